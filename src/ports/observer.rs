//! Observer port - abstraction for run observation and data collection
//!
//! Observers receive run lifecycle events so progress display, JSONL export,
//! and metrics can be composed without touching the training loop.

use crate::{
    Result,
    controller::EpisodeReport,
    report::{LearningCurve, TestBlockRecord},
    schedule::Phase,
};

/// Observer trait for monitoring a training run
///
/// # Event Sequence
///
/// 1. `on_run_start(planned_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode, phase)`
///    - `on_episode_end(report)`
///    - `on_test_block(record)` - When the episode closed an evaluation block
/// 3. `on_run_end(curve)` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use footman_rl::{controller::EpisodeReport, ports::Observer};
///
/// struct CountingObserver {
///     episodes: usize,
/// }
///
/// impl Observer for CountingObserver {
///     fn on_episode_end(&mut self, _report: &EpisodeReport) -> footman_rl::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first episode.
    ///
    /// `planned_episodes` counts training and evaluation episodes of a
    /// complete run.
    fn on_run_start(&mut self, _planned_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called before an episode's first turn.
    fn on_episode_start(&mut self, _episode: usize, _phase: Phase) -> Result<()> {
        Ok(())
    }

    /// Called after the controller closed an episode.
    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    /// Called when an evaluation block finished and its average was recorded.
    fn on_test_block(&mut self, _record: &TestBlockRecord) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode.
    fn on_run_end(&mut self, _curve: &LearningCurve) -> Result<()> {
        Ok(())
    }
}
