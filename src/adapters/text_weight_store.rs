//! Plain-text implementation of the weight store.
//!
//! One value per line, in feature order. Values are written with Rust's
//! shortest round-trip float formatting, so loading returns exactly what was
//! saved.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::WeightStore};

/// Default location of the weight file, relative to the working directory.
pub const DEFAULT_WEIGHTS_PATH: &str = "agent_weights/weights.txt";

/// Line-per-weight text file store.
///
/// # Examples
///
/// ```no_run
/// use footman_rl::adapters::TextWeightStore;
/// use footman_rl::ports::WeightStore;
/// use std::path::Path;
///
/// let store = TextWeightStore;
/// store.save(&[0.25, -1.5, 0.0, 3.0, 0.125], Path::new("agent_weights/weights.txt"))?;
/// let weights = store.load(Path::new("agent_weights/weights.txt"))?;
/// assert_eq!(weights.len(), 5);
/// # Ok::<(), footman_rl::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWeightStore;

impl TextWeightStore {
    pub fn new() -> Self {
        Self
    }
}

/// Parse the text format; blank lines are ignored.
pub fn parse_weights(text: &str) -> Result<Vec<f64>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            line.trim().parse::<f64>().map_err(|_| Error::ParseWeight {
                line: idx + 1,
                value: line.to_string(),
            })
        })
        .collect()
}

impl WeightStore for TextWeightStore {
    fn save(&self, weights: &[f64], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {}", parent.display()),
                source,
            })?;
        }

        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        for weight in weights {
            writeln!(writer, "{weight}").map_err(|source| Error::Io {
                operation: format!("write weights to {}", path.display()),
                source,
            })?;
        }

        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush weights to {}", path.display()),
            source,
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Vec<f64>> {
        if !path.exists() {
            return Err(Error::MissingWeights {
                location: path.display().to_string(),
            });
        }

        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read weights from {}", path.display()),
            source,
        })?;

        parse_weights(&text)
    }
}
