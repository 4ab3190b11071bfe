mod common;

use common::{controller, controller_with_weights, enemy, footman, id, two_on_two};
use footman_rl::{
    Side,
    app::RunConfig,
    battle::{ActionFeedback, AttackCommand, BattleSnapshot, TurnHistory},
};

/// One footman with 3 health next to one enemy with 2 health.
fn duel(turn: u32) -> BattleSnapshot {
    BattleSnapshot::new(turn)
        .with_unit(footman(0, 0, 0, 3.0))
        .with_unit(enemy(10, 1, 0, 2.0))
}

#[test]
fn event_turn_updates_toward_accumulated_reward() {
    let (mut ctl, _) = controller_with_weights(RunConfig::default(), vec![0.0; 5]);

    let opening = ctl.initial_step(&duel(0), &TurnHistory::new());
    assert_eq!(opening, vec![AttackCommand::new(id(0), id(10))]);

    let hit = TurnHistory::new()
        .with_damage((Side::Friendly, id(0)), (Side::Enemy, id(10)), 10.0)
        .with_feedback(id(0), ActionFeedback::Incomplete);
    let commands = ctl.middle_step(&duel(1), &hit);
    assert!(commands.is_empty());

    // features: distance 1, defender 2, attacker 3, one attacker, committed 5
    let expected = [0.001, 0.002, 0.003, 0.001, 0.005];
    for (w, e) in ctl.weights().iter().zip(expected) {
        assert!((w - e).abs() < 1e-12, "{w} != {e}");
    }
    assert_eq!(ctl.accumulated_reward(id(0)), Some(0.0));
}

#[test]
fn terminal_turn_is_not_credited() {
    let weights = vec![0.1, -0.4, 0.2, 0.3, -0.1];
    let (mut ctl, _) = controller_with_weights(RunConfig::default(), weights.clone());
    ctl.initial_step(&duel(0), &TurnHistory::new());

    let kill = TurnHistory::new()
        .with_damage((Side::Friendly, id(0)), (Side::Enemy, id(10)), 2.0)
        .with_death(Side::Enemy, id(10))
        .with_feedback(id(0), ActionFeedback::Completed);
    let finished = BattleSnapshot::new(1).with_unit(footman(0, 0, 0, 3.0));
    let report = ctl.terminal_step(&finished, &kill);

    assert_eq!(report.summary.updates, 0);
    assert_eq!(report.summary.reward, 0.0);
    assert_eq!(ctl.weights(), weights.as_slice());
    // the kill still counts towards the outcome
    assert!(report.summary.won);
    assert_eq!(report.summary.survivors, 1);
}

#[test]
fn quiet_turns_keep_accumulating() {
    let (mut ctl, _) = controller_with_weights(RunConfig::default(), vec![0.0; 5]);
    ctl.initial_step(&duel(0), &TurnHistory::new());

    let order = TurnHistory::new()
        .with_command(AttackCommand::new(id(0), id(10)))
        .with_feedback(id(0), ActionFeedback::Incomplete);
    ctl.middle_step(&duel(1), &order);
    ctl.middle_step(&duel(2), &order);

    let total = ctl.accumulated_reward(id(0)).unwrap();
    assert!((total - (-0.1 - 0.09)).abs() < 1e-12);
    assert_eq!(ctl.weights(), &[0.0; 5]);

    let hit = TurnHistory::new()
        .with_damage((Side::Enemy, id(10)), (Side::Friendly, id(0)), 1.0)
        .with_feedback(id(0), ActionFeedback::Incomplete);
    ctl.middle_step(&duel(3), &hit);
    assert_eq!(ctl.accumulated_reward(id(0)), Some(0.0));
    assert_ne!(ctl.weights(), &[0.0; 5]);
}

#[test]
fn friendly_death_clears_its_bookkeeping() {
    let (mut ctl, _) = controller(RunConfig::default());
    let snapshot = BattleSnapshot::new(0)
        .with_unit(footman(0, 0, 0, 50.0))
        .with_unit(footman(1, 0, 1, 50.0))
        .with_unit(enemy(10, 2, 0, 50.0));
    ctl.initial_step(&snapshot, &TurnHistory::new());
    assert_eq!(ctl.assignments().attackers_of(id(10)).map(|s| s.len()), Some(2));

    let death = TurnHistory::new()
        .with_damage((Side::Enemy, id(10)), (Side::Friendly, id(1)), 50.0)
        .with_death(Side::Friendly, id(1))
        .with_feedback(id(0), ActionFeedback::Incomplete);
    let mut after = snapshot.clone();
    after.remove(Side::Friendly, id(1));
    after.set_turn(1);
    ctl.middle_step(&after, &death);

    assert_eq!(ctl.friendly_units().collect::<Vec<_>>(), vec![id(0)]);
    assert_eq!(ctl.assignments().target_of(id(1)), None);
    assert!(!ctl.assignments().attackers_of(id(10)).unwrap().contains(&id(1)));
    assert_eq!(ctl.accumulated_reward(id(1)), None);
}

#[test]
fn enemy_death_frees_attackers_for_new_targets() {
    let (mut ctl, _) = controller(RunConfig::default());
    let opening = ctl.initial_step(&two_on_two(0), &TurnHistory::new());
    let first_target = opening
        .iter()
        .find(|c| c.attacker == id(0))
        .map(|c| c.target)
        .unwrap();
    let survivor = if first_target == id(10) { id(11) } else { id(10) };

    let mut after = two_on_two(1);
    after.remove(Side::Enemy, first_target);
    let kill = TurnHistory::new()
        .with_death(Side::Enemy, first_target)
        .with_feedback(id(0), ActionFeedback::Completed)
        .with_feedback(id(1), ActionFeedback::Incomplete);
    let commands = ctl.middle_step(&after, &kill);

    assert!(!ctl.assignments().is_tracked(first_target));
    assert!(commands.contains(&AttackCommand::new(id(0), survivor)));
    assert_eq!(ctl.enemy_units().collect::<Vec<_>>(), vec![survivor]);
}

#[test]
fn unit_attribution_credits_only_the_striker() {
    use footman_rl::reward::RewardAttribution;

    let config = RunConfig::default()
        .with_attribution(RewardAttribution::Unit)
        .with_episodes(0);
    let (mut ctl, _) = controller(config);
    ctl.initial_step(&two_on_two(0), &TurnHistory::new());

    // evaluation mode: nothing resets the accumulators
    let quiet = TurnHistory::new()
        .with_command(AttackCommand::new(id(1), id(11)))
        .with_feedback(id(0), ActionFeedback::Incomplete)
        .with_feedback(id(1), ActionFeedback::Incomplete);
    ctl.middle_step(&two_on_two(1), &quiet);

    assert_eq!(ctl.accumulated_reward(id(0)), Some(0.0));
    assert!((ctl.accumulated_reward(id(1)).unwrap() + 0.1).abs() < 1e-12);
}
