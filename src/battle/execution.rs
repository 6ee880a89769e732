//! Battle orchestration - the round loop
//!
//! Each round every army, in index order and whether or not it still has
//! units standing, picks an enemy army and makes one attack pass against
//! it. The battle concludes once fewer than two armies remain active, once
//! no attack any strategy could make can win its contest against a squad
//! still standing, or after the round limit.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::army::Army;
use crate::battle::constants::DEFAULT_MAX_ROUNDS;
use crate::battle::targeting::{choose_enemy_army, enemy_army_candidates};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Round;
use crate::report::{BattleReporter, BattleSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Two or more armies still active
    Running,
    /// Decided, deadlocked or out of rounds
    Concluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// 0-based index of the last army standing
    Winner(usize),
    /// Mutual destruction
    NoWinner,
    /// Two or more armies left, none able to hurt another
    Stalemate,
    /// Still undecided when the round limit ran out
    Undecided,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::Winner(index) => write!(f, "Army {} is the winner!", index + 1),
            BattleOutcome::NoWinner => f.write_str("There is no winner"),
            BattleOutcome::Stalemate => {
                f.write_str("Stalemate: the surviving armies can no longer hurt each other")
            }
            BattleOutcome::Undecided => f.write_str("The battle was called off undecided"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSummary {
    /// Rounds played
    pub rounds: Round,
    pub outcome: BattleOutcome,
    /// Armies still active at the end; more than one only without a winner
    pub survivors: usize,
}

/// Complete battle state: armies, the shared random stream and a clock
pub struct Battle<R = ChaCha8Rng, C = SystemClock> {
    armies: Vec<Army>,
    rng: R,
    clock: C,
    round: Round,
    max_rounds: Round,
    phase: BattlePhase,
    outcome: Option<BattleOutcome>,
}

impl Battle<ChaCha8Rng, SystemClock> {
    /// Seed the generator from `config` and raise every army
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(config.seed), SystemClock)
    }
}

impl<R: Rng, C: Clock> Battle<R, C> {
    /// Raise every army from `config` drawing on `rng`.
    ///
    /// Armies are built in order, squad by squad, unit by unit, so the
    /// same seeded generator always yields the same battlefield.
    pub fn with_rng(config: &SimulationConfig, mut rng: R, clock: C) -> Result<Self> {
        config.validate()?;
        let armies = (0..config.armies_amount)
            .map(|_| {
                Army::new(
                    config.squad_amount,
                    config.units_amount,
                    config.strategy,
                    &mut rng,
                )
            })
            .collect();
        Ok(Self::from_armies(armies, rng, clock).with_max_rounds(config.max_rounds))
    }

    /// Battle over prepared armies, limited to [`DEFAULT_MAX_ROUNDS`]
    pub fn from_armies(armies: Vec<Army>, rng: R, clock: C) -> Self {
        let mut battle = Self {
            armies,
            rng,
            clock,
            round: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            phase: BattlePhase::Running,
            outcome: None,
        };
        battle.update_phase();
        battle
    }

    /// Builder: call the battle off as undecided after `max_rounds` rounds
    pub fn with_max_rounds(mut self, max_rounds: Round) -> Self {
        self.max_rounds = max_rounds;
        self.update_phase();
        self
    }

    pub fn armies(&self) -> &[Army] {
        &self.armies
    }

    /// Rounds completed so far
    pub fn round(&self) -> Round {
        self.round
    }

    pub fn max_rounds(&self) -> Round {
        self.max_rounds
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Concluded
    }

    pub fn active_army_count(&self) -> usize {
        self.armies.iter().filter(|a| a.is_active()).count()
    }

    /// `None` while the battle is still running
    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    fn update_phase(&mut self) {
        if self.is_finished() {
            return;
        }
        let active: Vec<usize> = self
            .armies
            .iter()
            .enumerate()
            .filter(|(_, army)| army.is_active())
            .map(|(index, _)| index)
            .collect();

        let outcome = match active.as_slice() {
            [] => BattleOutcome::NoWinner,
            [winner] => BattleOutcome::Winner(*winner),
            _ if !self.damage_possible() => BattleOutcome::Stalemate,
            _ if self.round >= self.max_rounds => BattleOutcome::Undecided,
            _ => return,
        };
        self.phase = BattlePhase::Concluded;
        self.outcome = Some(outcome);
    }

    /// Whether any army could still win a contest against a standing
    /// squad it might be sent against. Once this fails, health is frozen
    /// for good.
    fn damage_possible(&self) -> bool {
        self.armies.iter().enumerate().any(|(attacker, army)| {
            enemy_army_candidates(army.strategy(), &self.armies, attacker)
                .into_iter()
                .any(|enemy| army.can_damage(&self.armies[enemy]))
        })
    }

    /// Play one full round. Does nothing once the battle has concluded.
    pub fn step(&mut self) -> BattlePhase {
        if self.is_finished() {
            return self.phase;
        }

        for attacker in 0..self.armies.len() {
            let strategy = self.armies[attacker].strategy();
            let target = choose_enemy_army(strategy, &self.armies, attacker, &mut self.rng);
            let now_ms = self.clock.now_ms();

            let (army, enemy) = pair_mut(&mut self.armies, attacker, target);
            let pass = army.attack(enemy, &mut self.rng, now_ms);
            tracing::trace!(
                round = self.round,
                attacker,
                target_army = target,
                hits = pass.hits,
                damage = pass.damage_dealt,
                "attack pass"
            );
        }

        self.round += 1;
        self.update_phase();
        self.phase
    }

    /// Play rounds until the battle concludes
    pub fn run<P: BattleReporter + ?Sized>(&mut self, reporter: &mut P) -> BattleSummary {
        tracing::info!(
            armies = self.armies.len(),
            active = self.active_army_count(),
            "battle started"
        );

        while !self.is_finished() {
            let round = self.round;
            self.step();

            if reporter.wants_round(round) {
                tracing::debug!(round, active_armies = self.active_army_count(), "round report");
                reporter.report(&BattleSnapshot::capture(round, &self.armies));
            }
        }

        let summary = self.summary();
        let last = BattleSnapshot::capture(self.round.saturating_sub(1), &self.armies);
        reporter.finish(&last, &summary);

        tracing::info!(rounds = summary.rounds, outcome = %summary.outcome, "battle concluded");
        summary
    }

    /// Summary of the battle so far; the outcome is only final once concluded
    pub fn summary(&self) -> BattleSummary {
        BattleSummary {
            rounds: self.round,
            outcome: self.outcome().unwrap_or(BattleOutcome::NoWinner),
            survivors: self.active_army_count(),
        }
    }
}

/// Two distinct mutable elements of one slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "an army cannot attack itself");
    if a < b {
        let (low, high) = items.split_at_mut(b);
        (&mut low[a], &mut high[0])
    } else {
        let (low, high) = items.split_at_mut(a);
        (&mut high[0], &mut low[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::squad::Squad;
    use crate::battle::targeting::Strategy;
    use crate::battle::unit::{Soldier, Unit};
    use crate::core::clock::ManualClock;
    use crate::report::NullReporter;

    fn squad(health: f64, experience: u32) -> Squad {
        let units: Vec<Unit> = (0..5)
            .map(|_| {
                Soldier::with_cooldown(500)
                    .with_health(health)
                    .with_experience(experience)
                    .into()
            })
            .collect();
        Squad::from_units(units, Strategy::Strongest)
    }

    fn army(health: f64, experience: u32) -> Army {
        let squads = vec![squad(health, experience), squad(health, experience)];
        Army::from_squads(squads, Strategy::Strongest)
    }

    fn battle(armies: Vec<Army>) -> Battle<ChaCha8Rng, ManualClock> {
        Battle::from_armies(armies, rng(), ManualClock::new(0))
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2024)
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(BattleOutcome::Winner(0).to_string(), "Army 1 is the winner!");
        assert_eq!(BattleOutcome::NoWinner.to_string(), "There is no winner");
        assert!(BattleOutcome::Stalemate.to_string().starts_with("Stalemate"));
        assert!(BattleOutcome::Undecided.to_string().contains("undecided"));
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut values = [1, 2, 3, 4];
        let (a, b) = pair_mut(&mut values, 3, 1);
        assert_eq!((*a, *b), (4, 2));
        let (a, b) = pair_mut(&mut values, 0, 2);
        assert_eq!((*a, *b), (1, 3));
    }

    #[test]
    fn test_single_survivor_concludes_immediately() {
        let battle = battle(vec![army(100.0, 0), army(0.0, 0)]);
        assert!(battle.is_finished());
        assert_eq!(battle.outcome(), Some(BattleOutcome::Winner(0)));
    }

    #[test]
    fn test_all_dead_is_no_winner() {
        let battle = battle(vec![army(0.0, 0), army(0.0, 0)]);
        assert_eq!(battle.outcome(), Some(BattleOutcome::NoWinner));
        assert_eq!(battle.summary().survivors, 0);
    }

    #[test]
    fn test_running_has_no_outcome() {
        let battle = battle(vec![army(100.0, 0), army(100.0, 0)]);
        assert_eq!(battle.phase(), BattlePhase::Running);
        assert_eq!(battle.outcome(), None);
    }

    #[test]
    fn test_veterans_beat_recruits() {
        let mut battle = battle(vec![army(100.0, 0), army(100.0, 50)]);
        let summary = battle.run(&mut NullReporter);
        assert!(battle.is_finished());
        assert_eq!(summary.outcome, BattleOutcome::Winner(1));
        assert_eq!(summary.survivors, 1);
        assert_eq!(summary.rounds, battle.round());
        // Further steps are no-ops
        assert_eq!(battle.step(), BattlePhase::Concluded);
        assert_eq!(battle.round(), summary.rounds);
    }

    #[test]
    fn test_from_config_is_reproducible() {
        let config = SimulationConfig::new(77, 3, Strategy::Weakest, 2, 6);
        let first = Battle::from_config(&config).unwrap();
        let second = Battle::from_config(&config).unwrap();
        assert_eq!(first.armies(), second.armies());
        assert_eq!(first.armies().len(), 3);
    }

    #[test]
    fn test_invalid_config_builds_nothing() {
        let config = SimulationConfig::new(77, 1, Strategy::Weakest, 2, 6);
        assert!(Battle::from_config(&config).is_err());
    }

    #[test]
    fn test_veteran_armies_are_a_stalemate() {
        let battle = battle(vec![army(100.0, 50), army(100.0, 50)]);
        assert!(battle.is_finished());
        assert_eq!(battle.outcome(), Some(BattleOutcome::Stalemate));
        assert_eq!(battle.summary().survivors, 2);
    }

    #[test]
    fn test_stalemate_once_only_veterans_remain() {
        let weakest = |health, experience| {
            let squads = vec![squad(health, experience), squad(health, experience)];
            Army::from_squads(squads, Strategy::Weakest)
        };
        let mut battle = battle(vec![weakest(100.0, 50), weakest(100.0, 50), weakest(100.0, 0)]);
        assert_eq!(battle.phase(), BattlePhase::Running);

        let summary = battle.run(&mut NullReporter);

        assert_eq!(summary.outcome, BattleOutcome::Stalemate);
        assert_eq!(summary.survivors, 2);
        assert!(summary.rounds > 0);
        assert!(!battle.armies()[2].is_active());
    }

    #[test]
    fn test_round_limit_calls_battle_off() {
        let mut battle = battle(vec![army(100.0, 0), army(100.0, 0)]).with_max_rounds(3);
        assert_eq!(battle.max_rounds(), 3);

        let summary = battle.run(&mut NullReporter);

        assert_eq!(summary.outcome, BattleOutcome::Undecided);
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.survivors, 2);
    }

    #[test]
    fn test_config_round_limit_applies() {
        let mut config = SimulationConfig::new(77, 2, Strategy::Random, 2, 5);
        config.max_rounds = 1;
        let mut battle = Battle::from_config(&config).unwrap();
        assert_eq!(battle.max_rounds(), 1);
        battle.run(&mut NullReporter);
        assert!(battle.round() <= 1);
    }
}
