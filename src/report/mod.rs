//! Battle reporting - read-only consumers of the orchestrator's state
//!
//! Reporters never touch simulation state; they receive snapshots the
//! orchestrator captures on the rounds they ask for.

pub mod progress;
pub mod snapshot;

pub use progress::ProgressPrinter;
pub use snapshot::{
    army_label, squad_label, ArmySnapshot, BattleSnapshot, SnapshotLog, SquadHealth,
    SquadSnapshot,
};

use crate::battle::execution::BattleSummary;
use crate::core::types::Round;

/// Receives periodic snapshots from a running battle
pub trait BattleReporter {
    /// Whether a snapshot should be captured after `round`
    fn wants_round(&self, round: Round) -> bool;

    fn report(&mut self, snapshot: &BattleSnapshot);

    /// Called once with the state after the concluding round
    fn finish(&mut self, _last: &BattleSnapshot, _summary: &BattleSummary) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl BattleReporter for NullReporter {
    fn wants_round(&self, _round: Round) -> bool {
        false
    }

    fn report(&mut self, _snapshot: &BattleSnapshot) {}
}

impl<T: BattleReporter + ?Sized> BattleReporter for &mut T {
    fn wants_round(&self, round: Round) -> bool {
        (**self).wants_round(round)
    }

    fn report(&mut self, snapshot: &BattleSnapshot) {
        (**self).report(snapshot)
    }

    fn finish(&mut self, last: &BattleSnapshot, summary: &BattleSummary) {
        (**self).finish(last, summary)
    }
}

/// Fans out to every reporter that wants the round
impl BattleReporter for Vec<Box<dyn BattleReporter + '_>> {
    fn wants_round(&self, round: Round) -> bool {
        self.iter().any(|r| r.wants_round(round))
    }

    fn report(&mut self, snapshot: &BattleSnapshot) {
        for reporter in self.iter_mut() {
            if reporter.wants_round(snapshot.round) {
                reporter.report(snapshot);
            }
        }
    }

    fn finish(&mut self, last: &BattleSnapshot, summary: &BattleSummary) {
        for reporter in self.iter_mut() {
            reporter.finish(last, summary);
        }
    }
}
