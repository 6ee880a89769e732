//! Human-readable progress lines

use std::io::{self, Write};

use crate::core::types::{Health, Round};
use crate::report::snapshot::BattleSnapshot;
use crate::report::BattleReporter;

/// Prints squad health listings every `interval` rounds
pub struct ProgressPrinter<W: Write> {
    out: W,
    interval: Round,
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W, interval: Round) -> Self {
        Self {
            out,
            interval: interval.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_snapshot(&mut self, snapshot: &BattleSnapshot) -> io::Result<()> {
        writeln!(self.out, "Round {}", snapshot.round)?;
        for army in &snapshot.armies {
            writeln!(self.out, "{}: {} squads left", army.label, army.active_squads)?;
            for squad in &army.squads {
                writeln!(
                    self.out,
                    "  {}: Soldiers [{}] Vehicles [{}]",
                    squad.label,
                    format_healths(&squad.health.soldiers),
                    format_healths(&squad.health.vehicles),
                )?;
            }
        }
        writeln!(self.out, "---------")?;
        self.out.flush()
    }
}

fn format_healths(healths: &[Health]) -> String {
    healths
        .iter()
        .map(|h| format!("{:.2}", h))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<W: Write> BattleReporter for ProgressPrinter<W> {
    fn wants_round(&self, round: Round) -> bool {
        round % self.interval == 0
    }

    fn report(&mut self, snapshot: &BattleSnapshot) {
        if let Err(e) = self.write_snapshot(snapshot) {
            tracing::warn!("Failed to write progress for round {}: {}", snapshot.round, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::snapshot::{ArmySnapshot, SquadHealth, SquadSnapshot};

    fn snapshot() -> BattleSnapshot {
        BattleSnapshot {
            round: 100,
            armies: vec![ArmySnapshot {
                label: "Army 1".into(),
                active_squads: 2,
                squads: vec![SquadSnapshot {
                    label: "Squad 1".into(),
                    health: SquadHealth {
                        soldiers: vec![100.0, 42.126],
                        vehicles: vec![],
                    },
                }],
            }],
        }
    }

    #[test]
    fn test_progress_format() {
        let mut printer = ProgressPrinter::new(Vec::new(), 50);
        assert!(printer.wants_round(100));
        assert!(!printer.wants_round(101));

        printer.report(&snapshot());

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            text,
            "Round 100\n\
             Army 1: 2 squads left\n  \
             Squad 1: Soldiers [100.00, 42.13] Vehicles []\n\
             ---------\n"
        );
    }
}
