//! Per-round health snapshots and the persisted snapshot log

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::battle::army::Army;
use crate::battle::execution::BattleSummary;
use crate::battle::unit::UnitKind;
use crate::core::error::Result;
use crate::core::types::{Health, Round};
use crate::report::BattleReporter;

/// Health listing of one squad, split by unit kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadHealth {
    #[serde(rename = "Soldiers")]
    pub soldiers: Vec<Health>,
    #[serde(rename = "Vehicles")]
    pub vehicles: Vec<Health>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadSnapshot {
    pub label: String,
    #[serde(flatten)]
    pub health: SquadHealth,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmySnapshot {
    pub label: String,
    pub active_squads: usize,
    pub squads: Vec<SquadSnapshot>,
}

/// Read-only picture of every army after a round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub round: Round,
    pub armies: Vec<ArmySnapshot>,
}

impl BattleSnapshot {
    /// Capture `armies`; labels are 1-based ("Army 1", "Squad 1")
    pub fn capture(round: Round, armies: &[Army]) -> Self {
        let armies = armies
            .iter()
            .enumerate()
            .map(|(a, army)| ArmySnapshot {
                label: army_label(a),
                active_squads: army.active_squad_count(),
                squads: army
                    .squads()
                    .iter()
                    .enumerate()
                    .map(|(s, squad)| SquadSnapshot {
                        label: squad_label(s),
                        health: SquadHealth {
                            soldiers: squad.healths(UnitKind::Soldier),
                            vehicles: squad.healths(UnitKind::Vehicle),
                        },
                    })
                    .collect(),
            })
            .collect();

        Self { round, armies }
    }
}

pub fn army_label(index: usize) -> String {
    format!("Army {}", index + 1)
}

pub fn squad_label(index: usize) -> String {
    format!("Squad {}", index + 1)
}

type SquadEntries = Vec<(String, SquadHealth)>;

/// Army label -> squad label -> health, kept in battle order
#[derive(Clone, Debug, PartialEq, Serialize)]
struct RoundEntry(#[serde(serialize_with = "ordered_map")] Vec<(String, OrderedSquads)>);

#[derive(Clone, Debug, PartialEq, Serialize)]
struct OrderedSquads(#[serde(serialize_with = "ordered_map")] SquadEntries);

#[allow(clippy::ptr_arg)]
fn ordered_map<S, K, V>(pairs: &Vec<(K, V)>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize,
    V: Serialize,
{
    serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

impl From<&BattleSnapshot> for RoundEntry {
    fn from(snapshot: &BattleSnapshot) -> Self {
        RoundEntry(
            snapshot
                .armies
                .iter()
                .map(|army| {
                    let squads = army
                        .squads
                        .iter()
                        .map(|squad| (squad.label.clone(), squad.health.clone()))
                        .collect();
                    (army.label.clone(), OrderedSquads(squads))
                })
                .collect(),
        )
    }
}

/// Structured log of captured rounds, written once when the battle ends.
///
/// Serializes as `round -> army -> squad -> {"Soldiers": [..], "Vehicles": [..]}`.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct SnapshotLog {
    #[serde(skip)]
    interval: Round,
    rounds: BTreeMap<Round, RoundEntry>,
}

impl SnapshotLog {
    /// Keep every `interval`-th round (and always the final one)
    pub fn new(interval: Round) -> Self {
        Self {
            interval: interval.max(1),
            rounds: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Captured round numbers in ascending order
    pub fn rounds(&self) -> impl Iterator<Item = Round> + '_ {
        self.rounds.keys().copied()
    }

    fn record(&mut self, snapshot: &BattleSnapshot) {
        self.rounds.insert(snapshot.round, RoundEntry::from(snapshot));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write the whole log to `path` as pretty-printed JSON
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), rounds = self.len(), "snapshot log written");
        Ok(())
    }
}

impl BattleReporter for SnapshotLog {
    fn wants_round(&self, round: Round) -> bool {
        round % self.interval == 0
    }

    fn report(&mut self, snapshot: &BattleSnapshot) {
        self.record(snapshot);
    }

    fn finish(&mut self, last: &BattleSnapshot, _summary: &BattleSummary) {
        self.record(last);
    }
}
