//! Target selection heuristics
//!
//! Two layers, both keyed by the acting army's strategy: first an enemy
//! army, then (once per attacking squad) a squad inside that army.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::army::Army;
use crate::battle::squad::Squad;
use crate::battle::unit::Combatant;
use crate::core::error::BattlefieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Go after the healthiest enemy
    Strongest,
    /// Pick off the most damaged enemy still standing
    Weakest,
    /// Uniform choice
    Random,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Strongest, Strategy::Weakest, Strategy::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Strongest => "strongest",
            Strategy::Weakest => "weakest",
            Strategy::Random => "random",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = BattlefieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BattlefieldError::UnknownStrategy(s.to_string()))
    }
}

/// Index of the enemy army `attacker` should engage.
///
/// Never returns `attacker` when there are at least two armies.
pub fn choose_enemy_army<R: Rng + ?Sized>(
    strategy: Strategy,
    armies: &[Army],
    attacker: usize,
    rng: &mut R,
) -> usize {
    debug_assert!(armies.len() >= 2, "need an opponent to choose from");
    match strategy {
        Strategy::Strongest => strongest_army(armies, attacker),
        Strategy::Weakest => weakest_army(armies, attacker),
        Strategy::Random => random_army(armies.len(), attacker, rng),
    }
}

/// Index of the squad in `enemy` that one attacking squad should engage
pub fn choose_target_squad<R: Rng + ?Sized>(
    strategy: Strategy,
    enemy: &Army,
    rng: &mut R,
) -> usize {
    let squads = enemy.squads();
    debug_assert!(!squads.is_empty(), "enemy army has no squads");
    match strategy {
        Strategy::Strongest => strongest_squad(squads),
        Strategy::Weakest => weakest_squad(squads),
        Strategy::Random => rng.gen_range(0..squads.len()),
    }
}

/// Every army [`choose_enemy_army`] could return in the current state,
/// without drawing
pub fn enemy_army_candidates(strategy: Strategy, armies: &[Army], attacker: usize) -> Vec<usize> {
    match strategy {
        Strategy::Strongest => vec![strongest_army(armies, attacker)],
        Strategy::Weakest => vec![weakest_army(armies, attacker)],
        Strategy::Random => (0..armies.len()).filter(|&i| i != attacker).collect(),
    }
}

/// Every squad [`choose_target_squad`] could return in the current state,
/// without drawing
pub fn target_squad_candidates(strategy: Strategy, enemy: &Army) -> Vec<usize> {
    let squads = enemy.squads();
    match strategy {
        Strategy::Strongest => vec![strongest_squad(squads)],
        Strategy::Weakest => vec![weakest_squad(squads)],
        Strategy::Random => (0..squads.len()).collect(),
    }
}

/// First opponent slot: army 1 when army 0 attacks, army 0 otherwise
fn default_opponent(count: usize, attacker: usize) -> usize {
    if attacker == 0 && count > 1 {
        1
    } else {
        0
    }
}

// Ties go to the later army (`>=` / `<=` overwrite)
fn strongest_army(armies: &[Army], attacker: usize) -> usize {
    let mut chosen = default_opponent(armies.len(), attacker);
    let mut max_strength = 0.0;
    for (i, army) in armies.iter().enumerate() {
        let strength = army.strength();
        if i != attacker && strength >= max_strength {
            max_strength = strength;
            chosen = i;
        }
    }
    chosen
}

/// Destroyed armies (strength 0) are never the weakest target, as with
/// [`weakest_squad`]; falls back to the default opponent. Without this every
/// army would keep striking the first army wiped out.
fn weakest_army(armies: &[Army], attacker: usize) -> usize {
    let mut chosen = default_opponent(armies.len(), attacker);
    let mut min_strength = f64::INFINITY;
    for (i, army) in armies.iter().enumerate() {
        let strength = army.strength();
        if i != attacker && strength > 0.0 && strength <= min_strength {
            min_strength = strength;
            chosen = i;
        }
    }
    chosen
}

/// Uniform over the `count - 1` other armies
fn random_army<R: Rng + ?Sized>(count: usize, attacker: usize, rng: &mut R) -> usize {
    let chosen = rng.gen_range(0..=count - 2);
    if chosen == attacker {
        count - 1
    } else {
        chosen
    }
}

fn strongest_squad(squads: &[Squad]) -> usize {
    let mut chosen = 0;
    let mut max_strength = squads[0].strength();
    for (i, squad) in squads.iter().enumerate() {
        let strength = squad.strength();
        if strength >= max_strength {
            max_strength = strength;
            chosen = i;
        }
    }
    chosen
}

/// Wiped-out squads (strength 0) are never the weakest target;
/// squad 0 when nothing has strength left.
fn weakest_squad(squads: &[Squad]) -> usize {
    let mut chosen: Option<(usize, f64)> = None;
    for (i, squad) in squads.iter().enumerate() {
        let strength = squad.strength();
        if strength <= 0.0 {
            continue;
        }
        match chosen {
            Some((_, min_strength)) if strength > min_strength => {}
            _ => chosen = Some((i, strength)),
        }
    }
    chosen.map_or(0, |(i, _)| i)
}
