//! Attrition combat between armies of soldier and vehicle squads
//!
//! Hierarchy: Unit (Soldier | Vehicle) → Squad → Army.
//!
//! Damage flows downward from attacker to target: squad to units, vehicle
//! to its crew. Experience flows back to the attacking squad's own units
//! when a hit lands.

pub mod army;
pub mod constants;
pub mod execution;
pub mod squad;
pub mod targeting;
pub mod unit;

// Re-exports for convenient access
pub use army::{Army, AttackPass};
pub use constants::*;
pub use execution::{Battle, BattleOutcome, BattlePhase, BattleSummary};
pub use squad::{Squad, SquadAttack};
pub use targeting::{
    choose_enemy_army, choose_target_squad, enemy_army_candidates, target_squad_candidates,
    Strategy,
};
pub use unit::{Combatant, Soldier, Unit, UnitKind, Vehicle};
