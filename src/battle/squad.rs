//! Squads: fixed groups of units attacking and defending as one

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::targeting::Strategy;
use crate::battle::unit::{geometric_mean, Combatant, Unit, UnitKind};
use crate::core::types::{Health, Millis};

/// Outcome of one squad-on-squad attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SquadAttack {
    /// Attacker's resolved probability did not beat the defender's
    Outmatched,
    /// Contest won but the success roll failed
    Missed,
    /// Damage applied to the defender
    Hit { damage: f64 },
}

impl SquadAttack {
    pub fn landed(&self) -> bool {
        matches!(self, SquadAttack::Hit { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    units: Vec<Unit>,
    /// Inherited from the owning army; targeting reads the army's tag instead
    strategy: Strategy,
}

impl Squad {
    /// Squad of `unit_amount` randomly chosen soldiers and vehicles
    pub fn new<R: Rng + ?Sized>(unit_amount: usize, strategy: Strategy, rng: &mut R) -> Self {
        let units = (0..unit_amount).map(|_| Unit::random(rng)).collect();
        Self::from_units(units, strategy)
    }

    pub fn from_units(units: Vec<Unit>, strategy: Strategy) -> Self {
        Self { units, strategy }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn active_unit_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_active()).count()
    }

    /// Health of every unit of `kind`, in squad order
    pub fn healths(&self, kind: UnitKind) -> Vec<Health> {
        self.units
            .iter()
            .filter(|u| u.kind() == kind)
            .map(Unit::health)
            .collect()
    }

    /// Contest against `target`, then roll for success.
    ///
    /// The attacker must resolve a strictly higher probability than the
    /// target. On a landed hit every attacking unit gains experience,
    /// including units that are already down.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        target: &mut Squad,
        rng: &mut R,
        now_ms: Millis,
    ) -> SquadAttack {
        let probability = self.attack_success_probability(rng);
        let damage = self.damage_output(now_ms);
        let target_probability = target.attack_success_probability(rng);

        if probability <= target_probability {
            return SquadAttack::Outmatched;
        }

        let roll = rng.gen_range(0..=100);
        if f64::from(roll) > probability * 100.0 {
            return SquadAttack::Missed;
        }

        target.apply_damage(damage, rng);
        self.gain_experience();
        SquadAttack::Hit { damage }
    }

    /// Whether an attack on `target` can ever hurt it: the target is still
    /// standing and our best draw beats its worst one.
    pub fn can_damage(&self, target: &Squad) -> bool {
        target.is_active() && self.probability_range().1 > target.probability_range().0
    }
}

impl Combatant for Squad {
    /// Geometric mean over active units; 0 when none are active
    fn attack_success_probability<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let active = self
            .units
            .iter()
            .filter(|u| u.is_active())
            .map(|u| u.attack_success_probability(rng));
        geometric_mean(active).unwrap_or(0.0)
    }

    /// Sum over all units, active or not
    fn damage_output(&mut self, now_ms: Millis) -> f64 {
        self.units.iter_mut().map(|u| u.damage_output(now_ms)).sum()
    }

    /// Each unit receives `amount / active_unit_count`, dead units included
    fn apply_damage<R: Rng + ?Sized>(&mut self, amount: f64, rng: &mut R) {
        let active = self.active_unit_count();
        if active == 0 {
            return;
        }
        let share = amount / active as f64;
        for unit in &mut self.units {
            unit.apply_damage(share, rng);
        }
    }

    fn gain_experience(&mut self) {
        self.units.iter_mut().for_each(Unit::gain_experience);
    }

    fn is_active(&self) -> bool {
        self.active_unit_count() > 0
    }

    fn strength(&self) -> f64 {
        self.units.iter().map(Unit::strength).sum()
    }

    /// Geometric means of the active units' bounds; `(0, 0)` when none are active
    fn probability_range(&self) -> (f64, f64) {
        let (low, high): (Vec<f64>, Vec<f64>) = self
            .units
            .iter()
            .filter(|u| u.is_active())
            .map(Unit::probability_range)
            .unzip();
        match (geometric_mean(low), geometric_mean(high)) {
            (Some(low), Some(high)) => (low, high),
            _ => (0.0, 0.0),
        }
    }
}
