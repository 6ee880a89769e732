//! Atomic combatants: soldiers and crewed vehicles
//!
//! A unit is never removed from its squad. A dead unit keeps `health == 0`
//! and simply drops out of every active-set computation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::*;
use crate::core::types::{Health, Millis};

/// Capabilities shared by every kind of combatant
pub trait Combatant {
    /// Chance in `[0, 1]` that an attack by this combatant lands.
    /// Draws from `rng`.
    fn attack_success_probability<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;

    /// Damage dealt by one landed attack. Advances the attack cooldown
    /// timer when `now_ms` is past it; the returned amount does not depend
    /// on the cooldown.
    fn damage_output(&mut self, now_ms: Millis) -> f64;

    fn apply_damage<R: Rng + ?Sized>(&mut self, amount: f64, rng: &mut R);

    fn gain_experience(&mut self);

    fn is_active(&self) -> bool;

    /// Health metric used for target selection only
    fn strength(&self) -> f64;

    /// Lowest and highest value [`Self::attack_success_probability`] can
    /// resolve to in the current state. Both ends are reachable.
    fn probability_range(&self) -> (f64, f64);
}

/// Geometric mean of `values`, `None` when empty
pub(crate) fn geometric_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut product = 1.0;
    let mut count = 0usize;
    for value in values {
        product *= value;
        count += 1;
    }
    (count > 0).then(|| product.powf(1.0 / count as f64))
}

/// `0.5 * (1 + health / 100)`
fn health_factor(health: Health) -> f64 {
    0.5 * (1.0 + health / MAX_HEALTH)
}

/// A soldier's success probability for one roll in `[50 + experience, 100]`
fn scaled_roll(health: Health, roll: u32) -> f64 {
    health_factor(health) * f64::from(roll) / 100.0
}

/// State every unit carries regardless of kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UnitState {
    health: Health,
    cooldown_ms: Millis,
    last_attacked_at: Millis,
}

impl UnitState {
    fn new(cooldown_ms: Millis) -> Self {
        Self {
            health: MAX_HEALTH,
            cooldown_ms,
            last_attacked_at: 0,
        }
    }

    fn take_damage(&mut self, amount: f64) {
        debug_assert!(amount >= 0.0, "negative damage {amount}");
        self.health = (self.health - amount).max(0.0);
    }

    fn set_health(&mut self, health: Health) {
        self.health = health.clamp(0.0, MAX_HEALTH);
    }

    /// Record the attack time if the cooldown has elapsed
    fn mark_attack(&mut self, now_ms: Millis) {
        if now_ms.saturating_sub(self.last_attacked_at) >= self.cooldown_ms {
            self.last_attacked_at = now_ms;
        }
    }
}

/// Infantry unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    state: UnitState,
    experience: u32,
}

impl Soldier {
    /// Fresh soldier with a random cooldown
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (lo, hi) = SOLDIER_COOLDOWN_MS;
        Self::with_cooldown(rng.gen_range(lo..=hi))
    }

    pub fn with_cooldown(cooldown_ms: Millis) -> Self {
        Self {
            state: UnitState::new(cooldown_ms),
            experience: 0,
        }
    }

    /// Builder: override health (clamped to `[0, 100]`)
    pub fn with_health(mut self, health: Health) -> Self {
        self.state.set_health(health);
        self
    }

    /// Builder: override experience (capped at 50)
    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience.min(MAX_EXPERIENCE);
        self
    }

    pub fn health(&self) -> Health {
        self.state.health
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn cooldown_ms(&self) -> Millis {
        self.state.cooldown_ms
    }

    pub fn last_attacked_at(&self) -> Millis {
        self.state.last_attacked_at
    }

    fn disable(&mut self) {
        self.state.health = 0.0;
    }
}

impl Combatant for Soldier {
    fn attack_success_probability<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let roll = rng.gen_range((50 + self.experience)..=100);
        scaled_roll(self.state.health, roll)
    }

    fn damage_output(&mut self, now_ms: Millis) -> f64 {
        self.state.mark_attack(now_ms);
        SOLDIER_BASE_DAMAGE + f64::from(self.experience) / 100.0
    }

    fn apply_damage<R: Rng + ?Sized>(&mut self, amount: f64, _rng: &mut R) {
        self.state.take_damage(amount);
    }

    fn gain_experience(&mut self) {
        if self.experience < MAX_EXPERIENCE {
            self.experience += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.state.health > 0.0
    }

    fn strength(&self) -> f64 {
        self.state.health
    }

    fn probability_range(&self) -> (f64, f64) {
        (
            scaled_roll(self.state.health, 50 + self.experience),
            scaled_roll(self.state.health, 100),
        )
    }
}

/// Vehicle crewed by 1-3 operators it exclusively owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    state: UnitState,
    operators: Vec<Soldier>,
}

impl Vehicle {
    /// Fresh vehicle with a random cooldown and a random crew
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (lo, hi) = VEHICLE_COOLDOWN_MS;
        let cooldown_ms = rng.gen_range(lo..=hi);
        let crew = rng.gen_range(MIN_OPERATORS..=MAX_OPERATORS);
        let operators = (0..crew).map(|_| Soldier::new(rng)).collect();
        Self::with_operators(cooldown_ms, operators)
    }

    /// Vehicle with a given crew.
    ///
    /// # Panics
    ///
    /// Panics unless the crew has between 1 and 3 members.
    pub fn with_operators(cooldown_ms: Millis, operators: Vec<Soldier>) -> Self {
        assert!(
            (MIN_OPERATORS..=MAX_OPERATORS).contains(&operators.len()),
            "vehicle needs {}-{} operators, got {}",
            MIN_OPERATORS,
            MAX_OPERATORS,
            operators.len()
        );
        Self {
            state: UnitState::new(cooldown_ms),
            operators,
        }
    }

    /// Builder: override hull health (clamped to `[0, 100]`)
    pub fn with_health(mut self, health: Health) -> Self {
        self.state.set_health(health);
        self
    }

    pub fn health(&self) -> Health {
        self.state.health
    }

    pub fn cooldown_ms(&self) -> Millis {
        self.state.cooldown_ms
    }

    pub fn last_attacked_at(&self) -> Millis {
        self.state.last_attacked_at
    }

    pub fn operators(&self) -> &[Soldier] {
        &self.operators
    }

    pub fn active_operator_count(&self) -> usize {
        self.operators.iter().filter(|o| o.is_active()).count()
    }

    /// Total experience of the crew still alive
    pub fn crew_experience(&self) -> u32 {
        self.operators
            .iter()
            .filter(|o| o.is_active())
            .map(|o| o.experience)
            .sum()
    }
}

impl Combatant for Vehicle {
    fn attack_success_probability<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        debug_assert!(
            self.active_operator_count() > 0,
            "success probability requested for an uncrewed vehicle"
        );
        let crew = self
            .operators
            .iter()
            .filter(|o| o.is_active())
            .map(|o| o.attack_success_probability(rng));
        match geometric_mean(crew) {
            Some(mean) => mean * health_factor(self.state.health),
            None => 0.0,
        }
    }

    fn damage_output(&mut self, now_ms: Millis) -> f64 {
        let crew_experience = self.crew_experience();
        self.state.mark_attack(now_ms);
        VEHICLE_BASE_DAMAGE + f64::from(crew_experience) / 100.0
    }

    fn apply_damage<R: Rng + ?Sized>(&mut self, amount: f64, rng: &mut R) {
        self.state.take_damage(amount * VEHICLE_HULL_SHARE);

        let crew = self.operators.len();
        let direct = rng.gen_range(0..crew);
        self.operators[direct].state.take_damage(amount * DIRECT_HIT_SHARE);

        if crew == 1 {
            // Nobody else to absorb the splash
            self.operators[direct].state.take_damage(amount * CREW_SPLASH_SHARE);
        } else {
            let share = amount * CREW_SPLASH_SHARE / (crew - 1) as f64;
            for (i, operator) in self.operators.iter_mut().enumerate() {
                if i != direct {
                    operator.state.take_damage(share);
                }
            }
        }

        if !self.is_active() {
            self.operators.iter_mut().for_each(Soldier::disable);
        }

        // A vehicle without a living crew is out of action
        if self.active_operator_count() == 0 {
            self.state.health = 0.0;
        }
    }

    fn gain_experience(&mut self) {
        self.operators.iter_mut().for_each(Soldier::gain_experience);
    }

    fn is_active(&self) -> bool {
        self.state.health > 0.0
    }

    fn strength(&self) -> f64 {
        let crew_health: f64 = self.operators.iter().map(|o| o.state.health).sum();
        (self.state.health + crew_health) / (self.operators.len() + 1) as f64
    }

    fn probability_range(&self) -> (f64, f64) {
        let (low, high): (Vec<f64>, Vec<f64>) = self
            .operators
            .iter()
            .filter(|o| o.is_active())
            .map(Soldier::probability_range)
            .unzip();
        let factor = health_factor(self.state.health);
        match (geometric_mean(low), geometric_mean(high)) {
            (Some(low), Some(high)) => (low * factor, high * factor),
            _ => (0.0, 0.0),
        }
    }
}

/// Kind tag used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Soldier,
    Vehicle,
}

/// Any squad member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Unit {
    Soldier(Soldier),
    Vehicle(Vehicle),
}

impl Unit {
    /// Soldier or vehicle with equal odds
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_range(0..=1) == 0 {
            Unit::Soldier(Soldier::new(rng))
        } else {
            Unit::Vehicle(Vehicle::new(rng))
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Soldier(_) => UnitKind::Soldier,
            Unit::Vehicle(_) => UnitKind::Vehicle,
        }
    }

    /// Own health (a vehicle's hull, not its crew)
    pub fn health(&self) -> Health {
        match self {
            Unit::Soldier(s) => s.health(),
            Unit::Vehicle(v) => v.health(),
        }
    }

    /// Single-unit attack: no probability contest, just the success roll.
    /// Returns whether the attack landed; a unit that is down never attacks.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        enemy: &mut Unit,
        rng: &mut R,
        now_ms: Millis,
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        let probability = self.attack_success_probability(rng);
        let damage = self.damage_output(now_ms);
        let roll = rng.gen_range(0..=100);
        if f64::from(roll) <= probability * 100.0 {
            enemy.apply_damage(damage, rng);
            self.gain_experience();
            true
        } else {
            false
        }
    }
}

impl From<Soldier> for Unit {
    fn from(soldier: Soldier) -> Self {
        Unit::Soldier(soldier)
    }
}

impl From<Vehicle> for Unit {
    fn from(vehicle: Vehicle) -> Self {
        Unit::Vehicle(vehicle)
    }
}

impl Combatant for Unit {
    fn attack_success_probability<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Unit::Soldier(s) => s.attack_success_probability(rng),
            Unit::Vehicle(v) => v.attack_success_probability(rng),
        }
    }

    fn damage_output(&mut self, now_ms: Millis) -> f64 {
        match self {
            Unit::Soldier(s) => s.damage_output(now_ms),
            Unit::Vehicle(v) => v.damage_output(now_ms),
        }
    }

    fn apply_damage<R: Rng + ?Sized>(&mut self, amount: f64, rng: &mut R) {
        match self {
            Unit::Soldier(s) => s.apply_damage(amount, rng),
            Unit::Vehicle(v) => v.apply_damage(amount, rng),
        }
    }

    fn gain_experience(&mut self) {
        match self {
            Unit::Soldier(s) => s.gain_experience(),
            Unit::Vehicle(v) => v.gain_experience(),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Unit::Soldier(s) => s.is_active(),
            Unit::Vehicle(v) => v.is_active(),
        }
    }

    fn strength(&self) -> f64 {
        match self {
            Unit::Soldier(s) => s.strength(),
            Unit::Vehicle(v) => v.strength(),
        }
    }

    fn probability_range(&self) -> (f64, f64) {
        match self {
            Unit::Soldier(s) => s.probability_range(),
            Unit::Vehicle(v) => v.probability_range(),
        }
    }
}
