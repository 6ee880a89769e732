//! Armies: squads sharing one targeting strategy

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::squad::{Squad, SquadAttack};
use crate::battle::targeting::{choose_target_squad, target_squad_candidates, Strategy};
use crate::battle::unit::Combatant;
use crate::core::types::Millis;

/// Tally of one army's attack pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttackPass {
    pub hits: u32,
    pub misses: u32,
    pub outmatched: u32,
    pub damage_dealt: f64,
}

impl AttackPass {
    fn record(&mut self, attack: SquadAttack) {
        match attack {
            SquadAttack::Hit { damage } => {
                self.hits += 1;
                self.damage_dealt += damage;
            }
            SquadAttack::Missed => self.misses += 1,
            SquadAttack::Outmatched => self.outmatched += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Army {
    squads: Vec<Squad>,
    strategy: Strategy,
}

impl Army {
    /// Army of `squad_amount` random squads, `unit_amount` units each
    pub fn new<R: Rng + ?Sized>(
        squad_amount: usize,
        unit_amount: usize,
        strategy: Strategy,
        rng: &mut R,
    ) -> Self {
        let squads = (0..squad_amount)
            .map(|_| Squad::new(unit_amount, strategy, rng))
            .collect();
        Self::from_squads(squads, strategy)
    }

    pub fn from_squads(squads: Vec<Squad>, strategy: Strategy) -> Self {
        Self { squads, strategy }
    }

    pub fn squads(&self) -> &[Squad] {
        &self.squads
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Total health across all squads
    pub fn strength(&self) -> f64 {
        self.squads.iter().map(Squad::strength).sum()
    }

    /// Squads with at least one unit still standing
    pub fn active_squad_count(&self) -> usize {
        self.squads.iter().filter(|s| s.is_active()).count()
    }

    pub fn active_unit_count(&self) -> usize {
        self.squads.iter().map(Squad::active_unit_count).sum()
    }

    pub fn is_active(&self) -> bool {
        self.active_unit_count() > 0
    }

    /// Whether any of our squads could still hurt a squad of `enemy` that
    /// this army's strategy might send it against
    pub fn can_damage(&self, enemy: &Army) -> bool {
        let targets = target_squad_candidates(self.strategy, enemy);
        self.squads.iter().any(|squad| {
            targets
                .iter()
                .any(|&target| squad.can_damage(&enemy.squads[target]))
        })
    }

    /// Every squad, in order, picks a squad of `enemy` and attacks it.
    ///
    /// Targets are re-chosen per squad, so later squads see the damage
    /// dealt by earlier ones.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        enemy: &mut Army,
        rng: &mut R,
        now_ms: Millis,
    ) -> AttackPass {
        let mut pass = AttackPass::default();
        for squad in &mut self.squads {
            let target = choose_target_squad(self.strategy, enemy, rng);
            let result = squad.attack(&mut enemy.squads[target], rng, now_ms);
            if result.landed() {
                tracing::trace!(target_squad = target, ?result, "squad hit");
            }
            pass.record(result);
        }
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::unit::{Soldier, Unit};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

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

    #[test]
    fn test_new_army_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let army = Army::new(3, 6, Strategy::Weakest, &mut rng);
        assert_eq!(army.squads().len(), 3);
        assert_eq!(army.active_squad_count(), 3);
        assert_eq!(army.active_unit_count(), 18);
        assert!(army.squads().iter().all(|s| s.strategy() == Strategy::Weakest));
        assert!(army.is_active());
    }

    #[test]
    fn test_counts_skip_dead_squads() {
        let army = Army::from_squads(vec![squad(0.0, 0), squad(40.0, 0)], Strategy::Random);
        assert_eq!(army.active_squad_count(), 1);
        assert_eq!(army.active_unit_count(), 5);
        assert_eq!(army.strength(), 200.0);
    }

    #[test]
    fn test_dead_army_cannot_hurt() {
        let mut attacker = Army::from_squads(vec![squad(0.0, 0), squad(0.0, 0)], Strategy::Random);
        let mut enemy = Army::from_squads(vec![squad(100.0, 0), squad(100.0, 0)], Strategy::Random);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let pass = attacker.attack(&mut enemy, &mut rng, 0);

        assert_eq!(pass.hits, 0);
        assert_eq!(pass.outmatched, 2);
        assert_eq!(enemy.strength(), 1000.0);
    }

    #[test]
    fn test_veterans_land_every_attack() {
        let veterans = vec![squad(100.0, 50), squad(100.0, 50)];
        let mut attacker = Army::from_squads(veterans, Strategy::Strongest);
        let recruits = vec![squad(50.0, 0), squad(40.0, 0)];
        let mut enemy = Army::from_squads(recruits, Strategy::Strongest);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let pass = attacker.attack(&mut enemy, &mut rng, 0);

        assert_eq!(pass.hits, 2);
        assert!(pass.damage_dealt > 0.0);
        assert!(enemy.strength() < 450.0);
    }

    #[test]
    fn test_can_damage_follows_strategy() {
        let veterans = Army::from_squads(vec![squad(100.0, 50), squad(0.0, 0)], Strategy::Weakest);
        // Weakest picks the fragile veteran squad over the fresh recruits
        let recruits = vec![squad(100.0, 50), squad(100.0, 0)];
        let mut enemy = Army::from_squads(recruits, Strategy::Weakest);
        enemy.squads[0] = Squad::from_units(
            (0..3)
                .map(|_| Soldier::with_cooldown(500).with_experience(50).into())
                .collect(),
            Strategy::Weakest,
        );
        assert!(!veterans.can_damage(&enemy));

        let random = Army::from_squads(vec![squad(100.0, 50), squad(0.0, 0)], Strategy::Random);
        assert!(random.can_damage(&enemy));

        let fallen = Army::from_squads(vec![squad(0.0, 0), squad(0.0, 0)], Strategy::Random);
        assert!(!fallen.can_damage(&enemy));
    }
}
