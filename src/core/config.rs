//! Simulation parameters
//!
//! Parameters come from an optional TOML file and optional command-line
//! overrides. Both are read into [`ConfigFile`], merged (overrides win) and
//! resolved into a validated [`SimulationConfig`] before any army is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    DEFAULT_MAX_ROUNDS, DEFAULT_REPORT_INTERVAL, DEFAULT_SNAPSHOT_INTERVAL, MAX_SQUAD_UNITS,
    MIN_ARMIES, MIN_SQUADS, MIN_SQUAD_UNITS,
};
use crate::battle::targeting::Strategy;
use crate::core::error::{BattlefieldError, Result};

/// Validated parameters for one battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationConfig {
    /// Seed for the shared random generator
    pub seed: u64,
    /// Number of armies on the field (at least 2)
    pub armies_amount: usize,
    /// Targeting strategy applied to every army
    pub strategy: Strategy,
    /// Squads per army (at least 2)
    pub squad_amount: usize,
    /// Units per squad (5 to 10)
    pub units_amount: usize,
    /// Rounds between progress snapshots
    pub report_interval: u64,
    /// Rounds between entries kept in the persisted snapshot log
    pub snapshot_interval: u64,
    /// Rounds after which an undecided battle is called off
    pub max_rounds: u64,
}

impl SimulationConfig {
    pub fn new(
        seed: u64,
        armies_amount: usize,
        strategy: Strategy,
        squad_amount: usize,
        units_amount: usize,
    ) -> Self {
        Self {
            seed,
            armies_amount,
            strategy,
            squad_amount,
            units_amount,
            report_interval: DEFAULT_REPORT_INTERVAL,
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.armies_amount < MIN_ARMIES {
            return Err(BattlefieldError::InvalidConfig(format!(
                "armies_amount ({}) must be at least {}",
                self.armies_amount, MIN_ARMIES
            )));
        }

        if self.squad_amount < MIN_SQUADS {
            return Err(BattlefieldError::InvalidConfig(format!(
                "squad_amount ({}) must be at least {}",
                self.squad_amount, MIN_SQUADS
            )));
        }

        if !(MIN_SQUAD_UNITS..=MAX_SQUAD_UNITS).contains(&self.units_amount) {
            return Err(BattlefieldError::InvalidConfig(format!(
                "units_amount ({}) must be between {} and {}",
                self.units_amount, MIN_SQUAD_UNITS, MAX_SQUAD_UNITS
            )));
        }

        if self.report_interval == 0 || self.snapshot_interval == 0 {
            return Err(BattlefieldError::InvalidConfig(
                "report and snapshot intervals must be positive".into(),
            ));
        }

        if self.max_rounds == 0 {
            return Err(BattlefieldError::InvalidConfig(
                "max_rounds must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Raw, possibly partial parameters as read from TOML or the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub seed: Option<u64>,
    pub armies_amount: Option<usize>,
    pub strategy: Option<String>,
    pub squad_amount: Option<usize>,
    pub units_amount: Option<usize>,
    pub report_interval: Option<u64>,
    pub snapshot_interval: Option<u64>,
    pub max_rounds: Option<u64>,
}

impl ConfigFile {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load parameters from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            seed: overrides.seed.or(self.seed),
            armies_amount: overrides.armies_amount.or(self.armies_amount),
            strategy: overrides.strategy.or(self.strategy),
            squad_amount: overrides.squad_amount.or(self.squad_amount),
            units_amount: overrides.units_amount.or(self.units_amount),
            report_interval: overrides.report_interval.or(self.report_interval),
            snapshot_interval: overrides.snapshot_interval.or(self.snapshot_interval),
            max_rounds: overrides.max_rounds.or(self.max_rounds),
        }
    }

    /// Resolve into a validated [`SimulationConfig`]
    pub fn resolve(self) -> Result<SimulationConfig> {
        let strategy: Strategy = self
            .strategy
            .ok_or(BattlefieldError::MissingParameter("strategy"))?
            .parse()?;

        let config = SimulationConfig {
            seed: self.seed.ok_or(BattlefieldError::MissingParameter("seed"))?,
            armies_amount: self
                .armies_amount
                .ok_or(BattlefieldError::MissingParameter("armies_amount"))?,
            strategy,
            squad_amount: self
                .squad_amount
                .ok_or(BattlefieldError::MissingParameter("squad_amount"))?,
            units_amount: self
                .units_amount
                .ok_or(BattlefieldError::MissingParameter("units_amount"))?,
            report_interval: self.report_interval.unwrap_or(DEFAULT_REPORT_INTERVAL),
            snapshot_interval: self.snapshot_interval.unwrap_or(DEFAULT_SNAPSHOT_INTERVAL),
            max_rounds: self.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
        seed = 42
        armies_amount = 3
        strategy = "weakest"
        squad_amount = 2
        units_amount = 5
    "#;

    #[test]
    fn test_resolve_full_file() {
        let config = ConfigFile::from_toml_str(FULL_TOML).unwrap().resolve().unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.armies_amount, 3);
        assert_eq!(config.strategy, Strategy::Weakest);
        assert_eq!(config.report_interval, DEFAULT_REPORT_INTERVAL);
        assert_eq!(config.snapshot_interval, DEFAULT_SNAPSHOT_INTERVAL);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn test_overrides_win() {
        let file = ConfigFile::from_toml_str(FULL_TOML).unwrap();
        let overrides = ConfigFile {
            seed: Some(7),
            strategy: Some("random".into()),
            ..ConfigFile::default()
        };
        let config = file.merge(overrides).resolve().unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.strategy, Strategy::Random);
        assert_eq!(config.armies_amount, 3);
    }

    #[test]
    fn test_missing_parameter() {
        let file = ConfigFile {
            seed: Some(1),
            armies_amount: Some(2),
            strategy: Some("random".into()),
            squad_amount: Some(2),
            ..ConfigFile::default()
        };
        let err = file.resolve().unwrap_err();
        assert!(matches!(err, BattlefieldError::MissingParameter("units_amount")));
    }

    #[test]
    fn test_too_few_armies_rejected() {
        let config = SimulationConfig::new(1, 1, Strategy::Random, 2, 5);
        assert!(matches!(
            config.validate(),
            Err(BattlefieldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_units_amount_range() {
        assert!(SimulationConfig::new(1, 2, Strategy::Random, 2, 4).validate().is_err());
        assert!(SimulationConfig::new(1, 2, Strategy::Random, 2, 5).validate().is_ok());
        assert!(SimulationConfig::new(1, 2, Strategy::Random, 2, 10).validate().is_ok());
        assert!(SimulationConfig::new(1, 2, Strategy::Random, 2, 11).validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SimulationConfig::new(1, 2, Strategy::Random, 2, 5);
        config.report_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_limit() {
        let mut config = SimulationConfig::new(1, 2, Strategy::Weakest, 2, 5);
        config.max_rounds = 0;
        assert!(matches!(
            config.validate(),
            Err(BattlefieldError::InvalidConfig(_))
        ));

        let file = ConfigFile::from_toml_str(&format!("{FULL_TOML}\nmax_rounds = 500")).unwrap();
        assert_eq!(file.resolve().unwrap().max_rounds, 500);
    }

    #[test]
    fn test_unknown_strategy() {
        let file = ConfigFile {
            strategy: Some("bravest".into()),
            ..ConfigFile::from_toml_str(FULL_TOML).unwrap()
        };
        assert!(matches!(
            file.resolve(),
            Err(BattlefieldError::UnknownStrategy(s)) if s == "bravest"
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ConfigFile::from_toml_str("armies = 3").unwrap_err();
        assert!(matches!(err, BattlefieldError::Toml(_)));
    }
}
