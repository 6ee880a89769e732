//! Battle system constants - all tunable values in one place

// Unit state bounds
pub const MAX_HEALTH: f64 = 100.0;
pub const MAX_EXPERIENCE: u32 = 50;

// Cooldowns (ms), drawn once at construction
pub const SOLDIER_COOLDOWN_MS: (u64, u64) = (100, 2000);
pub const VEHICLE_COOLDOWN_MS: (u64, u64) = (1000, 2000);

// Vehicle crew
pub const MIN_OPERATORS: usize = 1;
pub const MAX_OPERATORS: usize = 3;

// Damage output base values
pub const SOLDIER_BASE_DAMAGE: f64 = 0.05;
pub const VEHICLE_BASE_DAMAGE: f64 = 0.1;

// Incoming vehicle damage split
pub const VEHICLE_HULL_SHARE: f64 = 0.6;
pub const DIRECT_HIT_SHARE: f64 = 0.2;
pub const CREW_SPLASH_SHARE: f64 = 0.2;

// Army composition limits
pub const MIN_ARMIES: usize = 2;
pub const MIN_SQUADS: usize = 2;
pub const MIN_SQUAD_UNITS: usize = 5;
pub const MAX_SQUAD_UNITS: usize = 10;

// Reporting cadence (rounds)
pub const DEFAULT_REPORT_INTERVAL: u64 = 50;
pub const DEFAULT_SNAPSHOT_INTERVAL: u64 = 50;

// Battles still undecided after this many rounds are called off
pub const DEFAULT_MAX_ROUNDS: u64 = 100_000;
