pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigFile, SimulationConfig};
pub use error::{BattlefieldError, Result};
