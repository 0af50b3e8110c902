pub mod config;
pub mod error;
pub mod types;

pub use config::{BattleConfig, CountdownStep};
pub use error::{ArenaError, Result};
pub use types::{Seconds, SessionId, Side};
