//! Ability profile constants - all per-archetype effect numbers in one place

use crate::core::types::Seconds;

// Speed archetype: flurry of quick pecks
pub const FLURRY_HIT_COUNT: u32 = 5;

// Trickster archetype: disorienting strike
pub const TRICKSTER_STUN_DURATION: Seconds = 1.5;

// Balanced archetype: rallying cry (flagged only, never applied)
pub const RALLY_BUFF_DURATION: Seconds = 5.0;
