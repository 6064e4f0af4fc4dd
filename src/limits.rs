use crate::model::Ms;

pub const HOUR_MS: Ms = 3_600_000;
pub const DAY_MS: Ms = 24 * HOUR_MS;

/// First bookable slot of the day (08:00).
pub const FIRST_SLOT_HOUR: u32 = 8;
/// Last bookable slot of the day (22:00), inclusive.
pub const LAST_SLOT_HOUR: u32 = 22;
pub const SLOT_COUNT: usize = (LAST_SLOT_HOUR - FIRST_SLOT_HOUR + 1) as usize;

/// Entries beyond this in a single backend payload are dropped.
pub const MAX_PAYLOAD_ENTRIES: usize = 100_000;
/// Longest `message` accepted from a backend rejection body.
pub const MAX_MESSAGE_LEN: usize = 1024;
