//! Availability engine: pure functions from a desk's reservations to the
//! month calendar colouring and the day's slot grid. No state, no I/O.

mod availability;
mod slots;
#[cfg(test)]
mod tests;

pub use availability::{
    day_status, merge_overlapping, overlapping_spans, overlaps_any, reconcile, union_duration_ms,
};
pub use slots::slots_for_day;

/// True iff `start < end`. Works for instants and for `HH:00` labels alike,
/// since the labels are fixed-width and zero-padded.
pub fn validate_range<T: PartialOrd>(start: T, end: T) -> bool {
    start < end
}
