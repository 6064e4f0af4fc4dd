use chrono::NaiveDate;

use crate::calendar::{day_span, slot_hours, slot_label};
use crate::model::*;

use super::availability::overlapping_spans;

/// The fixed hourly grid for `date`, 08:00 through 22:00 in ascending order.
///
/// A slot is reserved when its start instant falls inside some reservation:
/// `start <= slot < end`. A reservation ending exactly on a slot boundary
/// leaves that slot free.
pub fn slots_for_day(reservations: &[Reservation], date: NaiveDate) -> Vec<SlotAvailability> {
    let spans = day_span(date)
        .map(|bounds| overlapping_spans(reservations, &bounds))
        .unwrap_or_default();

    slot_hours()
        .map(|hour| {
            let reserved = date
                .and_hms_opt(hour, 0, 0)
                .map(to_ms)
                .is_some_and(|t| spans.iter().any(|s| s.contains_instant(t)));
            SlotAvailability {
                time: slot_label(hour),
                reserved,
            }
        })
        .collect()
}
