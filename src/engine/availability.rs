use chrono::NaiveDate;

use crate::calendar::{day_span, days_in_month, month_span};
use crate::model::*;

// ── Month view ────────────────────────────────────────────────────

/// Classify every day of `year`/`month` as free, partial or reserved.
///
/// Each reservation is clipped to the day's `[00:00, 24:00)` window and the
/// clipped spans are unioned, so overlapping or double-booked reservations
/// never count twice. A day is `Reserved` only when the union covers all
/// 24 hours. Reservations outside the month are ignored; malformed ones
/// (`end <= start`) cover nothing.
///
/// Always returns one entry per day of the month; an invalid month yields
/// an empty map.
pub fn day_status(reservations: &[Reservation], year: i32, month: u32) -> MonthStatus {
    let mut out = MonthStatus::new();
    let (Some(days), Some(window)) = (days_in_month(year, month), month_span(year, month)) else {
        return out;
    };

    let spans = overlapping_spans(reservations, &window);

    for day in 1..=days {
        let status = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(day_span)
            .map_or(DayStatus::Free, |bounds| classify(&spans, &bounds));
        out.insert(day, status);
    }
    out
}

fn classify(sorted: &[Span], bounds: &Span) -> DayStatus {
    let clipped: Vec<Span> = sorted.iter().filter_map(|s| s.clip(bounds)).collect();
    let reserved = union_duration_ms(&clipped);
    if reserved == 0 {
        DayStatus::Free
    } else if reserved >= bounds.duration_ms() {
        DayStatus::Reserved
    } else {
        DayStatus::Partial
    }
}

/// Well-formed reservation spans overlapping `window`, sorted by start.
pub fn overlapping_spans(reservations: &[Reservation], window: &Span) -> Vec<Span> {
    let mut spans: Vec<Span> = reservations
        .iter()
        .filter_map(Reservation::span)
        .filter(|s| s.overlaps(window))
        .collect();
    spans.sort_by_key(|s| s.start);
    spans
}

// ── Interval helpers ──────────────────────────────────────────────

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[Span]) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

/// Total time covered by the union of sorted spans.
pub fn union_duration_ms(sorted: &[Span]) -> Ms {
    merge_overlapping(sorted).iter().map(Span::duration_ms).sum()
}

/// Whether `candidate` collides with any well-formed reservation.
pub fn overlaps_any(reservations: &[Reservation], candidate: &Span) -> bool {
    reservations
        .iter()
        .filter_map(Reservation::span)
        .any(|s| s.overlaps(candidate))
}

/// Days on which `remote` disagrees with `local`. Days missing from
/// `remote` are read as free.
pub fn reconcile(local: &MonthStatus, remote: &MonthStatus) -> Vec<u32> {
    local
        .iter()
        .filter(|&(day, status)| remote.get(day).copied().unwrap_or(DayStatus::Free) != *status)
        .map(|(day, _)| *day)
        .collect()
}
