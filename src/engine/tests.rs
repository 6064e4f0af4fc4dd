use chrono::{NaiveDate, NaiveDateTime};

use super::*;
use crate::calendar::days_in_month;
use crate::limits::*;
use crate::model::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
    d.and_hms_opt(h, min, 0).unwrap()
}

fn res(start: NaiveDateTime, end: NaiveDateTime) -> Reservation {
    Reservation::new(start, end)
}

fn reserved_labels(slots: &[SlotAvailability]) -> Vec<&str> {
    slots
        .iter()
        .filter(|s| s.reserved)
        .map(|s| s.time.as_str())
        .collect()
}

// ── day_status ────────────────────────────────────────────

#[test]
fn one_entry_per_day_for_every_month() {
    let d = date(2024, 2, 10);
    let reservations = vec![res(at(d, 8, 0), at(d, 12, 0))];
    for year in [2023, 2024] {
        for month in 1..=12 {
            let status = day_status(&reservations, year, month);
            let days = days_in_month(year, month).unwrap();
            assert_eq!(status.len(), days as usize, "{year}-{month}");
            assert_eq!(status.keys().copied().collect::<Vec<_>>(), (1..=days).collect::<Vec<_>>());
        }
    }
}

#[test]
fn empty_month_is_all_free() {
    let status = day_status(&[], 2024, 6);
    assert_eq!(status.len(), 30);
    assert!(status.values().all(|s| *s == DayStatus::Free));
}

#[test]
fn full_day_is_reserved() {
    let d = date(2024, 6, 5);
    let reservations = vec![res(at(d, 0, 0), at(date(2024, 6, 6), 0, 0))];
    let status = day_status(&reservations, 2024, 6);
    assert_eq!(status[&5], DayStatus::Reserved);
    assert_eq!(status[&4], DayStatus::Free);
    assert_eq!(status[&6], DayStatus::Free);
}

#[test]
fn morning_block_is_partial() {
    let d = date(2024, 6, 5);
    let status = day_status(&[res(at(d, 8, 0), at(d, 12, 0))], 2024, 6);
    assert_eq!(status[&5], DayStatus::Partial);
}

#[test]
fn bookable_window_alone_is_only_partial() {
    // Full-day classification: 08:00-22:00 leaves ten free hours.
    let d = date(2024, 6, 5);
    let status = day_status(&[res(at(d, 8, 0), at(d, 22, 0))], 2024, 6);
    assert_eq!(status[&5], DayStatus::Partial);
}

#[test]
fn adjacent_pieces_fill_a_day() {
    let d = date(2024, 6, 5);
    let reservations = vec![
        res(at(d, 12, 0), at(date(2024, 6, 6), 0, 0)),
        res(at(d, 0, 0), at(d, 6, 0)),
        res(at(d, 6, 0), at(d, 12, 0)),
    ];
    assert_eq!(day_status(&reservations, 2024, 6)[&5], DayStatus::Reserved);
}

#[test]
fn overlapping_duplicates_do_not_double_count() {
    // 2 x 12h on the same half of the day must not add up to 24h.
    let d = date(2024, 6, 5);
    let reservations = vec![res(at(d, 0, 0), at(d, 12, 0)), res(at(d, 0, 0), at(d, 12, 0))];
    assert_eq!(day_status(&reservations, 2024, 6)[&5], DayStatus::Partial);
}

#[test]
fn clipped_union_measures_the_day() {
    let d = date(2024, 6, 5);
    let bounds = crate::calendar::day_span(d).unwrap();
    let reservations = vec![
        res(at(date(2024, 6, 4), 20, 0), at(d, 2, 0)),
        res(at(d, 1, 0), at(d, 3, 0)),
        res(at(d, 23, 0), at(date(2024, 6, 6), 4, 0)),
    ];
    let clipped: Vec<Span> = overlapping_spans(&reservations, &bounds)
        .iter()
        .filter_map(|s| s.clip(&bounds))
        .collect();
    assert_eq!(union_duration_ms(&clipped), 4 * HOUR_MS);
    assert!(union_duration_ms(&clipped) < DAY_MS);
}

#[test]
fn multi_day_reservation_spans_days() {
    let reservations = vec![res(at(date(2024, 6, 3), 18, 0), at(date(2024, 6, 6), 9, 0))];
    let status = day_status(&reservations, 2024, 6);
    assert_eq!(status[&2], DayStatus::Free);
    assert_eq!(status[&3], DayStatus::Partial);
    assert_eq!(status[&4], DayStatus::Reserved);
    assert_eq!(status[&5], DayStatus::Reserved);
    assert_eq!(status[&6], DayStatus::Partial);
    assert_eq!(status[&7], DayStatus::Free);
}

#[test]
fn reservation_crossing_month_boundary() {
    let reservations = vec![res(at(date(2024, 5, 31), 12, 0), at(date(2024, 6, 2), 0, 0))];
    let june = day_status(&reservations, 2024, 6);
    assert_eq!(june[&1], DayStatus::Reserved);
    assert_eq!(june[&2], DayStatus::Free);
    let may = day_status(&reservations, 2024, 5);
    assert_eq!(may[&31], DayStatus::Partial);
}

#[test]
fn other_months_are_ignored() {
    let d = date(2024, 7, 5);
    let status = day_status(&[res(at(d, 0, 0), at(d, 23, 0))], 2024, 6);
    assert!(status.values().all(|s| *s == DayStatus::Free));
}

#[test]
fn malformed_interval_contributes_nothing() {
    let d = date(2024, 6, 5);
    let reservations = vec![res(at(d, 12, 0), at(d, 9, 0)), res(at(d, 10, 0), at(d, 10, 0))];
    let status = day_status(&reservations, 2024, 6);
    assert_eq!(status[&5], DayStatus::Free);
}

#[test]
fn invalid_month_is_empty() {
    assert!(day_status(&[], 2024, 0).is_empty());
    assert!(day_status(&[], 2024, 13).is_empty());
}

#[test]
fn day_status_is_idempotent() {
    let d = date(2024, 6, 5);
    let reservations = vec![res(at(d, 8, 0), at(d, 12, 0)), res(at(d, 11, 0), at(d, 14, 0))];
    assert_eq!(day_status(&reservations, 2024, 6), day_status(&reservations, 2024, 6));
}

// ── slots_for_day ─────────────────────────────────────────

#[test]
fn fifteen_slots_in_order() {
    let slots = slots_for_day(&[], date(2024, 6, 5));
    assert_eq!(slots.len(), SLOT_COUNT);
    let labels: Vec<&str> = slots.iter().map(|s| s.time.as_str()).collect();
    assert_eq!(labels.first(), Some(&"08:00"));
    assert_eq!(labels.last(), Some(&"22:00"));
    assert_eq!(labels[1], "09:00");
    let mut sorted = labels.clone();
    sorted.sort();
    assert_eq!(labels, sorted);
    assert!(slots.iter().all(|s| !s.reserved));
}

#[test]
fn single_hour_marks_single_slot() {
    let d = date(2024, 6, 5);
    let slots = slots_for_day(&[res(at(d, 9, 0), at(d, 10, 0))], d);
    assert_eq!(reserved_labels(&slots), vec!["09:00"]);
}

#[test]
fn end_boundary_slot_stays_free() {
    let d = date(2024, 6, 5);
    let slots = slots_for_day(&[res(at(d, 9, 0), at(d, 12, 0))], d);
    assert_eq!(reserved_labels(&slots), vec!["09:00", "10:00", "11:00"]);
}

#[test]
fn partial_hour_only_counts_slot_start() {
    let d = date(2024, 6, 5);
    // 09:30-10:30 does not contain 09:00 but does contain 10:00.
    let slots = slots_for_day(&[res(at(d, 9, 30), at(d, 10, 30))], d);
    assert_eq!(reserved_labels(&slots), vec!["10:00"]);
}

#[test]
fn overnight_reservation_reaches_next_morning() {
    let d = date(2024, 6, 5);
    let next = date(2024, 6, 6);
    let reservations = vec![res(at(d, 21, 0), at(next, 9, 0))];
    assert_eq!(reserved_labels(&slots_for_day(&reservations, d)), vec!["21:00", "22:00"]);
    assert_eq!(reserved_labels(&slots_for_day(&reservations, next)), vec!["08:00"]);
}

#[test]
fn other_days_do_not_leak() {
    let d = date(2024, 6, 5);
    let other = date(2024, 6, 4);
    let slots = slots_for_day(&[res(at(other, 9, 0), at(other, 17, 0))], d);
    assert!(reserved_labels(&slots).is_empty());
}

#[test]
fn malformed_reservation_reserves_no_slot() {
    let d = date(2024, 6, 5);
    let slots = slots_for_day(&[res(at(d, 12, 0), at(d, 9, 0))], d);
    assert!(reserved_labels(&slots).is_empty());
}

#[test]
fn slots_are_idempotent() {
    let d = date(2024, 6, 5);
    let reservations = vec![res(at(d, 9, 0), at(d, 10, 0))];
    assert_eq!(slots_for_day(&reservations, d), slots_for_day(&reservations, d));
}

// ── validate_range ────────────────────────────────────────

#[test]
fn validate_range_instants() {
    let d = date(2024, 6, 5);
    assert!(validate_range(at(d, 9, 0), at(d, 10, 0)));
    assert!(!validate_range(at(d, 10, 0), at(d, 10, 0)));
    assert!(!validate_range(at(d, 10, 0), at(d, 9, 0)));
}

#[test]
fn validate_range_labels() {
    assert!(validate_range("09:00", "10:00"));
    assert!(!validate_range("10:00", "09:00"));
    assert!(!validate_range("10:00", "10:00"));
    assert!(validate_range("08:00", "22:00"));
}

// ── overlaps_any ──────────────────────────────────────────

#[test]
fn overlap_check_is_half_open() {
    let d = date(2024, 6, 5);
    let reservations = vec![res(at(d, 9, 0), at(d, 10, 0))];
    let span = |h1, h2| Reservation::new(at(d, h1, 0), at(d, h2, 0)).span().unwrap();
    assert!(overlaps_any(&reservations, &span(9, 11)));
    assert!(overlaps_any(&reservations, &span(8, 10)));
    assert!(!overlaps_any(&reservations, &span(10, 12)));
    assert!(!overlaps_any(&reservations, &span(8, 9)));
}
