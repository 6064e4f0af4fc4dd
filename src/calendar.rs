use std::ops::RangeInclusive;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::BookingError;
use crate::limits::*;
use crate::model::{DayStatus, MonthStatus, Span, to_ms};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const WIRE_FORMAT_SECS: &str = "%Y-%m-%dT%H:%M:%S";

/// Number of days in `month` of `year`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// `[date 00:00, date+1 00:00)`.
pub fn day_span(date: NaiveDate) -> Option<Span> {
    let start = date.and_time(NaiveTime::MIN);
    let end = date.succ_opt()?.and_time(NaiveTime::MIN);
    Some(Span::new(to_ms(start), to_ms(end)))
}

/// `[first of month 00:00, first of next month 00:00)`.
pub fn month_span(year: i32, month: u32) -> Option<Span> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(Span::new(
        to_ms(first.and_time(NaiveTime::MIN)),
        to_ms(next.and_time(NaiveTime::MIN)),
    ))
}

pub fn slot_hours() -> RangeInclusive<u32> {
    FIRST_SLOT_HOUR..=LAST_SLOT_HOUR
}

pub fn slot_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

/// Parse an `HH:00` label that lies on the slot grid.
pub fn parse_slot(label: &str) -> Result<NaiveTime, BookingError> {
    let invalid = || BookingError::InvalidSlot(label.to_string());
    if label.len() != 5 {
        return Err(invalid());
    }
    let time = NaiveTime::parse_from_str(label, "%H:%M").map_err(|_| invalid())?;
    if time.minute() != 0 || !slot_hours().contains(&time.hour()) {
        return Err(invalid());
    }
    Ok(time)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a wire timestamp, `YYYY-MM-DDTHH:MM` with optional seconds.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, WIRE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, WIRE_FORMAT_SECS))
        .ok()
}

pub fn format_datetime(t: NaiveDateTime) -> String {
    t.format(WIRE_FORMAT).to_string()
}

/// Weekday column (Monday = 0) of the first day of the month.
pub fn first_weekday_offset(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.weekday().num_days_from_monday())
}

/// Single-character calendar marker for a day status.
pub fn marker(status: DayStatus) -> char {
    match status {
        DayStatus::Free => '.',
        DayStatus::Partial => '~',
        DayStatus::Reserved => '#',
    }
}

/// Text month grid, Monday first. Each day carries its status marker
/// (`.` free, `~` partial, `#` reserved); the highlighted day is bracketed.
pub fn render_month(
    year: i32,
    month: u32,
    status: &MonthStatus,
    highlight: Option<u32>,
) -> String {
    let (Some(days), Some(offset)) =
        (days_in_month(year, month), first_weekday_offset(year, month))
    else {
        return String::new();
    };
    let mut out = format!("{year}-{month:02}\n Mo   Tu   We   Th   Fr   Sa   Su\n");
    let mut column = offset;
    out.push_str(&"      ".repeat(offset as usize));
    for day in 1..=days {
        let m = marker(status.get(&day).copied().unwrap_or(DayStatus::Free));
        let cell = if highlight == Some(day) {
            format!("[{day:2}{m}]")
        } else {
            format!(" {day:2}{m} ")
        };
        out.push_str(&cell);
        column += 1;
        if column == 7 {
            out.push('\n');
            column = 0;
        } else {
            out.push(' ');
        }
    }
    if column != 0 {
        out.push('\n');
    }
    out
}
