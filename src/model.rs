use std::collections::BTreeMap;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Milliseconds on the local wall-clock timeline. The engine works only in `Ms`.
pub type Ms = i64;

/// Map a local wall-clock timestamp onto the `Ms` timeline.
pub fn to_ms(t: NaiveDateTime) -> Ms {
    t.and_utc().timestamp_millis()
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// The part of `self` inside `bounds`, if any.
    pub fn clip(&self, bounds: &Span) -> Option<Span> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start < end).then(|| Span::new(start, end))
    }
}

/// A bookable desk as listed by `GET /desks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desk {
    pub id: u64,
    pub name: String,
    pub available: bool,
}

/// An existing reservation on one desk. The desk is implied by the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(with = "wire_time")]
    pub start_time: NaiveDateTime,
    #[serde(with = "wire_time")]
    pub end_time: NaiveDateTime,
}

impl Reservation {
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// `None` when `end_time <= start_time`: such a reservation covers no time.
    pub fn span(&self) -> Option<Span> {
        let start = to_ms(self.start_time);
        let end = to_ms(self.end_time);
        (start < end).then(|| Span::new(start, end))
    }
}

/// Colour class of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    #[serde(alias = "available")]
    Free,
    Partial,
    Reserved,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Free => "free",
            DayStatus::Partial => "partial",
            DayStatus::Reserved => "reserved",
        }
    }

    /// Background colour used for the day marker.
    pub fn color(&self) -> &'static str {
        match self {
            DayStatus::Free => "green",
            DayStatus::Partial => "orange",
            DayStatus::Reserved => "red",
        }
    }
}

/// Day of month (1-based) → status.
pub type MonthStatus = BTreeMap<u32, DayStatus>;

/// One hourly slot in the day grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub time: String,
    pub reserved: bool,
}

/// Form body of `POST /reserve_desk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRequest {
    pub desk_id: u64,
    pub start_datetime: String,
    pub end_datetime: String,
}

impl ReservationRequest {
    pub fn new(desk_id: u64, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            desk_id,
            start_datetime: calendar::format_datetime(start),
            end_datetime: calendar::format_datetime(end),
        }
    }
}

/// What the backend said after accepting a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn for_request(request: &ReservationRequest) -> Self {
        let pretty = |s: &str| {
            calendar::parse_datetime(s)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| s.to_string())
        };
        Self {
            message: format!(
                "Desk {} has been reserved from {} to {}.",
                request.desk_id,
                pretty(&request.start_datetime),
                pretty(&request.end_datetime)
            ),
        }
    }
}

/// A chosen start/end slot pair on the selected date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::calendar;

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&calendar::format_datetime(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        calendar::parse_datetime(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
