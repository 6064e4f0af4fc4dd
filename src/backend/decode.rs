use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::limits::*;
use crate::model::*;

/// Decode each array entry on its own; entries that don't fit `T` are
/// dropped. A non-array payload decodes to nothing.
fn decode_list<T: DeserializeOwned>(payload: Value, what: &'static str) -> Vec<T> {
    let Value::Array(entries) = payload else {
        warn!(what, "expected a JSON array, dropping payload");
        drop_count(what, 1);
        return Vec::new();
    };
    if entries.len() > MAX_PAYLOAD_ENTRIES {
        warn!(what, len = entries.len(), "payload truncated to {MAX_PAYLOAD_ENTRIES} entries");
        drop_count(what, entries.len() - MAX_PAYLOAD_ENTRIES);
    }
    entries
        .into_iter()
        .take(MAX_PAYLOAD_ENTRIES)
        .filter_map(|entry| match serde_json::from_value::<T>(entry) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(what, "dropping malformed entry: {e}");
                drop_count(what, 1);
                None
            }
        })
        .collect()
}

fn drop_count(what: &'static str, n: usize) {
    metrics::counter!(crate::observability::DROPPED_ENTRIES_TOTAL, "payload" => what)
        .increment(n as u64);
}

pub fn decode_desks(payload: Value) -> Vec<Desk> {
    decode_list(payload, "desks")
}

pub fn decode_reservations(payload: Value) -> Vec<Reservation> {
    decode_list(payload, "reservations")
}

/// `{"1": "free", "2": "partial", ...}`. Keys that aren't day numbers in
/// `1..=31` and unknown statuses are dropped.
pub fn decode_month_status(payload: Value) -> MonthStatus {
    let Value::Object(entries) = payload else {
        warn!("month status: expected a JSON object, dropping payload");
        drop_count("month", 1);
        return MonthStatus::new();
    };
    let mut out = MonthStatus::new();
    for (key, value) in entries {
        let day = key.parse::<u32>().ok().filter(|d| (1..=31).contains(d));
        let status = serde_json::from_value::<DayStatus>(value).ok();
        match (day, status) {
            (Some(day), Some(status)) => {
                out.insert(day, status);
            }
            _ => {
                warn!(key = %key, "month status: dropping malformed entry");
                drop_count("month", 1);
            }
        }
    }
    out
}

/// The `message` field of a rejection body, if the body is JSON and has one.
pub fn rejection_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?;
    Some(message.chars().take(MAX_MESSAGE_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn desks_drop_malformed_entries() {
        let desks = decode_desks(json!([
            {"id": 1, "name": "Desk 1", "available": true},
            {"id": "two", "name": "Desk 2", "available": true},
            {"id": 3, "name": "Desk 3"},
            {"id": 4, "name": "Desk 4", "available": false},
        ]));
        assert_eq!(desks.len(), 2);
        assert_eq!(desks[0].id, 1);
        assert_eq!(desks[1].id, 4);
        assert!(!desks[1].available);
    }

    #[test]
    fn non_array_is_empty() {
        assert!(decode_desks(json!({"id": 1})).is_empty());
        assert!(decode_reservations(json!(null)).is_empty());
    }

    #[test]
    fn reservations_drop_bad_timestamps() {
        let rs = decode_reservations(json!([
            {"start_time": "2024-06-05T09:00", "end_time": "2024-06-05T10:00"},
            {"start_time": "2024-06-05T09:00"},
            {"start_time": "garbage", "end_time": "2024-06-05T10:00"},
        ]));
        assert_eq!(rs.len(), 1);
    }

    #[test]
    fn month_status_fails_closed() {
        let month = decode_month_status(json!({
            "1": "available",
            "2": "partial",
            "3": "reserved",
            "4": "booked",
            "0": "free",
            "x": "free",
            "32": "free",
        }));
        assert_eq!(
            month,
            MonthStatus::from([
                (1, DayStatus::Free),
                (2, DayStatus::Partial),
                (3, DayStatus::Reserved),
            ])
        );
        assert!(decode_month_status(json!([1, 2])).is_empty());
    }

    #[test]
    fn rejection_message_extraction() {
        assert_eq!(
            rejection_message(r#"{"message": "already reserved"}"#).as_deref(),
            Some("already reserved")
        );
        assert_eq!(rejection_message("<html>oops</html>"), None);
        assert_eq!(rejection_message(r#"{"message": 5}"#), None);
    }
}
