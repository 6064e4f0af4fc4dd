use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::calendar::{format_date, parse_slot};
use crate::engine::validate_range;
use crate::error::BookingError;
use crate::model::TimeRange;

const SUBMIT_NETWORK_MESSAGE: &str = "An error occurred while making the reservation.";

/// Where the user is in the date → times → submit flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    NoneSelected,
    /// A date is picked; `start` survives a rejected end time.
    DateSelected {
        date: NaiveDate,
        start: Option<NaiveTime>,
    },
    TimesSelected {
        date: NaiveDate,
        range: TimeRange,
    },
    /// Terminal: the backend accepted the reservation.
    Submitted { confirmation: String },
}

/// Owns the selection, the single calendar highlight and the single
/// user-visible message slot.
#[derive(Debug)]
pub struct SelectionController {
    state: SelectionState,
    highlight: Option<NaiveDate>,
    message: Option<String>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            state: SelectionState::NoneSelected,
            highlight: None,
            message: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn highlight(&self) -> Option<NaiveDate> {
        self.highlight
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        match &self.state {
            SelectionState::DateSelected { date, .. }
            | SelectionState::TimesSelected { date, .. } => Some(*date),
            SelectionState::NoneSelected | SelectionState::Submitted { .. } => None,
        }
    }

    pub fn selected_range(&self) -> Option<TimeRange> {
        match &self.state {
            SelectionState::TimesSelected { range, .. } => Some(*range),
            _ => None,
        }
    }

    // ── Highlight marker ────────────────────────────────────

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// Replaces any previous marker; at most one exists.
    pub fn set_highlight(&mut self, date: NaiveDate) {
        self.clear_highlight();
        self.highlight = Some(date);
    }

    // ── Message slot ────────────────────────────────────────

    pub fn show_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn hide_message(&mut self) {
        self.message = None;
    }

    /// Show `err` in the message slot and hand it back.
    pub fn fail(&mut self, err: BookingError) -> BookingError {
        self.show_message(err.user_message());
        err
    }

    // ── Transitions ─────────────────────────────────────────

    /// Back to `NoneSelected`, e.g. after picking another desk.
    pub fn reset(&mut self) {
        self.state = SelectionState::NoneSelected;
        self.clear_highlight();
        self.hide_message();
    }

    /// Pick a calendar day. Days before `today` are rejected and leave the
    /// state untouched; otherwise any earlier slot choice is discarded.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
        if let SelectionState::Submitted { .. } = self.state {
            return Err(self.fail(BookingError::NotReady("reservation already submitted")));
        }
        if date < today {
            return Err(self.fail(BookingError::PastDate(date)));
        }
        self.state = SelectionState::DateSelected { date, start: None };
        self.set_highlight(date);
        self.hide_message();
        debug!(date = %format_date(date), "date selected");
        Ok(())
    }

    /// Pick start and end slots (`HH:00`) on the selected date.
    pub fn select_times(&mut self, start: &str, end: &str) -> Result<(), BookingError> {
        let Some(date) = self.selected_date() else {
            return Err(self.fail(BookingError::NotReady("select a date first")));
        };
        let start_time = match parse_slot(start) {
            Ok(t) => t,
            Err(e) => {
                self.state = SelectionState::DateSelected { date, start: None };
                return Err(self.fail(e));
            }
        };
        let end_time = match parse_slot(end) {
            Ok(t) => t,
            Err(e) => {
                self.state = SelectionState::DateSelected {
                    date,
                    start: Some(start_time),
                };
                return Err(self.fail(e));
            }
        };
        if !validate_range(start, end) {
            self.state = SelectionState::DateSelected {
                date,
                start: Some(start_time),
            };
            return Err(self.fail(BookingError::InvalidRange));
        }
        self.state = SelectionState::TimesSelected {
            date,
            range: TimeRange {
                start: start_time,
                end: end_time,
            },
        };
        self.hide_message();
        Ok(())
    }

    /// Drop the end slot, keeping the date and start slot.
    pub fn clear_end_time(&mut self) {
        if let SelectionState::TimesSelected { date, range } = self.state {
            self.state = SelectionState::DateSelected {
                date,
                start: Some(range.start),
            };
        }
    }

    /// The interval to send to the backend. Requires `TimesSelected`.
    pub fn begin_submit(&mut self) -> Result<(NaiveDateTime, NaiveDateTime), BookingError> {
        let SelectionState::TimesSelected { date, range } = self.state else {
            return Err(self.fail(BookingError::NotReady("select a start and end time first")));
        };
        let start = date.and_time(range.start);
        let end = date.and_time(range.end);
        if !validate_range(start, end) {
            return Err(self.fail(BookingError::InvalidRange));
        }
        Ok((start, end))
    }

    pub fn submit_succeeded(&mut self, confirmation: String) {
        self.state = SelectionState::Submitted { confirmation };
        self.clear_highlight();
        self.hide_message();
    }

    /// The backend refused or could not be reached; the selection stays.
    pub fn submit_failed(&mut self, err: BookingError) -> BookingError {
        if let BookingError::Network(_) = err {
            self.show_message(SUBMIT_NETWORK_MESSAGE);
            return err;
        }
        self.fail(err)
    }
}
