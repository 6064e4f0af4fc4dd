use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    PastDate(NaiveDate),
    InvalidRange,
    InvalidSlot(String),
    InvalidDate(String),
    SlotUnavailable,
    NotReady(&'static str),
    DeskUnavailable(u64),
    Network(String),
    BackendRejection { status: u16, message: String },
}

impl BookingError {
    /// Text for the single message slot shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::PastDate(_) => "You cannot select a past date.".into(),
            BookingError::InvalidRange => "End time must be after start time.".into(),
            BookingError::SlotUnavailable => {
                "This desk is already reserved for the selected time period.".into()
            }
            BookingError::Network(_) => {
                "Could not reach the reservation service. Please try again.".into()
            }
            BookingError::BackendRejection { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::PastDate(date) => write!(f, "date {date} is in the past"),
            BookingError::InvalidRange => write!(f, "end must be after start"),
            BookingError::InvalidSlot(label) => write!(f, "not a bookable slot: {label:?}"),
            BookingError::InvalidDate(raw) => write!(f, "invalid date: {raw:?}"),
            BookingError::SlotUnavailable => write!(f, "selected time overlaps a reservation"),
            BookingError::NotReady(what) => write!(f, "not ready: {what}"),
            BookingError::DeskUnavailable(id) => write!(f, "desk {id} is not available"),
            BookingError::Network(e) => write!(f, "network error: {e}"),
            BookingError::BackendRejection { status, message } => {
                write!(f, "backend rejected request ({status}): {message}")
            }
        }
    }
}

impl std::error::Error for BookingError {}

impl From<reqwest::Error> for BookingError {
    fn from(e: reqwest::Error) -> Self {
        BookingError::Network(e.to_string())
    }
}
