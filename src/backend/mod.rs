//! The reservation service as seen from the client: four endpoints behind
//! one trait, so the session can run against HTTP or in memory.

mod decode;
mod http;
mod memory;

pub use decode::{decode_desks, decode_month_status, decode_reservations, rejection_message};
pub use http::HttpBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;

use crate::error::BookingError;
use crate::model::*;

#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /desks`
    async fn list_desks(&self) -> Result<Vec<Desk>, BookingError>;

    /// `GET /reservations/{desk_id}`
    async fn reservations(&self, desk_id: u64) -> Result<Vec<Reservation>, BookingError>;

    /// `GET /reservations/{desk_id}/month/{year}/{month}`
    async fn month_status(
        &self,
        desk_id: u64,
        year: i32,
        month: u32,
    ) -> Result<MonthStatus, BookingError>;

    /// `POST /reserve_desk`
    async fn reserve(&self, request: &ReservationRequest) -> Result<Confirmation, BookingError>;
}
