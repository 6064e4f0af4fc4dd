use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use crate::calendar::parse_datetime;
use crate::engine::{day_status, overlaps_any};
use crate::error::BookingError;
use crate::model::*;

use super::Backend;

/// In-process `Backend`: desks and per-desk reservation lists in `DashMap`s.
/// Serves demos and tests; nothing is persisted.
pub struct MemoryBackend {
    desks: DashMap<u64, Desk>,
    reservations: DashMap<u64, Vec<Reservation>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            desks: DashMap::new(),
            reservations: DashMap::new(),
        }
    }

    /// Three available desks, `Desk 1` through `Desk 3`.
    pub fn with_sample_desks() -> Self {
        let backend = Self::new();
        for id in 1..=3 {
            backend.insert_desk(Desk {
                id,
                name: format!("Desk {id}"),
                available: true,
            });
        }
        backend
    }

    // ── Fixture setup ────────────────────────────────────────

    pub fn insert_desk(&self, desk: Desk) {
        self.desks.insert(desk.id, desk);
    }

    /// Add a reservation without any checks, e.g. to seed a malformed one.
    pub fn insert_reservation(&self, desk_id: u64, reservation: Reservation) {
        self.reservations.entry(desk_id).or_default().push(reservation);
    }

    pub fn reservation_count(&self, desk_id: u64) -> usize {
        self.reservations.get(&desk_id).map_or(0, |r| r.len())
    }
}

fn bad_request(message: &str) -> BookingError {
    BookingError::BackendRejection {
        status: 400,
        message: message.to_string(),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_desks(&self) -> Result<Vec<Desk>, BookingError> {
        let mut desks: Vec<Desk> = self.desks.iter().map(|e| e.value().clone()).collect();
        desks.sort_by_key(|d| d.id);
        Ok(desks)
    }

    async fn reservations(&self, desk_id: u64) -> Result<Vec<Reservation>, BookingError> {
        Ok(self
            .reservations
            .get(&desk_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }

    async fn month_status(
        &self,
        desk_id: u64,
        year: i32,
        month: u32,
    ) -> Result<MonthStatus, BookingError> {
        let reservations = self.reservations(desk_id).await?;
        Ok(day_status(&reservations, year, month))
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<Confirmation, BookingError> {
        let (Some(start), Some(end)) = (
            parse_datetime(&request.start_datetime),
            parse_datetime(&request.end_datetime),
        ) else {
            return Err(bad_request("Invalid date format."));
        };
        let reservation = Reservation::new(start, end);
        let Some(span) = reservation.span() else {
            return Err(bad_request("End time must be after start time."));
        };
        if !self.desks.contains_key(&request.desk_id) {
            return Err(BookingError::BackendRejection {
                status: 404,
                message: format!("Desk {} not found.", request.desk_id),
            });
        }

        // The entry guard serialises check-and-insert per desk.
        let mut existing = self.reservations.entry(request.desk_id).or_default();
        if overlaps_any(&existing, &span) {
            return Err(bad_request(
                "This desk is already reserved for the selected time period.",
            ));
        }
        existing.push(reservation);
        drop(existing);

        let confirmation = Confirmation::for_request(request);
        info!(desk_id = request.desk_id, "{}", confirmation.message);
        Ok(confirmation)
    }
}
