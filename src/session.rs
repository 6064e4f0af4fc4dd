use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::engine::{day_status, reconcile, slots_for_day};
use crate::error::BookingError;
use crate::model::*;
use crate::observability::{self, MONTH_MISMATCH_TOTAL, RESERVATIONS_TOTAL, STALE_RESPONSES_TOTAL};
use crate::selection::{SelectionController, SelectionState};

/// Shown in place of the reserved-times list when a desk has none.
pub const NO_RESERVATIONS: &str = "No reservations for this desk.";

const LIST_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Identifies one desk selection. Views fetched under an older ticket are
/// discarded when a newer selection has been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskTicket {
    pub desk_id: u64,
    pub generation: u64,
}

/// Everything fetched and derived for one desk selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskView {
    pub ticket: DeskTicket,
    pub year: i32,
    pub month: u32,
    pub reservations: Vec<Reservation>,
    /// Computed locally from `reservations`; the month view shown to the user.
    pub month_status: MonthStatus,
    /// Days where the server's month endpoint said something else.
    pub mismatched_days: Vec<u32>,
}

/// One user's pass through desk → date → times → submit.
pub struct BookingSession<B> {
    backend: B,
    today: NaiveDate,
    desks: Vec<Desk>,
    generation: AtomicU64,
    current: Option<DeskView>,
    selection: SelectionController,
}

impl<B: Backend> BookingSession<B> {
    pub fn new(backend: B, today: NaiveDate) -> Self {
        Self {
            backend,
            today,
            desks: Vec::new(),
            generation: AtomicU64::new(0),
            current: None,
            selection: SelectionController::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn desks(&self) -> &[Desk] {
        &self.desks
    }

    pub fn current(&self) -> Option<&DeskView> {
        self.current.as_ref()
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn state(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn message(&self) -> Option<&str> {
        self.selection.message()
    }

    // ── Desks ───────────────────────────────────────────────

    /// Fetch the desk list. Each response replaces the previous list.
    pub async fn load_desks(&mut self) -> Result<&[Desk], BookingError> {
        match self.backend.list_desks().await {
            Ok(desks) => {
                info!(count = desks.len(), "desks loaded");
                self.desks = desks;
                Ok(&self.desks)
            }
            Err(e) => Err(self.selection.fail(e)),
        }
    }

    /// Start a desk selection: validates the desk and supersedes any
    /// earlier ticket.
    pub fn begin_desk_selection(&self, desk_id: u64) -> Result<DeskTicket, BookingError> {
        let selectable = self.desks.iter().any(|d| d.id == desk_id && d.available);
        if !selectable {
            return Err(BookingError::DeskUnavailable(desk_id));
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DeskTicket {
            desk_id,
            generation,
        })
    }

    /// Fetch reservations and the server month view concurrently, and
    /// derive the month view locally.
    pub async fn fetch_desk_view(
        &self,
        ticket: DeskTicket,
        year: i32,
        month: u32,
    ) -> Result<DeskView, BookingError> {
        let (reservations, remote) = futures::try_join!(
            self.backend.reservations(ticket.desk_id),
            self.backend.month_status(ticket.desk_id, year, month),
        )?;

        let month_status = day_status(&reservations, year, month);
        let mismatched_days = reconcile(&month_status, &remote);
        if !mismatched_days.is_empty() {
            warn!(
                desk_id = ticket.desk_id,
                year,
                month,
                "server month view disagrees on days {mismatched_days:?}; using local view"
            );
            metrics::counter!(MONTH_MISMATCH_TOTAL).increment(mismatched_days.len() as u64);
        }

        Ok(DeskView {
            ticket,
            year,
            month,
            reservations,
            month_status,
            mismatched_days,
        })
    }

    /// Install `view` if its ticket is still the latest. Returns false and
    /// leaves the session untouched for a stale view.
    pub fn apply_desk_view(&mut self, view: DeskView) -> bool {
        let latest = self.generation.load(Ordering::SeqCst);
        if view.ticket.generation != latest {
            debug!(
                desk_id = view.ticket.desk_id,
                generation = view.ticket.generation,
                latest,
                "discarding stale desk view"
            );
            metrics::counter!(STALE_RESPONSES_TOTAL).increment(1);
            return false;
        }
        info!(desk_id = view.ticket.desk_id, "desk selected");
        self.current = Some(view);
        self.selection.reset();
        true
    }

    /// Select a desk and load the current month for it.
    pub async fn select_desk(&mut self, desk_id: u64) -> Result<MonthStatus, BookingError> {
        let ticket = match self.begin_desk_selection(desk_id) {
            Ok(t) => t,
            Err(e) => return Err(self.selection.fail(e)),
        };
        let (year, month) = (self.today.year(), self.today.month());
        let view = match self.fetch_desk_view(ticket, year, month).await {
            Ok(v) => v,
            Err(e) => return Err(self.selection.fail(e)),
        };
        let status = view.month_status.clone();
        if !self.apply_desk_view(view) {
            return Err(BookingError::NotReady("desk selection superseded"));
        }
        Ok(status)
    }

    /// Month view for the selected desk, computed from its reservations.
    pub fn view_month(&self, year: i32, month: u32) -> Result<MonthStatus, BookingError> {
        let view = self
            .current
            .as_ref()
            .ok_or(BookingError::NotReady("select a desk first"))?;
        Ok(day_status(&view.reservations, year, month))
    }

    /// The selected desk's reservations as `start - end` lines, earliest
    /// first. Reservations that cover no time are left out.
    pub fn reserved_times(&self) -> Result<Vec<String>, BookingError> {
        let view = self
            .current
            .as_ref()
            .ok_or(BookingError::NotReady("select a desk first"))?;
        let mut reservations: Vec<&Reservation> =
            view.reservations.iter().filter(|r| r.span().is_some()).collect();
        reservations.sort_by_key(|r| r.start_time);
        Ok(reservations
            .into_iter()
            .map(|r| {
                format!(
                    "{} - {}",
                    r.start_time.format(LIST_FORMAT),
                    r.end_time.format(LIST_FORMAT)
                )
            })
            .collect())
    }

    // ── Date and times ──────────────────────────────────────

    /// Pick a date and return its slot grid.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<Vec<SlotAvailability>, BookingError> {
        let Some(view) = &self.current else {
            return Err(self.selection.fail(BookingError::NotReady("select a desk first")));
        };
        let slots = slots_for_day(&view.reservations, date);
        self.selection.select_date(date, self.today)?;
        Ok(slots)
    }

    /// Pick start and end slots. A range that collides with an existing
    /// reservation keeps the start and clears the end.
    pub fn select_times(&mut self, start: &str, end: &str) -> Result<(), BookingError> {
        self.selection.select_times(start, end)?;
        let (Some(view), Some(date), Some(range)) = (
            &self.current,
            self.selection.selected_date(),
            self.selection.selected_range(),
        ) else {
            return Ok(());
        };
        let candidate = Reservation::new(date.and_time(range.start), date.and_time(range.end));
        let taken = candidate
            .span()
            .is_some_and(|span| crate::engine::overlaps_any(&view.reservations, &span));
        if taken {
            self.selection.clear_end_time();
            return Err(self.selection.fail(BookingError::SlotUnavailable));
        }
        Ok(())
    }

    // ── Submit ──────────────────────────────────────────────

    /// Send the selected interval to the backend. No retries: on failure
    /// the selection stays put and the message slot explains why.
    pub async fn submit(&mut self) -> Result<Confirmation, BookingError> {
        let desk_id = match &self.current {
            Some(view) => view.ticket.desk_id,
            None => return Err(self.selection.fail(BookingError::NotReady("select a desk first"))),
        };
        let (start, end) = self.selection.begin_submit()?;
        let request = ReservationRequest::new(desk_id, start, end);

        match self.backend.reserve(&request).await {
            Ok(confirmation) => {
                let outcome = observability::outcome_label(None);
                metrics::counter!(RESERVATIONS_TOTAL, "outcome" => outcome).increment(1);
                info!(desk_id, "reservation submitted");
                self.selection.submit_succeeded(confirmation.message.clone());
                Ok(confirmation)
            }
            Err(e) => {
                let outcome = observability::outcome_label(Some(&e));
                metrics::counter!(RESERVATIONS_TOTAL, "outcome" => outcome).increment(1);
                warn!(desk_id, "reservation failed: {e}");
                Err(self.selection.submit_failed(e))
            }
        }
    }
}
