use std::net::SocketAddr;

// ── Backend traffic ─────────────────────────────────────────────

/// Counter: backend requests. Labels: endpoint, status.
pub const FETCHES_TOTAL: &str = "deskbook_fetches_total";

/// Histogram: backend request latency in seconds. Labels: endpoint.
pub const FETCH_DURATION_SECONDS: &str = "deskbook_fetch_duration_seconds";

/// Counter: payload entries dropped as malformed. Labels: payload.
pub const DROPPED_ENTRIES_TOTAL: &str = "deskbook_dropped_entries_total";

// ── Session ─────────────────────────────────────────────────────

/// Counter: reservation submissions. Labels: outcome.
pub const RESERVATIONS_TOTAL: &str = "deskbook_reservations_total";

/// Counter: days where the server month view disagrees with the local one.
pub const MONTH_MISMATCH_TOTAL: &str = "deskbook_month_mismatch_total";

/// Counter: desk views discarded because a newer desk selection won.
pub const STALE_RESPONSES_TOTAL: &str = "deskbook_stale_responses_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Short label for a submission outcome.
pub fn outcome_label(err: Option<&crate::error::BookingError>) -> &'static str {
    use crate::error::BookingError;
    match err {
        None => "booked",
        Some(BookingError::BackendRejection { .. }) => "rejected",
        Some(BookingError::Network(_)) => "network_error",
        Some(_) => "invalid",
    }
}
