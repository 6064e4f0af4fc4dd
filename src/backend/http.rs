use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::BookingError;
use crate::model::*;
use crate::observability::{FETCHES_TOTAL, FETCH_DURATION_SECONDS};

use super::decode::*;
use super::Backend;

/// `Backend` over the service's JSON/form HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BookingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the body as loose JSON, mapping non-2xx to a rejection.
    async fn get_json(&self, endpoint: &'static str, path: &str) -> Result<Value, BookingError> {
        let started = Instant::now();
        let result = self.get_json_inner(path).await;
        metrics::histogram!(FETCH_DURATION_SECONDS, "endpoint" => endpoint)
            .record(started.elapsed().as_secs_f64());
        metrics::counter!(FETCHES_TOTAL, "endpoint" => endpoint, "status" => status_label(&result))
            .increment(1);
        result
    }

    async fn get_json_inner(&self, path: &str) -> Result<Value, BookingError> {
        let url = self.url(path);
        debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rejection(status.as_u16(), &body));
        }
        // A 2xx body that isn't JSON is a failed fetch, not an empty one.
        Ok(resp.json::<Value>().await?)
    }

    async fn reserve_inner(
        &self,
        request: &ReservationRequest,
    ) -> Result<Confirmation, BookingError> {
        let resp = self
            .client
            .post(self.url("/reserve_desk"))
            .form(request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }
        // Success may be a JSON confirmation or, after the redirect, the
        // confirmation page; fall back to a locally composed message.
        Ok(serde_json::from_str::<Confirmation>(&body)
            .unwrap_or_else(|_| Confirmation::for_request(request)))
    }
}

fn rejection(status: u16, body: &str) -> BookingError {
    BookingError::BackendRejection {
        status,
        message: rejection_message(body).unwrap_or_else(|| {
            format!("An error occurred while processing your request ({status}).")
        }),
    }
}

fn status_label<T>(result: &Result<T, BookingError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(BookingError::BackendRejection { .. }) => "rejected",
        Err(_) => "error",
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_desks(&self) -> Result<Vec<Desk>, BookingError> {
        let payload = self.get_json("desks", "/desks").await?;
        Ok(decode_desks(payload))
    }

    async fn reservations(&self, desk_id: u64) -> Result<Vec<Reservation>, BookingError> {
        let payload = self
            .get_json("reservations", &format!("/reservations/{desk_id}"))
            .await?;
        Ok(decode_reservations(payload))
    }

    async fn month_status(
        &self,
        desk_id: u64,
        year: i32,
        month: u32,
    ) -> Result<MonthStatus, BookingError> {
        let payload = self
            .get_json(
                "month",
                &format!("/reservations/{desk_id}/month/{year}/{month}"),
            )
            .await?;
        Ok(decode_month_status(payload))
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<Confirmation, BookingError> {
        let started = Instant::now();
        let result = self.reserve_inner(request).await;
        metrics::histogram!(FETCH_DURATION_SECONDS, "endpoint" => "reserve")
            .record(started.elapsed().as_secs_f64());
        metrics::counter!(FETCHES_TOTAL, "endpoint" => "reserve", "status" => status_label(&result))
            .increment(1);
        if let Ok(c) = &result {
            info!(desk_id = request.desk_id, "{}", c.message);
        }
        result
    }
}
