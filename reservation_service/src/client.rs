use anyhow::{bail, Context};
use chrono::NaiveDate;
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{ConfirmationNumber, Reservation};

pub struct ReservationServiceClient {
    url: String,
    client: ClientWithMiddleware,
}

impl ReservationServiceClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/reservations endpoint
    /// Returns confirmation number allocated for the reservation
    pub async fn create(&self, reservation: &Reservation) -> anyhow::Result<ConfirmationNumber> {
        let response = self
            .client
            .post(format!("{}/api/reservations", self.url))
            .json(reservation)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to create reservation {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        Ok(location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/reservations/")
            .context("Invalid location header")?
            .to_string())
    }

    /// Calls GET /api/reservations/{confirmation_number} endpoint
    /// Returns None if there is no such reservation
    pub async fn retrieve(
        &self,
        confirmation_number: &str,
    ) -> anyhow::Result<Option<Reservation>> {
        let response = self
            .client
            .get(format!(
                "{}/api/reservations/{}",
                self.url, confirmation_number
            ))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get reservation {}", error)
        }
    }

    /// Calls PUT /api/reservations/{confirmation_number} endpoint
    pub async fn update(
        &self,
        confirmation_number: &str,
        reservation: &Reservation,
    ) -> anyhow::Result<()> {
        let response = self
            .client
            .put(format!(
                "{}/api/reservations/{}",
                self.url, confirmation_number
            ))
            .json(reservation)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to update reservation {}", error)
        }
    }

    /// Calls GET /api/reservations endpoint
    pub async fn list(&self) -> anyhow::Result<Vec<Reservation>> {
        let response = self
            .client
            .get(format!("{}/api/reservations", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list reservations {}", error)
        }
    }

    /// Calls GET /api/reservations/search endpoint
    pub async fn search(
        &self,
        hotel_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<Reservation>> {
        let response = self
            .client
            .get(format!("{}/api/reservations/search", self.url))
            .query(&[("hotel_id", hotel_id.to_string()), ("date", date.to_string())])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to search reservations ({}) {}", status, error)
        }
    }

    /// Calls DELETE /api/reservations/{confirmation_number} endpoint
    pub async fn delete(&self, confirmation_number: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!(
                "{}/api/reservations/{}",
                self.url, confirmation_number
            ))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to delete reservation {}", error)
        }
    }
}
