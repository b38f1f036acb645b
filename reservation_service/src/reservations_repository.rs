use chrono::NaiveDate;
use futures_util::stream::BoxStream;

pub use cassandra_reservations_repository::CassandraReservationsRepository;
pub use in_memory_reservations_repository::InMemoryReservationsRepository;

use crate::api::{ConfirmationNumber, Reservation};
use crate::store_client::StoreError;

mod cassandra_reservations_repository;
mod in_memory_reservations_repository;

/// Lazily fetched reservations, pages are pulled from the store as the stream is polled
pub type ReservationStream<'a> = BoxStream<'a, Result<Reservation, ReservationsRepositoryError>>;

#[derive(Debug, thiserror::Error)]
pub enum ReservationsRepositoryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("No free confirmation number found in {0} attempts")]
    AllocationExhausted(u32),

    #[error("Store failure {0}")]
    StoreFailure(#[from] StoreError),
}

#[async_trait::async_trait]
pub trait ReservationsRepository: Send + Sync {
    /// Persists a new reservation, returns the confirmation number allocated for it.
    /// The reservation must not carry a confirmation number yet.
    async fn create(
        &self,
        reservation: Reservation,
    ) -> Result<ConfirmationNumber, ReservationsRepositoryError>;

    /// Returns None when there is no such reservation, this is not an error
    async fn retrieve_by_confirmation(
        &self,
        confirmation_number: &str,
    ) -> Result<Option<Reservation>, ReservationsRepositoryError>;

    /// Overwrites all mutable fields of an existing reservation
    async fn update(&self, reservation: Reservation) -> Result<(), ReservationsRepositoryError>;

    /// Every stored reservation in unspecified order
    async fn get_all(&self) -> Result<ReservationStream<'_>, ReservationsRepositoryError>;

    async fn search_by_hotel_date(
        &self,
        hotel_id: &str,
        date: NaiveDate,
    ) -> Result<ReservationStream<'_>, ReservationsRepositoryError>;

    /// Deleting an unknown reservation is not an error
    async fn delete(&self, confirmation_number: &str) -> Result<(), ReservationsRepositoryError>;
}

fn ensure_draft(reservation: &Reservation) -> Result<(), ReservationsRepositoryError> {
    match &reservation.confirmation_number {
        Some(confirmation_number) => {
            tracing::error!(
                "Received new reservation containing confirmation number: {}",
                confirmation_number
            );
            Err(ReservationsRepositoryError::InvalidArgument(
                "New reservation cannot contain confirmation number".to_string(),
            ))
        }
        None => Ok(()),
    }
}

fn unknown_reservation(confirmation_number: Option<&str>) -> ReservationsRepositoryError {
    let error_msg = format!(
        "Unable to update unknown reservation with confirmation number: {}",
        confirmation_number.unwrap_or("<none>")
    );
    tracing::error!("{}", error_msg);
    ReservationsRepositoryError::InvalidArgument(error_msg)
}

fn search_not_implemented(hotel_id: &str, date: NaiveDate) -> ReservationsRepositoryError {
    tracing::error!(
        "Search by hotel {} and date {} requested but not supported",
        hotel_id,
        date
    );
    ReservationsRepositoryError::NotImplemented("search_by_hotel_date")
}
