use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::{stream, StreamExt};

use crate::api::{ConfirmationNumber, Reservation};
use crate::confirmation::{ConfirmationAllocator, RandomConfirmationNumberGenerator};
use crate::reservations_repository::{
    ensure_draft, search_not_implemented, unknown_reservation, ReservationStream,
    ReservationsRepository, ReservationsRepositoryError,
};

const DEFAULT_MAX_ALLOCATION_ATTEMPTS: u32 = 16;

/// Keeps reservations in process memory.
/// Claiming a confirmation number and inserting happen under one write lock, so allocation is race free here.
pub struct InMemoryReservationsRepository {
    reservations: parking_lot::RwLock<HashMap<ConfirmationNumber, Reservation>>,
    allocator: ConfirmationAllocator,
}

impl InMemoryReservationsRepository {
    pub fn new(allocator: ConfirmationAllocator) -> Self {
        Self {
            reservations: Default::default(),
            allocator,
        }
    }
}

impl Default for InMemoryReservationsRepository {
    fn default() -> Self {
        Self::new(ConfirmationAllocator::new(
            Arc::new(RandomConfirmationNumberGenerator::default()),
            DEFAULT_MAX_ALLOCATION_ATTEMPTS,
        ))
    }
}

#[async_trait::async_trait]
impl ReservationsRepository for InMemoryReservationsRepository {
    async fn create(
        &self,
        reservation: Reservation,
    ) -> Result<ConfirmationNumber, ReservationsRepositoryError> {
        ensure_draft(&reservation)?;

        self.allocator
            .allocate(|candidate| {
                let claimed = match self.reservations.write().entry(candidate.clone()) {
                    Entry::Occupied(_) => false,
                    Entry::Vacant(entry) => {
                        entry.insert(reservation.clone().with_confirmation_number(candidate));
                        true
                    }
                };
                async move { Ok(claimed) }
            })
            .await
    }

    async fn retrieve_by_confirmation(
        &self,
        confirmation_number: &str,
    ) -> Result<Option<Reservation>, ReservationsRepositoryError> {
        let reservation = self.reservations.read().get(confirmation_number).cloned();
        if reservation.is_none() {
            tracing::debug!(
                "Unable to load reservation with confirmation number: {}",
                confirmation_number
            );
        }
        Ok(reservation)
    }

    async fn update(&self, reservation: Reservation) -> Result<(), ReservationsRepositoryError> {
        let confirmation_number = reservation
            .confirmation_number
            .clone()
            .ok_or_else(|| unknown_reservation(None))?;

        match self.reservations.write().get_mut(&confirmation_number) {
            Some(stored) => {
                *stored = reservation;
                Ok(())
            }
            None => Err(unknown_reservation(Some(&confirmation_number))),
        }
    }

    async fn get_all(&self) -> Result<ReservationStream<'_>, ReservationsRepositoryError> {
        let snapshot: Vec<Reservation> = self.reservations.read().values().cloned().collect();
        Ok(stream::iter(snapshot.into_iter().map(Ok)).boxed())
    }

    async fn search_by_hotel_date(
        &self,
        hotel_id: &str,
        date: NaiveDate,
    ) -> Result<ReservationStream<'_>, ReservationsRepositoryError> {
        Err(search_not_implemented(hotel_id, date))
    }

    async fn delete(&self, confirmation_number: &str) -> Result<(), ReservationsRepositoryError> {
        self.reservations.write().remove(confirmation_number);
        Ok(())
    }
}
