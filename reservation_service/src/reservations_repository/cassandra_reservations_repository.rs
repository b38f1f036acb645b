use std::sync::Arc;

use chrono::NaiveDate;
use futures_util::StreamExt;
use scylla::statement::prepared::PreparedStatement;
use scylla::value::{CqlValue, Row};

use crate::api::{ConfirmationNumber, Reservation};
use crate::confirmation::ConfirmationAllocator;
use crate::reservations_repository::{
    ensure_draft, search_not_implemented, unknown_reservation, ReservationStream,
    ReservationsRepository, ReservationsRepositoryError,
};
use crate::row_mapper::{self, InsertBindings, ReservationRow, RESERVATION_COLUMNS};
use crate::settings::AllocationStrategy;
use crate::store_client::{self, StoreError, StoreSession};

const RESERVATIONS_BY_CONFIRMATION: &str = "reservations_by_confirmation";

struct PreparedStatements {
    insert: PreparedStatement,
    insert_if_not_exists: PreparedStatement,
    select_by_confirmation: PreparedStatement,
    select_all: PreparedStatement,
    update: PreparedStatement,
    delete: PreparedStatement,
}

impl PreparedStatements {
    async fn prepare(session: &StoreSession) -> Result<Self, StoreError> {
        let insert = format!(
            "INSERT INTO {RESERVATIONS_BY_CONFIRMATION} ({RESERVATION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        );
        Ok(Self {
            insert: session.prepare(&insert).await?,
            insert_if_not_exists: session
                .prepare(&format!("{insert} IF NOT EXISTS"))
                .await?,
            select_by_confirmation: session
                .prepare(&format!(
                    "SELECT {RESERVATION_COLUMNS} FROM {RESERVATIONS_BY_CONFIRMATION} WHERE confirmation_number = ?"
                ))
                .await?,
            select_all: session
                .prepare(&format!(
                    "SELECT {RESERVATION_COLUMNS} FROM {RESERVATIONS_BY_CONFIRMATION}"
                ))
                .await?,
            update: session
                .prepare(&format!(
                    "UPDATE {RESERVATIONS_BY_CONFIRMATION} SET hotel_id = ?, start_date = ?, end_date = ?, room_number = ?, guest_id = ? WHERE confirmation_number = ?"
                ))
                .await?,
            delete: session
                .prepare(&format!(
                    "DELETE FROM {RESERVATIONS_BY_CONFIRMATION} WHERE confirmation_number = ?"
                ))
                .await?,
        })
    }
}

/// Reservations stored in `reservations_by_confirmation`
pub struct CassandraReservationsRepository {
    session: Arc<StoreSession>,
    statements: PreparedStatements,
    allocator: ConfirmationAllocator,
    allocation_strategy: AllocationStrategy,
}

impl CassandraReservationsRepository {
    /// Prepares all statements up front, the schema has to exist already
    pub async fn init(
        session: Arc<StoreSession>,
        allocator: ConfirmationAllocator,
        allocation_strategy: AllocationStrategy,
    ) -> Result<Self, StoreError> {
        let statements = PreparedStatements::prepare(&session).await?;
        tracing::info!(
            "Reservations repository ready on keyspace {}, allocation strategy {:?}",
            session.keyspace(),
            allocation_strategy
        );
        Ok(Self {
            session,
            statements,
            allocator,
            allocation_strategy,
        })
    }

    async fn allocate_by_probe(&self) -> Result<ConfirmationNumber, ReservationsRepositoryError> {
        self.allocator
            .allocate(move |candidate| async move {
                let existing = self.retrieve_by_confirmation(&candidate).await?;
                Ok::<_, ReservationsRepositoryError>(existing.is_none())
            })
            .await
    }

    async fn insert(&self, bindings: InsertBindings) -> Result<(), ReservationsRepositoryError> {
        self.session
            .execute(&self.statements.insert, bindings)
            .await?;
        Ok(())
    }

    /// Returns whether the row was written, false when the key was already present
    async fn insert_if_not_exists(
        &self,
        bindings: InsertBindings,
    ) -> Result<bool, ReservationsRepositoryError> {
        let result = self
            .session
            .execute(&self.statements.insert_if_not_exists, bindings)
            .await?;

        // `[applied]` always comes first, the existing row follows when it was not applied
        let applied = store_client::maybe_first_row::<Row>(result)?
            .and_then(|row| row.columns.into_iter().next().flatten());
        match applied {
            Some(CqlValue::Boolean(applied)) => Ok(applied),
            other => Err(StoreError::UnexpectedResponse(format!(
                "conditional insert returned {:?} instead of [applied]",
                other
            ))
            .into()),
        }
    }
}

#[async_trait::async_trait]
impl ReservationsRepository for CassandraReservationsRepository {
    async fn create(
        &self,
        reservation: Reservation,
    ) -> Result<ConfirmationNumber, ReservationsRepositoryError> {
        ensure_draft(&reservation)?;

        match self.allocation_strategy {
            AllocationStrategy::Probe => {
                let confirmation_number = self.allocate_by_probe().await?;
                let reservation = reservation.with_confirmation_number(confirmation_number.clone());
                self.insert(row_mapper::bind_insert(&reservation)).await?;
                Ok(confirmation_number)
            }
            AllocationStrategy::ConditionalInsert => {
                self.allocator
                    .allocate(move |candidate| {
                        let bindings = row_mapper::bind_insert(
                            &reservation.clone().with_confirmation_number(candidate),
                        );
                        async move { self.insert_if_not_exists(bindings).await }
                    })
                    .await
            }
        }
    }

    async fn retrieve_by_confirmation(
        &self,
        confirmation_number: &str,
    ) -> Result<Option<Reservation>, ReservationsRepositoryError> {
        let result = self
            .session
            .execute(
                &self.statements.select_by_confirmation,
                (confirmation_number,),
            )
            .await?;

        match store_client::maybe_first_row::<ReservationRow>(result)? {
            Some(row) => Ok(Some(row_mapper::from_row(row)?)),
            None => {
                tracing::debug!(
                    "Unable to load reservation with confirmation number: {}",
                    confirmation_number
                );
                Ok(None)
            }
        }
    }

    async fn update(&self, reservation: Reservation) -> Result<(), ReservationsRepositoryError> {
        let confirmation_number = reservation
            .confirmation_number
            .as_deref()
            .ok_or_else(|| unknown_reservation(None))?;

        if self
            .retrieve_by_confirmation(confirmation_number)
            .await?
            .is_none()
        {
            return Err(unknown_reservation(Some(confirmation_number)));
        }

        self.session
            .execute(
                &self.statements.update,
                row_mapper::bind_update(&reservation),
            )
            .await?;
        Ok(())
    }

    async fn get_all(&self) -> Result<ReservationStream<'_>, ReservationsRepositoryError> {
        let pager = self
            .session
            .execute_iter(&self.statements.select_all, ())
            .await?;
        let rows = pager
            .rows_stream::<ReservationRow>()
            .map_err(StoreError::from)?;

        Ok(rows
            .map(|row| -> Result<Reservation, ReservationsRepositoryError> {
                let row = row.map_err(StoreError::from)?;
                Ok(row_mapper::from_row(row)?)
            })
            .boxed())
    }

    async fn search_by_hotel_date(
        &self,
        hotel_id: &str,
        date: NaiveDate,
    ) -> Result<ReservationStream<'_>, ReservationsRepositoryError> {
        Err(search_not_implemented(hotel_id, date))
    }

    async fn delete(&self, confirmation_number: &str) -> Result<(), ReservationsRepositoryError> {
        self.session
            .execute(&self.statements.delete, (confirmation_number,))
            .await?;
        Ok(())
    }
}
