use scylla::value::CqlDate;
use scylla::{DeserializeRow, SerializeRow};
use uuid::Uuid;

use crate::api::Reservation;
use crate::date_codec;
use crate::store_client::StoreError;

/// Column list shared by every statement reading or writing a full reservation
pub const RESERVATION_COLUMNS: &str =
    "confirmation_number, hotel_id, start_date, end_date, room_number, guest_id";

/// Raw row of `reservations_by_confirmation`, any column may be null
#[derive(Debug, Clone, Default, PartialEq, DeserializeRow)]
pub struct ReservationRow {
    pub confirmation_number: Option<String>,
    pub hotel_id: Option<String>,
    pub start_date: Option<CqlDate>,
    pub end_date: Option<CqlDate>,
    pub room_number: Option<i16>,
    pub guest_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, SerializeRow)]
pub struct InsertBindings {
    pub confirmation_number: Option<String>,
    pub hotel_id: Option<String>,
    pub start_date: Option<CqlDate>,
    pub end_date: Option<CqlDate>,
    pub room_number: i16,
    pub guest_id: Option<Uuid>,
}

/// Values for `UPDATE ... SET <mutable columns> WHERE confirmation_number = ?`.
/// Bound by name so the key lands in the WHERE clause.
#[derive(Debug, Clone, PartialEq, SerializeRow)]
pub struct UpdateBindings {
    pub hotel_id: Option<String>,
    pub start_date: Option<CqlDate>,
    pub end_date: Option<CqlDate>,
    pub room_number: i16,
    pub guest_id: Option<Uuid>,
    pub confirmation_number: Option<String>,
}

// smallint is signed, the bit pattern is kept so every u16 room survives a round trip
fn room_to_store(room_number: u16) -> i16 {
    room_number as i16
}

fn room_to_domain(room_number: Option<i16>) -> u16 {
    room_number.map(|room| room as u16).unwrap_or_default()
}

pub fn from_row(row: ReservationRow) -> Result<Reservation, StoreError> {
    Ok(Reservation {
        confirmation_number: row.confirmation_number,
        hotel_id: row.hotel_id,
        start_date: date_codec::to_domain(row.start_date)?,
        end_date: date_codec::to_domain(row.end_date)?,
        room_number: room_to_domain(row.room_number),
        guest_id: row.guest_id,
    })
}

pub fn bind_insert(reservation: &Reservation) -> InsertBindings {
    InsertBindings {
        confirmation_number: reservation.confirmation_number.clone(),
        hotel_id: reservation.hotel_id.clone(),
        start_date: date_codec::to_store(reservation.start_date),
        end_date: date_codec::to_store(reservation.end_date),
        room_number: room_to_store(reservation.room_number),
        guest_id: reservation.guest_id,
    }
}

pub fn bind_update(reservation: &Reservation) -> UpdateBindings {
    UpdateBindings {
        hotel_id: reservation.hotel_id.clone(),
        start_date: date_codec::to_store(reservation.start_date),
        end_date: date_codec::to_store(reservation.end_date),
        room_number: room_to_store(reservation.room_number),
        guest_id: reservation.guest_id,
        confirmation_number: reservation.confirmation_number.clone(),
    }
}
