use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ConfirmationNumber = String;
pub type HotelId = String;
pub type RoomNumber = u16;
pub type GuestId = Uuid;

/// A hotel room reservation.
///
/// `confirmation_number` is absent on a draft and is stamped by the repository on create.
/// Every other attribute may be absent too, in which case it is persisted as null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Reservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<ConfirmationNumber>,
    pub hotel_id: Option<HotelId>,
    /// Check-in day, inclusive
    pub start_date: Option<NaiveDate>,
    /// Check-out day, exclusive
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub room_number: RoomNumber,
    pub guest_id: Option<GuestId>,
}

impl Reservation {
    pub fn with_confirmation_number(self, confirmation_number: ConfirmationNumber) -> Self {
        Self {
            confirmation_number: Some(confirmation_number),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct HotelDateQuery {
    pub hotel_id: HotelId,
    pub date: NaiveDate,
}
