use std::time::UNIX_EPOCH;

use chrono::NaiveDate;
use reservation_service::api::Reservation;
use reservation_service::client::ReservationServiceClient;
use uuid::Uuid;

const RESERVATION_SERVICE_URL: &str = "http://127.0.0.1:8080";

/// Hotel id unique to one test run, so leftovers of earlier runs do not interfere
fn unique_hotel_id(prefix: &str) -> String {
    format!(
        "{}{}",
        prefix,
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

fn draft(hotel_id: &str, room_number: u16) -> Reservation {
    Reservation {
        confirmation_number: None,
        hotel_id: Some(hotel_id.to_string()),
        start_date: NaiveDate::from_ymd_opt(2020, 6, 1),
        end_date: NaiveDate::from_ymd_opt(2020, 6, 5),
        room_number,
        guest_id: Some(Uuid::new_v4()),
    }
}

#[tokio::test]
/// Simple test for reservation service
/// Creates a reservation
/// Gets the reservation
/// Moves it to another room
/// Lists all reservations to see if it is there
/// Deletes it twice
async fn reservation_service_e2e_test() {
    let client =
        ReservationServiceClient::new(RESERVATION_SERVICE_URL).expect("Failed to create client");
    let hotel_id = unique_hotel_id("AZ");
    let reservation = draft(&hotel_id, 101);

    // CREATE
    let confirmation_number = client
        .create(&reservation)
        .await
        .expect("Failed to create reservation");
    assert!(!confirmation_number.is_empty());

    // RETRIEVE
    let returned = client
        .retrieve(&confirmation_number)
        .await
        .expect("Failed to get reservation")
        .expect("Reservation not found");
    assert_eq!(
        returned,
        reservation
            .clone()
            .with_confirmation_number(confirmation_number.clone())
    );

    // UPDATE
    let moved = Reservation {
        room_number: 202,
        ..returned.clone()
    };
    client
        .update(&confirmation_number, &moved)
        .await
        .expect("Failed to update reservation");
    let returned = client
        .retrieve(&confirmation_number)
        .await
        .expect("Failed to get reservation")
        .expect("Reservation not found");
    assert_eq!(returned, moved);

    // LIST
    let all = client.list().await.expect("Failed to list reservations");
    assert!(all
        .iter()
        .any(|r| r.confirmation_number.as_deref() == Some(confirmation_number.as_str())));

    // DELETE
    client
        .delete(&confirmation_number)
        .await
        .expect("Failed to delete reservation");
    assert_eq!(
        client
            .retrieve(&confirmation_number)
            .await
            .expect("Failed to get reservation"),
        None
    );
    client
        .delete(&confirmation_number)
        .await
        .expect("Second delete failed");
}

#[tokio::test]
/// Pre-stamped drafts are rejected and leave nothing behind,
/// search by hotel and date is not available
async fn reservation_service_rejections_e2e_test() {
    let client =
        ReservationServiceClient::new(RESERVATION_SERVICE_URL).expect("Failed to create client");
    let hotel_id = unique_hotel_id("REJ");

    let stamped = draft(&hotel_id, 1).with_confirmation_number("XYZ".to_string());
    assert!(client.create(&stamped).await.is_err());

    let all = client.list().await.expect("Failed to list reservations");
    assert!(all
        .iter()
        .all(|r| r.hotel_id.as_deref() != Some(hotel_id.as_str())));

    assert!(client
        .update("NOPE0000", &draft(&hotel_id, 1))
        .await
        .is_err());

    assert!(client
        .search("AZ123", NaiveDate::from_ymd_opt(2020, 6, 1).unwrap())
        .await
        .is_err());
}
