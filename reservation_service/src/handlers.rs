use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::web::{self, Data};
use actix_web::{Error, HttpResponse};
use futures_util::TryStreamExt;

use crate::api::{ConfirmationNumber, HotelDateQuery, Reservation};
use crate::reservations_repository::{ReservationsRepository, ReservationsRepositoryError};

type Repository = Data<Arc<dyn ReservationsRepository>>;

fn error_response(operation: &str, err: ReservationsRepositoryError) -> HttpResponse {
    match err {
        ReservationsRepositoryError::InvalidArgument(msg) => HttpResponse::BadRequest().json(msg),
        ReservationsRepositoryError::NotImplemented(_) => {
            HttpResponse::NotImplemented().json(err.to_string())
        }
        err => {
            tracing::error!("{} failed {}", operation, err);
            HttpResponse::InternalServerError().json(err.to_string())
        }
    }
}

pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

pub async fn create_reservation(
    repository: Repository,
    reservation: web::Json<Reservation>,
) -> HttpResponse {
    match repository.create(reservation.into_inner()).await {
        Ok(confirmation_number) => HttpResponse::Created()
            .append_header((
                LOCATION,
                format!("/api/reservations/{}", confirmation_number),
            ))
            .json(confirmation_number),
        Err(err) => error_response("Create reservation", err),
    }
}

pub async fn get_all_reservations(repository: Repository) -> HttpResponse {
    let reservations = match repository.get_all().await {
        Ok(stream) => stream.try_collect::<Vec<_>>().await,
        Err(err) => Err(err),
    };
    match reservations {
        Ok(reservations) => HttpResponse::Ok().json(reservations),
        Err(err) => error_response("Get all reservations", err),
    }
}

pub async fn get_reservation(
    repository: Repository,
    confirmation_number: web::Path<ConfirmationNumber>,
) -> HttpResponse {
    match repository
        .retrieve_by_confirmation(&confirmation_number)
        .await
    {
        Ok(Some(reservation)) => HttpResponse::Ok().json(reservation),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => error_response("Get reservation", err),
    }
}

/// The confirmation number from the path wins over one in the body
pub async fn update_reservation(
    repository: Repository,
    confirmation_number: web::Path<ConfirmationNumber>,
    reservation: web::Json<Reservation>,
) -> HttpResponse {
    let reservation = reservation
        .into_inner()
        .with_confirmation_number(confirmation_number.into_inner());
    match repository.update(reservation).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => error_response("Update reservation", err),
    }
}

pub async fn delete_reservation(
    repository: Repository,
    confirmation_number: web::Path<ConfirmationNumber>,
) -> HttpResponse {
    match repository.delete(&confirmation_number).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => error_response("Delete reservation", err),
    }
}

pub async fn search_reservations(
    repository: Repository,
    query: web::Query<HotelDateQuery>,
) -> HttpResponse {
    let reservations = match repository
        .search_by_hotel_date(&query.hotel_id, query.date)
        .await
    {
        Ok(stream) => stream.try_collect::<Vec<_>>().await,
        Err(err) => Err(err),
    };
    match reservations {
        Ok(reservations) => HttpResponse::Ok().json(reservations),
        Err(err) => error_response("Search reservations", err),
    }
}

#[cfg(test)]
mod handler_tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::app_config::config_app;
    use crate::reservations_repository::InMemoryReservationsRepository;

    fn repository_data() -> Repository {
        let repository: Arc<dyn ReservationsRepository> =
            Arc::new(InMemoryReservationsRepository::default());
        Data::new(repository)
    }

    fn draft() -> Reservation {
        Reservation {
            confirmation_number: None,
            hotel_id: Some("AZ123".to_string()),
            start_date: NaiveDate::from_ymd_opt(2020, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 6, 5),
            room_number: 101,
            guest_id: Some(Uuid::new_v4()),
        }
    }

    #[actix_web::test]
    /// Walks one reservation through every route
    async fn test_reservation_routes() {
        let app = test::init_service(
            App::new()
                .app_data(repository_data())
                .configure(config_app),
        )
        .await;
        let reservation = draft();

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/reservations")
                .set_json(reservation.clone())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let confirmation_number: ConfirmationNumber = test::read_body_json(response).await;
        assert_eq!(
            location,
            format!("/api/reservations/{}", confirmation_number)
        );

        let stored: Reservation = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&location).to_request(),
        )
        .await;
        assert_eq!(
            stored,
            reservation.with_confirmation_number(confirmation_number.clone())
        );

        let moved = Reservation {
            room_number: 202,
            confirmation_number: None,
            ..stored.clone()
        };
        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&location)
                .set_json(moved)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let all: Vec<Reservation> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/reservations")
                .to_request(),
        )
        .await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].room_number, 202);

        let response = test::call_service(
            &app,
            test::TestRequest::delete().uri(&location).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response =
            test::call_service(&app, test::TestRequest::get().uri(&location).to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_error_statuses() {
        let app = test::init_service(
            App::new()
                .app_data(repository_data())
                .configure(config_app),
        )
        .await;

        let stamped = draft().with_confirmation_number("XYZ".to_string());
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/reservations")
                .set_json(stamped)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/reservations/NOPE0000")
                .set_json(draft())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/reservations/search?hotel_id=AZ123&date=2020-06-01")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/health").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
