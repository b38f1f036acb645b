use actix_web::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api/reservations")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_all_reservations))
                        .route(web::post().to(handlers::create_reservation)),
                )
                // registered before the catch-all confirmation number resource
                .service(
                    web::resource("/search").route(web::get().to(handlers::search_reservations)),
                )
                .service(
                    web::resource("/{confirmation_number}")
                        .route(web::get().to(handlers::get_reservation))
                        .route(web::put().to(handlers::update_reservation))
                        .route(web::delete().to(handlers::delete_reservation)),
                ),
        );
}
