pub mod api;
pub mod confirmation;
pub mod date_codec;
pub mod reservations_repository;
pub mod row_mapper;
pub mod settings;
pub mod store_client;

#[cfg(any(feature = "client", test))]
pub mod client;

#[cfg(any(feature = "server", test))]
pub mod app_config;

#[cfg(any(feature = "server", test))]
mod handlers;
