use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use reservation_service::app_config::config_app;
use reservation_service::confirmation::{ConfirmationAllocator, RandomConfirmationNumberGenerator};
use reservation_service::reservations_repository::{
    CassandraReservationsRepository, InMemoryReservationsRepository, ReservationsRepository,
};
use reservation_service::settings::Settings;
use reservation_service::store_client::StoreSession;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "reservation_service";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .context("Failed to install OpenTelemetry tracer.")?;

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;
    let settings = Settings::load().context("Failed to load settings")?;

    let allocator = ConfirmationAllocator::new(
        Arc::new(RandomConfirmationNumberGenerator::default()),
        settings.max_allocation_retries,
    );

    let session = if settings.use_in_memory_db {
        None
    } else {
        Some(Arc::new(
            StoreSession::connect(settings.store_config())
                .await
                .context("Failed to connect to store")?,
        ))
    };

    let repository: Arc<dyn ReservationsRepository> = match &session {
        None => Arc::new(InMemoryReservationsRepository::new(allocator)),
        Some(session) => Arc::new(
            CassandraReservationsRepository::init(
                session.clone(),
                allocator,
                settings.allocation_strategy,
            )
            .await
            .context("Failed to init reservations repository")?,
        ),
    };

    tracing::info!(
        "starting HTTP server at http://localhost:{}",
        settings.http_port
    );
    let server_repository = repository.clone();
    let server_result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_repository.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
    })
    .bind(("0.0.0.0", settings.http_port))
    .context("Failed to bind HTTP server")?
    .run()
    .await;

    // workers are gone once run() returns, the session is ours again
    drop(repository);
    if let Some(session) = session {
        match Arc::try_unwrap(session) {
            Ok(session) => session.close(),
            Err(_) => tracing::warn!("Store session still shared at shutdown, dropping it"),
        }
    }
    global::shutdown_tracer_provider();

    server_result.context("HTTP server failed")
}
