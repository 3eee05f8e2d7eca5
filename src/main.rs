use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use snifflocal::config::{LoggingSettings, Settings};
use snifflocal::routes::{self, error as api_error, AppState};
use snifflocal::services::{FeedService, SessionVerifier, SupabaseClient};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&settings.logging);
    info!("Starting SniffLocal service...");

    let timeout = Duration::from_secs(settings.supabase.timeout_secs.unwrap_or(30));
    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.anon_key.clone(),
        settings.supabase.photo_bucket.clone(),
        timeout,
    )
    .map_err(|e| {
        error!("Failed to create Supabase client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    let supabase = Arc::new(supabase);

    info!(
        "Supabase client initialized ({}, bucket: {})",
        settings.supabase.url, settings.supabase.photo_bucket
    );

    let sessions = web::Data::new(SessionVerifier::new(&settings.supabase.jwt_secret));
    let feed = FeedService::new(supabase.clone(), settings.feed.per_source_limit);

    info!("Feed service initialized ({} items per source)", feed.per_source_limit());

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, cancelling in-flight fetches");
                shutdown.cancel();
            }
        });
    }

    let app_state = AppState {
        supabase,
        feed,
        shutdown: shutdown.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let max_upload_bytes = settings.server.max_upload_bytes;

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(sessions.clone())
            .app_data(web::JsonConfig::default().error_handler(api_error::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(api_error::handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(api_error::handle_path_error))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    shutdown.cancel();
    info!("SniffLocal service stopped");
    result
}
