//! crewdeck Ops API
//!
//! Employee lifecycle orchestration across the managed platforms, plus
//! link reconciliation and analytics reads, served over Axum.

mod config;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use config::Config;
use crewdeck_api::{api_router, AppState};
use crewdeck_links::{LinkService, LinkServiceConfig, PriorityProduct};
use crewdeck_platforms::{
    CrmConfig, CrmConnector, DirectoryConfig, DirectoryConnector, PaymentsConfig,
    PaymentsConnector, SchedulingConfig, SchedulingConnector, TelephonyConfig,
    TelephonyConnector, VideoConfig, VideoConnector,
};
use crewdeck_provisioning::{NumberCache, OffboardingEngine, OnboardingEngine};

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        employee_domain = %config.employee_domain,
        "Starting ops API"
    );

    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to construct platform adapters: {e}");
            std::process::exit(1);
        }
    };

    let cors = build_cors_layer(&config.cors_origins);
    let app = api_router(state).layer(cors);

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Construct every adapter and the engines from the configuration.
///
/// Adapter constructors validate their credentials, so a bad config
/// stops startup here rather than failing on the first request.
fn build_state(config: &Config) -> Result<AppState, crewdeck_connector::ConnectorError> {
    let directory = Arc::new(DirectoryConnector::new(DirectoryConfig {
        base_url: config.directory_base_url.clone(),
        token_url: config.directory_token_url.clone(),
        service_account_email: config.directory_service_account_email.clone(),
        private_key_pem: config.directory_private_key.clone(),
        admin_email: config.directory_admin_email.clone(),
        customer_id: config.directory_customer_id.clone(),
        domain: config.employee_domain.clone(),
    })?);

    let scheduling = Arc::new(SchedulingConnector::new(SchedulingConfig {
        base_url: config.scheduling_base_url.clone(),
        api_key: config.scheduling_api_key.clone(),
        seat_limit: config.scheduling_seat_limit,
    })?);

    let video = Arc::new(VideoConnector::new(VideoConfig {
        base_url: config.video_base_url.clone(),
        token_url: config.video_token_url.clone(),
        account_id: config.video_account_id.clone(),
        client_id: config.video_client_id.clone(),
        client_secret: config.video_client_secret.clone(),
    })?);

    let telephony = Arc::new(TelephonyConnector::new(TelephonyConfig {
        base_url: config.telephony_base_url.clone(),
        account_sid: config.telephony_account_sid.clone(),
        auth_token: config.telephony_auth_token.clone(),
        messaging_service_sid: config.telephony_messaging_service_sid.clone(),
        campaign_sid: config.telephony_campaign_sid.clone(),
    })?);

    let crm = Arc::new(CrmConnector::new(CrmConfig {
        base_url: config.crm_base_url.clone(),
        api_key: config.crm_api_key.clone(),
    })?);

    let payments = Arc::new(PaymentsConnector::new(PaymentsConfig {
        base_url: config.payments_base_url.clone(),
        api_key: config.payments_api_key.clone(),
        company_id: config.payments_company_id.clone(),
    })?);

    let numbers = Arc::new(NumberCache::new(config.number_cache_ttl));

    let onboarding = Arc::new(OnboardingEngine::new(
        directory.clone(),
        scheduling.clone(),
        video.clone(),
        telephony.clone(),
        crm.clone(),
        numbers.clone(),
        config.area_code.clone(),
    ));

    let offboarding = Arc::new(OffboardingEngine::new(
        directory.clone(),
        scheduling.clone(),
        video.clone(),
        telephony.clone(),
        crm.clone(),
        numbers.clone(),
        config.employee_domain.clone(),
        config.area_code.clone(),
    ));

    let mut link_config = LinkServiceConfig::new(
        config.employee_domain.clone(),
        config
            .payments_priority_products
            .iter()
            .map(|p| PriorityProduct {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect(),
    );
    link_config.cache_ttl = config.link_cache_ttl;
    let links = Arc::new(LinkService::new(payments, link_config));

    Ok(AppState {
        onboarding,
        offboarding,
        links,
        directory: directory.clone(),
        scheduling: scheduling.clone(),
        video: video.clone(),
        telephony,
        crm,
        video_licenses: video,
        scheduling_licenses: scheduling,
        numbers,
        employee_domain: config.employee_domain.clone(),
        area_code: config.area_code.clone(),
        closer_links_timeout: config.closer_links_timeout,
    })
}

/// Build CORS layer from configured origins. Explicit origins enable
/// credentials; the wildcard stays wide open for development.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let is_wildcard = origins.len() == 1 && origins[0] == "*";

    if is_wildcard {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600))
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    }
}

/// Graceful shutdown on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
