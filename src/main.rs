use gemini_relay::config::Config;
use gemini_relay::credentials::{CredentialResolver, CredentialSource, stage_service_account};
use gemini_relay::error::ConfigError;
use gemini_relay::server::{RelayState, relay_router};
use gemini_relay::upstream::{Dispatcher, build_http_client};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let upstream = cfg.upstream();
    let mut source = cfg.credential_source();

    let redact = |set: bool| if set { "<set>" } else { "<none>" };
    info!(
        listen_addr = %cfg.listen_addr,
        port = cfg.port,
        loglevel = %cfg.loglevel,
        api_base = %upstream.api_base,
        models = ?cfg.models,
        retry_max_attempts = upstream.retry.max_attempts(),
        retry_initial_delay = ?upstream.retry.initial_delay(),
        retry_backoff_factor = upstream.retry.factor(),
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        api_key = redact(source.api_key.is_some()),
        service_account_json = redact(cfg.google_service_account_json.is_some()),
        service_account_path = ?source.service_account_path
    );

    if let Some(raw) = cfg.google_service_account_json.as_deref() {
        stage_service_account(&mut source, raw, &CredentialSource::default_staging_path()).await?;
    }

    if source.api_key.is_none() && source.service_account_path.is_none() {
        warn!("No API key or service account configured; generate requests will fail.");
    }

    let client = build_http_client(&upstream).map_err(ConfigError::from)?;
    let resolver = CredentialResolver::new(source, client.clone());
    let dispatcher = Dispatcher::from_config(&upstream, client, resolver);

    let state = RelayState::new(dispatcher);
    let app = relay_router(state);

    let addr = SocketAddr::from((cfg.listen_addr, cfg.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
