use crate::components::extraction::Extractor;
use crate::components::mail::{HttpRelayTransport, LogTransport, Transport};
use crate::components::Pipeline;
use crate::config::Config;
use crate::error::{Error, MailcalResult};
use crate::server::{self, AppState};
use crate::shutdown;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

#[cfg(feature = "gemini")]
fn build_extractor(config: &Config) -> MailcalResult<Arc<dyn Extractor>> {
    use crate::components::calendar::timezone::SYDNEY;
    use crate::components::extraction::GeminiExtractor;
    use crate::error::env_error;

    let api_key = config
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| env_error("GEMINI_API_KEY"))?;
    Ok(Arc::new(GeminiExtractor::new(
        api_key,
        &config.gemini_model,
        SYDNEY.tz,
    )))
}

#[cfg(not(feature = "gemini"))]
fn build_extractor(_config: &Config) -> MailcalResult<Arc<dyn Extractor>> {
    Err(crate::error::config_error(
        "no extraction backend, rebuild with the `gemini` feature",
    ))
}

fn build_transport(config: &Config) -> MailcalResult<Arc<dyn Transport>> {
    match &config.relay_url {
        Some(url) => {
            info!("Delivering mail through relay {}", url);
            Ok(Arc::new(HttpRelayTransport::new(
                url,
                config.relay_token.clone(),
            )?))
        }
        None => {
            warn!("MAIL_RELAY_URL not set, calendar mail will only be logged");
            Ok(Arc::new(LogTransport))
        }
    }
}

/// Wire the configured collaborators into a pipeline
pub fn build_pipeline(config: &Config) -> MailcalResult<Pipeline> {
    Ok(Pipeline::new(
        config.calendar_settings(),
        config.mail_settings(),
        build_extractor(config)?,
        build_transport(config)?,
    ))
}

/// Start the inbound webhook and serve until a shutdown signal
pub async fn start_server(config: Config) -> miette::Result<()> {
    let pipeline = build_pipeline(&config)?;
    let app = server::router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(Error::from)?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    info!("Server shut down");
    Ok(())
}
