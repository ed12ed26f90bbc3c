use crate::{
    adapters::{http::app_state::AppState, identity::twitter::TwitterClient},
    application::ports::identity_provider::IdentityProviderClient,
    infra::{
        InfraError,
        config::{AppConfig, TwitterConfig},
        http_client::try_build_client,
        oauth_state::OAuthStateStore,
        postgres_persistence,
    },
    use_cases::{
        access_registry::{AccessRegistry, UserRepo},
        identity_link::IdentityLinkUseCases,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;
    let twitter_config = TwitterConfig::from_env();

    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.database_max_connections).await?);
    let user_repo_arc = postgres_arc.clone() as Arc<dyn UserRepo>;

    let oauth_states = Arc::new(OAuthStateStore::new(&config.redis_url).await?);

    let http = try_build_client().map_err(InfraError::HttpClient)?;
    let twitter = TwitterClient::new(
        http,
        twitter_config.client_id,
        twitter_config.client_secret,
        twitter_config.callback_url,
        twitter_config.bearer_token,
    )
    .map_err(InfraError::IdentityProvider)?;
    let identity_arc = Arc::new(twitter) as Arc<dyn IdentityProviderClient>;

    let access_registry = AccessRegistry::new(user_repo_arc.clone(), identity_arc.clone());
    let identity_link = IdentityLinkUseCases::new(
        user_repo_arc,
        oauth_states,
        identity_arc,
        config.app_redirect_url.clone(),
        config.oauth_state_ttl.whole_minutes(),
    );

    Ok(AppState {
        config: Arc::new(config),
        access_registry: Arc::new(access_registry),
        identity_link: Arc::new(identity_link),
    })
}

/// Console logs always; JSON lines to `LOG_FILE` (default `app.log`) when it can be opened.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ribh_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let log_path = std::env::var("LOG_FILE").unwrap_or_else(|_| "app.log".to_string());
    let json_layer = match File::create(&log_path) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create log file {log_path}: {err}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
