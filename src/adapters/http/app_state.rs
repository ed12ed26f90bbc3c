use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{access_registry::AccessRegistry, identity_link::IdentityLinkUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub access_registry: Arc<AccessRegistry>,
    pub identity_link: Arc<IdentityLinkUseCases>,
}
