// src/infrastructure/di.rs
use crate::application::engine::{ImportConfig, ImportEngine};
use crate::application::error::ApplicationResult;
use crate::application::import_service::ImportService;
use crate::config::Settings;
use crate::domain::services::bookmark_api::BookmarkApi;
use crate::infrastructure::proxy::ProxyClient;
use std::sync::Arc;
use tracing::debug;

/// Production service container - single source of truth for service creation
pub struct ServiceContainer {
    pub import_service: ImportService,
}

impl ServiceContainer {
    pub fn new(settings: &Settings) -> ApplicationResult<Self> {
        let bookmark_api = Self::create_bookmark_api(&settings.proxy_url)?;
        let config = ImportConfig::from(&settings.import);
        config.validate()?;

        let import_service = ImportService::new(ImportEngine::new(bookmark_api, config));

        Ok(Self { import_service })
    }

    fn create_bookmark_api(proxy_url: &str) -> ApplicationResult<Arc<dyn BookmarkApi>> {
        debug!("Using proxy at {}", proxy_url);
        Ok(Arc::new(ProxyClient::new(proxy_url)?))
    }
}
