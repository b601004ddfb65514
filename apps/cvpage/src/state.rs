use std::sync::Arc;

use crate::config::Config;
use crate::editing::controller::SharedController;
use crate::export::assets::AssetSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The single controller owning mode, label and the live profile.
    pub controller: SharedController,
    /// Page-relative assets: directory on disk or an HTTP base URL, chosen at startup.
    pub assets: Arc<dyn AssetSource>,
}
