//! Data loader: stored entry first, then the configured fallback, then an
//! empty profile. Never fails; degraded loads are only logged.

use tracing::{error, info, warn};

use crate::export::assets::AssetSource;
use crate::models::profile::Profile;
use crate::storage::ProfileStore;

const DEFAULT_PROFILE_JSON: &str = include_str!("../../assets/default_profile.json");

/// Where the profile comes from when nothing has been saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackSource {
    /// Profile compiled into the binary.
    Embedded,
    /// JSON document fetched from a page-relative path such as `data.json`.
    Document(String),
}

impl FallbackSource {
    /// `embedded` (or blank) selects the built-in profile; anything else is a document path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "embedded" => FallbackSource::Embedded,
            path => FallbackSource::Document(path.to_string()),
        }
    }
}

/// The built-in default profile.
pub fn embedded_profile() -> Profile {
    serde_json::from_str(DEFAULT_PROFILE_JSON).unwrap_or_else(|e| {
        error!("Embedded default profile is malformed: {e}");
        Profile::default()
    })
}

/// Loads the fallback profile. Fetch or parse failures yield an empty profile.
pub async fn load_fallback(source: &FallbackSource, assets: &dyn AssetSource) -> Profile {
    match source {
        FallbackSource::Embedded => {
            info!("Using embedded default profile");
            embedded_profile()
        }
        FallbackSource::Document(path) => {
            let bytes = match assets.fetch(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Error loading user data from {path}: {e}");
                    return Profile::default();
                }
            };
            match serde_json::from_slice(&bytes) {
                Ok(profile) => {
                    info!("Loaded fallback profile from {path}");
                    profile
                }
                Err(e) => {
                    error!("Error parsing user data from {path}: {e}");
                    Profile::default()
                }
            }
        }
    }
}

/// A stored profile always wins over the fallback.
pub async fn load_profile(
    store: &dyn ProfileStore,
    fallback: &FallbackSource,
    assets: &dyn AssetSource,
) -> Profile {
    match store.load().await {
        Ok(Some(profile)) => {
            info!("Loaded profile from storage");
            return profile;
        }
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable stored profile: {e}"),
    }
    load_fallback(fallback, assets).await
}
