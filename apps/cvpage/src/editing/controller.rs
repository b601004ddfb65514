//! Edit-mode controller. Owns the page state and drives Viewing ⇄ Editing.
//!
//! Rendering and extraction stay pure functions in `crate::page`; this type
//! only holds the state they run over and decides when storage is written.
//! `AppState` carries it as a `SharedController` behind a tokio mutex.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::editing::validation::{check_field, ValidatedField};
use crate::export::assets::AssetSource;
use crate::models::profile::Profile;
use crate::page::{render_page, render_regions, ControlLabel, EditMode, ExtractError, PageSnapshot, PageView};
use crate::storage::loader::{load_fallback, load_profile, FallbackSource};
use crate::storage::{ProfileStore, StoreError};

/// How long the "Saved" confirmation stays on the toggle.
pub const CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

pub type SharedController = Arc<Mutex<CvController>>;

/// Load, fallback and reset behaviour of a page deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    pub fallback: FallbackSource,
    pub reset_enabled: bool,
}

/// A phone or email input whose non-empty value failed its check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FlaggedField {
    pub field: ValidatedField,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Form validation failed. Fix the fields marked in red.")]
    Rejected { flagged: Vec<FlaggedField> },

    #[error("The page is not in edit mode")]
    NotEditing,

    #[error("Malformed page snapshot: {0}")]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Reset is disabled for this page")]
    Disabled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Re-rendered regions plus the state the client applies them under.
#[derive(Debug, Clone, Serialize)]
pub struct PageUpdate {
    pub mode: EditMode,
    pub label: String,
    pub expanded: bool,
    /// Inner markup keyed by region DOM id.
    pub regions: BTreeMap<&'static str, String>,
}

/// Snapshot of the controller's UI state.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerState {
    pub mode: EditMode,
    pub label: String,
    pub expanded: bool,
    pub reset_enabled: bool,
}

pub struct CvController {
    settings: PageSettings,
    mode: EditMode,
    expanded: bool,
    label: ControlLabel,
    profile: Profile,
    store: Arc<dyn ProfileStore>,
    assets: Arc<dyn AssetSource>,
}

impl CvController {
    /// Loads the profile (storage first, then fallback) and starts in Viewing.
    pub async fn bootstrap(
        settings: PageSettings,
        store: Arc<dyn ProfileStore>,
        assets: Arc<dyn AssetSource>,
    ) -> Self {
        let profile = load_profile(store.as_ref(), &settings.fallback, assets.as_ref()).await;
        Self {
            settings,
            mode: EditMode::Viewing,
            expanded: false,
            label: ControlLabel::Edit,
            profile,
            store,
            assets,
        }
    }

    pub fn into_shared(self) -> SharedController {
        Arc::new(Mutex::new(self))
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn label(&self) -> ControlLabel {
        self.label
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn view(&self) -> PageView {
        PageView {
            mode: self.mode,
            expanded: self.expanded,
            label: self.label,
            reset_enabled: self.settings.reset_enabled,
        }
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            mode: self.mode,
            label: self.label.to_string(),
            expanded: self.expanded,
            reset_enabled: self.settings.reset_enabled,
        }
    }

    pub fn render_page(&self) -> String {
        render_page(&self.profile, &self.view())
    }

    fn update(&self) -> PageUpdate {
        PageUpdate {
            mode: self.mode,
            label: self.label.to_string(),
            expanded: self.expanded,
            regions: render_regions(&self.profile, &self.view())
                .into_iter()
                .collect(),
        }
    }

    /// Viewing → Editing: expand every section, enable inputs and mark text
    /// modifiable. Pre-filled phone/email values are re-checked by the render.
    pub fn enter_edit(&mut self) -> PageUpdate {
        if !self.mode.is_editing() {
            info!("Entering edit mode");
        }
        self.mode = EditMode::Editing;
        self.expanded = true;
        self.label = ControlLabel::Save;
        self.update()
    }

    /// Editing → Viewing. A non-empty phone or email that fails its check
    /// refuses the transition and leaves storage untouched; otherwise the
    /// snapshot replaces the profile and is persisted.
    pub async fn save(&mut self, snapshot: &str) -> Result<PageUpdate, SaveError> {
        if !self.mode.is_editing() {
            return Err(SaveError::NotEditing);
        }

        let (flagged, profile) = read_snapshot(snapshot)?;
        if !flagged.is_empty() {
            for f in &flagged {
                warn!("Save blocked: invalid {} {:?}", f.field.as_str(), f.value);
            }
            return Err(SaveError::Rejected { flagged });
        }

        self.store.save(&profile).await?;
        self.profile = profile;
        self.mode = EditMode::Viewing;
        self.label = ControlLabel::Saved;
        info!("Saved edited profile");
        Ok(self.update())
    }

    /// Drops the transient "Saved" label. Returns whether anything changed.
    pub fn clear_confirmation(&mut self) -> bool {
        if self.label == ControlLabel::Saved {
            self.label = ControlLabel::Edit;
            true
        } else {
            false
        }
    }

    /// Clears storage and reloads the fallback profile.
    pub async fn reset(&mut self) -> Result<PageUpdate, ResetError> {
        if !self.settings.reset_enabled {
            return Err(ResetError::Disabled);
        }
        self.store.clear().await?;
        self.profile = load_fallback(&self.settings.fallback, self.assets.as_ref()).await;
        self.mode = EditMode::Viewing;
        self.label = ControlLabel::Edit;
        info!("Profile reset to fallback");
        Ok(self.update())
    }
}

/// Validation verdicts and the extracted profile. Kept synchronous: the parsed
/// document must not live across an await.
fn read_snapshot(snapshot: &str) -> Result<(Vec<FlaggedField>, Profile), ExtractError> {
    let page = PageSnapshot::parse(snapshot);
    let flagged = page
        .validated_inputs()?
        .into_iter()
        .filter(|(field, value)| check_field(*field, value).blocks_save())
        .map(|(field, value)| FlaggedField { field, value })
        .collect();
    Ok((flagged, page.extract_profile()?))
}

/// Reverts the "Saved" label after `delay`. Fire-and-forget; touches no data.
pub fn schedule_label_reset(controller: SharedController, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if controller.lock().await.clear_confirmation() {
            debug!("Save confirmation cleared");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::assets::DirAssetSource;
    use crate::models::profile::IconKind;
    use crate::storage::loader::embedded_profile;
    use crate::storage::MemoryStore;

    struct Harness {
        controller: CvController,
        store: Arc<MemoryStore>,
        _dir: tempfile::TempDir,
    }

    async fn harness(reset_enabled: bool, stored: Option<&Profile>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(match stored {
            Some(p) => MemoryStore::with_profile(p).unwrap(),
            None => MemoryStore::new(),
        });
        let settings = PageSettings {
            fallback: FallbackSource::Embedded,
            reset_enabled,
        };
        let controller = CvController::bootstrap(
            settings,
            store.clone(),
            Arc::new(DirAssetSource::new(dir.path())),
        )
        .await;
        Harness {
            controller,
            store,
            _dir: dir,
        }
    }

    fn phone_value(profile: &Profile) -> String {
        profile.contact_of(IconKind::Phone).unwrap().text.clone()
    }

    fn email_value(profile: &Profile) -> String {
        profile.contact_of(IconKind::Email).unwrap().text.clone()
    }

    #[tokio::test]
    async fn test_bootstrap_starts_viewing_with_fallback() {
        let h = harness(false, None).await;
        assert_eq!(h.controller.mode(), EditMode::Viewing);
        assert_eq!(h.controller.label(), ControlLabel::Edit);
        assert_eq!(h.controller.profile(), &embedded_profile());
    }

    #[tokio::test]
    async fn test_enter_edit_expands_and_enables() {
        let mut h = harness(false, None).await;
        let update = h.controller.enter_edit();
        assert_eq!(update.mode, EditMode::Editing);
        assert_eq!(update.label, "Save");
        assert!(update.expanded);
        assert!(update.regions["contactInfo"].contains(r#"data-enter="suppress""#));
        assert!(h.controller.render_page().contains("accordion-panel active"));
    }

    #[tokio::test]
    async fn test_toggle_without_changes_is_idempotent() {
        let mut h = harness(false, None).await;
        let original = h.controller.profile().clone();
        h.controller.enter_edit();
        let page = h.controller.render_page();

        let update = h.controller.save(&page).await.unwrap();
        assert_eq!(update.mode, EditMode::Viewing);
        assert_eq!(update.label, "Saved");
        let stored = h.store.load().await.unwrap().unwrap();
        assert_eq!(stored, original.trimmed());
        assert_eq!(h.controller.profile(), &stored);
    }

    #[tokio::test]
    async fn test_invalid_phone_blocks_save() {
        let mut h = harness(false, None).await;
        let original_phone = phone_value(h.controller.profile());
        h.controller.enter_edit();
        let page = h.controller.render_page().replace(
            &format!(r#"value="{original_phone}""#),
            r#"value="abc""#,
        );

        let err = h.controller.save(&page).await.unwrap_err();
        match err {
            SaveError::Rejected { flagged } => assert_eq!(
                flagged,
                vec![FlaggedField {
                    field: ValidatedField::Phone,
                    value: "abc".into()
                }]
            ),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(h.controller.mode(), EditMode::Editing);
        assert_eq!(h.controller.label(), ControlLabel::Save);
        assert!(h.store.raw().await.is_none());
        assert_eq!(phone_value(h.controller.profile()), original_phone);
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_prior_stored_state() {
        let stored = embedded_profile();
        let mut h = harness(false, Some(&stored)).await;
        let before = h.store.raw().await;
        h.controller.enter_edit();
        let email = email_value(&stored);
        let page = h
            .controller
            .render_page()
            .replace(&format!(r#"value="{email}""#), r#"value="user@example""#);

        assert!(matches!(
            h.controller.save(&page).await,
            Err(SaveError::Rejected { .. })
        ));
        assert_eq!(h.store.raw().await, before);
    }

    #[tokio::test]
    async fn test_blank_email_saves_as_empty_string() {
        let mut h = harness(false, None).await;
        let email = email_value(h.controller.profile());
        h.controller.enter_edit();
        let page = h
            .controller
            .render_page()
            .replace(&format!(r#"value="{email}""#), r#"value="""#);

        h.controller.save(&page).await.unwrap();
        let stored = h.store.load().await.unwrap().unwrap();
        assert_eq!(email_value(&stored), "");
        assert_eq!(h.controller.mode(), EditMode::Viewing);
    }

    #[tokio::test]
    async fn test_edited_text_is_persisted() {
        let mut h = harness(false, None).await;
        h.controller.enter_edit();
        let page = h
            .controller
            .render_page()
            .replace(">Adaptability<", ">Ownership<");

        h.controller.save(&page).await.unwrap();
        let stored = h.store.load().await.unwrap().unwrap();
        assert_eq!(stored.skills.last().unwrap(), "Ownership");
    }

    #[tokio::test]
    async fn test_save_while_viewing_is_refused() {
        let mut h = harness(false, None).await;
        let page = h.controller.render_page();
        assert!(matches!(
            h.controller.save(&page).await,
            Err(SaveError::NotEditing)
        ));
    }

    #[tokio::test]
    async fn test_malformed_snapshot_keeps_editing() {
        let mut h = harness(false, None).await;
        h.controller.enter_edit();
        let err = h.controller.save("<html></html>").await.unwrap_err();
        assert!(matches!(err, SaveError::Extract(_)));
        assert_eq!(h.controller.mode(), EditMode::Editing);
    }

    #[tokio::test]
    async fn test_reset_disabled() {
        let mut h = harness(false, None).await;
        assert!(matches!(h.controller.reset().await, Err(ResetError::Disabled)));
    }

    #[tokio::test]
    async fn test_reset_clears_storage_and_reloads_fallback() {
        let stored = Profile {
            title: "Edited".into(),
            ..Default::default()
        };
        let mut h = harness(true, Some(&stored)).await;
        assert_eq!(h.controller.profile().title, "Edited");
        h.controller.enter_edit();

        let update = h.controller.reset().await.unwrap();
        assert_eq!(update.mode, EditMode::Viewing);
        assert!(h.store.raw().await.is_none());
        assert_eq!(h.controller.profile(), &embedded_profile());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_reverts_after_delay() {
        let mut h = harness(false, None).await;
        h.controller.enter_edit();
        let page = h.controller.render_page();
        h.controller.save(&page).await.unwrap();

        let shared = h.controller.into_shared();
        let handle = schedule_label_reset(shared.clone(), CONFIRMATION_DELAY);
        assert_eq!(shared.lock().await.label(), ControlLabel::Saved);
        handle.await.unwrap();
        assert_eq!(shared.lock().await.label(), ControlLabel::Edit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_does_not_touch_label_after_reentering_edit() {
        let mut h = harness(false, None).await;
        h.controller.enter_edit();
        let page = h.controller.render_page();
        h.controller.save(&page).await.unwrap();

        let shared = h.controller.into_shared();
        let handle = schedule_label_reset(shared.clone(), CONFIRMATION_DELAY);
        shared.lock().await.enter_edit();
        handle.await.unwrap();
        assert_eq!(shared.lock().await.label(), ControlLabel::Save);
    }
}
