//! Toggle controller: the enabled/disabled state machine.
//!
//! The controller owns the toggle state, writes the style profile to the page,
//! renders the control and persists the flag per bookmark. The page is treated
//! as a mutable resource without transactions: every write checks the current
//! value first, so repeated or interleaved calls converge instead of compounding.

use std::cell::Cell;

use flashboard_domain::error::{DomUnreadyError, FlashboardError};
use flashboard_domain::identity::ViewIdentity;
use flashboard_domain::style::{self, StyleEdit, Variant};
use flashboard_domain::toggle::{ControlView, ToggleState};
use flashboard_domain::toggle_config::{self, ToggleConfig};

use crate::ports::{FieldStore, PageDom, Timer};
use crate::services::presence::PresenceDetector;
use crate::settings::Settings;

/// Region name reported when the control host is missing.
pub const CONTROL_HOST_REGION: &str = "control host";

/// Attribute holding a region's `style` text as it was before a substitution.
pub const SAVED_STYLE_ATTRIBUTE: &str = "data-flashboard-style";

/// Application service driving the compact layout toggle.
pub struct ToggleController<D, S, T> {
    dom: D,
    store: S,
    timer: T,
    settings: Settings,
    presence: PresenceDetector,
    state: Cell<ToggleState>,
    // Bumped on every state entry; pending style retries from an older epoch stop.
    epoch: Cell<u64>,
}

impl<D, S, T> ToggleController<D, S, T>
where
    D: PageDom,
    S: FieldStore,
    T: Timer,
{
    /// Create a controller in the [`ToggleState::Disabled`] state.
    pub fn new(dom: D, store: S, timer: T, settings: Settings) -> Self {
        let presence = PresenceDetector::new(settings.markers.clone());
        Self {
            dom,
            store,
            timer,
            settings,
            presence,
            state: Cell::new(ToggleState::Disabled),
            epoch: Cell::new(0),
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state.get()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Check the page and reconcile it with the persisted state.
    ///
    /// Off the dashboard view this performs no page write and no store call.
    /// Otherwise it reads the persisted flag, renders the control, and applies
    /// the compact layout when enabled (waiting for late regions) or restores
    /// the original layout when a previous check had applied it.
    ///
    /// A transition made while the flag is being read wins: the read result is
    /// dropped and the page is left as that transition set it.
    ///
    /// Returns the state entered, or `None` off the dashboard view.
    ///
    /// # Errors
    ///
    /// Returns [`FlashboardError::DomUnready`] when the control host is not
    /// rendered yet, or [`FlashboardError::Page`] when the control could not
    /// be mounted. The style is reconciled in both cases.
    pub async fn initialize(&self) -> Result<Option<ToggleState>, FlashboardError> {
        if !self.presence.is_dashboard_view(&self.dom) {
            tracing::debug!("not on the dashboard view, skipping initialization");
            return Ok(None);
        }

        let started = self.epoch.get();
        let state = ToggleState::from_enabled(self.load_state().await);
        if self.epoch.get() != started {
            tracing::debug!(loaded = %state, "state changed while loading, keeping it");
            return Ok(Some(self.state.get()));
        }
        let previous = self.state.get();
        let epoch = self.enter(state);
        let rendered = self.render(state);

        match state {
            ToggleState::Enabled => {
                self.apply_style_in(epoch).await;
            }
            ToggleState::Disabled if previous.is_enabled() => {
                self.revert_style();
            }
            ToggleState::Disabled => {}
        }

        rendered.map(|()| Some(state))
    }

    /// The persisted flag for the dashboard on screen.
    ///
    /// `false` when there is no identity, no record, a malformed record, or
    /// when the store read fails. Failures are logged, never returned.
    pub async fn load_state(&self) -> bool {
        let Some(identity) = self.presence.current_view_identity(&self.dom) else {
            return false;
        };
        match self.read_config(&identity).await {
            Ok(config) => toggle_config::is_enabled(config.as_ref()),
            Err(err) => {
                tracing::warn!(%identity, error = %err, "failed to read toggle config, assuming disabled");
                false
            }
        }
    }

    /// Switch the compact layout on or off for the dashboard on screen.
    ///
    /// The control is re-rendered first, then the page is updated, then the
    /// flag is persisted. A failed write does not roll the page back. When a
    /// region is not rendered yet the layout is applied once it appears,
    /// after the write.
    ///
    /// # Errors
    ///
    /// Returns [`FlashboardError::NotOnTargetView`] when no dashboard identity
    /// can be read from the page; nothing is written in that case.
    pub async fn set_enabled(&self, enabled: bool) -> Result<ToggleState, FlashboardError> {
        let identity = self
            .presence
            .current_view_identity(&self.dom)
            .ok_or(FlashboardError::NotOnTargetView)?;

        let state = ToggleState::from_enabled(enabled);
        let epoch = self.enter(state);
        tracing::info!(%identity, %state, "switching compact layout");

        if let Err(err) = self.render(state) {
            tracing::debug!(error = %err, "control not rendered");
        }

        let pending = match state {
            ToggleState::Enabled => match self.try_apply_style() {
                Ok(_) => false,
                Err(err) => {
                    tracing::debug!(region = %err.region, "compact layout deferred");
                    true
                }
            },
            ToggleState::Disabled => {
                self.revert_style();
                false
            }
        };

        self.persist(&identity, enabled).await;

        if pending {
            self.apply_style_in(epoch).await;
        }
        Ok(state)
    }

    /// Apply the compact layout, retrying after a fixed delay until every
    /// region is rendered.
    ///
    /// Returns `false` when the attempt was abandoned because a newer
    /// transition superseded it or the page left the dashboard view.
    pub async fn apply_style(&self) -> bool {
        self.apply_style_in(self.epoch.get()).await
    }

    /// A single all-or-nothing attempt at the compact layout.
    ///
    /// Every region is located before anything is written, so a missing
    /// region leaves the page untouched. Returns the number of writes made;
    /// zero when the layout was already applied.
    ///
    /// # Errors
    ///
    /// Returns the first region that is not rendered.
    pub fn try_apply_style(&self) -> Result<usize, DomUnreadyError> {
        let mut targets = Vec::with_capacity(self.settings.profile.regions.len());
        for region in &self.settings.profile.regions {
            let nodes = self.dom.locate(&region.locator);
            if nodes.is_empty() {
                return Err(DomUnreadyError {
                    region: region.name.clone(),
                });
            }
            targets.push((region, nodes));
        }

        let mut writes = 0;
        for (region, nodes) in &targets {
            writes += self.write_region(nodes, Variant::Updated, region.edits(Variant::Updated));
        }
        Ok(writes)
    }

    /// Restore the original layout on every region still in the page.
    ///
    /// Missing regions are skipped. Returns the number of writes made.
    pub fn revert_style(&self) -> usize {
        let mut writes = 0;
        for region in &self.settings.profile.regions {
            let nodes = self.dom.locate(&region.locator);
            if nodes.is_empty() {
                tracing::debug!(region = %region.name, "region gone, nothing to restore");
                continue;
            }
            writes += self.write_region(&nodes, Variant::Original, region.edits(Variant::Original));
        }
        writes
    }

    /// Replace any rendered control with exactly one reflecting `state`.
    ///
    /// # Errors
    ///
    /// Returns [`FlashboardError::DomUnready`] when the control host is not
    /// rendered, or the adapter's error when mounting fails.
    pub fn render(&self, state: ToggleState) -> Result<(), FlashboardError> {
        let control = &self.settings.control;
        let host = self
            .dom
            .locate(&control.host)
            .into_iter()
            .next()
            .ok_or_else(|| DomUnreadyError {
                region: CONTROL_HOST_REGION.to_string(),
            })?;

        for stale in self
            .dom
            .elements_with_class(Some(&host), &control.container_class)
        {
            self.dom.remove(&stale);
        }

        let view = ControlView::for_state(state, &control.container_class, &control.kind, &control.labels);
        self.dom.mount_control(&host, &view)?;
        Ok(())
    }

    fn enter(&self, state: ToggleState) -> u64 {
        self.state.set(state);
        let epoch = self.epoch.get().wrapping_add(1);
        self.epoch.set(epoch);
        epoch
    }

    async fn apply_style_in(&self, epoch: u64) -> bool {
        let delay = self.settings.timing.style_retry();
        let mut attempt: u32 = 0;
        loop {
            if self.epoch.get() != epoch {
                tracing::debug!(attempt, "compact layout superseded by a newer transition");
                return false;
            }
            if !self.presence.is_dashboard_view(&self.dom) {
                tracing::debug!(attempt, "left the dashboard view, abandoning compact layout");
                return false;
            }
            match self.try_apply_style() {
                Ok(writes) => {
                    tracing::debug!(attempt, writes, "compact layout applied");
                    return true;
                }
                Err(err) => {
                    attempt = attempt.saturating_add(1);
                    tracing::debug!(region = %err.region, attempt, "region not rendered yet, retrying");
                    self.timer.sleep(delay).await;
                }
            }
        }
    }

    fn write_region<'a>(
        &self,
        nodes: &[D::Node],
        variant: Variant,
        edits: impl Iterator<Item = StyleEdit<'a>> + Clone,
    ) -> usize {
        let substitutes = edits.clone().any(|edit| matches!(edit, StyleEdit::Replace { .. }));
        let mut writes = 0;
        for node in nodes {
            // Restoring the saved text undoes every substitution on the node at once.
            let restored = variant == Variant::Original && substitutes && self.restore_saved_style(node);
            if restored {
                writes += 1;
            }
            for edit in edits.clone() {
                let written = match edit {
                    StyleEdit::Replace { .. } if restored => false,
                    edit => self.write_edit(node, edit),
                };
                if written {
                    writes += 1;
                }
            }
        }
        writes
    }

    fn write_edit(&self, node: &D::Node, edit: StyleEdit<'_>) -> bool {
        match edit {
            StyleEdit::SetProperty { name, value } => {
                if self.dom.style_property(node, name).as_deref() == value {
                    return false;
                }
                self.dom.set_style_property(node, name, value);
                true
            }
            StyleEdit::Replace { from, to } => {
                let Some(current) = self.dom.attribute(node, "style") else {
                    return false;
                };
                let Some(updated) = style::substitute_tokens(&current, from, to) else {
                    return false;
                };
                // Keep the text from before the first substitution so that
                // restoring it leaves tokens the host wrote as `to` alone.
                if self.dom.attribute(node, SAVED_STYLE_ATTRIBUTE).is_none() {
                    self.dom.set_attribute(node, SAVED_STYLE_ATTRIBUTE, &current);
                }
                self.dom.set_attribute(node, "style", &updated);
                true
            }
        }
    }

    fn restore_saved_style(&self, node: &D::Node) -> bool {
        let Some(saved) = self.dom.attribute(node, SAVED_STYLE_ATTRIBUTE) else {
            return false;
        };
        self.dom.remove_attribute(node, SAVED_STYLE_ATTRIBUTE);
        if self.dom.attribute(node, "style").as_deref() != Some(saved.as_str()) {
            self.dom.set_attribute(node, "style", &saved);
        }
        true
    }

    async fn read_config(
        &self,
        identity: &ViewIdentity,
    ) -> Result<Option<ToggleConfig>, FlashboardError> {
        let record = self
            .store
            .get(&self.settings.extension_id, identity.as_str())
            .await?;
        Ok(ToggleConfig::from_record(record)?)
    }

    async fn persist(&self, identity: &ViewIdentity, enabled: bool) -> bool {
        let attempts = self.settings.timing.persist_attempts.max(1);
        for attempt in 1..=attempts {
            match self.write_config(identity, enabled).await {
                Ok(()) => {
                    tracing::debug!(%identity, enabled, attempt, "toggle config persisted");
                    return true;
                }
                Err(err) => {
                    tracing::warn!(%identity, attempt, attempts, error = %err, "failed to persist toggle config");
                    if attempt < attempts {
                        self.timer.sleep(self.settings.timing.persist_retry()).await;
                    }
                }
            }
        }
        tracing::warn!(%identity, enabled, "giving up on persisting toggle config");
        false
    }

    async fn write_config(
        &self,
        identity: &ViewIdentity,
        enabled: bool,
    ) -> Result<(), FlashboardError> {
        // Read-modify-write keeps fields this version does not know about.
        let current = match self.read_config(identity).await {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                tracing::debug!(%identity, error = %err, "writing a fresh toggle config");
                ToggleConfig::default()
            }
        };
        let record = current.with_enabled(enabled).to_record();
        self.store
            .set(&self.settings.extension_id, identity.as_str(), record)
            .await
    }
}
