//! Profile and edit session management.
//!
//! An [`EditSession`] holds the profiles of one (objective, camera) scope in
//! two forms: the canonical set last read from the [`ProfileStore`] and the
//! local set the user sees. Drawing, editing and deleting shapes mutate the
//! local set immediately and append to an ordered pending-change log; the
//! canonical set only changes when the log is saved or discarded.
//!
//! Profile creation and deletion bypass the log and go straight to the store.
//! Visibility is purely local: it never enters the log and is carried across
//! reloads by profile id.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use roikit_core::{
    PersistenceError, ProfileError, ProfileId, ProfileScope, Result, RoiColor, ShapeError, ShapeId,
};
use roikit_settings::ProfileSettings;

use crate::model::{Profile, RoiShape, Shape, ShapeDraft, ShapePatch};
use crate::store::{NewProfile, ProfileStore};

/// One entry of the pending-change log.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    /// A drawn shape. `provisional_id` is the id the shape carries locally
    /// until the store assigns its own.
    Add {
        profile_id: ProfileId,
        provisional_id: ShapeId,
        draft: ShapeDraft,
    },
    Update {
        profile_id: ProfileId,
        shape_id: ShapeId,
        patch: ShapePatch,
    },
    Delete {
        profile_id: ProfileId,
        shape_id: ShapeId,
    },
}

impl PendingChange {
    pub fn profile_id(&self) -> ProfileId {
        match self {
            PendingChange::Add { profile_id, .. }
            | PendingChange::Update { profile_id, .. }
            | PendingChange::Delete { profile_id, .. } => *profile_id,
        }
    }

    /// The shape the change addresses; the provisional id for adds.
    pub fn shape_id(&self) -> ShapeId {
        match self {
            PendingChange::Add { provisional_id, .. } => *provisional_id,
            PendingChange::Update { shape_id, .. } | PendingChange::Delete { shape_id, .. } => {
                *shape_id
            }
        }
    }

    pub fn is_add_of(&self, shape_id: ShapeId) -> bool {
        matches!(self, PendingChange::Add { provisional_id, .. } if *provisional_id == shape_id)
    }
}

pub struct EditSession {
    store: Arc<dyn ProfileStore>,
    policy: ProfileSettings,
    scope: ProfileScope,
    profiles: Vec<Profile>,
    canonical: Vec<Profile>,
    pending: Vec<PendingChange>,
    hidden: HashSet<ProfileId>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("scope", &self.scope)
            .field("profiles", &self.profiles.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl EditSession {
    /// Loads the profiles of `scope` from the store.
    pub async fn open(
        store: Arc<dyn ProfileStore>,
        scope: ProfileScope,
        policy: ProfileSettings,
    ) -> Result<Self> {
        let canonical = store.list_profiles(&scope).await?;
        tracing::info!("Opened scope {} with {} profiles", scope, canonical.len());
        let mut session = Self {
            store,
            policy,
            scope,
            hidden: hidden_in(&canonical),
            profiles: canonical.clone(),
            canonical,
            pending: Vec::new(),
        };
        session.apply_visibility();
        Ok(session)
    }

    pub fn scope(&self) -> &ProfileScope {
        &self.scope
    }

    /// Local profile state, including unsaved edits.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Looks a shape up across all profiles.
    pub fn find_shape(&self, shape_id: ShapeId) -> Option<(&Profile, &Shape)> {
        self.profiles
            .iter()
            .find_map(|p| p.shape(shape_id).map(|s| (p, s)))
    }

    pub fn pending_changes(&self) -> &[PendingChange] {
        &self.pending
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn profile_mut(&mut self, id: ProfileId) -> std::result::Result<&mut Profile, ProfileError> {
        self.profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ProfileError::NotFound { id })
    }

    fn apply_visibility(&mut self) {
        for profile in &mut self.profiles {
            profile.visible = !self.hidden.contains(&profile.id);
        }
    }

    fn check_new_name(&self, name: &str) -> std::result::Result<String, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let limit = self.policy.max_per_scope;
        let check_limit = || {
            if self.profiles.len() >= limit {
                Err(ProfileError::ProfileLimitExceeded { limit })
            } else {
                Ok(())
            }
        };
        let check_duplicate = || {
            if self.profiles.iter().any(|p| p.has_name(name)) {
                Err(ProfileError::DuplicateName {
                    name: name.to_string(),
                })
            } else {
                Ok(())
            }
        };

        if self.policy.limit_check_first {
            check_limit()?;
            check_duplicate()?;
        } else {
            check_duplicate()?;
            check_limit()?;
        }
        Ok(name.to_string())
    }

    /// Creates a profile in the session scope and persists it immediately.
    ///
    /// The profile gets the first palette color no sibling uses.
    pub async fn create_profile(&mut self, name: &str) -> Result<&Profile> {
        let name = self.check_new_name(name)?;
        let color = RoiColor::assign(self.profiles.iter().map(|p| p.color));

        let created = self
            .store
            .create_profile(NewProfile {
                scope: self.scope.clone(),
                name,
                color,
            })
            .await
            .inspect_err(|e| tracing::warn!("Failed to create profile: {}", e))?;

        tracing::info!(
            "Created profile '{}' ({}) in {}",
            created.name,
            created.color.name(),
            self.scope
        );
        self.canonical.push(created.clone());
        self.profiles.push(created);
        self.apply_visibility();
        let index = self.profiles.len() - 1;
        Ok(&self.profiles[index])
    }

    /// Deletes a profile, its shapes and its pending changes.
    pub async fn delete_profile(&mut self, id: ProfileId) -> Result<()> {
        if self.profile(id).is_none() {
            return Err(ProfileError::NotFound { id }.into());
        }

        self.store
            .delete_profile(id)
            .await
            .inspect_err(|e| tracing::warn!("Failed to delete profile {}: {}", id, e))?;

        self.profiles.retain(|p| p.id != id);
        self.canonical.retain(|p| p.id != id);
        self.hidden.remove(&id);
        let before = self.pending.len();
        self.pending.retain(|c| c.profile_id() != id);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} pending changes of deleted profile {}", dropped, id);
        }
        tracing::info!("Deleted profile {}", id);
        Ok(())
    }

    /// Flips a profile's visibility. Returns the new value.
    pub fn toggle_visibility(&mut self, id: ProfileId) -> Result<bool> {
        let profile = self.profile_mut(id)?;
        profile.visible = !profile.visible;
        let visible = profile.visible;
        if visible {
            self.hidden.remove(&id);
        } else {
            self.hidden.insert(id);
        }
        Ok(visible)
    }

    /// Sets visibility of several profiles at once. Unknown ids are ignored.
    pub fn set_visibility(&mut self, ids: &[ProfileId], visible: bool) {
        for id in ids {
            if visible {
                self.hidden.remove(id);
            } else {
                self.hidden.insert(*id);
            }
        }
        self.apply_visibility();
    }

    /// Records a drawn shape as a pending add. Returns its provisional id.
    pub fn record_drawn(&mut self, profile_id: ProfileId, draft: ShapeDraft) -> Result<ShapeId> {
        draft.geometry.validate()?;
        let profile = self.profile_mut(profile_id)?;

        let shape = Shape::from_draft(draft.clone());
        let provisional_id = shape.id;
        tracing::debug!(
            "Recorded {} {} in profile {}",
            shape.shape_type(),
            provisional_id,
            profile_id
        );
        profile.shapes.push(shape);
        self.pending.push(PendingChange::Add {
            profile_id,
            provisional_id,
            draft,
        });
        Ok(provisional_id)
    }

    /// Replaces fields of a shape and records the update.
    pub fn record_updated(
        &mut self,
        profile_id: ProfileId,
        shape_id: ShapeId,
        patch: ShapePatch,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        patch.validate()?;

        let profile = self.profile_mut(profile_id)?;
        let slot = profile
            .shapes
            .iter_mut()
            .find(|s| s.id == shape_id)
            .ok_or(ShapeError::NotFound { id: shape_id })?;
        *slot = slot.patched(&patch)?;

        tracing::debug!("Recorded update of {} in profile {}", shape_id, profile_id);
        self.pending.push(PendingChange::Update {
            profile_id,
            shape_id,
            patch,
        });
        Ok(())
    }

    /// Removes a shape and records the deletion.
    ///
    /// Deleting a shape that is still a pending add drops the add and its
    /// queued updates instead; the store never learns of it.
    pub fn record_deleted(&mut self, profile_id: ProfileId, shape_id: ShapeId) -> Result<()> {
        let profile = self.profile_mut(profile_id)?;
        let index = profile
            .shape_index(shape_id)
            .ok_or(ShapeError::NotFound { id: shape_id })?;
        profile.shapes.remove(index);

        if !self.forget_pending_add(shape_id) {
            self.pending.push(PendingChange::Delete {
                profile_id,
                shape_id,
            });
        }
        tracing::debug!("Recorded delete of {} in profile {}", shape_id, profile_id);
        Ok(())
    }

    /// Removes the pending add of `shape_id` and any updates queued for it.
    fn forget_pending_add(&mut self, shape_id: ShapeId) -> bool {
        if !self.pending.iter().any(|c| c.is_add_of(shape_id)) {
            return false;
        }
        self.pending.retain(|c| c.shape_id() != shape_id);
        true
    }

    /// Removes the topmost shape of a profile.
    ///
    /// Returns the removed shape's id, or `None` when the profile is empty.
    pub fn undo_last(&mut self, profile_id: ProfileId) -> Result<Option<ShapeId>> {
        let profile = self.profile_mut(profile_id)?;
        let Some(shape) = profile.shapes.pop() else {
            return Ok(None);
        };

        if !self.forget_pending_add(shape.id) {
            self.pending.push(PendingChange::Delete {
                profile_id,
                shape_id: shape.id,
            });
        }
        tracing::debug!("Undid {} in profile {}", shape.id, profile_id);
        Ok(Some(shape.id))
    }

    /// Flushes the pending log to the store in recording order.
    ///
    /// On failure the unsaved part of the log is kept for a retry. When the
    /// store reports a partial replay, the applied prefix is dropped from the
    /// log and the remainder is pointed at the ids the store assigned.
    /// On success the log is cleared and local state is reloaded from the
    /// store; if that reload fails, local state (with store-assigned ids)
    /// becomes the canonical snapshot.
    pub async fn save(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let count = self.pending.len();
        let report = match self.store.apply_batch(&self.pending).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Save of {} changes failed: {}", count, e);
                if let PersistenceError::PartialBatch {
                    applied, id_map, ..
                } = &e
                {
                    self.settle_applied(*applied, id_map).await;
                }
                return Err(e.into());
            }
        };

        self.pending.clear();
        tracing::info!("Saved {} changes in {}", report.applied, self.scope);

        if let Err(e) = self.reload().await {
            tracing::warn!("Reload after save failed, keeping local state: {}", e);
            remap_ids(&mut self.profiles, &report.id_map);
            self.canonical = self.profiles.clone();
        }
        Ok(())
    }

    async fn settle_applied(&mut self, applied: usize, id_map: &HashMap<ShapeId, ShapeId>) {
        let applied = applied.min(self.pending.len());
        self.pending.drain(..applied);
        for change in &mut self.pending {
            if let PendingChange::Update { shape_id, .. } | PendingChange::Delete { shape_id, .. } =
                change
            {
                if let Some(id) = id_map.get(&*shape_id) {
                    *shape_id = *id;
                }
            }
        }
        remap_ids(&mut self.profiles, id_map);
        tracing::info!(
            "Kept {} changes for retry after {} were stored",
            self.pending.len(),
            applied
        );

        match self.store.list_profiles(&self.scope).await {
            Ok(profiles) => self.canonical = profiles,
            Err(e) => tracing::warn!("Could not refresh canonical state: {}", e),
        }
    }

    /// Drops the pending log and restores canonical state.
    ///
    /// Canonical state is re-read from the store, falling back to the last
    /// snapshot when the store is unreachable.
    pub async fn discard(&mut self) -> Result<()> {
        let dropped = self.pending.len();
        self.pending.clear();
        if let Err(e) = self.reload().await {
            tracing::warn!("Reload on discard failed, using cached state: {}", e);
            self.profiles = self.canonical.clone();
            self.apply_visibility();
        }
        tracing::info!("Discarded {} pending changes", dropped);
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        let profiles = self.store.list_profiles(&self.scope).await?;
        // the local overlay wins for profiles already on screen
        for profile in &profiles {
            if !profile.visible && self.profile(profile.id).is_none() {
                self.hidden.insert(profile.id);
            }
        }
        self.canonical = profiles.clone();
        self.profiles = profiles;
        self.apply_visibility();
        Ok(())
    }

    /// Loads another scope. Pending changes are dropped; callers guard with
    /// [`has_pending_changes`](Self::has_pending_changes).
    ///
    /// Returns how many pending changes were dropped. Nothing changes if the
    /// store cannot be read.
    pub async fn switch_scope(&mut self, scope: ProfileScope) -> Result<usize> {
        let profiles = self.store.list_profiles(&scope).await?;
        let dropped = self.pending.len();
        if dropped > 0 {
            tracing::warn!(
                "Switching to {} dropped {} pending changes",
                scope,
                dropped
            );
        }
        tracing::info!("Switched scope {} -> {}", self.scope, scope);
        self.scope = scope;
        self.pending.clear();
        self.hidden = hidden_in(&profiles);
        self.canonical = profiles.clone();
        self.profiles = profiles;
        self.apply_visibility();
        Ok(dropped)
    }
}

fn hidden_in(profiles: &[Profile]) -> HashSet<ProfileId> {
    profiles.iter().filter(|p| !p.visible).map(|p| p.id).collect()
}

fn remap_ids(profiles: &mut [Profile], id_map: &HashMap<ShapeId, ShapeId>) {
    for shape in profiles.iter_mut().flat_map(|p| p.shapes.iter_mut()) {
        if let Some(id) = id_map.get(&shape.id) {
            shape.id = *id;
        }
    }
}
