//! Profile persistence interface.
//!
//! The engine never assumes a storage medium: hosts inject a [`ProfileStore`]
//! and the edit session awaits it on profile creation and deletion, reload,
//! and save. [`InMemoryProfileStore`] is the reference implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use roikit_core::{PersistenceError, ProfileId, ProfileScope, RoiColor, ShapeId};

use crate::model::{Profile, RoiShape, Shape, ShapeDraft, ShapePatch};
use crate::session::PendingChange;

/// Request to create a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub scope: ProfileScope,
    pub name: String,
    pub color: RoiColor,
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Number of changes applied.
    pub applied: usize,
    /// Provisional shape id of each `Add` mapped to the id the store assigned.
    pub id_map: HashMap<ShapeId, ShapeId>,
}

impl BatchReport {
    /// The store id for `id`, following the map for shapes added in this batch.
    pub fn resolve(&self, id: ShapeId) -> ShapeId {
        self.id_map.get(&id).copied().unwrap_or(id)
    }
}

/// Asynchronous profile persistence.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// All profiles of a scope, in creation order.
    async fn list_profiles(&self, scope: &ProfileScope) -> Result<Vec<Profile>, PersistenceError>;

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, PersistenceError>;

    /// Deletes a profile together with its shapes.
    async fn delete_profile(&self, id: ProfileId) -> Result<(), PersistenceError>;

    async fn create_shape(
        &self,
        profile_id: ProfileId,
        draft: ShapeDraft,
    ) -> Result<Shape, PersistenceError>;

    async fn update_shape(
        &self,
        profile_id: ProfileId,
        shape_id: ShapeId,
        patch: ShapePatch,
    ) -> Result<Shape, PersistenceError>;

    async fn delete_shape(
        &self,
        profile_id: ProfileId,
        shape_id: ShapeId,
    ) -> Result<(), PersistenceError>;

    /// Applies a pending-change log in order.
    ///
    /// The default replays the changes one call at a time. A failure part-way
    /// through is reported as [`PersistenceError::PartialBatch`] with the
    /// number already applied and the ids assigned to applied adds; those
    /// are not rolled back. Stores with a transaction primitive should
    /// override this and apply all or nothing.
    async fn apply_batch(&self, changes: &[PendingChange]) -> Result<BatchReport, PersistenceError> {
        let mut report = BatchReport::default();
        let total = changes.len();

        for change in changes {
            let result = match change {
                PendingChange::Add {
                    profile_id,
                    provisional_id,
                    draft,
                } => self
                    .create_shape(*profile_id, draft.clone())
                    .await
                    .map(|shape| {
                        report.id_map.insert(*provisional_id, shape.id);
                    }),
                PendingChange::Update {
                    profile_id,
                    shape_id,
                    patch,
                } => self
                    .update_shape(*profile_id, report.resolve(*shape_id), patch.clone())
                    .await
                    .map(|_| ()),
                PendingChange::Delete {
                    profile_id,
                    shape_id,
                } => {
                    self.delete_shape(*profile_id, report.resolve(*shape_id))
                        .await
                }
            };

            if let Err(e) = result {
                return Err(PersistenceError::PartialBatch {
                    applied: report.applied,
                    total,
                    reason: e.to_string(),
                    id_map: report.id_map,
                });
            }
            report.applied += 1;
        }

        Ok(report)
    }
}

/// Profile store held in process memory.
///
/// Batches are applied to a staged copy and swapped in only when every change
/// succeeds.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<Vec<Profile>>,
    unavailable: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
            unavailable: AtomicBool::new(false),
        }
    }

    /// While set, every call fails with a persistence failure.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// A copy of everything stored, across scopes.
    pub fn snapshot(&self) -> Vec<Profile> {
        self.profiles.read().clone()
    }

    fn check_available(&self) -> Result<(), PersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(PersistenceError::failure("store unavailable"))
        } else {
            Ok(())
        }
    }
}

fn profile_mut(profiles: &mut [Profile], id: ProfileId) -> Result<&mut Profile, PersistenceError> {
    profiles
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(PersistenceError::ProfileNotFound { id })
}

fn insert_shape(
    profiles: &mut [Profile],
    profile_id: ProfileId,
    draft: ShapeDraft,
) -> Result<Shape, PersistenceError> {
    let profile = profile_mut(profiles, profile_id)?;
    draft
        .geometry
        .validate()
        .map_err(|e| PersistenceError::failure(e.to_string()))?;
    let shape = Shape::from_draft(draft);
    profile.shapes.push(shape.clone());
    profile.updated_at = shape.created_at;
    Ok(shape)
}

fn patch_shape(
    profiles: &mut [Profile],
    profile_id: ProfileId,
    shape_id: ShapeId,
    patch: &ShapePatch,
) -> Result<Shape, PersistenceError> {
    let profile = profile_mut(profiles, profile_id)?;
    let slot = profile
        .shapes
        .iter_mut()
        .find(|s| s.id == shape_id)
        .ok_or(PersistenceError::ShapeNotFound { id: shape_id })?;
    let next = slot
        .patched(patch)
        .map_err(|e| PersistenceError::failure(e.to_string()))?;
    *slot = next.clone();
    profile.updated_at = next.updated_at;
    Ok(next)
}

fn remove_shape(
    profiles: &mut [Profile],
    profile_id: ProfileId,
    shape_id: ShapeId,
) -> Result<(), PersistenceError> {
    let profile = profile_mut(profiles, profile_id)?;
    let index = profile
        .shape_index(shape_id)
        .ok_or(PersistenceError::ShapeNotFound { id: shape_id })?;
    profile.shapes.remove(index);
    Ok(())
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn list_profiles(&self, scope: &ProfileScope) -> Result<Vec<Profile>, PersistenceError> {
        self.check_available()?;
        Ok(self
            .profiles
            .read()
            .iter()
            .filter(|p| &p.scope == scope)
            .cloned()
            .collect())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, PersistenceError> {
        self.check_available()?;
        let created = Profile::new(profile.scope, profile.name, profile.color);
        self.profiles.write().push(created.clone());
        Ok(created)
    }

    async fn delete_profile(&self, id: ProfileId) -> Result<(), PersistenceError> {
        self.check_available()?;
        let mut profiles = self.profiles.write();
        let index = profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or(PersistenceError::ProfileNotFound { id })?;
        profiles.remove(index);
        Ok(())
    }

    async fn create_shape(
        &self,
        profile_id: ProfileId,
        draft: ShapeDraft,
    ) -> Result<Shape, PersistenceError> {
        self.check_available()?;
        insert_shape(&mut self.profiles.write(), profile_id, draft)
    }

    async fn update_shape(
        &self,
        profile_id: ProfileId,
        shape_id: ShapeId,
        patch: ShapePatch,
    ) -> Result<Shape, PersistenceError> {
        self.check_available()?;
        patch_shape(&mut self.profiles.write(), profile_id, shape_id, &patch)
    }

    async fn delete_shape(
        &self,
        profile_id: ProfileId,
        shape_id: ShapeId,
    ) -> Result<(), PersistenceError> {
        self.check_available()?;
        remove_shape(&mut self.profiles.write(), profile_id, shape_id)
    }

    async fn apply_batch(&self, changes: &[PendingChange]) -> Result<BatchReport, PersistenceError> {
        self.check_available()?;
        let mut guard = self.profiles.write();
        let mut staged = guard.clone();
        let mut report = BatchReport::default();

        for change in changes {
            let result = match change {
                PendingChange::Add {
                    profile_id,
                    provisional_id,
                    draft,
                } => insert_shape(&mut staged, *profile_id, draft.clone()).map(|shape| {
                    report.id_map.insert(*provisional_id, shape.id);
                }),
                PendingChange::Update {
                    profile_id,
                    shape_id,
                    patch,
                } => patch_shape(&mut staged, *profile_id, report.resolve(*shape_id), patch)
                    .map(|_| ()),
                PendingChange::Delete {
                    profile_id,
                    shape_id,
                } => remove_shape(&mut staged, *profile_id, report.resolve(*shape_id)),
            };
            if let Err(e) = result {
                return Err(PersistenceError::failure(format!(
                    "batch rolled back at change {} of {}: {}",
                    report.applied + 1,
                    changes.len(),
                    e
                )));
            }
            report.applied += 1;
        }

        *guard = staged;
        Ok(report)
    }
}
