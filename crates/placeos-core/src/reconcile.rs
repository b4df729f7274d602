// ── Reconciliation engine ──
//
// Drives one managed entity toward its desired fields:
//
//   Absent ──create──▶ Created ──read+diff──▶ Synced (nothing to send)
//                                        └──▶ Updated (one write)
//   any ──delete──▶ Deleted
//
// Every update is preceded by a fresh read; the diff is always taken
// against that snapshot.

use std::fmt;

use placeos_api::{EntityClient, EntityKind, UpdateMode};
use tracing::{debug, info, instrument, warn};

use crate::diff::{self, FieldSet};
use crate::error::CoreError;
use crate::retry::RetryPolicy;

/// Where a managed entity stands after the last engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Absent,
    Created,
    /// Remote state already matched the desired fields.
    Synced,
    Updated,
    Deleted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Created => "created",
            Self::Synced => "synced",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        })
    }
}

/// What a single [`Reconciler::reconcile`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated { changed: FieldSet },
    Unchanged,
}

/// One entity under management: its id once known, its lifecycle state
/// and the last snapshot the engine saw.
#[derive(Debug, Clone)]
pub struct Managed<K: EntityKind> {
    id: Option<String>,
    state: LifecycleState,
    snapshot: Option<K::Entity>,
}

impl<K: EntityKind> Default for Managed<K> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<K: EntityKind> Managed<K> {
    /// Not yet created.
    pub fn absent() -> Self {
        Self {
            id: None,
            state: LifecycleState::Absent,
            snapshot: None,
        }
    }

    /// Already exists remotely under `id` (e.g. imported by the caller).
    pub fn existing(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            return Self::absent();
        }
        Self {
            id: Some(id),
            state: LifecycleState::Synced,
            snapshot: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&K::Entity> {
        self.snapshot.as_ref()
    }

    fn record(&mut self, entity: K::Entity, state: LifecycleState) {
        self.id = Some(K::id(&entity).to_owned());
        self.snapshot = Some(entity);
        self.state = state;
    }
}

/// Converges managed entities of kind `K` with the fewest calls.
pub struct Reconciler<'a, K: EntityKind> {
    entities: EntityClient<'a, K>,
    retry: RetryPolicy,
}

impl<'a, K: EntityKind> Reconciler<'a, K> {
    pub fn new(entities: EntityClient<'a, K>) -> Self {
        Self {
            entities,
            retry: RetryPolicy::default(),
        }
    }

    /// Retry transient read failures. Writes are never retried.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn entities(&self) -> &EntityClient<'a, K> {
        &self.entities
    }

    /// Read the remote entity, retrying per policy.
    pub async fn observe(&self, id: &str) -> Result<K::Entity, CoreError> {
        let entities = &self.entities;
        let entity = self
            .retry
            .run(K::NAME, move || entities.read(id))
            .await?;
        Ok(entity)
    }

    /// Bring the remote entity in line with `desired`.
    ///
    /// Without an id this creates. With one it reads the current snapshot,
    /// diffs, and sends a single update only when something differs:
    /// full-replace kinds get the snapshot's settable fields with the
    /// desired values merged in, partial kinds get only the changed fields.
    /// A vanished entity surfaces as `NotFound`; it is not recreated.
    #[instrument(skip_all, fields(kind = K::NAME, id = managed.id().unwrap_or("")))]
    pub async fn reconcile(
        &self,
        managed: &mut Managed<K>,
        desired: &K::Fields,
    ) -> Result<Outcome, CoreError> {
        let Some(id) = managed.id.clone() else {
            let entity = self.entities.create(desired).await?;
            info!(id = K::id(&entity), "created");
            managed.record(entity, LifecycleState::Created);
            return Ok(Outcome::Created);
        };

        let observed = self.observe(&id).await?;
        let changed = diff::changed_fields::<K>(desired, &observed)
            .map_err(|e| CoreError::Serialization {
                message: e.to_string(),
            })?;

        if changed.is_empty() {
            debug!("in sync, nothing to send");
            managed.record(observed, LifecycleState::Synced);
            return Ok(Outcome::Unchanged);
        }

        let payload = match K::UPDATE_MODE {
            UpdateMode::FullReplace => diff::full_replace_payload::<K>(desired, &observed),
            UpdateMode::Partial => diff::partial_payload::<K>(desired, &changed),
        }
        .map_err(|e| CoreError::Serialization {
            message: e.to_string(),
        })?;

        info!(changed = ?changed, mode = %K::UPDATE_MODE, "updating");
        let updated = self.entities.update(&id, &payload).await?;
        if K::id(&updated) != id && !K::id(&updated).is_empty() {
            warn!(returned = K::id(&updated), "update response carried a different id");
        }

        // The id never changes on update; keep ours if the response omits it.
        managed.snapshot = Some(updated);
        managed.state = LifecycleState::Updated;
        Ok(Outcome::Updated { changed })
    }

    /// Delete the remote entity and forget its id.
    ///
    /// A `NotFound` from the engine still leaves the entity `Deleted`; the
    /// error is returned so the caller can tell it was already gone.
    #[instrument(skip_all, fields(kind = K::NAME, id = managed.id().unwrap_or("")))]
    pub async fn destroy(&self, managed: &mut Managed<K>) -> Result<(), CoreError> {
        let result = match managed.id.as_deref() {
            Some(id) => self.entities.delete(id).await,
            None => Ok(()),
        };

        match result {
            Ok(()) => {
                info!("deleted");
                managed.mark_deleted();
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                warn!("already gone");
                managed.mark_deleted();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<K: EntityKind> Managed<K> {
    fn mark_deleted(&mut self) {
        self.id = None;
        self.snapshot = None;
        self.state = LifecycleState::Deleted;
    }
}

#[cfg(test)]
mod tests {
    use placeos_api::Zone;

    use super::*;

    #[test]
    fn empty_existing_id_is_absent() {
        let managed = Managed::<Zone>::existing("");
        assert_eq!(managed.state(), LifecycleState::Absent);
        assert!(managed.id().is_none());
    }

    #[test]
    fn existing_entity_starts_synced() {
        let managed = Managed::<Zone>::existing("zone-1");
        assert_eq!(managed.id(), Some("zone-1"));
        assert_eq!(managed.state(), LifecycleState::Synced);
        assert!(managed.snapshot().is_none());
    }

    #[test]
    fn deleting_clears_id_and_snapshot() {
        let mut managed = Managed::<Zone>::existing("zone-1");
        managed.mark_deleted();
        assert_eq!(managed.state(), LifecycleState::Deleted);
        assert!(managed.id().is_none());
        assert_eq!(managed.state().to_string(), "deleted");
    }
}
