//! Delete guard over the foreign-key edges between record kinds.

use uuid::Uuid;

use crate::{
    db::Stores,
    models::{EntityKind, Reference, Visibility},
    Error, Result,
};

/// Blocks deletes of records that other rows still point at.
#[derive(Clone)]
pub struct ReferenceGuard {
    stores: Stores,
}

impl ReferenceGuard {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn count(
        &self,
        reference: Reference,
        target: Uuid,
        visibility: Visibility,
    ) -> Result<i64> {
        self.stores
            .count_referencing(reference, target, visibility)
            .await
    }

    /// Walks every edge pointing at `kind` and fails on the first one with
    /// dependents.
    pub async fn ensure_unreferenced(
        &self,
        kind: EntityKind,
        id: Uuid,
        visibility: Visibility,
    ) -> Result<()> {
        for reference in Reference::pointing_at(kind) {
            let count = self.count(reference, id, visibility).await?;
            if count > 0 {
                tracing::debug!(
                    entity = %kind,
                    id = %id,
                    dependent = %reference.child(),
                    count,
                    "Delete blocked by dependent records"
                );
                return Err(Error::BlockedByReference {
                    kind,
                    id,
                    dependent: reference.child(),
                    count,
                });
            }
        }
        Ok(())
    }
}
