//! Find, create-or-restore, save and delete, shared by every record type.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::RecordStore,
    models::{now, DeleteMode, DeleteSummary, KeyScope, Record, Visibility},
    services::guard::ReferenceGuard,
    Error, Result,
};

pub struct RecordService<T: Record> {
    store: Arc<dyn RecordStore<T>>,
    guard: ReferenceGuard,
}

impl<T: Record> Clone for RecordService<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<T: Record> RecordService<T> {
    pub fn new(store: Arc<dyn RecordStore<T>>, guard: ReferenceGuard) -> Self {
        Self { store, guard }
    }

    pub fn guard(&self) -> &ReferenceGuard {
        &self.guard
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        self.store.list(Visibility::Active).await
    }

    pub async fn find_one(&self, id: Uuid) -> Result<T> {
        self.store
            .get(id, Visibility::Active)
            .await?
            .ok_or(Error::NotFound { kind: T::KIND, id })
    }

    pub async fn find_one_with_deleted(&self, id: Uuid) -> Result<T> {
        self.store
            .get(id, Visibility::WithDeleted)
            .await?
            .ok_or(Error::NotFound { kind: T::KIND, id })
    }

    /// Active record named by another record's foreign key. A missing target is
    /// the caller's input error, not a missing resource.
    pub async fn require(&self, id: Uuid) -> Result<T> {
        self.store
            .get(id, Visibility::Active)
            .await?
            .ok_or_else(|| Error::Validation(format!("{} with id {id} does not exist", T::KIND)))
    }

    /// Inserts `draft`, or restores the soft-deleted record holding the same
    /// restorable key.
    ///
    /// On restore the stored id and `created` are kept, business fields are
    /// replaced by the draft's and `updated` is refreshed.
    pub async fn create(&self, draft: T) -> Result<T> {
        if let Some(existing) = self.key_holder(&draft).await? {
            if !existing.is_deleted() {
                return Err(self.conflict());
            }

            let mut restored = draft;
            restored.set_id(existing.id());
            let mut lifecycle = existing.lifecycle().clone();
            lifecycle.restore(now());
            *restored.lifecycle_mut() = lifecycle;

            let restored = self.store.update(&restored).await?;
            tracing::info!(entity = %T::KIND, id = %restored.id(), "Record restored");
            return Ok(restored);
        }

        let created = self.store.insert(&draft).await?;
        tracing::info!(entity = %T::KIND, id = %created.id(), "Record created");
        Ok(created)
    }

    /// Persists a modified active record and refreshes `updated`.
    pub async fn save(&self, mut record: T) -> Result<T> {
        if let Some(holder) = self.key_holder(&record).await? {
            if holder.id() != record.id() {
                return Err(self.conflict());
            }
        }
        record.lifecycle_mut().touch(now());
        let saved = self.store.update(&record).await?;
        tracing::debug!(entity = %T::KIND, id = %saved.id(), "Record updated");
        Ok(saved)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<DeleteSummary> {
        let mut record = self.find_one(id).await?;
        self.guard
            .ensure_unreferenced(T::KIND, id, Visibility::Active)
            .await?;

        let at = now();
        if !self.store.mark_deleted(id, at).await? {
            return Err(Error::NotFound { kind: T::KIND, id });
        }
        record.lifecycle_mut().mark_deleted(at);

        tracing::info!(entity = %T::KIND, id = %id, "Record soft-deleted");
        Ok(DeleteSummary::for_record(&record, DeleteMode::Soft))
    }

    /// Removes the row. Soft-deleted dependents still hold the foreign key, so
    /// they block as well.
    pub async fn permanent_delete(&self, id: Uuid) -> Result<DeleteSummary> {
        let record = self.find_one_with_deleted(id).await?;
        self.guard
            .ensure_unreferenced(T::KIND, id, Visibility::WithDeleted)
            .await?;

        if !self.store.purge(id).await? {
            return Err(Error::NotFound { kind: T::KIND, id });
        }

        tracing::info!(entity = %T::KIND, id = %id, "Record purged");
        Ok(DeleteSummary::for_record(&record, DeleteMode::Permanent))
    }

    /// The stored record competing with `record` for its unique key.
    async fn key_holder(&self, record: &T) -> Result<Option<T>> {
        let Some(key) = record.unique_key() else {
            return Ok(None);
        };
        let visibility = match T::KEY_SCOPE {
            KeyScope::None => return Ok(None),
            KeyScope::Restorable => Visibility::WithDeleted,
            KeyScope::ActiveOnly => Visibility::Active,
        };
        self.store.get_by_key(key, visibility).await
    }

    fn conflict(&self) -> Error {
        tracing::debug!(entity = %T::KIND, "Unique key already taken");
        Error::Conflict(format!(
            "{} with this {} already exists",
            T::KIND,
            T::KEY_NAME
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;
    use crate::models::{Lifecycle, Named, Soil};

    fn soils() -> RecordService<Soil> {
        let stores = Stores::in_memory();
        RecordService::new(stores.soils.clone(), ReferenceGuard::new(stores))
    }

    #[tokio::test]
    async fn create_restores_soft_deleted_key() {
        let service = soils();
        let first = service
            .create(Soil::build("Loam".into(), Lifecycle::new(now())))
            .await
            .unwrap();
        service.soft_delete(first.id).await.unwrap();

        let again = service
            .create(Soil::build("Loam".into(), Lifecycle::new(now())))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.lifecycle.created, first.lifecycle.created);
        assert!(again.lifecycle.deleted.is_none());
        assert!(again.lifecycle.updated >= first.lifecycle.updated);
    }

    #[tokio::test]
    async fn create_conflicts_with_active_key() {
        let service = soils();
        service
            .create(Soil::build("Clay".into(), Lifecycle::new(now())))
            .await
            .unwrap();
        let err = service
            .create(Soil::build("Clay".into(), Lifecycle::new(now())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn require_reports_validation_error() {
        let err = soils().require(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn soft_deleted_records_are_hidden_but_purgeable() {
        let service = soils();
        let sand = service
            .create(Soil::build("Sand".into(), Lifecycle::new(now())))
            .await
            .unwrap();
        let summary = service.soft_delete(sand.id).await.unwrap();
        assert_eq!(summary.name.as_deref(), Some("Sand"));

        assert!(matches!(
            service.find_one(sand.id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(service.find_one_with_deleted(sand.id).await.is_ok());
        assert!(service.find_all().await.unwrap().is_empty());

        service.permanent_delete(sand.id).await.unwrap();
        assert!(matches!(
            service.find_one_with_deleted(sand.id).await,
            Err(Error::NotFound { .. })
        ));
    }
}
