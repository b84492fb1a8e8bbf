use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{
        FarmMachineCount, FarmSoilCount, FieldCountPerFarmAndCrop, ProcessingReportRow, Record,
        Reference, Visibility,
    },
    Result,
};

/// Persistence for one record type.
///
/// Every read states its [`Visibility`]. Writes store the full row, lifecycle
/// columns included, so restore is an ordinary [`RecordStore::update`].
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Rows ordered by creation time, then id.
    async fn list(&self, visibility: Visibility) -> Result<Vec<T>>;

    async fn get(&self, id: Uuid, visibility: Visibility) -> Result<Option<T>>;

    /// Lookup by the record's unique key. An active row wins over soft-deleted
    /// ones. Always `None` for record types without a key.
    async fn get_by_key(&self, key: &str, visibility: Visibility) -> Result<Option<T>>;

    /// Fails with `Conflict` when the unique key is already taken.
    async fn insert(&self, record: &T) -> Result<T>;

    /// Overwrites the row with the same id. `NotFound` when it is gone.
    async fn update(&self, record: &T) -> Result<T>;

    /// Sets `deleted` and `updated` on an active row. Returns false when no
    /// active row matched.
    async fn mark_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;

    /// Physically removes the row. Returns false when nothing was removed.
    async fn purge(&self, id: Uuid) -> Result<bool>;

    /// Number of rows whose `reference` column points at `target`.
    async fn count_by(
        &self,
        reference: Reference,
        target: Uuid,
        visibility: Visibility,
    ) -> Result<i64>;
}

/// Aggregations over active rows.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn farms_with_most_machines(&self, limit: i64) -> Result<Vec<FarmMachineCount>>;

    async fn field_count_per_farm_and_crop(&self) -> Result<Vec<FieldCountPerFarmAndCrop>>;

    async fn most_common_soil_per_farm(&self) -> Result<Vec<FarmSoilCount>>;

    async fn processing_report(&self) -> Result<Vec<ProcessingReportRow>>;
}
