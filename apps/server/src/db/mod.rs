//! Persistence layer: store traits and their PostgreSQL and in-memory backends.

pub mod memory;
pub mod postgres;
pub mod traits;

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

pub use memory::{MemoryReports, MemoryTable, MemoryTables};
pub use postgres::{PgRecord, PgReports, PgTable};
pub use traits::{RecordStore, ReportStore};

use crate::{
    models::{
        Crop, EntityKind, Farm, Field, GrowingCropPeriod, Machine, Processing, ProcessingType,
        Reference, Soil, Visibility,
    },
    Result,
};

/// One store per record type plus the report queries.
#[derive(Clone)]
pub struct Stores {
    pub farms: Arc<dyn RecordStore<Farm>>,
    pub soils: Arc<dyn RecordStore<Soil>>,
    pub crops: Arc<dyn RecordStore<Crop>>,
    pub fields: Arc<dyn RecordStore<Field>>,
    pub machines: Arc<dyn RecordStore<Machine>>,
    pub periods: Arc<dyn RecordStore<GrowingCropPeriod>>,
    pub processing_types: Arc<dyn RecordStore<ProcessingType>>,
    pub processings: Arc<dyn RecordStore<Processing>>,
    pub reports: Arc<dyn ReportStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            farms: Arc::new(PgTable::<Farm>::new(pool.clone())),
            soils: Arc::new(PgTable::<Soil>::new(pool.clone())),
            crops: Arc::new(PgTable::<Crop>::new(pool.clone())),
            fields: Arc::new(PgTable::<Field>::new(pool.clone())),
            machines: Arc::new(PgTable::<Machine>::new(pool.clone())),
            periods: Arc::new(PgTable::<GrowingCropPeriod>::new(pool.clone())),
            processing_types: Arc::new(PgTable::<ProcessingType>::new(pool.clone())),
            processings: Arc::new(PgTable::<Processing>::new(pool.clone())),
            reports: Arc::new(PgReports::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let tables = MemoryTables::default();
        Self {
            farms: tables.farms.clone(),
            soils: tables.soils.clone(),
            crops: tables.crops.clone(),
            fields: tables.fields.clone(),
            machines: tables.machines.clone(),
            periods: tables.periods.clone(),
            processing_types: tables.processing_types.clone(),
            processings: tables.processings.clone(),
            reports: Arc::new(MemoryReports::new(tables)),
        }
    }

    /// Rows of `reference.child()` pointing at `target` through `reference`.
    pub async fn count_referencing(
        &self,
        reference: Reference,
        target: Uuid,
        visibility: Visibility,
    ) -> Result<i64> {
        match reference.child() {
            EntityKind::Field => self.fields.count_by(reference, target, visibility).await,
            EntityKind::Machine => self.machines.count_by(reference, target, visibility).await,
            EntityKind::GrowingCropPeriod => {
                self.periods.count_by(reference, target, visibility).await
            }
            EntityKind::Processing => {
                self.processings
                    .count_by(reference, target, visibility)
                    .await
            }
            EntityKind::Farm => self.farms.count_by(reference, target, visibility).await,
            EntityKind::Soil => self.soils.count_by(reference, target, visibility).await,
            EntityKind::Crop => self.crops.count_by(reference, target, visibility).await,
            EntityKind::ProcessingType => {
                self.processing_types
                    .count_by(reference, target, visibility)
                    .await
            }
        }
    }
}
