//! In-memory stores for tests and local runs without a database.
//!
//! Each table is a vector behind an async lock. Unique keys are enforced under
//! the write lock so racing inserts see the same outcome PostgreSQL's unique
//! constraints give. Foreign keys are not enforced here; the services check them.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::traits::{RecordStore, ReportStore},
    models::{
        Crop, Farm, FarmMachineCount, FarmSoilCount, Field, FieldCountPerFarmAndCrop,
        GrowingCropPeriod, KeyScope, Machine, Processing, ProcessingReportRow, ProcessingType,
        Record, Reference, Soil, Visibility,
    },
    Error, Result,
};

pub struct MemoryTable<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active rows, in storage order.
    pub async fn active(&self) -> Vec<T> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|r| !r.is_deleted())
            .cloned()
            .collect()
    }

    fn key_taken(rows: &[T], candidate: &T) -> bool {
        let Some(key) = candidate.unique_key() else {
            return false;
        };
        rows.iter().filter(|r| r.id() != candidate.id()).any(|r| {
            let in_scope = match T::KEY_SCOPE {
                KeyScope::None => false,
                KeyScope::Restorable => true,
                KeyScope::ActiveOnly => !r.is_deleted() && !candidate.is_deleted(),
            };
            in_scope && r.unique_key() == Some(key)
        })
    }

    fn conflict() -> Error {
        Error::Conflict(format!(
            "{} with this {} already exists",
            T::KIND,
            T::KEY_NAME
        ))
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryTable<T> {
    async fn list(&self, visibility: Visibility) -> Result<Vec<T>> {
        let mut rows: Vec<T> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| visibility.includes(r.lifecycle()))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.lifecycle().created, r.id()));
        Ok(rows)
    }

    async fn get(&self, id: Uuid, visibility: Visibility) -> Result<Option<T>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.id() == id && visibility.includes(r.lifecycle()))
            .cloned())
    }

    async fn get_by_key(&self, key: &str, visibility: Visibility) -> Result<Option<T>> {
        if T::KEY_SCOPE == KeyScope::None {
            return Ok(None);
        }
        let rows = self.rows.read().await;
        let mut matches: Vec<&T> = rows
            .iter()
            .filter(|r| r.unique_key() == Some(key) && visibility.includes(r.lifecycle()))
            .collect();
        matches.sort_by_key(|r| (r.is_deleted(), r.lifecycle().created));
        Ok(matches.first().map(|r| (*r).clone()))
    }

    async fn insert(&self, record: &T) -> Result<T> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.id() == record.id()) {
            return Err(Error::Internal(format!(
                "{} with id {} already stored",
                T::KIND,
                record.id()
            )));
        }
        if Self::key_taken(&rows, record) {
            return Err(Self::conflict());
        }
        rows.push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &T) -> Result<T> {
        let mut rows = self.rows.write().await;
        if Self::key_taken(&rows, record) {
            return Err(Self::conflict());
        }
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or(Error::NotFound {
                kind: T::KIND,
                id: record.id(),
            })?;
        *slot = record.clone();
        Ok(record.clone())
    }

    async fn mark_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id() == id && !r.is_deleted()) {
            Some(row) => {
                row.lifecycle_mut().mark_deleted(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge(&self, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        Ok(rows.len() < before)
    }

    async fn count_by(
        &self,
        reference: Reference,
        target: Uuid,
        visibility: Visibility,
    ) -> Result<i64> {
        if reference.child() != T::KIND {
            return Err(Error::Internal(format!(
                "{} table does not hold the {} column of {}",
                T::KIND,
                reference.column(),
                reference.child()
            )));
        }
        let count = self
            .rows
            .read()
            .await
            .iter()
            .filter(|r| visibility.includes(r.lifecycle()) && r.reference(reference) == Some(target))
            .count();
        Ok(count as i64)
    }
}

/// Tables shared with [`MemoryReports`].
#[derive(Clone, Default)]
pub struct MemoryTables {
    pub farms: Arc<MemoryTable<Farm>>,
    pub soils: Arc<MemoryTable<Soil>>,
    pub crops: Arc<MemoryTable<Crop>>,
    pub fields: Arc<MemoryTable<Field>>,
    pub machines: Arc<MemoryTable<Machine>>,
    pub periods: Arc<MemoryTable<GrowingCropPeriod>>,
    pub processing_types: Arc<MemoryTable<ProcessingType>>,
    pub processings: Arc<MemoryTable<Processing>>,
}

fn by_id<T: Record>(rows: Vec<T>) -> HashMap<Uuid, T> {
    rows.into_iter().map(|r| (r.id(), r)).collect()
}

/// Report computations over [`MemoryTables`], ordered the same way as the SQL.
#[derive(Clone)]
pub struct MemoryReports {
    tables: MemoryTables,
}

impl MemoryReports {
    pub fn new(tables: MemoryTables) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl ReportStore for MemoryReports {
    async fn farms_with_most_machines(&self, limit: i64) -> Result<Vec<FarmMachineCount>> {
        let machines = self.tables.machines.active().await;
        let mut rows: Vec<FarmMachineCount> = self
            .tables
            .farms
            .active()
            .await
            .into_iter()
            .map(|farm| FarmMachineCount {
                machine_count: machines.iter().filter(|m| m.farm_id == farm.id).count() as i64,
                farm_id: farm.id,
                farm_name: farm.name,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.machine_count
                .cmp(&a.machine_count)
                .then_with(|| a.farm_name.cmp(&b.farm_name))
                .then_with(|| a.farm_id.cmp(&b.farm_id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn field_count_per_farm_and_crop(&self) -> Result<Vec<FieldCountPerFarmAndCrop>> {
        let farms = by_id(self.tables.farms.active().await);
        let crops = by_id(self.tables.crops.active().await);
        let fields = by_id(self.tables.fields.active().await);

        let mut pairs: HashMap<(Uuid, Uuid), HashSet<Uuid>> = HashMap::new();
        for period in self.tables.periods.active().await {
            let Some(field) = fields.get(&period.field_id) else {
                continue;
            };
            if farms.contains_key(&field.farm_id) && crops.contains_key(&period.crop_id) {
                pairs
                    .entry((field.farm_id, period.crop_id))
                    .or_default()
                    .insert(field.id);
            }
        }

        let mut rows: Vec<FieldCountPerFarmAndCrop> = pairs
            .into_iter()
            .map(|((farm_id, crop_id), field_ids)| FieldCountPerFarmAndCrop {
                farm_id,
                farm_name: farms[&farm_id].name.clone(),
                crop_id,
                crop_name: crops[&crop_id].name.clone(),
                field_count: field_ids.len() as i64,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.field_count
                .cmp(&a.field_count)
                .then_with(|| a.farm_name.cmp(&b.farm_name))
                .then_with(|| a.crop_name.cmp(&b.crop_name))
                .then_with(|| a.farm_id.cmp(&b.farm_id))
                .then_with(|| a.crop_id.cmp(&b.crop_id))
        });
        Ok(rows)
    }

    async fn most_common_soil_per_farm(&self) -> Result<Vec<FarmSoilCount>> {
        let farms = by_id(self.tables.farms.active().await);
        let soils = by_id(self.tables.soils.active().await);

        let mut counts: HashMap<(Uuid, Uuid), i64> = HashMap::new();
        for field in self.tables.fields.active().await {
            if farms.contains_key(&field.farm_id) && soils.contains_key(&field.soil_id) {
                *counts.entry((field.farm_id, field.soil_id)).or_default() += 1;
            }
        }

        let mut best: HashMap<Uuid, FarmSoilCount> = HashMap::new();
        for ((farm_id, soil_id), field_count) in counts {
            let candidate = FarmSoilCount {
                farm_id,
                farm_name: farms[&farm_id].name.clone(),
                soil_id,
                soil_name: soils[&soil_id].name.clone(),
                field_count,
            };
            let rank = |r: &FarmSoilCount| (Reverse(r.field_count), r.soil_name.clone(), r.soil_id);
            match best.get(&farm_id) {
                Some(current) if rank(current) <= rank(&candidate) => {}
                _ => {
                    best.insert(farm_id, candidate);
                }
            }
        }

        let mut rows: Vec<FarmSoilCount> = best.into_values().collect();
        rows.sort_by(|a, b| {
            b.field_count
                .cmp(&a.field_count)
                .then_with(|| a.farm_name.cmp(&b.farm_name))
                .then_with(|| a.farm_id.cmp(&b.farm_id))
        });
        Ok(rows)
    }

    async fn processing_report(&self) -> Result<Vec<ProcessingReportRow>> {
        let farms = by_id(self.tables.farms.active().await);
        let soils = by_id(self.tables.soils.active().await);
        let crops = by_id(self.tables.crops.active().await);
        let fields = by_id(self.tables.fields.active().await);
        let machines = by_id(self.tables.machines.active().await);
        let periods = by_id(self.tables.periods.active().await);
        let kinds = by_id(self.tables.processing_types.active().await);

        let mut rows: Vec<ProcessingReportRow> = self
            .tables
            .processings
            .active()
            .await
            .into_iter()
            .map(|p| {
                let period = periods.get(&p.growing_crop_period_id);
                let field = period.and_then(|g| fields.get(&g.field_id));
                let machine = machines.get(&p.machine_id);
                ProcessingReportRow {
                    processing_id: p.id,
                    processing_date: p.date,
                    processing_type_name: kinds.get(&p.processing_type_id).map(|t| t.name.clone()),
                    field_name: field.map(|f| f.name.clone()),
                    machine_brand: machine.map(|m| m.brand.clone()),
                    machine_model: machine.map(|m| m.model.clone()),
                    crop_name: period
                        .and_then(|g| crops.get(&g.crop_id))
                        .map(|c| c.name.clone()),
                    soil_name: field
                        .and_then(|f| soils.get(&f.soil_id))
                        .map(|s| s.name.clone()),
                    farm_name: field
                        .and_then(|f| farms.get(&f.farm_id))
                        .map(|fa| fa.name.clone()),
                }
            })
            .collect();
        rows.sort_by_key(|r| (r.processing_date, r.processing_id));
        Ok(rows)
    }
}
