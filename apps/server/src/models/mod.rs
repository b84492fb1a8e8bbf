//! Record types and their create/update inputs.
//!
//! Every record carries an explicit [`Lifecycle`]; foreign keys are plain ids and
//! the edges between record kinds are listed once in [`Reference`].

pub mod farm;
pub mod field;
pub mod geo;
pub mod growing_crop_period;
pub mod machine;
pub mod named;
pub mod processing;
pub mod report;
pub mod validation;

pub use farm::{CreateFarm, Farm, UpdateFarm};
pub use field::{CreateField, Field, UpdateField};
pub use geo::{Boundary, GeoPoint};
pub use growing_crop_period::{CreateGrowingCropPeriod, GrowingCropPeriod, UpdateGrowingCropPeriod};
pub use machine::{CreateMachine, Machine, TransferMachine, UpdateMachine};
pub use processing::{CreateProcessing, Processing, UpdateProcessing};
pub use named::{
    CreateCrop, CreateProcessingType, CreateSoil, Crop, Named, ProcessingType, Soil, UpdateCrop,
    UpdateProcessingType, UpdateSoil,
};
pub use report::{FarmMachineCount, FarmSoilCount, FieldCountPerFarmAndCrop, ProcessingReportRow};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Farm,
    Soil,
    Crop,
    Field,
    Machine,
    GrowingCropPeriod,
    ProcessingType,
    Processing,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Farm => "Farm",
            Self::Soil => "Soil",
            Self::Crop => "Crop",
            Self::Field => "Field",
            Self::Machine => "Machine",
            Self::GrowingCropPeriod => "Growing crop period",
            Self::ProcessingType => "Processing type",
            Self::Processing => "Processing",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::Farm => "farm",
            Self::Soil => "soil",
            Self::Crop => "crop",
            Self::Field => "field",
            Self::Machine => "machine",
            Self::GrowingCropPeriod => "growing_crop_period",
            Self::ProcessingType => "processing_type",
            Self::Processing => "processing",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A foreign-key edge: rows of [`Reference::child`] point at rows of
/// [`Reference::parent`] through [`Reference::column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    FieldFarm,
    FieldSoil,
    MachineFarm,
    PeriodField,
    PeriodCrop,
    ProcessingPeriod,
    ProcessingKind,
    ProcessingMachine,
}

impl Reference {
    pub const ALL: [Reference; 8] = [
        Reference::FieldFarm,
        Reference::FieldSoil,
        Reference::MachineFarm,
        Reference::PeriodField,
        Reference::PeriodCrop,
        Reference::ProcessingPeriod,
        Reference::ProcessingKind,
        Reference::ProcessingMachine,
    ];

    pub fn child(self) -> EntityKind {
        match self {
            Self::FieldFarm | Self::FieldSoil => EntityKind::Field,
            Self::MachineFarm => EntityKind::Machine,
            Self::PeriodField | Self::PeriodCrop => EntityKind::GrowingCropPeriod,
            Self::ProcessingPeriod | Self::ProcessingKind | Self::ProcessingMachine => {
                EntityKind::Processing
            }
        }
    }

    pub fn parent(self) -> EntityKind {
        match self {
            Self::FieldFarm | Self::MachineFarm => EntityKind::Farm,
            Self::FieldSoil => EntityKind::Soil,
            Self::PeriodField => EntityKind::Field,
            Self::PeriodCrop => EntityKind::Crop,
            Self::ProcessingPeriod => EntityKind::GrowingCropPeriod,
            Self::ProcessingKind => EntityKind::ProcessingType,
            Self::ProcessingMachine => EntityKind::Machine,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::FieldFarm | Self::MachineFarm => "farm_id",
            Self::FieldSoil => "soil_id",
            Self::PeriodField => "field_id",
            Self::PeriodCrop => "crop_id",
            Self::ProcessingPeriod => "growing_crop_period_id",
            Self::ProcessingKind => "processing_type_id",
            Self::ProcessingMachine => "machine_id",
        }
    }

    /// Edges whose parent is `kind`, i.e. everything that blocks deleting a `kind`.
    pub fn pointing_at(kind: EntityKind) -> impl Iterator<Item = Reference> {
        Self::ALL.into_iter().filter(move |r| r.parent() == kind)
    }
}

/// Which rows a read path sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Active,
    WithDeleted,
}

impl Visibility {
    pub fn includes(self, lifecycle: &Lifecycle) -> bool {
        match self {
            Self::Active => lifecycle.deleted.is_none(),
            Self::WithDeleted => true,
        }
    }
}

/// How a record's unique key behaves against soft-deleted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// No unique key.
    None,
    /// Unique across active and soft-deleted rows; a create matching a soft-deleted
    /// row restores it.
    Restorable,
    /// Unique among active rows only; soft-deleted rows are ignored.
    ActiveOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lifecycle {
    #[sqlx(rename = "created_at")]
    pub created: DateTime<Utc>,
    #[sqlx(rename = "updated_at")]
    pub updated: DateTime<Utc>,
    #[sqlx(rename = "deleted_at")]
    pub deleted: Option<DateTime<Utc>>,
}

impl Lifecycle {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            created: at,
            updated: at,
            deleted: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated = at;
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.updated = at;
        self.deleted = Some(at);
    }

    pub fn restore(&mut self, at: DateTime<Utc>) {
        self.updated = at;
        self.deleted = None;
    }
}

/// Current time truncated to microseconds.
///
/// PostgreSQL `timestamptz` stores microseconds; truncating up front keeps the
/// value returned to callers identical to the stored one.
pub fn now() -> DateTime<Utc> {
    let at = Utc::now();
    let us = (at.timestamp_subsec_nanos() / 1_000) * 1_000;
    DateTime::from_timestamp(at.timestamp(), us).unwrap_or(at)
}

/// Behaviour shared by every persisted record.
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    const KIND: EntityKind;
    const KEY_SCOPE: KeyScope = KeyScope::None;
    /// Caller-facing name of the unique key, used in conflict messages.
    const KEY_NAME: &'static str = "name";

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn lifecycle(&self) -> &Lifecycle;
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    fn unique_key(&self) -> Option<&str> {
        None
    }

    /// Value of the foreign key behind `reference`, when this record is its child.
    fn reference(&self, _reference: Reference) -> Option<Uuid> {
        None
    }

    fn summary_name(&self) -> Option<String> {
        None
    }

    fn summary_date(&self) -> Option<NaiveDate> {
        None
    }

    fn is_deleted(&self) -> bool {
        self.lifecycle().is_deleted()
    }
}

/// Body returned by soft and permanent deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Soft,
    Permanent,
}

impl DeleteSummary {
    pub fn for_record<T: Record>(record: &T, mode: DeleteMode) -> Self {
        let verb = match mode {
            DeleteMode::Soft => "soft-deleted",
            DeleteMode::Permanent => "permanently deleted",
        };
        Self {
            id: record.id(),
            name: record.summary_name(),
            date: record.summary_date(),
            message: format!("Successfully {verb} {} with id {}", T::KIND, record.id()),
        }
    }
}
