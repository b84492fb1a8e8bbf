use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{EntityKind, Lifecycle, Record, Reference};

/// A unit of work (ploughing, spraying, harvest...) done with a machine during a
/// growing crop period.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Processing {
    pub id: Uuid,
    pub date: NaiveDate,
    pub growing_crop_period_id: Uuid,
    pub processing_type_id: Uuid,
    pub machine_id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcessing {
    #[validate(custom(function = "validate_date"))]
    pub date: NaiveDate,
    pub growing_crop_period_id: Uuid,
    pub processing_type_id: Uuid,
    pub machine_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProcessing {
    #[validate(custom(function = "validate_date"))]
    pub date: Option<NaiveDate>,
    pub growing_crop_period_id: Option<Uuid>,
    pub processing_type_id: Option<Uuid>,
    pub machine_id: Option<Uuid>,
}

/// Keeps dates inside the range PostgreSQL `date` and JSON clients agree on.
fn validate_date(date: &NaiveDate) -> Result<(), ValidationError> {
    use chrono::Datelike;
    if (1..=9999).contains(&date.year()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range");
        err.message = Some("date must fall between years 1 and 9999".into());
        Err(err)
    }
}

impl CreateProcessing {
    pub fn into_record(self, lifecycle: Lifecycle) -> Processing {
        Processing {
            id: Uuid::new_v4(),
            date: self.date,
            growing_crop_period_id: self.growing_crop_period_id,
            processing_type_id: self.processing_type_id,
            machine_id: self.machine_id,
            lifecycle,
        }
    }
}

impl UpdateProcessing {
    /// True when the update touches either side of the farm-consistency rule.
    pub fn moves_period_or_machine(&self) -> bool {
        self.growing_crop_period_id.is_some() || self.machine_id.is_some()
    }

    pub fn apply(self, processing: &mut Processing) {
        if let Some(date) = self.date {
            processing.date = date;
        }
        if let Some(id) = self.growing_crop_period_id {
            processing.growing_crop_period_id = id;
        }
        if let Some(id) = self.processing_type_id {
            processing.processing_type_id = id;
        }
        if let Some(id) = self.machine_id {
            processing.machine_id = id;
        }
    }
}

impl Record for Processing {
    const KIND: EntityKind = EntityKind::Processing;

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reference(&self, reference: Reference) -> Option<Uuid> {
        match reference {
            Reference::ProcessingPeriod => Some(self.growing_crop_period_id),
            Reference::ProcessingKind => Some(self.processing_type_id),
            Reference::ProcessingMachine => Some(self.machine_id),
            _ => None,
        }
    }

    fn summary_date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}
