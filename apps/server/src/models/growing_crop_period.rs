use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{EntityKind, Lifecycle, Record, Reference};

/// One cultivation cycle of a crop on a field. Processing events hang off it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GrowingCropPeriod {
    pub id: Uuid,
    pub field_id: Uuid,
    pub crop_id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrowingCropPeriod {
    pub field_id: Uuid,
    pub crop_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGrowingCropPeriod {
    pub field_id: Option<Uuid>,
    pub crop_id: Option<Uuid>,
}

impl CreateGrowingCropPeriod {
    pub fn into_record(self, lifecycle: Lifecycle) -> GrowingCropPeriod {
        GrowingCropPeriod {
            id: Uuid::new_v4(),
            field_id: self.field_id,
            crop_id: self.crop_id,
            lifecycle,
        }
    }
}

impl UpdateGrowingCropPeriod {
    pub fn apply(self, period: &mut GrowingCropPeriod) {
        if let Some(field_id) = self.field_id {
            period.field_id = field_id;
        }
        if let Some(crop_id) = self.crop_id {
            period.crop_id = crop_id;
        }
    }
}

impl Record for GrowingCropPeriod {
    const KIND: EntityKind = EntityKind::GrowingCropPeriod;

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
            Reference::PeriodField => Some(self.field_id),
            Reference::PeriodCrop => Some(self.crop_id),
            _ => None,
        }
    }
}
