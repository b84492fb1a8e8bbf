use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::geo::{validate_boundary, Boundary};
use super::validation::validate_name;
use super::{EntityKind, KeyScope, Lifecycle, Record, Reference};

/// A parcel of land belonging to one farm, with a single soil classification.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub boundary: Boundary,
    pub farm_id: Uuid,
    pub soil_id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateField {
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_boundary"))]
    pub boundary: Boundary,
    pub farm_id: Uuid,
    pub soil_id: Uuid,
}

/// The owning farm is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateField {
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_boundary"))]
    pub boundary: Option<Boundary>,
    pub soil_id: Option<Uuid>,
}

impl CreateField {
    pub fn into_record(self, lifecycle: Lifecycle) -> Field {
        Field {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            boundary: self.boundary,
            farm_id: self.farm_id,
            soil_id: self.soil_id,
            lifecycle,
        }
    }
}

impl UpdateField {
    pub fn apply(self, field: &mut Field) {
        if let Some(name) = self.name {
            field.name = name.trim().to_string();
        }
        if let Some(boundary) = self.boundary {
            field.boundary = boundary;
        }
        if let Some(soil_id) = self.soil_id {
            field.soil_id = soil_id;
        }
    }
}

impl Record for Field {
    const KIND: EntityKind = EntityKind::Field;
    const KEY_SCOPE: KeyScope = KeyScope::ActiveOnly;

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

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn reference(&self, reference: Reference) -> Option<Uuid> {
        match reference {
            Reference::FieldFarm => Some(self.farm_id),
            Reference::FieldSoil => Some(self.soil_id),
            _ => None,
        }
    }

    fn summary_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}
