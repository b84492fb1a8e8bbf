use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::geo::{validate_point, GeoPoint};
use super::validation::validate_name;
use super::{EntityKind, KeyScope, Lifecycle, Record};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub location: GeoPoint,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFarm {
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub name: String,
    #[validate(custom(function = "validate_point"))]
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFarm {
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_point"))]
    pub location: Option<GeoPoint>,
}

impl CreateFarm {
    pub fn into_record(self, lifecycle: Lifecycle) -> Farm {
        Farm {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            location: self.location,
            lifecycle,
        }
    }
}

impl UpdateFarm {
    pub fn apply(self, farm: &mut Farm) {
        if let Some(name) = self.name {
            farm.name = name.trim().to_string();
        }
        if let Some(location) = self.location {
            farm.location = location;
        }
    }
}

impl Record for Farm {
    const KIND: EntityKind = EntityKind::Farm;
    const KEY_SCOPE: KeyScope = KeyScope::Restorable;

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

    fn summary_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn farm_serializes_with_flat_lifecycle() {
        let farm = CreateFarm {
            name: "  Green Acres ".into(),
            location: GeoPoint::new(19.8, 45.2),
        }
        .into_record(Lifecycle::new(crate::models::now()));

        let value = serde_json::to_value(&farm).unwrap();
        assert_eq!(value["name"], "Green Acres");
        assert_eq!(value["location"]["type"], "Point");
        assert!(value["created"].is_string());
        assert!(value["deleted"].is_null());
    }

    #[test]
    fn create_input_is_validated() {
        let input: CreateFarm = serde_json::from_value(json!({
            "name": "",
            "location": {"type": "Point", "coordinates": [200.0, 0.0]}
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("location"));
    }
}
