use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::validate_name;
use super::{EntityKind, KeyScope, Lifecycle, Record, Reference};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub register_number: String,
    pub farm_id: Uuid,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachine {
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub brand: String,
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub model: String,
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub register_number: String,
    pub farm_id: Uuid,
}

/// The owning farm only changes through [`TransferMachine`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachine {
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub model: Option<String>,
    #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
    pub register_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferMachine {
    pub new_farm_id: Uuid,
}

impl CreateMachine {
    pub fn into_record(self, lifecycle: Lifecycle) -> Machine {
        Machine {
            id: Uuid::new_v4(),
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            register_number: self.register_number.trim().to_string(),
            farm_id: self.farm_id,
            lifecycle,
        }
    }
}

impl UpdateMachine {
    pub fn apply(self, machine: &mut Machine) {
        if let Some(brand) = self.brand {
            machine.brand = brand.trim().to_string();
        }
        if let Some(model) = self.model {
            machine.model = model.trim().to_string();
        }
        if let Some(register_number) = self.register_number {
            machine.register_number = register_number.trim().to_string();
        }
    }
}

impl Record for Machine {
    const KIND: EntityKind = EntityKind::Machine;
    const KEY_SCOPE: KeyScope = KeyScope::Restorable;
    const KEY_NAME: &'static str = "registerNumber";

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
        Some(&self.register_number)
    }

    fn reference(&self, reference: Reference) -> Option<Uuid> {
        match reference {
            Reference::MachineFarm => Some(self.farm_id),
            _ => None,
        }
    }

    fn summary_name(&self) -> Option<String> {
        Some(format!(
            "{} {} ({})",
            self.brand, self.model, self.register_number
        ))
    }
}
