//! Lookup records that carry nothing but a unique, restorable name.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::validate_name;
use super::{EntityKind, KeyScope, Lifecycle, Record};

/// A record whose only business attribute is its name.
pub trait Named: Record {
    fn build(name: String, lifecycle: Lifecycle) -> Self;
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

macro_rules! named_record {
    ($(#[$meta:meta])* $record:ident, $create:ident, $update:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
        #[serde(rename_all = "camelCase")]
        pub struct $record {
            pub id: Uuid,
            pub name: String,
            #[serde(flatten)]
            #[sqlx(flatten)]
            pub lifecycle: Lifecycle,
        }

        #[derive(Debug, Clone, Deserialize, Validate)]
        pub struct $create {
            #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
            pub name: String,
        }

        #[derive(Debug, Clone, Default, Deserialize, Validate)]
        pub struct $update {
            #[validate(length(min = 1, max = 120), custom(function = "validate_name"))]
            pub name: Option<String>,
        }

        impl Record for $record {
            const KIND: EntityKind = $kind;
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

        impl Named for $record {
            fn build(name: String, lifecycle: Lifecycle) -> Self {
                Self {
                    id: Uuid::new_v4(),
                    name: name.trim().to_string(),
                    lifecycle,
                }
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: String) {
                self.name = name.trim().to_string();
            }
        }
    };
}

named_record!(
    /// Soil classification referenced by fields.
    Soil,
    CreateSoil,
    UpdateSoil,
    EntityKind::Soil
);

named_record!(
    /// Crop grown during a growing crop period.
    Crop,
    CreateCrop,
    UpdateCrop,
    EntityKind::Crop
);

named_record!(
    /// Kind of work recorded by a processing event (ploughing, spraying, ...).
    ProcessingType,
    CreateProcessingType,
    UpdateProcessingType,
    EntityKind::ProcessingType
);
