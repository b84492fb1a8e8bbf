//! HTTP handlers, one module per resource path.

pub mod crop;
pub mod farm;
pub mod field;
pub mod growing_crop_period;
pub mod health;
pub mod machine;
pub mod processing;
pub mod processing_type;
pub mod records;
pub mod report;
pub mod soil;

use serde::Serialize;

/// Success envelope: `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
