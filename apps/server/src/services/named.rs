use uuid::Uuid;

use crate::{
    models::{now, Crop, Lifecycle, Named, ProcessingType, Soil},
    services::lifecycle::RecordService,
    Result,
};

/// Service for records that only carry a restorable name.
pub struct NamedService<T: Named> {
    records: RecordService<T>,
}

impl<T: Named> Clone for NamedService<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

pub type SoilService = NamedService<Soil>;
pub type CropService = NamedService<Crop>;
pub type ProcessingTypeService = NamedService<ProcessingType>;

impl<T: Named> NamedService<T> {
    pub fn new(records: RecordService<T>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &RecordService<T> {
        &self.records
    }

    pub async fn create(&self, name: String) -> Result<T> {
        self.records
            .create(T::build(name, Lifecycle::new(now())))
            .await
    }

    pub async fn update(&self, id: Uuid, name: Option<String>) -> Result<T> {
        let mut record = self.records.find_one(id).await?;
        if let Some(name) = name {
            record.set_name(name);
        }
        self.records.save(record).await
    }
}
