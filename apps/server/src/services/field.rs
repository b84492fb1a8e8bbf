use uuid::Uuid;

use crate::{
    models::{now, CreateField, Farm, Field, Lifecycle, Soil, UpdateField},
    services::lifecycle::RecordService,
    Result,
};

#[derive(Clone)]
pub struct FieldService {
    records: RecordService<Field>,
    farms: RecordService<Farm>,
    soils: RecordService<Soil>,
}

impl FieldService {
    pub fn new(
        records: RecordService<Field>,
        farms: RecordService<Farm>,
        soils: RecordService<Soil>,
    ) -> Self {
        Self {
            records,
            farms,
            soils,
        }
    }

    pub fn records(&self) -> &RecordService<Field> {
        &self.records
    }

    /// Field names are unique among active fields only, so a create never
    /// restores a soft-deleted field.
    pub async fn create(&self, input: CreateField) -> Result<Field> {
        self.farms.require(input.farm_id).await?;
        self.soils.require(input.soil_id).await?;
        self.records
            .create(input.into_record(Lifecycle::new(now())))
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateField) -> Result<Field> {
        let mut field = self.records.find_one(id).await?;
        if let Some(soil_id) = input.soil_id.filter(|s| *s != field.soil_id) {
            self.soils.require(soil_id).await?;
        }
        input.apply(&mut field);
        self.records.save(field).await
    }
}
