use uuid::Uuid;

use crate::{
    models::{
        now, CreateGrowingCropPeriod, Crop, Field, GrowingCropPeriod, Lifecycle, Reference,
        UpdateGrowingCropPeriod, Visibility,
    },
    services::lifecycle::RecordService,
    Error, Result,
};

#[derive(Clone)]
pub struct GrowingCropPeriodService {
    records: RecordService<GrowingCropPeriod>,
    fields: RecordService<Field>,
    crops: RecordService<Crop>,
}

impl GrowingCropPeriodService {
    pub fn new(
        records: RecordService<GrowingCropPeriod>,
        fields: RecordService<Field>,
        crops: RecordService<Crop>,
    ) -> Self {
        Self {
            records,
            fields,
            crops,
        }
    }

    pub fn records(&self) -> &RecordService<GrowingCropPeriod> {
        &self.records
    }

    pub async fn create(&self, input: CreateGrowingCropPeriod) -> Result<GrowingCropPeriod> {
        self.fields.require(input.field_id).await?;
        self.crops.require(input.crop_id).await?;
        self.records
            .create(input.into_record(Lifecycle::new(now())))
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateGrowingCropPeriod,
    ) -> Result<GrowingCropPeriod> {
        let mut period = self.records.find_one(id).await?;

        if let Some(field_id) = input.field_id.filter(|f| *f != period.field_id) {
            let target = self.fields.require(field_id).await?;
            let current = self.fields.find_one_with_deleted(period.field_id).await?;
            if target.farm_id != current.farm_id {
                self.ensure_no_processing(id).await?;
            }
        }
        if let Some(crop_id) = input.crop_id.filter(|c| *c != period.crop_id) {
            self.crops.require(crop_id).await?;
        }

        input.apply(&mut period);
        self.records.save(period).await
    }

    /// Active processing records pin a period to its farm.
    async fn ensure_no_processing(&self, id: Uuid) -> Result<()> {
        let count = self
            .records
            .guard()
            .count(Reference::ProcessingPeriod, id, Visibility::Active)
            .await?;
        if count > 0 {
            return Err(Error::Validation(format!(
                "Growing crop period with id {id} has {count} processing record(s) and cannot move to a field of another farm"
            )));
        }
        Ok(())
    }
}
