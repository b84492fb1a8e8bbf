use uuid::Uuid;

use crate::{
    models::{
        now, CreateProcessing, Field, GrowingCropPeriod, Lifecycle, Machine, Processing,
        ProcessingType, UpdateProcessing,
    },
    services::lifecycle::RecordService,
    Error, Result,
};

#[derive(Clone)]
pub struct ProcessingService {
    records: RecordService<Processing>,
    periods: RecordService<GrowingCropPeriod>,
    processing_types: RecordService<ProcessingType>,
    machines: RecordService<Machine>,
    fields: RecordService<Field>,
}

impl ProcessingService {
    pub fn new(
        records: RecordService<Processing>,
        periods: RecordService<GrowingCropPeriod>,
        processing_types: RecordService<ProcessingType>,
        machines: RecordService<Machine>,
        fields: RecordService<Field>,
    ) -> Self {
        Self {
            records,
            periods,
            processing_types,
            machines,
            fields,
        }
    }

    pub fn records(&self) -> &RecordService<Processing> {
        &self.records
    }

    pub async fn create(&self, input: CreateProcessing) -> Result<Processing> {
        let period = self.periods.require(input.growing_crop_period_id).await?;
        self.processing_types.require(input.processing_type_id).await?;
        let machine = self.machines.require(input.machine_id).await?;
        self.ensure_same_farm(&period, &machine).await?;

        self.records
            .create(input.into_record(Lifecycle::new(now())))
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateProcessing) -> Result<Processing> {
        let mut processing = self.records.find_one(id).await?;
        let recheck_farm = input.moves_period_or_machine();

        if let Some(type_id) = input
            .processing_type_id
            .filter(|t| *t != processing.processing_type_id)
        {
            self.processing_types.require(type_id).await?;
        }

        input.apply(&mut processing);

        if recheck_farm {
            let period = self
                .periods
                .require(processing.growing_crop_period_id)
                .await?;
            let machine = self.machines.require(processing.machine_id).await?;
            self.ensure_same_farm(&period, &machine).await?;
        }

        self.records.save(processing).await
    }

    /// The period's field and the machine must belong to the same farm.
    async fn ensure_same_farm(&self, period: &GrowingCropPeriod, machine: &Machine) -> Result<()> {
        let field = self.fields.require(period.field_id).await?;
        if field.farm_id != machine.farm_id {
            tracing::debug!(
                field_farm = %field.farm_id,
                machine_farm = %machine.farm_id,
                "Processing rejected: machine and field on different farms"
            );
            return Err(Error::Validation(
                "The machine and the growing crop period's field must belong to the same farm"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
