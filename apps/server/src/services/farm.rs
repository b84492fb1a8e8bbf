use uuid::Uuid;

use crate::{
    models::{now, CreateFarm, Farm, Lifecycle, UpdateFarm},
    services::lifecycle::RecordService,
    Result,
};

#[derive(Clone)]
pub struct FarmService {
    records: RecordService<Farm>,
}

impl FarmService {
    pub fn new(records: RecordService<Farm>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &RecordService<Farm> {
        &self.records
    }

    pub async fn create(&self, input: CreateFarm) -> Result<Farm> {
        self.records
            .create(input.into_record(Lifecycle::new(now())))
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateFarm) -> Result<Farm> {
        let mut farm = self.records.find_one(id).await?;
        input.apply(&mut farm);
        self.records.save(farm).await
    }
}
