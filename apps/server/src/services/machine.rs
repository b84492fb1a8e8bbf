use uuid::Uuid;

use crate::{
    models::{
        now, CreateMachine, EntityKind, Farm, Lifecycle, Machine, Reference, TransferMachine,
        UpdateMachine, Visibility,
    },
    services::lifecycle::RecordService,
    Error, Result,
};

#[derive(Clone)]
pub struct MachineService {
    records: RecordService<Machine>,
    farms: RecordService<Farm>,
}

impl MachineService {
    pub fn new(records: RecordService<Machine>, farms: RecordService<Farm>) -> Self {
        Self { records, farms }
    }

    pub fn records(&self) -> &RecordService<Machine> {
        &self.records
    }

    pub async fn create(&self, input: CreateMachine) -> Result<Machine> {
        self.farms.require(input.farm_id).await?;
        self.records
            .create(input.into_record(Lifecycle::new(now())))
            .await
    }

    pub async fn update(&self, id: Uuid, input: UpdateMachine) -> Result<Machine> {
        let mut machine = self.records.find_one(id).await?;
        input.apply(&mut machine);
        self.records.save(machine).await
    }

    /// Moves a machine to another farm. Not allowed while active processing
    /// records use it, since they would then span two farms.
    pub async fn transfer(&self, id: Uuid, input: TransferMachine) -> Result<Machine> {
        let mut machine = self.records.find_one(id).await?;
        if machine.farm_id == input.new_farm_id {
            return Ok(machine);
        }
        self.farms.require(input.new_farm_id).await?;

        let count = self
            .records
            .guard()
            .count(Reference::ProcessingMachine, id, Visibility::Active)
            .await?;
        if count > 0 {
            tracing::debug!(id = %id, count, "Machine transfer blocked by processing records");
            return Err(Error::BlockedByReference {
                kind: EntityKind::Machine,
                id,
                dependent: EntityKind::Processing,
                count,
            });
        }

        let from = machine.farm_id;
        machine.farm_id = input.new_farm_id;
        let machine = self.records.save(machine).await?;
        tracing::info!(
            id = %id,
            from_farm = %from,
            to_farm = %machine.farm_id,
            "Machine transferred"
        );
        Ok(machine)
    }
}
