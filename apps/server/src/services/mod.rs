//! Business logic layer
//!
//! Services apply the per-entity rules on top of the stores: reference checks,
//! unique keys with restore, the delete guard and the processing farm rule.

pub mod farm;
pub mod field;
pub mod growing_crop_period;
pub mod guard;
pub mod lifecycle;
pub mod machine;
pub mod named;
pub mod processing;
pub mod report;

pub use farm::FarmService;
pub use field::FieldService;
pub use growing_crop_period::GrowingCropPeriodService;
pub use guard::ReferenceGuard;
pub use lifecycle::RecordService;
pub use machine::MachineService;
pub use named::{CropService, NamedService, ProcessingTypeService, SoilService};
pub use processing::ProcessingService;
pub use report::ReportService;

use crate::db::Stores;

/// Every service, wired against one set of stores.
#[derive(Clone)]
pub struct Services {
    pub farms: FarmService,
    pub soils: SoilService,
    pub crops: CropService,
    pub fields: FieldService,
    pub machines: MachineService,
    pub growing_crop_periods: GrowingCropPeriodService,
    pub processing_types: ProcessingTypeService,
    pub processings: ProcessingService,
    pub reports: ReportService,
}

impl Services {
    pub fn new(stores: Stores, top_farms_limit: u32) -> Self {
        let guard = ReferenceGuard::new(stores.clone());

        let farms = RecordService::new(stores.farms.clone(), guard.clone());
        let soils = RecordService::new(stores.soils.clone(), guard.clone());
        let crops = RecordService::new(stores.crops.clone(), guard.clone());
        let fields = RecordService::new(stores.fields.clone(), guard.clone());
        let machines = RecordService::new(stores.machines.clone(), guard.clone());
        let periods = RecordService::new(stores.periods.clone(), guard.clone());
        let processing_types = RecordService::new(stores.processing_types.clone(), guard.clone());
        let processings = RecordService::new(stores.processings.clone(), guard);

        Self {
            farms: FarmService::new(farms.clone()),
            soils: NamedService::new(soils.clone()),
            crops: NamedService::new(crops.clone()),
            fields: FieldService::new(fields.clone(), farms.clone(), soils),
            machines: MachineService::new(machines.clone(), farms),
            growing_crop_periods: GrowingCropPeriodService::new(
                periods.clone(),
                fields.clone(),
                crops,
            ),
            processing_types: NamedService::new(processing_types.clone()),
            processings: ProcessingService::new(
                processings,
                periods,
                processing_types,
                machines,
                fields,
            ),
            reports: ReportService::new(stores.reports.clone(), top_farms_limit),
        }
    }
}
