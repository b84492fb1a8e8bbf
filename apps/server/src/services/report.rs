use std::sync::Arc;

use crate::{
    db::ReportStore,
    models::{FarmMachineCount, FarmSoilCount, FieldCountPerFarmAndCrop, ProcessingReportRow},
    Result,
};

#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportStore>,
    top_farms_limit: i64,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportStore>, top_farms_limit: u32) -> Self {
        Self {
            reports,
            top_farms_limit: i64::from(top_farms_limit),
        }
    }

    pub async fn farms_with_most_machines(&self) -> Result<Vec<FarmMachineCount>> {
        self.reports
            .farms_with_most_machines(self.top_farms_limit)
            .await
    }

    pub async fn field_count_per_farm_and_crop(&self) -> Result<Vec<FieldCountPerFarmAndCrop>> {
        self.reports.field_count_per_farm_and_crop().await
    }

    pub async fn most_common_soil_per_farm(&self) -> Result<Vec<FarmSoilCount>> {
        self.reports.most_common_soil_per_farm().await
    }

    pub async fn processing_report(&self) -> Result<Vec<ProcessingReportRow>> {
        self.reports.processing_report().await
    }
}
