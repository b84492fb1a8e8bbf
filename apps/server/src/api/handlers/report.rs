use axum::{extract::State, Json};

use crate::{
    api::handlers::Data,
    auth::{Caller, Capability},
    models::{FarmMachineCount, FarmSoilCount, FieldCountPerFarmAndCrop, ProcessingReportRow},
    state::AppState,
    Result,
};

/// Farms ranked by active machine count, limited by `reports.top_farms_limit`.
pub async fn farms_with_most_machines(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Data<Vec<FarmMachineCount>>>> {
    caller.authorize(Capability::Read)?;
    let rows = state.report_service.farms_with_most_machines().await?;
    Ok(Json(Data::new(rows)))
}

pub async fn field_count_per_farm_and_crop(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Data<Vec<FieldCountPerFarmAndCrop>>>> {
    caller.authorize(Capability::Read)?;
    let rows = state.report_service.field_count_per_farm_and_crop().await?;
    Ok(Json(Data::new(rows)))
}

pub async fn most_common_soil_per_farm(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Data<Vec<FarmSoilCount>>>> {
    caller.authorize(Capability::Read)?;
    let rows = state.report_service.most_common_soil_per_farm().await?;
    Ok(Json(Data::new(rows)))
}

pub async fn processing_report(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Data<Vec<ProcessingReportRow>>>> {
    caller.authorize(Capability::Read)?;
    let rows = state.report_service.processing_report().await?;
    Ok(Json(Data::new(rows)))
}
