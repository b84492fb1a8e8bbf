use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateGrowingCropPeriod, GrowingCropPeriod, UpdateGrowingCropPeriod},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateGrowingCropPeriod>,
) -> Result<(StatusCode, Json<Data<GrowingCropPeriod>>)> {
    caller.authorize(Capability::Write)?;
    let period = state.growing_crop_period_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(period))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateGrowingCropPeriod>,
) -> Result<Json<Data<GrowingCropPeriod>>> {
    caller.authorize(Capability::Write)?;
    let period = state.growing_crop_period_service.update(id, input).await?;
    Ok(Json(Data::new(period)))
}
