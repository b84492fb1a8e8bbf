use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateFarm, Farm, UpdateFarm},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateFarm>,
) -> Result<(StatusCode, Json<Data<Farm>>)> {
    caller.authorize(Capability::Write)?;
    let farm = state.farm_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(farm))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateFarm>,
) -> Result<Json<Data<Farm>>> {
    caller.authorize(Capability::Write)?;
    let farm = state.farm_service.update(id, input).await?;
    Ok(Json(Data::new(farm)))
}
