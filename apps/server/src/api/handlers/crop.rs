use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateCrop, Crop, UpdateCrop},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateCrop>,
) -> Result<(StatusCode, Json<Data<Crop>>)> {
    caller.authorize(Capability::Write)?;
    let record = state.crop_service.create(input.name).await?;
    Ok((StatusCode::CREATED, Json(Data::new(record))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateCrop>,
) -> Result<Json<Data<Crop>>> {
    caller.authorize(Capability::Write)?;
    let record = state.crop_service.update(id, input.name).await?;
    Ok(Json(Data::new(record)))
}
