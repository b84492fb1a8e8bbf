use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateProcessing, Processing, UpdateProcessing},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateProcessing>,
) -> Result<(StatusCode, Json<Data<Processing>>)> {
    caller.authorize(Capability::Write)?;
    let processing = state.processing_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(processing))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProcessing>,
) -> Result<Json<Data<Processing>>> {
    caller.authorize(Capability::Write)?;
    let processing = state.processing_service.update(id, input).await?;
    Ok(Json(Data::new(processing)))
}
