use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateProcessingType, ProcessingType, UpdateProcessingType},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateProcessingType>,
) -> Result<(StatusCode, Json<Data<ProcessingType>>)> {
    caller.authorize(Capability::Write)?;
    let record = state.processing_type_service.create(input.name).await?;
    Ok((StatusCode::CREATED, Json(Data::new(record))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateProcessingType>,
) -> Result<Json<Data<ProcessingType>>> {
    caller.authorize(Capability::Write)?;
    let record = state.processing_type_service.update(id, input.name).await?;
    Ok(Json(Data::new(record)))
}
