use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateField, Field, UpdateField},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateField>,
) -> Result<(StatusCode, Json<Data<Field>>)> {
    caller.authorize(Capability::Write)?;
    let field = state.field_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(field))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateField>,
) -> Result<Json<Data<Field>>> {
    caller.authorize(Capability::Write)?;
    let field = state.field_service.update(id, input).await?;
    Ok(Json(Data::new(field)))
}
