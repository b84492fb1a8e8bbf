use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{
        extract::{IdPath, ValidatedJson},
        handlers::Data,
    },
    auth::{Caller, Capability},
    models::{CreateMachine, Machine, TransferMachine, UpdateMachine},
    state::AppState,
    Result,
};

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ValidatedJson(input): ValidatedJson<CreateMachine>,
) -> Result<(StatusCode, Json<Data<Machine>>)> {
    caller.authorize(Capability::Write)?;
    let machine = state.machine_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(Data::new(machine))))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateMachine>,
) -> Result<Json<Data<Machine>>> {
    caller.authorize(Capability::Write)?;
    let machine = state.machine_service.update(id, input).await?;
    Ok(Json(Data::new(machine)))
}

/// `PATCH /machine/:id/transfer`
pub async fn transfer(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<TransferMachine>,
) -> Result<Json<Data<Machine>>> {
    caller.authorize(Capability::Write)?;
    let machine = state.machine_service.transfer(id, input).await?;
    Ok(Json(Data::new(machine)))
}
