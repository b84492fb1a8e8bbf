//! Read and delete handlers shared by every resource path.

use axum::{extract::State, Json};

use crate::{
    api::{extract::IdPath, handlers::Data},
    auth::{Caller, Capability},
    models::{
        Crop, DeleteSummary, Farm, Field, GrowingCropPeriod, Machine, Processing,
        ProcessingType, Record, Soil,
    },
    services::RecordService,
    state::AppState,
    Result,
};

/// Resolves the lifecycle service for `T` from the shared state.
pub trait RecordsOf<T: Record> {
    fn records(&self) -> &RecordService<T>;
}

macro_rules! records_of {
    ($record:ty, $service:ident) => {
        impl RecordsOf<$record> for AppState {
            fn records(&self) -> &RecordService<$record> {
                self.$service.records()
            }
        }
    };
}

records_of!(Farm, farm_service);
records_of!(Soil, soil_service);
records_of!(Crop, crop_service);
records_of!(Field, field_service);
records_of!(Machine, machine_service);
records_of!(GrowingCropPeriod, growing_crop_period_service);
records_of!(ProcessingType, processing_type_service);
records_of!(Processing, processing_service);

pub async fn list<T>(State(state): State<AppState>, caller: Caller) -> Result<Json<Data<Vec<T>>>>
where
    T: Record,
    AppState: RecordsOf<T>,
{
    caller.authorize(Capability::Read)?;
    let records = RecordsOf::<T>::records(&state).find_all().await?;
    Ok(Json(Data::new(records)))
}

pub async fn get<T>(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
) -> Result<Json<Data<T>>>
where
    T: Record,
    AppState: RecordsOf<T>,
{
    caller.authorize(Capability::Read)?;
    let record = RecordsOf::<T>::records(&state).find_one(id).await?;
    Ok(Json(Data::new(record)))
}

pub async fn soft_delete<T>(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
) -> Result<Json<DeleteSummary>>
where
    T: Record,
    AppState: RecordsOf<T>,
{
    caller.authorize(Capability::Write)?;
    let summary = RecordsOf::<T>::records(&state).soft_delete(id).await?;
    Ok(Json(summary))
}

pub async fn permanent_delete<T>(
    State(state): State<AppState>,
    caller: Caller,
    IdPath(id): IdPath,
) -> Result<Json<DeleteSummary>>
where
    T: Record,
    AppState: RecordsOf<T>,
{
    caller.authorize(Capability::Purge)?;
    let summary = RecordsOf::<T>::records(&state).permanent_delete(id).await?;
    Ok(Json(summary))
}
