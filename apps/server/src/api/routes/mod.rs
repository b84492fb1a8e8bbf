use crate::api::handlers::{
    crop, farm, field, growing_crop_period, health, machine, processing, processing_type,
    records, report, soil,
};
use crate::models::{
    Crop, Farm, Field, GrowingCropPeriod, Machine, Processing, ProcessingType, Soil,
};
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch},
    Router,
};

/// `GET|POST /{res}`, `GET|PATCH|DELETE /{res}/:id` and
/// `DELETE /{res}/:id/permanent` for one record type.
macro_rules! resource {
    ($router:expr, $path:literal, $record:ty, $handlers:ident) => {
        $router
            .route(
                $path,
                get(records::list::<$record>).post($handlers::create),
            )
            .route(
                concat!($path, "/:id"),
                get(records::get::<$record>)
                    .patch($handlers::update)
                    .delete(records::soft_delete::<$record>),
            )
            .route(
                concat!($path, "/:id/permanent"),
                delete(records::permanent_delete::<$record>),
            )
    };
}

pub fn resource_routes() -> Router<AppState> {
    let router = Router::new();
    let router = resource!(router, "/farm", Farm, farm);
    let router = resource!(router, "/field", Field, field);
    let router = resource!(router, "/soil", Soil, soil);
    let router = resource!(router, "/crop", Crop, crop);
    let router = resource!(router, "/machine", Machine, machine);
    let router = resource!(
        router,
        "/growingCropPeriod",
        GrowingCropPeriod,
        growing_crop_period
    );
    let router = resource!(router, "/processingType", ProcessingType, processing_type);
    let router = resource!(router, "/processing", Processing, processing);

    router.route("/machine/:id/transfer", patch(machine::transfer))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/farms-with-most-machines",
            get(report::farms_with_most_machines),
        )
        .route(
            "/field-count-per-farm-and-crop",
            get(report::field_count_per_farm_and_crop),
        )
        .route(
            "/most-common-soil-per-farm",
            get(report::most_common_soil_per_farm),
        )
        .route("/processing-report", get(report::processing_report))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}
