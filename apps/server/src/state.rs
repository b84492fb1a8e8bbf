//! Shared application state

use crate::{
    auth::AuthManager,
    config::Config,
    db::Stores,
    services::{
        CropService, FarmService, FieldService, GrowingCropPeriodService, MachineService,
        ProcessingService, ProcessingTypeService, ReportService, Services, SoilService,
    },
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

pub use crate::config::StorageKind;

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
    pub storage: StorageKind,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
            storage: StorageKind::Postgres,
        }
    }
}

impl AppStateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            run_migrations: config.database.run_migrations,
            storage: config.database.storage,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            run_migrations: false,
            storage: StorageKind::Memory,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthManager>,
    /// `None` when running on in-memory storage.
    pub db_pool: Option<PgPool>,
    pub farm_service: FarmService,
    pub soil_service: SoilService,
    pub crop_service: CropService,
    pub field_service: FieldService,
    pub machine_service: MachineService,
    pub growing_crop_period_service: GrowingCropPeriodService,
    pub processing_type_service: ProcessingTypeService,
    pub processing_service: ProcessingService,
    pub report_service: ReportService,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        let options = AppStateOptions::from_config(&config);
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!(storage = ?options.storage, "Initializing application state...");

        let config = Arc::new(config);

        let (db_pool, stores) = match options.storage {
            StorageKind::Postgres => {
                let pool = create_db_pool(&config).await?;
                if options.run_migrations {
                    tracing::info!("Running database migrations...");
                    sqlx::migrate!("./migrations").run(&pool).await?;
                }
                (Some(pool.clone()), Stores::postgres(pool))
            }
            StorageKind::Memory => (None, Stores::in_memory()),
        };

        let services = Services::new(stores, config.reports.top_farms_limit);
        let auth = Arc::new(AuthManager::new(&config.auth));

        tracing::info!("Application state initialized");

        Ok(Self {
            config,
            auth,
            db_pool,
            farm_service: services.farms,
            soil_service: services.soils,
            crop_service: services.crops,
            field_service: services.fields,
            machine_service: services.machines,
            growing_crop_period_service: services.growing_crop_periods,
            processing_type_service: services.processing_types,
            processing_service: services.processings,
            report_service: services.reports,
        })
    }
}

async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.database.statement_timeout_seconds;
    let lock_timeout = config.database.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database.url)
        .await
        .map_err(crate::Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.database.pool_min_size,
        config.database.pool_max_size
    );

    Ok(pool)
}
