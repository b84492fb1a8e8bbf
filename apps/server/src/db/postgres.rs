//! PostgreSQL-backed stores.
//!
//! One generic [`PgTable`] serves every record type; the per-type parts (column
//! list and binds) live in [`PgRecord`] impls below.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    db::traits::{RecordStore, ReportStore},
    models::{
        Crop, Farm, FarmMachineCount, FarmSoilCount, Field, FieldCountPerFarmAndCrop,
        GrowingCropPeriod, Machine, Processing, ProcessingReportRow, ProcessingType, Record,
        Reference, Soil, Visibility,
    },
    Error, Result,
};

type PgQueryAs<'q, T> = QueryAs<'q, Postgres, T, PgArguments>;

/// Column mapping for a record stored in its own table.
///
/// Every table has `id`, the business columns and `created_at`, `updated_at`,
/// `deleted_at`.
pub trait PgRecord: Record + for<'r> FromRow<'r, PgRow> + Unpin {
    /// Business columns, in the order [`PgRecord::bind_columns`] binds them.
    const COLUMNS: &'static [&'static str];
    const KEY_COLUMN: Option<&'static str> = None;

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self>;
}

impl PgRecord for Farm {
    const COLUMNS: &'static [&'static str] = &["name", "location"];
    const KEY_COLUMN: Option<&'static str> = Some("name");

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query.bind(&self.name).bind(Json(&self.location))
    }
}

macro_rules! pg_named_record {
    ($record:ty) => {
        impl PgRecord for $record {
            const COLUMNS: &'static [&'static str] = &["name"];
            const KEY_COLUMN: Option<&'static str> = Some("name");

            fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
                query.bind(&self.name)
            }
        }
    };
}

pg_named_record!(Soil);
pg_named_record!(Crop);
pg_named_record!(ProcessingType);

impl PgRecord for Field {
    const COLUMNS: &'static [&'static str] = &["name", "boundary", "farm_id", "soil_id"];
    const KEY_COLUMN: Option<&'static str> = Some("name");

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(&self.name)
            .bind(Json(&self.boundary))
            .bind(self.farm_id)
            .bind(self.soil_id)
    }
}

impl PgRecord for Machine {
    const COLUMNS: &'static [&'static str] = &["brand", "model", "register_number", "farm_id"];
    const KEY_COLUMN: Option<&'static str> = Some("register_number");

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(&self.brand)
            .bind(&self.model)
            .bind(&self.register_number)
            .bind(self.farm_id)
    }
}

impl PgRecord for GrowingCropPeriod {
    const COLUMNS: &'static [&'static str] = &["field_id", "crop_id"];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query.bind(self.field_id).bind(self.crop_id)
    }
}

impl PgRecord for Processing {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "growing_crop_period_id",
        "processing_type_id",
        "machine_id",
    ];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query
            .bind(self.date)
            .bind(self.growing_crop_period_id)
            .bind(self.processing_type_id)
            .bind(self.machine_id)
    }
}

fn active_clause(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Active => " AND deleted_at IS NULL",
        Visibility::WithDeleted => "",
    }
}

/// Maps constraint violations raised by writes to caller-facing errors.
fn write_error<T: Record>(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return Error::Conflict(format!(
                "{} with this {} already exists",
                T::KIND,
                T::KEY_NAME
            ));
        }
        if db.is_foreign_key_violation() {
            return Error::Validation(format!(
                "{} references a record that does not exist",
                T::KIND
            ));
        }
    }
    Error::Database(err)
}

/// The edge behind a foreign-key constraint, by PostgreSQL's default
/// `<table>_<column>_fkey` naming.
fn reference_for_constraint(constraint: &str) -> Option<Reference> {
    Reference::ALL
        .into_iter()
        .find(|r| constraint == format!("{}_{}_fkey", r.child().table(), r.column()))
}

/// Store for one record type backed by the table named after its kind.
pub struct PgTable<T> {
    pool: PgPool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for PgTable<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: PgRecord> PgTable<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn table() -> &'static str {
        T::KIND.table()
    }

    async fn count_dependents(&self, reference: Reference, target: Uuid) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            reference.child().table(),
            reference.column()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(target)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}

#[async_trait]
impl<T: PgRecord> RecordStore<T> for PgTable<T> {
    async fn list(&self, visibility: Visibility) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT * FROM {} WHERE TRUE{} ORDER BY created_at ASC, id ASC",
            Self::table(),
            active_clause(visibility)
        );
        sqlx::query_as::<_, T>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get(&self, id: Uuid, visibility: Visibility) -> Result<Option<T>> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = $1{}",
            Self::table(),
            active_clause(visibility)
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get_by_key(&self, key: &str, visibility: Visibility) -> Result<Option<T>> {
        let Some(column) = T::KEY_COLUMN else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT * FROM {} WHERE {column} = $1{}
             ORDER BY (deleted_at IS NULL) DESC, created_at ASC
             LIMIT 1",
            Self::table(),
            active_clause(visibility)
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn insert(&self, record: &T) -> Result<T> {
        let n = T::COLUMNS.len();
        let placeholders = (1..=n + 4)
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (id, {}, created_at, updated_at, deleted_at)
             VALUES ({placeholders})
             RETURNING *",
            Self::table(),
            T::COLUMNS.join(", ")
        );

        let lifecycle = record.lifecycle();
        let query = sqlx::query_as::<_, T>(&sql).bind(record.id());
        record
            .bind_columns(query)
            .bind(lifecycle.created)
            .bind(lifecycle.updated)
            .bind(lifecycle.deleted)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error::<T>)
    }

    async fn update(&self, record: &T) -> Result<T> {
        let n = T::COLUMNS.len();
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments}, updated_at = ${}, deleted_at = ${}
             WHERE id = $1
             RETURNING *",
            Self::table(),
            n + 2,
            n + 3
        );

        let lifecycle = record.lifecycle();
        let query = sqlx::query_as::<_, T>(&sql).bind(record.id());
        record
            .bind_columns(query)
            .bind(lifecycle.updated)
            .bind(lifecycle.deleted)
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error::<T>)?
            .ok_or(Error::NotFound {
                kind: T::KIND,
                id: record.id(),
            })
    }

    async fn mark_deleted(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let sql = format!(
            "UPDATE {} SET deleted_at = $2, updated_at = $2
             WHERE id = $1 AND deleted_at IS NULL",
            Self::table()
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, id: Uuid) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table());
        match sqlx::query(&sql).bind(id).execute(&self.pool).await {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                // A dependent row appeared after the guard ran.
                let Some(reference) = db.constraint().and_then(reference_for_constraint) else {
                    return Err(Error::Database(sqlx::Error::Database(db)));
                };
                let count = self.count_dependents(reference, id).await?;
                Err(Error::BlockedByReference {
                    kind: T::KIND,
                    id,
                    dependent: reference.child(),
                    count,
                })
            }
            Err(err) => Err(Error::Database(err)),
        }
    }

    async fn count_by(
        &self,
        reference: Reference,
        target: Uuid,
        visibility: Visibility,
    ) -> Result<i64> {
        if reference.child() != T::KIND {
            return Err(Error::Internal(format!(
                "{} table does not hold the {} column of {}",
                T::KIND,
                reference.column(),
                reference.child()
            )));
        }
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1{}",
            Self::table(),
            reference.column(),
            active_clause(visibility)
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(target)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}

/// Report queries. Joins only follow active rows.
#[derive(Clone)]
pub struct PgReports {
    pool: PgPool,
}

impl PgReports {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReports {
    async fn farms_with_most_machines(&self, limit: i64) -> Result<Vec<FarmMachineCount>> {
        sqlx::query_as::<_, FarmMachineCount>(
            "SELECT fa.id AS farm_id, fa.name AS farm_name, COUNT(m.id) AS machine_count
             FROM farm fa
             LEFT JOIN machine m ON m.farm_id = fa.id AND m.deleted_at IS NULL
             WHERE fa.deleted_at IS NULL
             GROUP BY fa.id, fa.name
             ORDER BY machine_count DESC, fa.name ASC, fa.id ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn field_count_per_farm_and_crop(&self) -> Result<Vec<FieldCountPerFarmAndCrop>> {
        sqlx::query_as::<_, FieldCountPerFarmAndCrop>(
            "SELECT fa.id AS farm_id, fa.name AS farm_name,
                    c.id AS crop_id, c.name AS crop_name,
                    COUNT(DISTINCT f.id) AS field_count
             FROM field f
             JOIN farm fa ON fa.id = f.farm_id AND fa.deleted_at IS NULL
             JOIN growing_crop_period g ON g.field_id = f.id AND g.deleted_at IS NULL
             JOIN crop c ON c.id = g.crop_id AND c.deleted_at IS NULL
             WHERE f.deleted_at IS NULL
             GROUP BY fa.id, fa.name, c.id, c.name
             ORDER BY field_count DESC, fa.name ASC, c.name ASC, fa.id ASC, c.id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn most_common_soil_per_farm(&self) -> Result<Vec<FarmSoilCount>> {
        sqlx::query_as::<_, FarmSoilCount>(
            "SELECT * FROM (
                 SELECT DISTINCT ON (fa.id)
                        fa.id AS farm_id, fa.name AS farm_name,
                        s.id AS soil_id, s.name AS soil_name,
                        COUNT(f.id) AS field_count
                 FROM farm fa
                 JOIN field f ON f.farm_id = fa.id AND f.deleted_at IS NULL
                 JOIN soil s ON s.id = f.soil_id AND s.deleted_at IS NULL
                 WHERE fa.deleted_at IS NULL
                 GROUP BY fa.id, fa.name, s.id, s.name
                 ORDER BY fa.id, COUNT(f.id) DESC, s.name ASC, s.id ASC
             ) per_farm
             ORDER BY field_count DESC, farm_name ASC, farm_id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn processing_report(&self) -> Result<Vec<ProcessingReportRow>> {
        sqlx::query_as::<_, ProcessingReportRow>(
            "SELECT p.id AS processing_id, p.date AS processing_date,
                    pt.name AS processing_type_name, f.name AS field_name,
                    m.brand AS machine_brand, m.model AS machine_model,
                    c.name AS crop_name, s.name AS soil_name, fa.name AS farm_name
             FROM processing p
             LEFT JOIN processing_type pt
                    ON pt.id = p.processing_type_id AND pt.deleted_at IS NULL
             LEFT JOIN machine m ON m.id = p.machine_id AND m.deleted_at IS NULL
             LEFT JOIN growing_crop_period g
                    ON g.id = p.growing_crop_period_id AND g.deleted_at IS NULL
             LEFT JOIN field f ON f.id = g.field_id AND f.deleted_at IS NULL
             LEFT JOIN crop c ON c.id = g.crop_id AND c.deleted_at IS NULL
             LEFT JOIN soil s ON s.id = f.soil_id AND s.deleted_at IS NULL
             LEFT JOIN farm fa ON fa.id = f.farm_id AND fa.deleted_at IS NULL
             WHERE p.deleted_at IS NULL
             ORDER BY p.date ASC, p.id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_edges() {
        assert_eq!(
            reference_for_constraint("field_soil_id_fkey"),
            Some(Reference::FieldSoil)
        );
        assert_eq!(
            reference_for_constraint("processing_machine_id_fkey"),
            Some(Reference::ProcessingMachine)
        );
        assert_eq!(reference_for_constraint("farm_name_key"), None);
    }

    #[test]
    fn active_clause_filters_deleted_rows() {
        assert_eq!(active_clause(Visibility::WithDeleted), "");
        assert!(active_clause(Visibility::Active).contains("deleted_at IS NULL"));
    }
}
