//! Read-only report rows. All reports consider active records only.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FarmMachineCount {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub machine_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FieldCountPerFarmAndCrop {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub crop_id: Uuid,
    pub crop_name: String,
    pub field_count: i64,
}

/// The soil covering the most fields of one farm.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FarmSoilCount {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub soil_id: Uuid,
    pub soil_name: String,
    pub field_count: i64,
}

/// A processing event joined with everything it touches. Joined names are
/// `None` when the referenced row is soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReportRow {
    pub processing_id: Uuid,
    pub processing_date: NaiveDate,
    pub processing_type_name: Option<String>,
    pub field_name: Option<String>,
    pub machine_brand: Option<String>,
    pub machine_model: Option<String>,
    pub crop_name: Option<String>,
    pub soil_name: Option<String>,
    pub farm_name: Option<String>,
}
