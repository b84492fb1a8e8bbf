#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use support::*;

fn timestamp(record: &Value, name: &str) -> DateTime<Utc> {
    record[name]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("missing timestamp '{name}' in {record}"))
}

#[tokio::test]
async fn created_record_is_active_and_readable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Green Acres").await?;
            assert_eq!(farm["name"], "Green Acres");
            assert_eq!(farm["location"]["type"], "Point");
            assert!(farm["deleted"].is_null());
            assert_eq!(timestamp(&farm, "created"), timestamp(&farm, "updated"));

            let id = id_of(&farm);
            let (status, body) = app.json(Method::GET, &format!("/farm/{id}"), None).await?;
            assert_status(status, StatusCode::OK, "get farm");
            assert_eq!(body["data"], farm);

            let (status, body) = app.json(Method::GET, "/farm", None).await?;
            assert_status(status, StatusCode::OK, "list farms");
            assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn names_are_trimmed() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let soil = app.create_soil("  Chernozem ").await?;
            assert_eq!(soil["name"], "Chernozem");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn soft_deleted_record_disappears_from_reads() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let crop = app.create_crop("Barley").await?;
            let id = id_of(&crop);

            let (status, body) = app.json(Method::DELETE, &format!("/crop/{id}"), None).await?;
            assert_status(status, StatusCode::OK, "soft delete crop");
            assert_eq!(body["id"], id.as_str());
            assert_eq!(body["name"], "Barley");
            assert_eq!(
                body["message"],
                format!("Successfully soft-deleted Crop with id {id}")
            );

            let (status, body) = app.json(Method::GET, &format!("/crop/{id}"), None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "get soft-deleted crop");
            assert_eq!(body["message"], format!("Crop with id {id} not found"));

            let (_, body) = app.json(Method::GET, "/crop", None).await?;
            assert_eq!(body["data"], json!([]));

            let (status, _) = app.json(Method::DELETE, &format!("/crop/{id}"), None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "second soft delete");

            let (status, _) = app
                .json(Method::PATCH, &format!("/crop/{id}"), Some(json!({ "name": "Oats" })))
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "update soft-deleted crop");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn create_with_soft_deleted_name_restores_the_record() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Old Mill").await?;
            let id = id_of(&farm);
            let (status, _) = app.json(Method::DELETE, &format!("/farm/{id}"), None).await?;
            assert_status(status, StatusCode::OK, "soft delete farm");

            let restored = app
                .create(
                    "/farm",
                    json!({ "name": "Old Mill", "location": { "type": "Point", "coordinates": [20.5, 44.8] } }),
                )
                .await?;
            assert_eq!(restored["id"], farm["id"]);
            assert_eq!(restored["created"], farm["created"]);
            assert!(restored["deleted"].is_null());
            assert_eq!(restored["location"]["coordinates"], json!([20.5, 44.8]));
            assert!(timestamp(&restored, "updated") >= timestamp(&farm, "updated"));

            let (status, _) = app.json(Method::GET, &format!("/farm/{id}"), None).await?;
            assert_status(status, StatusCode::OK, "get restored farm");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn machine_restores_by_register_number() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Valley").await?;
            let machine = app.create_machine("NS-001-AA", &id_of(&farm)).await?;
            let id = id_of(&machine);

            let (status, body) = app.json(Method::DELETE, &format!("/machine/{id}"), None).await?;
            assert_status(status, StatusCode::OK, "soft delete machine");
            assert_eq!(body["name"], "John Deere 6120M (NS-001-AA)");

            let restored = app
                .create(
                    "/machine",
                    json!({
                        "brand": "Fendt",
                        "model": "724 Vario",
                        "registerNumber": "NS-001-AA",
                        "farmId": id_of(&farm),
                    }),
                )
                .await?;
            assert_eq!(restored["id"], machine["id"]);
            assert_eq!(restored["brand"], "Fendt");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_active_key_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.create_soil("Loam").await?;
            let (status, body) = app
                .json(Method::POST, "/soil", Some(json!({ "name": "Loam" })))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate soil");
            assert_eq!(body["statusCode"], 409);
            assert_eq!(body["error"], "Conflict");
            assert_eq!(body["message"], "Soil with this name already exists");
            assert_eq!(app.list_len("/soil").await?, 1);

            let farm = app.create_farm("Hill").await?;
            app.create_machine("SU-777-BB", &id_of(&farm)).await?;
            let (status, body) = app
                .json(
                    Method::POST,
                    "/machine",
                    Some(json!({
                        "brand": "Claas",
                        "model": "Axion",
                        "registerNumber": "SU-777-BB",
                        "farmId": id_of(&farm),
                    })),
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate register number");
            assert_eq!(
                body["message"],
                "Machine with this registerNumber already exists"
            );
            assert_eq!(app.list_len("/machine").await?, 1);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn racing_creates_of_one_key_yield_one_record() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = json!({ "name": "Loam" });
            let (first, second) = tokio::join!(
                app.json(Method::POST, "/soil", Some(body.clone())),
                app.json(Method::POST, "/soil", Some(body.clone())),
            );
            let mut statuses = [first?.0, second?.0];
            statuses.sort();
            assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
            assert_eq!(app.list_len("/soil").await?, 1);

            let (first, second) = tokio::join!(
                app.state.soil_service.create("Clay".to_string()),
                app.state.soil_service.create("Clay".to_string()),
            );
            assert_eq!(
                [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
                1
            );
            assert!(matches!(
                first.err().or(second.err()),
                Some(farmstead::Error::Conflict(_))
            ));
            assert_eq!(app.list_len("/soil").await?, 2);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn field_name_is_reusable_after_soft_delete() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Riverside").await?;
            let soil = app.create_soil("Sand").await?;
            let field = app
                .create_field("North Parcel", &id_of(&farm), &id_of(&soil))
                .await?;

            let (status, _) = app
                .json(
                    Method::POST,
                    "/field",
                    Some(json!({
                        "name": "North Parcel",
                        "boundary": square_boundary(),
                        "farmId": id_of(&farm),
                        "soilId": id_of(&soil),
                    })),
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate active field");

            let (status, _) = app
                .json(Method::DELETE, &format!("/field/{}", id_of(&field)), None)
                .await?;
            assert_status(status, StatusCode::OK, "soft delete field");

            let again = app
                .create_field("North Parcel", &id_of(&farm), &id_of(&soil))
                .await?;
            assert_ne!(again["id"], field["id"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Meadow").await?;
            let id = id_of(&farm);

            let (status, body) = app
                .json(
                    Method::PATCH,
                    &format!("/farm/{id}"),
                    Some(json!({ "location": { "type": "Point", "coordinates": [21.0, 44.0] } })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update farm");
            let updated = &body["data"];
            assert_eq!(updated["name"], "Meadow");
            assert_eq!(updated["location"]["coordinates"], json!([21.0, 44.0]));
            assert_eq!(updated["created"], farm["created"]);
            assert!(timestamp(updated, "updated") >= timestamp(&farm, "updated"));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn rename_onto_taken_key_conflicts() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.create_processing_type("Ploughing").await?;
            let spraying = app.create_processing_type("Spraying").await?;
            let path = format!("/processingType/{}", id_of(&spraying));

            let (status, _) = app
                .json(Method::PATCH, &path, Some(json!({ "name": "Ploughing" })))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "rename onto active name");

            let (status, body) = app
                .json(Method::PATCH, &path, Some(json!({ "name": "Spraying" })))
                .await?;
            assert_status(status, StatusCode::OK, "rename onto own name");
            assert_eq!(body["data"]["name"], "Spraying");

            let harrowing = app.create_processing_type("Harrowing").await?;
            app.json(
                Method::DELETE,
                &format!("/processingType/{}", id_of(&harrowing)),
                None,
            )
            .await?;
            let (status, _) = app
                .json(Method::PATCH, &path, Some(json!({ "name": "Harrowing" })))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "rename onto soft-deleted name");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn permanent_delete_removes_soft_deleted_record() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let soil = app.create_soil("Peat").await?;
            let id = id_of(&soil);

            app.json(Method::DELETE, &format!("/soil/{id}"), None).await?;
            let (status, body) = app
                .json(Method::DELETE, &format!("/soil/{id}/permanent"), None)
                .await?;
            assert_status(status, StatusCode::OK, "purge soil");
            assert_eq!(
                body["message"],
                format!("Successfully permanently deleted Soil with id {id}")
            );

            let (status, _) = app
                .json(Method::DELETE, &format!("/soil/{id}/permanent"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "purge twice");

            let recreated = app.create_soil("Peat").await?;
            assert_ne!(recreated["id"], soil["id"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn processing_delete_summary_carries_the_date() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Orchard").await?;
            let soil = app.create_soil("Silt").await?;
            let crop = app.create_crop("Maize").await?;
            let kind = app.create_processing_type("Sowing").await?;
            let field = app.create_field("East", &id_of(&farm), &id_of(&soil)).await?;
            let machine = app.create_machine("ZR-100-CC", &id_of(&farm)).await?;
            let period = app.create_period(&id_of(&field), &id_of(&crop)).await?;
            let processing = app
                .create_processing(
                    "2024-04-15",
                    &id_of(&period),
                    &id_of(&kind),
                    &id_of(&machine),
                )
                .await?;

            let (status, body) = app
                .json(
                    Method::DELETE,
                    &format!("/processing/{}", id_of(&processing)),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "soft delete processing");
            assert_eq!(body["date"], "2024-04-15");
            assert!(body.get("name").is_none());
            Ok(())
        })
    })
    .await
}
