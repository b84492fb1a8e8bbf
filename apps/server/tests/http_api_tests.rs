#[allow(unused)]
mod support;

use axum::{
    body::Body,
    http::{Method, StatusCode},
};
use farmstead::auth::Role;
use serde_json::json;
use support::*;

#[tokio::test]
async fn requests_without_token_are_unauthorized() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) =
                app.request_as(None, Method::GET, "/farm", None).await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "list without token");
            let body = json_of(&body)?;
            assert_eq!(body["statusCode"], 401);
            assert_eq!(body["error"], "Unauthorized");

            let (status, _headers, _body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/report/processing-report",
                    None,
                    &[("authorization", "Bearer not-a-jwt")],
                )
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "garbage token");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn viewer_reads_but_cannot_write() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Viewpoint").await?;
            let id = id_of(&farm);

            let (status, _, _) = app
                .request_as(Some(Role::Viewer), Method::GET, &format!("/farm/{id}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "viewer get");

            let (status, _, _) = app
                .request_as(
                    Some(Role::Viewer),
                    Method::GET,
                    "/report/farms-with-most-machines",
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "viewer report");

            let body = to_json_body(&json!({ "name": "Clay" }))?;
            let (status, _, body) = app
                .request_as(Some(Role::Viewer), Method::POST, "/soil", Some(body))
                .await?;
            assert_status(status, StatusCode::FORBIDDEN, "viewer create");
            assert_eq!(json_of(&body)?["statusCode"], 403);

            let (status, _, _) = app
                .request_as(
                    Some(Role::Viewer),
                    Method::DELETE,
                    &format!("/farm/{id}"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::FORBIDDEN, "viewer delete");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn operator_writes_but_cannot_purge() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = to_json_body(&json!({ "name": "Oats" }))?;
            let (status, _, body) = app
                .request_as(Some(Role::Operator), Method::POST, "/crop", Some(body))
                .await?;
            assert_status(status, StatusCode::CREATED, "operator create");
            let id = id_of(&json_of(&body)?["data"]);

            let (status, _, _) = app
                .request_as(
                    Some(Role::Operator),
                    Method::DELETE,
                    &format!("/crop/{id}/permanent"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::FORBIDDEN, "operator purge");

            let (status, _, _) = app
                .request_as(
                    Some(Role::Operator),
                    Method::DELETE,
                    &format!("/crop/{id}"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "operator soft delete");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn disabled_auth_runs_as_owner() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.auth.enabled = false,
        |app| {
            Box::pin(async move {
                let body = to_json_body(&json!({ "name": "Basalt" }))?;
                let (status, _, body) = app
                    .request_as(None, Method::POST, "/soil", Some(body))
                    .await?;
                assert_status(status, StatusCode::CREATED, "anonymous create");
                let id = id_of(&json_of(&body)?["data"]);

                let (status, _, _) = app
                    .request_as(
                        None,
                        Method::DELETE,
                        &format!("/soil/{id}/permanent"),
                        None,
                    )
                    .await?;
                assert_status(status, StatusCode::OK, "anonymous purge");
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.json(Method::GET, "/farm/not-a-uuid", None).await?;
            assert_status(status, StatusCode::BAD_REQUEST, "bad id");
            assert_eq!(body["statusCode"], 400);
            assert_eq!(body["error"], "Bad Request");

            let (status, _, _) = app
                .request(Method::POST, "/farm", Some(Body::from("{ not json")))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "broken json");

            let (status, _) = app
                .json(
                    Method::POST,
                    "/farm",
                    Some(json!({ "location": { "type": "Point", "coordinates": [1.0, 2.0] } })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "missing name");

            let (status, _) = app
                .json(
                    Method::POST,
                    "/farm",
                    Some(json!({ "name": "   ", "location": { "type": "Point", "coordinates": [1.0, 2.0] } })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "blank name");

            let (status, _) = app
                .json(
                    Method::POST,
                    "/farm",
                    Some(json!({ "name": "Far Away", "location": { "type": "Point", "coordinates": [200.0, 2.0] } })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "longitude out of range");

            let (status, _) = app
                .json(Method::POST, "/soil", Some(json!({ "name": "Clay<script>" })))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "name with markup");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn field_boundary_must_be_a_closed_polygon() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let farm = app.create_farm("Geometry").await?;
            let soil = app.create_soil("Loam").await?;

            let (status, _) = app
                .json(
                    Method::POST,
                    "/field",
                    Some(json!({
                        "name": "Open",
                        "boundary": {
                            "type": "Polygon",
                            "coordinates": [[[19.80, 45.20], [19.81, 45.20], [19.81, 45.21], [19.80, 45.21]]]
                        },
                        "farmId": id_of(&farm),
                        "soilId": id_of(&soil),
                    })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "open ring");

            let field = app
                .create(
                    "/field",
                    json!({
                        "name": "Twin",
                        "boundary": {
                            "type": "MultiPolygon",
                            "coordinates": [
                                [[[19.80, 45.20], [19.81, 45.20], [19.81, 45.21], [19.80, 45.20]]],
                                [[[19.90, 45.20], [19.91, 45.20], [19.91, 45.21], [19.90, 45.20]]]
                            ]
                        },
                        "farmId": id_of(&farm),
                        "soilId": id_of(&soil),
                    }),
                )
                .await?;
            assert_eq!(field["boundary"]["type"], "MultiPolygon");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = uuid::Uuid::new_v4();
            for path in [
                format!("/farm/{id}"),
                format!("/field/{id}"),
                format!("/machine/{id}"),
                format!("/growingCropPeriod/{id}"),
                format!("/processing/{id}"),
            ] {
                let (status, _) = app.json(Method::GET, &path, None).await?;
                assert_status(status, StatusCode::NOT_FOUND, &path);
            }

            let (status, body) = app
                .json(
                    Method::PATCH,
                    &format!("/processingType/{id}"),
                    Some(json!({ "name": "Rolling" })),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "patch unknown");
            assert_eq!(
                body["message"],
                format!("Processing type with id {id} not found")
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn every_id_route_parses_the_path() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = uuid::Uuid::new_v4();
            for resource in [
                "farm",
                "field",
                "soil",
                "crop",
                "machine",
                "growingCropPeriod",
                "processingType",
                "processing",
            ] {
                let path = format!("/{resource}/{id}");
                for (method, path) in [
                    (Method::GET, path.clone()),
                    (Method::DELETE, path.clone()),
                    (Method::DELETE, format!("{path}/permanent")),
                ] {
                    let (status, _) = app.json(method.clone(), &path, None).await?;
                    assert_status(status, StatusCode::NOT_FOUND, &format!("{method} {path}"));
                }

                let (status, _) = app.json(Method::PATCH, &path, Some(json!({}))).await?;
                assert_status(status, StatusCode::NOT_FOUND, &format!("PATCH {path}"));

                let (status, _) = app
                    .json(Method::GET, &format!("/{resource}/not-a-uuid"), None)
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, resource);
            }

            let farm = app.create_farm("Transfer Target").await?;
            let (status, _) = app
                .json(
                    Method::PATCH,
                    &format!("/machine/{id}/transfer"),
                    Some(json!({ "newFarmId": id_of(&farm) })),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "transfer unknown machine");
            Ok(())
        })
    })
    .await
}
