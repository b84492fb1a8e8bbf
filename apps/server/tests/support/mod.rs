//! Shared harness for the HTTP integration tests.
//!
//! Every test gets its own router over fresh in-memory tables, so tests never
//! see each other's records and need no database.

use std::{future::Future, pin::Pin};

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use farmstead::{
    api::create_router,
    auth::Role,
    state::{AppState, AppStateOptions},
    Config,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub async fn with_test_app<F>(test: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> TestFuture,
{
    with_test_app_with_config(|_| {}, test).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, test: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> TestFuture,
{
    let mut config = Config::for_tests(TEST_SECRET);
    configure(&mut config);

    let state = AppState::new_with_options(config, AppStateOptions::in_memory()).await?;
    let router = create_router(state.clone());

    test(TestApp { state, router }).await
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

pub fn to_json_body(value: &Value) -> anyhow::Result<Body> {
    Ok(Body::from(serde_json::to_vec(value)?))
}

pub fn json_of(body: &Bytes) -> anyhow::Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

/// String id of a record returned inside a `{data}` envelope.
pub fn id_of(record: &Value) -> String {
    record["id"].as_str().unwrap_or_default().to_string()
}

pub fn square_boundary() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[19.80, 45.20], [19.81, 45.20], [19.81, 45.21], [19.80, 45.21], [19.80, 45.20]]]
    })
}

impl TestApp {
    pub fn token(&self, role: Role) -> anyhow::Result<String> {
        Ok(self.state.auth.issue_token("test-user", role, 300)?)
    }

    /// Sends the request as an `OWNER`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_as(Some(Role::Owner), method, path, body).await
    }

    /// Sends the request as `role`, or without a bearer token when `None`.
    pub async fn request_as(
        &self,
        role: Option<Role>,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut headers = Vec::new();
        if let Some(role) = role {
            headers.push((
                header::AUTHORIZATION.as_str().to_string(),
                format!("Bearer {}", self.token(role)?),
            ));
        }
        self.send(method, path, body, headers).await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        extra: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        // An explicit authorization header replaces the default owner token.
        let mut headers = Vec::new();
        if !extra
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()))
        {
            headers.push((
                header::AUTHORIZATION.as_str().to_string(),
                format!("Bearer {}", self.token(Role::Owner)?),
            ));
        }
        headers.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self.send(method, path, body, headers).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        headers: Vec<(String, String)>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let has_body = body.is_some();
        let mut builder = Request::builder().method(method).uri(path);
        if has_body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        for (name, value) in headers {
            builder = builder.header(name, HeaderValue::from_str(&value)?);
        }
        let request = builder.body(body.unwrap_or_else(Body::empty))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, bytes))
    }

    /// Sends JSON as an `OWNER` and parses the JSON reply.
    pub async fn json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let body = body.as_ref().map(to_json_body).transpose()?;
        let (status, _headers, bytes) = self.request(method, path, body).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            json_of(&bytes)?
        };
        Ok((status, value))
    }

    /// Number of active records listed under `path`.
    pub async fn list_len(&self, path: &str) -> anyhow::Result<usize> {
        let (status, value) = self.json(Method::GET, path, None).await?;
        assert_status(status, StatusCode::OK, &format!("GET {path}"));
        Ok(value["data"].as_array().map(Vec::len).unwrap_or_default())
    }

    /// POSTs `body`, expects `201 Created` and returns the created record.
    pub async fn create(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        let (status, value) = self.json(Method::POST, path, Some(body)).await?;
        assert_status(status, StatusCode::CREATED, &format!("POST {path}: {value}"));
        Ok(value["data"].clone())
    }

    pub async fn create_farm(&self, name: &str) -> anyhow::Result<Value> {
        self.create(
            "/farm",
            json!({ "name": name, "location": { "type": "Point", "coordinates": [19.83, 45.25] } }),
        )
        .await
    }

    pub async fn create_soil(&self, name: &str) -> anyhow::Result<Value> {
        self.create("/soil", json!({ "name": name })).await
    }

    pub async fn create_crop(&self, name: &str) -> anyhow::Result<Value> {
        self.create("/crop", json!({ "name": name })).await
    }

    pub async fn create_processing_type(&self, name: &str) -> anyhow::Result<Value> {
        self.create("/processingType", json!({ "name": name })).await
    }

    pub async fn create_field(
        &self,
        name: &str,
        farm_id: &str,
        soil_id: &str,
    ) -> anyhow::Result<Value> {
        self.create(
            "/field",
            json!({
                "name": name,
                "boundary": square_boundary(),
                "farmId": farm_id,
                "soilId": soil_id,
            }),
        )
        .await
    }

    pub async fn create_machine(&self, register_number: &str, farm_id: &str) -> anyhow::Result<Value> {
        self.create(
            "/machine",
            json!({
                "brand": "John Deere",
                "model": "6120M",
                "registerNumber": register_number,
                "farmId": farm_id,
            }),
        )
        .await
    }

    pub async fn create_period(&self, field_id: &str, crop_id: &str) -> anyhow::Result<Value> {
        self.create(
            "/growingCropPeriod",
            json!({ "fieldId": field_id, "cropId": crop_id }),
        )
        .await
    }

    pub async fn create_processing(
        &self,
        date: &str,
        period_id: &str,
        processing_type_id: &str,
        machine_id: &str,
    ) -> anyhow::Result<Value> {
        self.create(
            "/processing",
            json!({
                "date": date,
                "growingCropPeriodId": period_id,
                "processingTypeId": processing_type_id,
                "machineId": machine_id,
            }),
        )
        .await
    }
}
