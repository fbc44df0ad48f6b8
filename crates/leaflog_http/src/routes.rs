//! REST routes over the plant service.
//!
//! # Responsibility
//! - Translate HTTP requests into `PlantService` calls.
//! - Keep handlers free of business rules.
//!
//! # Invariants
//! - Ids in paths are parsed with `parse_plant_id`; malformed ids are `400`.
//! - Unknown ids are `404`; validation failures are `400`.
//! - JSON bodies that fail to deserialize are `400` with an `{ "error" }` body.

use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use leaflog_core::{
    now_epoch_ms, parse_plant_id, Plant, PlantId, PlantInput, PlantService, SqlitePlantStore,
    WateringStatus,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

/// Multipart field carrying the import text.
pub const BULK_FILE_FIELD: &str = "file";

/// Service shared by every request.
pub type SharedService = Arc<Mutex<PlantService<SqlitePlantStore>>>;

#[derive(Debug, Serialize)]
pub struct PlantView {
    #[serde(flatten)]
    pub plant: Plant,
    pub watering: WateringStatus,
}

impl PlantView {
    fn at(plant: Plant, now_ms: i64) -> Self {
        let watering = plant.watering_status(now_ms);
        Self { plant, watering }
    }
}

#[derive(Debug, Deserialize)]
pub struct FrequencyRequest {
    pub watering_frequency_days: i64,
}

#[derive(Debug, Serialize)]
pub struct BulkImportResponse {
    pub plants: Vec<Plant>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// CORS policy admitting a single frontend origin.
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|err| anyhow::anyhow!("invalid CORS origin `{origin}`: {err}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn build_router(service: SharedService, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/plants", get(list_plants).post(create_plant))
        .route("/api/plants/due", get(list_due))
        .route("/api/plants/bulk", post(import_bulk))
        .route("/api/plants/water/{id}", put(water_plant))
        .route(
            "/api/plants/{id}",
            get(get_plant).put(update_plant).delete(delete_plant),
        )
        .route("/api/plants/{id}/frequency", put(set_frequency))
        .layer(cors)
        .with_state(service)
}

fn lock(service: &SharedService) -> Result<MutexGuard<'_, PlantService<SqlitePlantStore>>, AppError> {
    service
        .lock()
        .map_err(|_| AppError::internal("plant service lock poisoned"))
}

fn path_id(raw: &str) -> Result<PlantId, AppError> {
    Ok(parse_plant_id(raw)?)
}

async fn list_plants(State(service): State<SharedService>) -> Result<Json<Vec<Plant>>, AppError> {
    let plants = lock(&service)?.list_plants()?;
    Ok(Json(plants))
}

async fn get_plant(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<PlantView>, AppError> {
    let plant = lock(&service)?.get_plant(path_id(&id)?)?;
    Ok(Json(PlantView::at(plant, now_epoch_ms())))
}

async fn create_plant(
    State(service): State<SharedService>,
    body: Result<Json<PlantInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = body?;
    let plant = lock(&service)?.create_plant(&input)?;
    Ok((StatusCode::CREATED, Json(plant)))
}

async fn update_plant(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    body: Result<Json<PlantInput>, JsonRejection>,
) -> Result<Json<Plant>, AppError> {
    let Json(input) = body?;
    let plant = lock(&service)?.update_plant(path_id(&id)?, &input)?;
    Ok(Json(plant))
}

async fn delete_plant(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = path_id(&id)?;
    lock(&service)?.delete_plant(id)?;
    Ok(Json(DeleteResponse {
        message: format!("Successfully deleted plant with id {id}"),
    }))
}

async fn water_plant(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<Plant>, AppError> {
    let plant = lock(&service)?.mark_watered(path_id(&id)?)?;
    Ok(Json(plant))
}

async fn set_frequency(
    State(service): State<SharedService>,
    Path(id): Path<String>,
    body: Result<Json<FrequencyRequest>, JsonRejection>,
) -> Result<Json<Plant>, AppError> {
    let Json(request) = body?;
    let plant = lock(&service)?
        .set_watering_frequency(path_id(&id)?, request.watering_frequency_days)?;
    Ok(Json(plant))
}

async fn list_due(State(service): State<SharedService>) -> Result<Json<Vec<PlantView>>, AppError> {
    let now_ms = now_epoch_ms();
    let due = lock(&service)?.list_due(now_ms)?;
    Ok(Json(
        due.into_iter()
            .map(|plant| PlantView::at(plant, now_ms))
            .collect(),
    ))
}

/// Imports the uploaded text; `400` when any line was rejected.
async fn import_bulk(
    State(service): State<SharedService>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.body_text()))?
    {
        if field.name() == Some(BULK_FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::bad_request(err.body_text()))?;
            upload = Some(bytes);
            break;
        }
    }
    let Some(bytes) = upload else {
        return Err(AppError::bad_request(format!(
            "missing multipart field `{BULK_FILE_FIELD}`"
        )));
    };

    let report = lock(&service)?.import_reader(&bytes[..])?;
    info!(
        "event=http_bulk_import module=http status=ok size_bytes={} created={} failed={}",
        bytes.len(),
        report.created.len(),
        report.errors.len()
    );

    let status = if report.is_partial() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    let errors = report.error_messages();
    Ok((
        status,
        Json(BulkImportResponse {
            plants: report.created,
            errors,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::{build_router, cors_layer, SharedService};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use leaflog_core::db::open_db_in_memory;
    use leaflog_core::{PlantService, SqlitePlantStore};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    const BOUNDARY: &str = "leaflog-test-boundary";

    fn test_service() -> SharedService {
        let conn = open_db_in_memory().unwrap();
        Arc::new(Mutex::new(PlantService::new(SqlitePlantStore::new(conn))))
    }

    async fn send(service: &SharedService, request: Request<Body>) -> axum::response::Response {
        let app = build_router(
            service.clone(),
            cors_layer("http://localhost:3000").unwrap(),
        );
        app.oneshot(request).await.unwrap()
    }

    async fn send_json(
        service: &SharedService,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        send(service, request).await
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_request(field: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"plants.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/plants/bulk")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn plant_body(name: &str) -> Value {
        json!({
            "name": name,
            "species": "Calathea orbifolia",
            "watering_frequency_days": 4,
            "notes": "Filtered water only"
        })
    }

    async fn create(service: &SharedService, name: &str) -> Value {
        let resp = send_json(service, Method::POST, "/api/plants", Some(plant_body(name))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let service = test_service();
        let resp = send_json(&service, Method::GET, "/api/plants", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn create_then_get_includes_watering_status() {
        let service = test_service();
        let created = create(&service, "Calathea").await;
        assert_eq!(created["name"], "Calathea");
        assert_eq!(created["last_watered"], Value::Null);

        let id = created["id"].as_str().unwrap();
        let resp = send_json(&service, Method::GET, &format!("/api/plants/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["id"], id);
        assert_eq!(json["watering"]["is_due"], true);
    }

    #[tokio::test]
    async fn create_with_invalid_data_is_bad_request() {
        let service = test_service();
        let mut body = plant_body("Calathea");
        body["watering_frequency_days"] = json!(366);

        let resp = send_json(&service, Method::POST, "/api/plants", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await["error"],
            "Watering Frequency must be less than or equal to 365"
        );
    }

    #[tokio::test]
    async fn non_numeric_frequency_is_bad_request_with_error_body() {
        let service = test_service();
        let mut body = plant_body("Calathea");
        body["watering_frequency_days"] = json!("NotANumber");

        let resp = send_json(&service, Method::POST, "/api/plants", Some(body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"]
            .as_str()
            .unwrap()
            .contains("watering_frequency_days"));

        let created = create(&service, "Calathea").await;
        let id = created["id"].as_str().unwrap();
        let resp = send_json(
            &service,
            Method::PUT,
            &format!("/api/plants/{id}/frequency"),
            Some(json!({ "watering_frequency_days": "often" })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn missing_json_content_type_is_bad_request() {
        let service = test_service();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/plants")
            .body(Body::from(plant_body("Calathea").to_string()))
            .unwrap();

        let resp = send(&service, request).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_garbage_id_is_bad_request() {
        let service = test_service();

        let resp = send_json(
            &service,
            Method::GET,
            "/api/plants/11111111-2222-4333-8444-555555555555",
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send_json(&service, Method::DELETE, "/api/plants/not-an-id", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_water_frequency_and_delete_flow() {
        let service = test_service();
        let created = create(&service, "Calathea").await;
        let id = created["id"].as_str().unwrap().to_string();

        let resp = send_json(
            &service,
            Method::PUT,
            &format!("/api/plants/{id}"),
            Some(plant_body("Prayer plant")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["name"], "Prayer plant");

        let resp = send_json(&service, Method::PUT, &format!("/api/plants/water/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_json(resp).await["last_watered"].is_i64());

        let resp = send_json(
            &service,
            Method::PUT,
            &format!("/api/plants/{id}/frequency"),
            Some(json!({ "watering_frequency_days": 9 })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["watering_frequency_days"], 9);

        let resp = send_json(&service, Method::DELETE, &format!("/api/plants/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send_json(&service, Method::DELETE, &format!("/api/plants/{id}"), None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_of_unknown_id_does_not_create() {
        let service = test_service();
        let resp = send_json(
            &service,
            Method::PUT,
            "/api/plants/11111111-2222-4333-8444-555555555555",
            Some(plant_body("Ghost")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send_json(&service, Method::GET, "/api/plants", None).await;
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn due_lists_never_watered_plants() {
        let service = test_service();
        create(&service, "Thirsty").await;

        let resp = send_json(&service, Method::GET, "/api/plants/due", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let due = json.as_array().unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0]["name"], "Thirsty");
        assert_eq!(due[0]["watering"]["days_since_watered"], Value::Null);
    }

    #[tokio::test]
    async fn bulk_import_reports_created_plants_and_line_errors() {
        let service = test_service();
        let content = "Aloe-Succulent-5-Needs sun\n\
                       BadLineWithoutEnoughFields\n\
                       Fern-Shade-NotANumber-Mist often\n\
                       Bamboo-Grass-14-Grows fast";

        let resp = send(&service, multipart_request("file", content)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;

        let plants = json["plants"].as_array().unwrap();
        assert_eq!(plants.len(), 2);
        assert_eq!(plants[0]["name"], "Aloe");
        assert_eq!(plants[1]["name"], "Bamboo");

        let errors = json["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].as_str().unwrap().contains("BadLineWithoutEnoughFields"));
        assert!(errors[1].as_str().unwrap().contains("NotANumber"));

        let resp = send_json(&service, Method::GET, "/api/plants", None).await;
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn clean_bulk_import_is_ok() {
        let service = test_service();
        let resp = send(&service, multipart_request("file", "Aloe-Succulent-5")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["plants"].as_array().unwrap().len(), 1);
        assert_eq!(json["errors"], json!([]));
    }

    #[tokio::test]
    async fn bulk_import_without_file_field_is_rejected() {
        let service = test_service();
        let resp = send(&service, multipart_request("upload", "Aloe-Succulent-5")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"]
            .as_str()
            .unwrap()
            .contains("file"));
    }

    #[tokio::test]
    async fn cors_preflight_allows_frontend_origin() {
        let service = test_service();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/plants")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();

        let resp = send(&service, request).await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn cors_layer_rejects_invalid_origin() {
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
