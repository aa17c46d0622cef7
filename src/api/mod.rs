//! Agency REST API
//!
//! HTTP API layer for the back-office and the public site, built with Axum.
//!
//! # Endpoints
//!
//! ## Records
//! Every table is mounted with the same five endpoints
//! (`GET`/`POST /api/v1/{resource}`, `GET`/`PATCH`/`DELETE /api/v1/{resource}/:id`):
//! `contacts`, `campaigns`, `campaign-analytics`, `experiments`, `forms`,
//! `form-submissions`, `jobs`, `applications`, `segments`, `themes`,
//! `events`, `leads`, `media`.
//!
//! ## Workflows
//! - `POST /api/v1/contacts/wizard` - Multi-step contact wizard
//! - `POST /api/v1/contacts/:id/status` - Inbox status
//! - `POST /api/v1/experiments/:id/status` - Experiment status
//! - `POST /api/v1/experiments/:id/toggle` - Pause / resume
//! - `GET /api/v1/experiments/:id/results` - Variant results
//! - `GET /api/v1/campaigns/:id/metrics` - Campaign metrics
//! - `POST /api/v1/forms/:id/submit` - Public form submission
//! - `GET /api/v1/forms/:id/submissions` - Submissions for a form
//! - `GET /api/v1/forms/:id/submissions.csv` - CSV export
//! - `POST /api/v1/jobs/:id/apply` - Job application
//! - `GET /api/v1/jobs/:id/applications` - Applications for a posting
//! - `GET /api/v1/segments/:id/members` - Segment members
//! - `POST /api/v1/themes/:id/activate` - Activate a theme
//! - `GET /api/v1/theme.css` - Site stylesheet variables
//! - `GET /api/v1/media/folders` - Media library folders
//! - `GET|PUT|DELETE /api/v1/preferences[/:key]` - Site preferences
//!
//! ## Analytics
//! - `GET /api/v1/analytics/campaigns`
//! - `GET /api/v1/analytics/forms`
//! - `GET /api/v1/analytics/funnel?steps=a,b,c`
//! - `GET /api/v1/analytics/segments?by=source`
//! - `GET /api/v1/analytics/segment-sizes`
//!
//! ## Dashboard
//! - `GET /api/v1/dashboard` - Headline counts
//! - `GET /api/v1/dashboard/contacts` - Live contact inbox
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Row change notifications
//!
//! # Example
//!
//! ```rust,ignore
//! use agency::api::{serve, ApiConfig, AppState};
//! use agency::store::SqliteStore;
//! use agency::theme::PreferenceStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("agency.db".as_ref())?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone(), PreferenceStore::in_memory());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::models::{
    AbExperiment, AnalyticsEvent, Campaign, CampaignAnalytics, ContactSubmission, Form,
    FormSubmission, JobApplication, JobPosting, Lead, MediaFile, Segment, Theme,
};
use crate::websocket::websocket_handler;
use routes::records::{resource, resource_with};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let record_routes = Router::new()
        .merge(resource::<ContactSubmission>("contacts"))
        .merge(resource::<Campaign>("campaigns"))
        .merge(resource::<CampaignAnalytics>("campaign-analytics"))
        .merge(resource::<AbExperiment>("experiments"))
        .merge(resource::<Form>("forms"))
        .merge(resource_with::<FormSubmission>(
            "form-submissions",
            post(routes::forms::create_submission),
        ))
        .merge(resource::<JobPosting>("jobs"))
        .merge(resource_with::<JobApplication>(
            "applications",
            post(routes::jobs::create_application),
        ))
        .merge(resource::<Segment>("segments"))
        .merge(resource_with::<Theme>("themes", post(routes::themes::create)))
        .merge(resource::<AnalyticsEvent>("events"))
        .merge(resource::<Lead>("leads"))
        .merge(resource::<MediaFile>("media"));

    let api_routes = Router::new()
        // Contact routes
        .route("/contacts/wizard", post(routes::contacts::submit_wizard))
        .route("/contacts/:id/status", post(routes::contacts::set_status))
        // Experiment routes
        .route("/experiments/:id/status", post(routes::experiments::set_status))
        .route("/experiments/:id/toggle", post(routes::experiments::toggle))
        .route("/experiments/:id/results", get(routes::experiments::results))
        // Campaign routes
        .route("/campaigns/:id/metrics", get(routes::campaigns::metrics))
        // Form routes
        .route("/forms/:id/submit", post(routes::forms::submit))
        .route("/forms/:id/submissions", get(routes::forms::submissions))
        .route("/forms/:id/submissions.csv", get(routes::forms::export_csv))
        // Job routes
        .route("/jobs/:id/apply", post(routes::jobs::apply))
        .route("/jobs/:id/applications", get(routes::jobs::applications))
        // Segment routes
        .route("/segments/:id/members", get(routes::segments::members))
        // Theme and preference routes
        .route("/themes/:id/activate", post(routes::themes::activate))
        .route("/theme.css", get(routes::themes::stylesheet))
        .route("/preferences", get(routes::themes::list_preferences))
        .route(
            "/preferences/:key",
            get(routes::themes::get_preference)
                .put(routes::themes::set_preference)
                .delete(routes::themes::delete_preference),
        )
        // Media routes
        .route("/media/folders", get(routes::media::folders))
        // Analytics routes
        .route("/analytics/campaigns", get(routes::campaigns::overview))
        .route("/analytics/forms", get(routes::forms::stats))
        .route("/analytics/funnel", get(routes::events::funnel))
        .route("/analytics/segments", get(routes::segments::group_leads))
        .route("/analytics/segment-sizes", get(routes::segments::sizes))
        // Dashboard routes
        .route("/dashboard", get(routes::dashboard::overview))
        .route("/dashboard/contacts", get(routes::dashboard::contacts))
        .merge(record_routes);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_secs(state.config.request_timeout_secs.max(1));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        // WebSocket route
        .route("/ws", get(websocket_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Agency API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Agency API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        EmploymentType, FieldKind, FormField, NewAbExperiment, NewAnalyticsEvent, NewForm,
        NewJobPosting, PostingStatus, Variant,
    };
    use crate::store::{SqliteStore, Store};
    use crate::theme::PreferenceStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, AppState) {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let state = AppState::new(store, ApiConfig::default(), PreferenceStore::in_memory());
        (build_router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json_body(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _state) = create_test_app();

        let (status, _) = send(&app, "GET", "/health/live", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend_kind"], "sqlite");
    }

    #[tokio::test]
    async fn test_create_and_list_leads() {
        let (app, _state) = create_test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/leads",
            Some(json!({"email": "ann@shop.io", "source": "webinar", "score": 70})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json_body(&body)["id"].as_str().unwrap().to_string();

        send(
            &app,
            "POST",
            "/api/v1/leads",
            Some(json!({"email": "bob@shop.io", "source": "ads"})),
        )
        .await;

        let (status, body) = send(&app, "GET", "/api/v1/leads", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["count"], 2);

        let (_, body) = send(&app, "GET", "/api/v1/leads?search=ANN", None).await;
        let body = json_body(&body);
        assert_eq!(body["count"], 1);
        assert_eq!(body["items"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_rejected_input_is_bad_request() {
        let (app, _state) = create_test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/leads")
            .header("Content-Type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/leads",
            Some(json!({"email": "nope", "source": "ads"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let (app, _state) = create_test_app();

        let uri = format!("/api/v1/campaigns/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body)["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_pausing_twice_is_a_no_op() {
        let (app, state) = create_test_app();
        let experiment = state
            .repos
            .experiments
            .create(&NewAbExperiment {
                name: "Hero copy".to_string(),
                hypothesis: None,
                status: crate::models::ExperimentStatus::Running,
                variants: vec![
                    Variant { name: "A".to_string(), visitors: 100, conversions: 10 },
                    Variant { name: "B".to_string(), visitors: 100, conversions: 15 },
                ],
            })
            .await
            .unwrap();

        let uri = format!("/api/v1/experiments/{}/status", experiment.id);
        let (status, body) = send(&app, "POST", &uri, Some(json!({"status": "paused"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["changed"], true);

        let (_, body) = send(&app, "POST", &uri, Some(json!({"status": "paused"}))).await;
        let body = json_body(&body);
        assert_eq!(body["changed"], false);
        assert_eq!(body["record"]["status"], "paused");

        let uri = format!("/api/v1/experiments/{}/results", experiment.id);
        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(json_body(&body)["winner"], "B");
    }

    #[tokio::test]
    async fn test_apply_to_closed_job_conflicts() {
        let (app, state) = create_test_app();
        let job = state
            .repos
            .jobs
            .create(&NewJobPosting {
                title: "SEO Lead".to_string(),
                department: "Search".to_string(),
                location: "Remote".to_string(),
                employment_type: EmploymentType::FullTime,
                description: String::new(),
                status: PostingStatus::Closed,
            })
            .await
            .unwrap();

        let uri = format!("/api/v1/jobs/{}/apply", job.id);
        let (status, body) = send(
            &app,
            "POST",
            &uri,
            Some(json!({"applicant_name": "Sam", "email": "sam@mail.io"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json_body(&body)["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_contact_wizard() {
        let (app, _state) = create_test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/contacts/wizard",
            Some(json!({
                "contact": {"name": "Dana", "email": "dana@brand.co"},
                "company": {"company": "Brand Co"},
                "services": ["seo", "content"],
                "project": {"message": "Relaunch our blog"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let body = json_body(&body);
        assert_eq!(body["submission"]["status"], "new");
        assert_eq!(body["summary"]["steps_completed"], 4);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/contacts/wizard",
            Some(json!({
                "contact": {"name": "Dana", "email": "dana@brand.co"},
                "services": [],
                "project": {"message": "Relaunch"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Step 3"));
    }

    #[tokio::test]
    async fn test_theme_css_uses_preferences() {
        let (app, _state) = create_test_app();

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/preferences/theme.primary_color",
            Some(json!({"value": "#123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, css) = send(&app, "GET", "/api/v1/theme.css", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(css.starts_with(":root {"));
        assert!(css.contains("#123456"));

        let (status, _) = send(&app, "DELETE", "/api/v1/preferences/theme.primary_color", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", "/api/v1/preferences/theme.primary_color", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_funnel() {
        let (app, state) = create_test_app();
        for (session, event) in [("s1", "page_view"), ("s1", "form_start"), ("s2", "page_view")] {
            state
                .repos
                .events
                .create(&NewAnalyticsEvent {
                    session_id: session.to_string(),
                    event_name: event.to_string(),
                    page: None,
                    properties: Default::default(),
                })
                .await
                .unwrap();
        }

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/analytics/funnel?steps=page_view,form_start",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["steps"][0]["sessions"], 2);
        assert_eq!(body["steps"][1]["sessions"], 1);
        assert_eq!(body["overall_conversion"], 50.0);

        let (status, _) = send(
            &app,
            "GET",
            "/api/v1/analytics/funnel?steps=page_view,page_view",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_submission_and_csv_export() {
        let (app, state) = create_test_app();
        let form = state
            .repos
            .forms
            .create(&NewForm {
                name: "Newsletter".to_string(),
                description: None,
                fields: vec![FormField {
                    name: "email".to_string(),
                    label: "Email".to_string(),
                    kind: FieldKind::Email,
                    required: true,
                    options: vec![],
                }],
                is_active: true,
            })
            .await
            .unwrap();

        let uri = format!("/api/v1/forms/{}/submit", form.id);
        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(json!({"data": {"email": "reader@mail.io"}, "source": "footer"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&app, "POST", &uri, Some(json!({"data": {"email": "nope"}}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/v1/forms/{}/submissions.csv", form.id);
        let (status, csv) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "id,created_at,source,email");
        assert!(lines.next().unwrap().ends_with("footer,reader@mail.io"));
        assert!(lines.next().is_none());
    }

    fn newsletter(is_active: bool) -> NewForm {
        NewForm {
            name: "Newsletter".to_string(),
            description: None,
            fields: vec![FormField {
                name: "email".to_string(),
                label: "Email".to_string(),
                kind: FieldKind::Email,
                required: true,
                options: vec![],
            }],
            is_active,
        }
    }

    #[tokio::test]
    async fn test_generic_create_follows_workflow_rules() {
        let (app, state) = create_test_app();
        let job = state
            .repos
            .jobs
            .create(&NewJobPosting {
                title: "Copywriter".to_string(),
                department: "Content".to_string(),
                location: "Berlin".to_string(),
                employment_type: EmploymentType::PartTime,
                description: String::new(),
                status: PostingStatus::Closed,
            })
            .await
            .unwrap();

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/applications",
            Some(json!({"job_id": job.id, "applicant_name": "Sam", "email": "sam@mail.io"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let closed = state.repos.forms.create(&newsletter(false)).await.unwrap();
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/form-submissions",
            Some(json!({"form_id": closed.id, "data": {"email": "reader@mail.io"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let open = state.repos.forms.create(&newsletter(true)).await.unwrap();
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/form-submissions",
            Some(json!({"form_id": open.id, "data": {"email": "not-an-email"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/form-submissions",
            Some(json!({"form_id": open.id, "data": {"email": "reader@mail.io"}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, "GET", "/api/v1/form-submissions", None).await;
        assert_eq!(json_body(&body)["count"], 1);
        let (_, body) = send(&app, "GET", "/api/v1/applications", None).await;
        assert_eq!(json_body(&body)["count"], 0);
    }

    #[tokio::test]
    async fn test_patch_refuses_managed_columns() {
        let (app, state) = create_test_app();
        let experiment = state
            .repos
            .experiments
            .create(&NewAbExperiment {
                name: "Footer CTA".to_string(),
                hypothesis: None,
                status: crate::models::ExperimentStatus::Completed,
                variants: vec![
                    Variant { name: "A".to_string(), visitors: 10, conversions: 1 },
                    Variant { name: "B".to_string(), visitors: 10, conversions: 2 },
                ],
            })
            .await
            .unwrap();

        let uri = format!("/api/v1/experiments/{}", experiment.id);
        let (status, _) = send(&app, "PATCH", &uri, Some(json!({"status": "draft"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "PATCH", &uri, Some(json!({"name": "Footer CTA v2"}))).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["name"], "Footer CTA v2");
        assert_eq!(body["status"], "completed");
    }

    #[tokio::test]
    async fn test_patch_runs_insert_validation() {
        let (app, _state) = create_test_app();
        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/leads",
            Some(json!({"email": "a@b.io", "source": "ads"})),
        )
        .await;
        let id = json_body(&body)["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/leads/{}", id);
        let (status, _) = send(&app, "PATCH", &uri, Some(json!({"email": "not-an-email"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(json_body(&body)["email"], "a@b.io");
    }

    #[tokio::test]
    async fn test_created_active_themes_leave_one_active() {
        let (app, _state) = create_test_app();
        let theme = |name: &str| {
            json!({
                "name": name,
                "primary_color": "#112233",
                "secondary_color": "#ffffff",
                "accent_color": "#ff6600",
                "background_color": "#fafafa",
                "text_color": "#111111",
                "font_family": "Inter",
                "is_active": true
            })
        };

        let (status, _) = send(&app, "POST", "/api/v1/themes", Some(theme("Light"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, "POST", "/api/v1/themes", Some(theme("Dark"))).await;
        assert_eq!(status, StatusCode::CREATED);
        let dark = json_body(&body);
        assert_eq!(dark["is_active"], true);

        let (_, body) = send(&app, "GET", "/api/v1/themes", None).await;
        let body = json_body(&body);
        let active: Vec<&Value> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|t| t["is_active"] == true)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["id"], dark["id"]);

        let uri = format!("/api/v1/themes/{}", dark["id"].as_str().unwrap());
        let (status, _) = send(&app, "PATCH", &uri, Some(json!({"is_active": false}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
