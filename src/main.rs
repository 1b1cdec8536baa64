// src/main.rs

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

fn app(app_state: AppState) -> Router {
    let account_routes = Router::new()
        .route(
            "/accounts",
            get(handlers::accounts::list_accounts).post(handlers::accounts::create_account),
        )
        .route(
            "/accounts/{id}",
            put(handlers::accounts::update_account).delete(handlers::accounts::delete_account),
        );

    let lead_routes = Router::new()
        .route(
            "/leads",
            get(handlers::leads::list_leads).post(handlers::leads::create_lead),
        )
        .route("/leads/{id}/convert", post(handlers::leads::convert_lead))
        .route("/leads/{id}", delete(handlers::leads::delete_lead));

    let opp_routes = Router::new().route(
        "/opps",
        get(handlers::opps::list_opportunities).post(handlers::opps::create_opportunity),
    );

    let dashboard_routes =
        Router::new().route("/dashboard/summary", get(handlers::dashboard::get_summary));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(account_routes)
        .merge(lead_routes)
        .merge(opp_routes)
        .merge(dashboard_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        // The browser client runs on another origin and needs DELETE/PUT.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() is fine here: without state or schema the app must not start.
    let app_state = AppState::new()
        .await
        .expect("failed to initialise application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");

    tracing::info!("✅ database migrations applied");

    let app = app(app_state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(4000);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("🚀 CRM API listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.expect("server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        sqlx::migrate!().run(&pool).await.expect("migrations failed");
        app(AppState::from_pool(pool))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn account_create_then_delete_roundtrip() {
        let app = test_app().await;

        let (status, account) =
            send(&app, "POST", "/accounts", Some(json!({ "name": "Acme" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = account["id"].as_str().expect("generated id").to_string();
        assert!(!id.is_empty());
        assert!(account["createdAt"].is_string());

        let (status, body) = send(&app, "DELETE", &format!("/accounts/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        let (status, accounts) = send(&app, "GET", "/accounts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(accounts, json!([]));
    }

    #[tokio::test]
    async fn account_without_name_is_a_400_with_json_error() {
        let app = test_app().await;

        let (status, body) = send(&app, "POST", "/accounts", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name is required");
    }

    #[tokio::test]
    async fn malformed_json_body_is_a_400_with_json_error() {
        let app = test_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/accounts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn update_resends_every_field() {
        let app = test_app().await;

        let (_, account) = send(
            &app,
            "POST",
            "/accounts",
            Some(json!({ "name": "Acme", "industry": "Software" })),
        )
        .await;
        let id = account["id"].as_str().unwrap();

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/accounts/{id}"),
            Some(json!({ "name": "Acme Corp" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Acme Corp");
        assert_eq!(updated["industry"], Value::Null);
    }

    #[tokio::test]
    async fn lead_conversion_returns_account_and_opportunity() {
        let app = test_app().await;

        let (status, lead) = send(
            &app,
            "POST",
            "/leads",
            Some(json!({ "fullName": "Jane Doe", "company": "Acme" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(lead["status"], "NEW");
        let id = lead["id"].as_str().unwrap();

        let (status, conversion) =
            send(&app, "POST", &format!("/leads/{id}/convert"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(conversion["account"]["name"], "Acme");
        assert_eq!(conversion["opp"]["name"], "New deal - Jane Doe");
        assert_eq!(conversion["opp"]["stage"], "PROSPECTING");
        assert_eq!(conversion["opp"]["accountId"], conversion["account"]["id"]);

        let (_, leads) = send(&app, "GET", "/leads", None).await;
        assert_eq!(leads[0]["status"], "QUALIFIED");
    }

    #[tokio::test]
    async fn opportunity_for_unknown_account_is_rejected_without_a_row() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/opps",
            Some(json!({
                "accountId": "00000000-0000-0000-0000-000000000001",
                "name": "Ghost deal"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "account not found");

        let (_, opps) = send(&app, "GET", "/opps", None).await;
        assert_eq!(opps, json!([]));
    }

    #[tokio::test]
    async fn deleting_an_account_removes_its_opportunities() {
        let app = test_app().await;

        let (_, account) = send(&app, "POST", "/accounts", Some(json!({ "name": "Acme" }))).await;
        let id = account["id"].as_str().unwrap().to_string();
        for name in ["Deal A", "Deal B"] {
            let (status, _) = send(
                &app,
                "POST",
                "/opps",
                Some(json!({ "accountId": id, "name": name, "amount": 10 })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _) = send(&app, "DELETE", &format!("/accounts/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, opps) = send(&app, "GET", "/opps", None).await;
        assert_eq!(opps, json!([]));
    }

    #[tokio::test]
    async fn dashboard_summary_reflects_the_store() {
        let app = test_app().await;

        let (_, account) = send(&app, "POST", "/accounts", Some(json!({ "name": "Acme" }))).await;
        let account_id = account["id"].as_str().unwrap().to_string();
        send(
            &app,
            "POST",
            "/opps",
            Some(json!({ "accountId": account_id, "name": "Deal", "amount": 100 })),
        )
        .await;
        send(
            &app,
            "POST",
            "/opps",
            Some(json!({ "accountId": account_id, "name": "Unsized deal" })),
        )
        .await;
        send(&app, "POST", "/leads", Some(json!({ "fullName": "Jane Doe" }))).await;

        let (status, summary) = send(&app, "GET", "/dashboard/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["totalAccounts"], 1);
        assert_eq!(summary["totalLeads"], 1);
        assert_eq!(summary["totalOpps"], 2);
        assert_eq!(summary["totalRevenue"], 100.0);
        assert_eq!(summary["conversionRate"], 0.0);
        assert_eq!(summary["pipelineByStage"][0]["stage"], "PROSPECTING");
        assert_eq!(summary["pipelineByStage"][0]["count"], 2);
        assert_eq!(summary["revenueByMonth"].as_array().unwrap().len(), 6);
        // Everything was created just now, so the newest bucket holds it all.
        assert_eq!(summary["revenueByMonth"][5]["total"], 100.0);
    }
}
