//! Behavior tests for the JSON API
//!
//! A browser dashboard loads each view from its own endpoint. These tests
//! check that a failing view only breaks its own panel and that the form
//! workflow (lookup, autofill, export) works end to end.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use caixa_core::{CepResolver, Dashboard, FinanceClient, FixedClock, SessionStore};
use caixa_tests::*;
use caixa_web::{create_router, AppState};
use http_body_util::BodyExt;
use time::macros::date;
use tower::ServiceExt;

fn app(http: ScriptedHttpClient, with_token: bool) -> Router {
    let http = Arc::new(http);
    let dashboard = with_token.then(|| {
        Dashboard::new(
            FinanceClient::new(http.clone(), API_BASE, "secret-token"),
            Arc::new(FixedClock(date!(2025 - 10 - 16))),
            date!(2025 - 01 - 01),
        )
    });
    let state = AppState::new(
        dashboard,
        CepResolver::with_http_client(http),
        SessionStore::default(),
    );
    create_router(Arc::new(state), None)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn dashboard_panels_fail_independently() {
    // Given: balances reject the token, everything else works
    let http = ScriptedHttpClient::new()
        .status("https://api.test/v1/saldoBancos", 403)
        .json("https://api.test/v1/movimentosBancarios", movements_payload())
        .json("https://api.test/v1/boletos", receivables_payload())
        .json("https://api.test/v1/clientes", clients_payload());
    let app = app(http, true);

    // When / Then: the balances panel shows an inline error
    let (status, json) = call(&app, "GET", "/api/balances", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("/v1/saldoBancos"));

    // And the other panels still render
    let (status, json) = call(&app, "GET", "/api/movements?banks=Ita%C3%BA", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["kpis_formatted"]["net"], "R$ 120,00");

    let (status, json) = call(&app, "GET", "/api/receivables?statuses=Vencido,due_today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["kpis_formatted"]["total_settled_this_month"], "R$ 150,00");
}

#[tokio::test]
async fn without_a_token_only_financial_panels_are_unavailable() {
    let app = app(ScriptedHttpClient::new().json(VIACEP, viacep_se()), false);

    for uri in ["/api/movements", "/api/balances", "/api/banks", "/api/receivables"] {
        let (status, json) = call(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert!(json["error"].as_str().unwrap().contains("token"));
    }

    let (status, _) = call(&app, "GET", "/api/cep/01001000", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn form_workflow_lookup_autofill_and_export() {
    // Given: ViaCEP is down and BrasilAPI answers
    let http = ScriptedHttpClient::new()
        .status(VIACEP, 502)
        .json(BRASILAPI, brasilapi_se());
    let app = app(http, false);

    // When: a session is opened, the company typed and the CEP looked up
    let (status, json) = call(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["session_id"].as_str().unwrap().to_owned();

    call(
        &app,
        "PUT",
        &format!("/api/sessions/{id}/form"),
        Some(serde_json::json!({ "legal_name": "Acme Ltda", "number": "42" })),
    )
    .await;

    let (status, form) = call(
        &app,
        "POST",
        &format!("/api/sessions/{id}/form/address"),
        Some(serde_json::json!({ "cep": "01001-000" })),
    )
    .await;

    // Then: the address block is filled, typed fields survive
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["city"], "São Paulo");
    assert_eq!(form["number"], "42");

    // And the export is a base64 PDF named after the company
    let (status, document) = call(&app, "GET", &format!("/api/sessions/{id}/form/export"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(document["file_name"], "ficha-cadastral-acme-ltda.pdf");
    assert!(document["content_base64"].as_str().unwrap().starts_with("JVBERi0"));
}

#[tokio::test]
async fn bad_input_is_rejected_with_bad_request() {
    let app = app(finance_api(), true);

    for uri in [
        "/api/cep/123",
        "/api/movements?to=31/03/2025",
        "/api/receivables?from=2025-05-01&to=2025-04-01",
        "/api/receivables?statuses=cancelado",
    ] {
        let (status, json) = call(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(json["error"].is_string());
    }
}
