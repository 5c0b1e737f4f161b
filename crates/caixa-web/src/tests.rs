//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use caixa_core::{
    FixedClock, HttpError, HttpFuture, HttpRequest, HttpResponse, ProviderTier,
};
use http_body_util::BodyExt;
use std::sync::Mutex;
use time::macros::date;
use tower::ServiceExt;

/// Answers by URL prefix; unknown URLs fail with a connect error.
struct RoutedHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<String>>,
}

impl RoutedHttpClient {
    fn new(routes: Vec<(&str, Result<HttpResponse, HttpError>)>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .map(|(prefix, outcome)| (prefix.to_owned(), outcome))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }
}

impl HttpClient for RoutedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.url.clone());
            self.routes
                .iter()
                .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
                .map(|(_, outcome)| outcome.clone())
                .unwrap_or_else(|| Err(HttpError::connect("no route")))
        })
    }
}

const API: &str = "https://api.test";
const VIACEP: &str = "https://viacep.com.br/";
const BRASILAPI: &str = "https://brasilapi.com.br/";

fn ok(body: serde_json::Value) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::ok_json(body.to_string()))
}

fn finance_routes() -> Vec<(&'static str, Result<HttpResponse, HttpError>)> {
    vec![
        (
            "https://api.test/v1/movimentosBancarios",
            ok(serde_json::json!([
                {"dataMovimento": "2025-03-10T09:00:00", "descricao": "PIX RECEBIDO", "valor": 100.0, "operacao": "+", "nomeBanco": "Itaú"},
                {"dataMovimento": "2025-03-10T10:00:00", "descricao": "TARIFA", "valor": 30.0, "operacao": "-", "nomeBanco": "Itaú"},
                {"dataMovimento": "2025-04-02", "descricao": "TED", "valor": 50.0, "operacao": "+", "nomeBanco": "Bradesco"}
            ])),
        ),
        (
            "https://api.test/v1/saldoBancos",
            ok(serde_json::json!([
                {"banco": {"nome": "Itaú"}, "saldo": 1000.5},
                {"banco": {"nome": "Bradesco"}, "saldo": -200}
            ])),
        ),
        (
            "https://api.test/v1/boletos",
            ok(serde_json::json!([
                {"id": 1, "idCliente": 7, "valorBruto": 300, "dataVencimentoReal": "2025-10-01"},
                {"id": 2, "idCliente": 7, "valorBruto": 200, "dataVencimentoReal": "2025-10-20"},
                {"id": 3, "idCliente": 8, "valorBruto": 150, "dataVencimentoReal": "2025-09-10", "dataBaixa": "2025-10-03"}
            ])),
        ),
        (
            "https://api.test/v1/clientes",
            ok(serde_json::json!([
                {"id": 7, "nomeRazaoSocial": "Acme Ltda"},
                {"id": 8, "nomeRazaoSocial": "Beta SA"}
            ])),
        ),
    ]
}

fn viacep_hit() -> (&'static str, Result<HttpResponse, HttpError>) {
    (
        VIACEP,
        ok(serde_json::json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "sp"
        })),
    )
}

fn setup_with(
    routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>,
    with_dashboard: bool,
) -> (Router, Arc<RoutedHttpClient>) {
    let http = Arc::new(RoutedHttpClient::new(routes));
    let dashboard = with_dashboard.then(|| {
        Dashboard::new(
            FinanceClient::new(http.clone(), API, "secret"),
            Arc::new(FixedClock(date!(2025 - 10 - 16))),
            date!(2025 - 01 - 01),
        )
    });
    let state = AppState::new(
        dashboard,
        CepResolver::with_http_client(http.clone()),
        SessionStore::default(),
    );
    (create_router(Arc::new(state), None), http)
}

fn setup_test_app() -> (Router, Arc<RoutedHttpClient>) {
    let mut routes = finance_routes();
    routes.push(viacep_hit());
    setup_with(routes, true)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn new_session(app: &Router) -> String {
    let response = send(app, "POST", "/api/sessions", None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    get_body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_owned()
}

// ========== Postal Code Tests ==========

#[tokio::test]
async fn test_cep_lookup_returns_address() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/cep/01001-000", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["cep"], "01001-000");
    assert_eq!(json["city"], "São Paulo");
    assert_eq!(json["state"], "SP");
    assert_eq!(json["source_provider"], "viacep");
    assert_eq!(json["provider"], "PRIMARY");
}

#[tokio::test]
async fn test_cep_falls_back_to_secondary() {
    let (app, http) = setup_with(
        vec![
            (VIACEP, Ok(HttpResponse::new(500, ""))),
            (
                BRASILAPI,
                ok(serde_json::json!({
                    "cep": "01001000", "state": "SP", "city": "São Paulo",
                    "neighborhood": "Sé", "street": "Praça da Sé"
                })),
            ),
        ],
        false,
    );

    let json = get_body_json(send(&app, "GET", "/api/cep/01001000", None).await).await;
    assert_eq!(json["source_provider"], "brasilapi");
    assert_eq!(json["provider"], serde_json::json!(ProviderTier::Secondary));
    assert_eq!(http.requested("https://cep.awesomeapi.com.br/"), 0);
}

#[tokio::test]
async fn test_invalid_cep_is_bad_request_without_calls() {
    let (app, http) = setup_test_app();

    let response = send(&app, "GET", "/api/cep/123", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(get_body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("8 digits"));
    assert_eq!(http.requested("https://"), 0);
}

#[tokio::test]
async fn test_unresolvable_cep_is_not_found() {
    let (app, _) = setup_with(vec![], false);

    let response = send(&app, "GET", "/api/cep/99999999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Financial View Tests ==========

#[tokio::test]
async fn test_movements_statement_and_kpis() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/movements?from=2025-03-01&to=2025-03-31", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["kpis_formatted"]["total_inflow"], "R$ 100,00");
    assert_eq!(json["kpis_formatted"]["total_outflow"], "R$ 30,00");
    assert_eq!(json["kpis_formatted"]["net"], "R$ 70,00");
}

#[tokio::test]
async fn test_movements_filter_by_bank() {
    let (app, _) = setup_test_app();

    let json = get_body_json(send(&app, "GET", "/api/movements?banks=Bradesco", None).await).await;
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["bank_name"], "Bradesco");
}

#[tokio::test]
async fn test_movements_rejects_bad_dates() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/movements?from=01/03/2025", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "GET", "/api/movements?from=2025-04-01&to=2025-03-01", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_balances_with_total_line() {
    let (app, _) = setup_test_app();

    let json = get_body_json(send(&app, "GET", "/api/balances", None).await).await;
    let formatted = json["formatted"].as_array().unwrap();
    assert_eq!(formatted.len(), 3);
    assert_eq!(formatted[0]["bank_name"], "Bradesco");
    assert_eq!(formatted[0]["balance"], "R$ -200,00");
    assert_eq!(formatted[2]["bank_name"], "Total");
    assert_eq!(formatted[2]["balance"], "R$ 800,50");
}

#[tokio::test]
async fn test_bank_options_union() {
    let (app, _) = setup_test_app();

    let json = get_body_json(send(&app, "GET", "/api/banks", None).await).await;
    assert_eq!(json["banks"], serde_json::json!(["Bradesco", "Itaú"]));
}

#[tokio::test]
async fn test_receivables_join_client_names_and_kpis() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/receivables", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["rows_formatted"][0]["client_name"], "Beta SA");
    assert_eq!(json["kpis_formatted"]["total_open"], "R$ 500,00");
    assert_eq!(json["kpis_formatted"]["total_overdue"], "R$ 300,00");
    assert_eq!(json["kpis_formatted"]["total_settled_this_month"], "R$ 150,00");
    assert_eq!(json["warnings"], serde_json::json!([]));
}

#[tokio::test]
async fn test_receivables_status_filter_keeps_settled_kpi() {
    let (app, _) = setup_test_app();

    let json = get_body_json(send(&app, "GET", "/api/receivables?statuses=overdue", None).await).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 1);
    assert_eq!(json["kpis_formatted"]["total_open"], "R$ 300,00");
    assert_eq!(json["kpis_formatted"]["total_settled_this_month"], "R$ 150,00");
}

#[tokio::test]
async fn test_receivables_rejects_unknown_status() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/receivables?statuses=lost", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway_per_view() {
    let mut routes = finance_routes();
    routes.retain(|(prefix, _)| !prefix.ends_with("saldoBancos"));
    routes.push(("https://api.test/v1/saldoBancos", Ok(HttpResponse::new(401, ""))));
    let (app, _) = setup_with(routes, true);

    let response = send(&app, "GET", "/api/balances", None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(get_body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("401"));

    let response = send(&app, "GET", "/api/receivables", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_service_unavailable() {
    let (app, _) = setup_with(vec![viacep_hit()], false);

    let response = send(&app, "GET", "/api/movements", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = send(&app, "GET", "/api/cep/01001000", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

fn configured_app(cache_mode: CacheMode) -> (Router, Arc<RoutedHttpClient>) {
    let http = Arc::new(RoutedHttpClient::new(finance_routes()));
    let mut config = AppConfig::default();
    config.api.base_url = API.to_owned();
    config.api.token = Some("secret".into());

    let state = AppState::from_config(
        &config,
        http.clone(),
        Arc::new(FixedClock(date!(2025 - 10 - 16))),
        cache_mode,
    );
    (create_router(Arc::new(state), None), http)
}

#[tokio::test]
async fn test_configured_state_caches_between_requests() {
    let (app, http) = configured_app(CacheMode::Use);

    for _ in 0..2 {
        let response = send(&app, "GET", "/api/balances", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(http.requested("https://api.test/v1/saldoBancos"), 1);
}

#[tokio::test]
async fn test_configured_state_without_cache_fetches_every_time() {
    let (app, http) = configured_app(CacheMode::Bypass);

    for _ in 0..2 {
        let response = send(&app, "GET", "/api/balances", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(http.requested("https://api.test/v1/saldoBancos"), 2);
}

// ========== Registration Form Tests ==========

#[tokio::test]
async fn test_session_form_lifecycle() {
    let (app, _) = setup_test_app();
    let id = new_session(&app).await;

    let json = get_body_json(send(&app, "GET", &format!("/api/sessions/{id}/form"), None).await).await;
    assert_eq!(json["legal_name"], "");

    let response = send(
        &app,
        "PUT",
        &format!("/api/sessions/{id}/form"),
        Some(serde_json::json!({"legal_name": "Acme Ltda", "number": "100"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/form/address"),
        Some(serde_json::json!({"cep": "01001-000"})),
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["legal_name"], "Acme Ltda");
    assert_eq!(json["number"], "100");
    assert_eq!(json["street"], "Praça da Sé");
    assert_eq!(json["postal_code"], "01001-000");

    let response = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &format!("/api/sessions/{id}/form"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_address_fill_leaves_form_untouched() {
    let (app, _) = setup_with(vec![], false);
    let id = new_session(&app).await;

    send(
        &app,
        "PUT",
        &format!("/api/sessions/{id}/form"),
        Some(serde_json::json!({"street": "Rua Antiga"})),
    )
    .await;

    let response = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/form/address"),
        Some(serde_json::json!({"cep": "01001000"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(send(&app, "GET", &format!("/api/sessions/{id}/form"), None).await).await;
    assert_eq!(json["street"], "Rua Antiga");
}

#[tokio::test]
async fn test_export_form_as_base64_pdf() {
    let (app, _) = setup_test_app();
    let id = new_session(&app).await;

    send(
        &app,
        "PUT",
        &format!("/api/sessions/{id}/form"),
        Some(serde_json::json!({"legal_name": "Acme Ltda"})),
    )
    .await;

    let json = get_body_json(send(&app, "GET", &format!("/api/sessions/{id}/form/export"), None).await).await;
    assert_eq!(json["mime_type"], "application/pdf");
    assert!(json["file_name"].as_str().unwrap().ends_with(".pdf"));
    assert!(json["content_base64"].as_str().unwrap().starts_with("JVBERi0"));
}

#[tokio::test]
async fn test_invalid_session_id() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/sessions/not-a-uuid/form", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup_test_app();

    let response = send(&app, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["status"], "ok");
}
