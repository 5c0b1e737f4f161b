//! Behavior tests for the financial dashboard views
//!
//! These tests drive [`Dashboard`] over a scripted financial API and check
//! what each view shows: statement grouping, KPIs, balances, bank options
//! and receivables, plus how fetch failures and caching behave.

use std::str::FromStr;

use caixa_core::report::FormattedReceivable;
use caixa_core::{
    format_brl, CacheMode, CacheStore, Dashboard, DateRange, FetchError, FinanceClient,
    FixedClock, MovementFilter, ReceivableFilter, ReceivableStatus,
};
use caixa_tests::*;
use rust_decimal::Decimal;
use time::macros::date;

fn dashboard_over(http: Arc<ScriptedHttpClient>) -> Dashboard {
    dashboard_with(FinanceClient::new(http, API_BASE, "secret-token"))
}

fn dashboard_with(finance: FinanceClient) -> Dashboard {
    Dashboard::new(
        finance,
        Arc::new(FixedClock(date!(2025 - 10 - 16))),
        date!(2025 - 01 - 01),
    )
}

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal")
}

// =============================================================================
// Statement
// =============================================================================

#[tokio::test]
async fn statement_groups_by_day_and_description_and_drops_empty_lines() {
    // Given
    let dashboard = dashboard_over(Arc::new(finance_api()));

    // When: no filter is applied
    let report = dashboard
        .movement_report(&MovementFilter::default())
        .await
        .expect("report");

    // Then: two PIX credits on the same day collapse, the zero line is gone,
    // dated lines come newest first and the undated one last
    let lines = report
        .statement
        .iter()
        .map(|row| row.formatted())
        .map(|row| (row.date, row.description, row.inflow, row.outflow))
        .collect::<Vec<_>>();
    let expected: Vec<(String, String, String, String)> = vec![
        ("02/04/2025".into(), "TED".into(), "R$ 1.234,50".into(), String::new()),
        ("10/03/2025".into(), "PIX RECEBIDO".into(), "R$ 150,00".into(), String::new()),
        ("10/03/2025".into(), "TARIFA".into(), String::new(), "R$ 30,00".into()),
        (String::new(), "AJUSTE".into(), String::new(), "R$ 7,00".into()),
    ];
    assert_eq!(lines, expected);
    assert_eq!(report.rows.len(), 6);
}

#[tokio::test]
async fn kpis_follow_the_date_filter_and_exclude_undated_rows() {
    let dashboard = dashboard_over(Arc::new(finance_api()));
    let filter = MovementFilter {
        range: DateRange::parse_bounds(Some("2025-03-01"), Some("2025-03-31")).expect("range"),
        banks: Vec::new(),
    };

    let report = dashboard.movement_report(&filter).await.expect("report");

    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.kpis.total_inflow, dec("150"));
    assert_eq!(report.kpis.total_outflow, dec("30"));
    assert_eq!(report.kpis.net, dec("120"));
    assert_eq!(report.kpis.formatted().net, "R$ 120,00");
}

#[tokio::test]
async fn bank_filter_and_per_bank_flows() {
    let dashboard = dashboard_over(Arc::new(finance_api()));
    let filter = MovementFilter {
        range: None,
        banks: vec![String::from("Itaú"), String::from("Inter")],
    };

    let report = dashboard.movement_report(&filter).await.expect("report");

    assert!(report.rows.iter().all(|row| row.bank_name != "Bradesco"));
    let flows = report
        .bank_flows
        .iter()
        .map(|flow| (flow.bank_name.as_str(), flow.net))
        .collect::<Vec<_>>();
    assert_eq!(flows, vec![("Inter", dec("-7")), ("Itaú", dec("120"))]);
}

#[tokio::test]
async fn movements_request_starts_at_the_configured_day() {
    let http = Arc::new(finance_api());
    let dashboard = dashboard_over(http.clone());

    dashboard
        .movement_report(&MovementFilter::default())
        .await
        .expect("report");

    let url = &http.urls()[0];
    assert!(url.contains("DesabilitarPaginacao=true"));
    assert!(url.ends_with("DataMovimentoMaiorOuIgualA=2025-01-01"));
    assert_eq!(
        http.requests()[0].headers.get("authorization").map(String::as_str),
        Some("Bearer secret-token")
    );
}

// =============================================================================
// Balances and bank options
// =============================================================================

#[tokio::test]
async fn balances_merge_duplicate_banks_and_end_with_a_total() {
    let dashboard = dashboard_over(Arc::new(finance_api()));

    let report = dashboard.balance_report(&[]).await.expect("report");

    assert_eq!(
        report.formatted(),
        vec![
            ("Bradesco".to_owned(), "R$ -200,00".to_owned()),
            ("Itaú".to_owned(), "R$ 1.100,00".to_owned()),
            ("Total".to_owned(), "R$ 900,00".to_owned()),
        ]
    );
}

#[tokio::test]
async fn bank_options_are_the_sorted_union_of_both_feeds() {
    let dashboard = dashboard_over(Arc::new(finance_api()));

    let banks = dashboard.bank_options().await.expect("banks");

    assert_eq!(banks, vec!["Bradesco", "Inter", "Itaú"]);
}

// =============================================================================
// Receivables
// =============================================================================

#[tokio::test]
async fn receivable_statuses_kpis_and_buckets() {
    let dashboard = dashboard_over(Arc::new(finance_api()));

    let view = dashboard
        .receivables_view(&ReceivableFilter::default())
        .await
        .expect("view");
    let report = view.report;

    assert!(view.warnings.is_empty());
    assert_eq!(report.kpis.total_open, dec("550"));
    assert_eq!(report.kpis.total_overdue, dec("300"));
    assert_eq!(report.kpis.total_settled_this_month, dec("150"));

    let buckets = report
        .buckets
        .iter()
        .map(|bucket| (bucket.label, bucket.count, format_brl(bucket.amount)))
        .collect::<Vec<_>>();
    let expected: Vec<(&str, usize, String)> = vec![
        ("Pago", 2, "R$ 230,00".to_owned()),
        ("Vencido", 1, "R$ 300,00".to_owned()),
        ("Vence hoje", 1, "R$ 200,00".to_owned()),
        ("A vencer", 1, "R$ 40,00".to_owned()),
        ("Sem vencimento", 1, "R$ 10,00".to_owned()),
    ];
    assert_eq!(buckets, expected);

    let first = FormattedReceivable::from(&report.rows[0]);
    assert_eq!(first.client_name, "Beta SA");
    assert_eq!(first.due_date, "10/08/2025");
    assert_eq!(first.status, "Pago");
    assert_eq!(report.rows.last().map(|row| row.due_date), Some(None));
}

#[tokio::test]
async fn settled_this_month_ignores_the_filters() {
    let dashboard = dashboard_over(Arc::new(finance_api()));
    let filter = ReceivableFilter {
        range: DateRange::parse_bounds(Some("2025-11-01"), None).expect("range"),
        statuses: vec![ReceivableStatus::Upcoming],
    };

    let report = dashboard.receivables_view(&filter).await.expect("view").report;

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.kpis.total_open, dec("40"));
    assert_eq!(report.kpis.total_overdue, Decimal::ZERO);
    assert_eq!(report.kpis.total_settled_this_month, dec("150"));
}

#[tokio::test]
async fn clients_failure_degrades_to_a_warning() {
    let http = Arc::new(
        ScriptedHttpClient::new()
            .json("https://api.test/v1/boletos", receivables_payload())
            .status("https://api.test/v1/clientes", 500),
    );
    let dashboard = dashboard_over(http);

    let view = dashboard
        .receivables_view(&ReceivableFilter::default())
        .await
        .expect("view still renders");

    assert_eq!(view.report.rows.len(), 6);
    assert!(view.report.rows.iter().all(|row| row.client_name.is_empty()));
    assert_eq!(view.warnings.len(), 1);
}

// =============================================================================
// Fetch failures and caching
// =============================================================================

#[tokio::test]
async fn empty_body_is_an_empty_table_but_garbage_is_an_error() {
    let http = Arc::new(
        ScriptedHttpClient::new()
            .route("https://api.test/v1/saldoBancos", vec![Ok(HttpResponse::ok_json("  "))])
            .route(
                "https://api.test/v1/movimentosBancarios",
                vec![Ok(HttpResponse::ok_json("{not json"))],
            ),
    );
    let dashboard = dashboard_over(http);

    let balances = dashboard.balance_report(&[]).await.expect("empty is fine");
    assert!(balances.rows.is_empty());
    assert_eq!(balances.total, Decimal::ZERO);

    let error = dashboard
        .movement_report(&MovementFilter::default())
        .await
        .expect_err("garbage body");
    assert!(matches!(error, FetchError::Malformed { .. }));
    assert_eq!(error.endpoint(), "/v1/movimentosBancarios");
}

#[tokio::test]
async fn one_failing_view_leaves_the_others_working() {
    let http = Arc::new(
        ScriptedHttpClient::new()
            .status("https://api.test/v1/saldoBancos", 401)
            .json("https://api.test/v1/boletos", receivables_payload())
            .json("https://api.test/v1/clientes", clients_payload()),
    );
    let dashboard = dashboard_over(http);

    let error = dashboard.balance_report(&[]).await.expect_err("401");
    assert_eq!(
        error,
        FetchError::Status {
            endpoint: String::from("/v1/saldoBancos"),
            status: 401
        }
    );
    assert!(dashboard
        .receivables_view(&ReceivableFilter::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn cached_responses_are_reused_until_refresh() {
    let http = Arc::new(finance_api());
    let cache = CacheStore::default();
    let cached = dashboard_with(
        FinanceClient::new(http.clone(), API_BASE, "secret-token").with_cache(cache.clone()),
    );

    cached.balance_report(&[]).await.expect("first");
    cached.balance_report(&[]).await.expect("second");
    assert_eq!(http.calls_to("https://api.test/v1/saldoBancos"), 1);

    let refreshing = dashboard_with(
        FinanceClient::new(http.clone(), API_BASE, "secret-token")
            .with_cache(cache.clone())
            .with_cache_mode(CacheMode::Refresh),
    );
    refreshing.balance_report(&[]).await.expect("refresh");
    assert_eq!(http.calls_to("https://api.test/v1/saldoBancos"), 2);

    let other_token = dashboard_with(
        FinanceClient::new(http.clone(), API_BASE, "another-token").with_cache(cache),
    );
    other_token.balance_report(&[]).await.expect("other token");
    assert_eq!(http.calls_to("https://api.test/v1/saldoBancos"), 3);
}
