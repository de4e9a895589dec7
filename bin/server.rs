// ZenSpend - API Server
// JSON REST API with Axum over one shared in-memory workspace

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Local;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use zenspend::config::{init_tracing, ServerCli};
use zenspend::entities::category::UnknownCategory;
use zenspend::entities::subscription::{total_amount, total_monthly_cost};
use zenspend::{
    AlertCounts, AlertType, Analytics, BudgetRow, BudgetSummary, BurnRate, Category,
    CategorySelector, ChatMessage, CoachState, Contribution, Currency, FinanceError, Goal,
    NotificationKind, Overview, ParseError, Settings, Subscription, Transaction,
    TransactionFilter, Workspace,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    ws: Arc<Mutex<Workspace>>,
}

impl AppState {
    fn new(ws: Workspace) -> Self {
        Self {
            ws: Arc::new(Mutex::new(ws)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Workspace>, ApiError> {
        self.ws.lock().map_err(|_| {
            error!("workspace lock poisoned");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "workspace unavailable")
        })
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<Option<()>> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<FinanceError> for ApiError {
    fn from(err: FinanceError) -> Self {
        let status = match err {
            FinanceError::GoalNotFound(_) | FinanceError::AlertNotFound(_) => StatusCode::NOT_FOUND,
            FinanceError::CoachBusy => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<UnknownCategory> for ApiError {
    fn from(err: UnknownCategory) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::err(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

// ============================================================================
// Request / Response shapes
// ============================================================================

#[derive(Deserialize)]
struct TransactionQuery {
    q: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize)]
struct AlertQuery {
    #[serde(rename = "type")]
    alert_type: Option<String>,
}

#[derive(Deserialize)]
struct ContributionRequest {
    amount: f64,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Deserialize)]
struct CurrencyRequest {
    currency: Currency,
}

#[derive(Serialize)]
struct BudgetsResponse {
    budgets: Vec<BudgetRow>,
    summary: BudgetSummary,
}

#[derive(Serialize)]
struct BurnRateResponse {
    #[serde(flatten)]
    burn_rate: BurnRate,
    message: &'static str,
}

#[derive(Serialize)]
struct SubscriptionsResponse {
    subscriptions: Vec<Subscription>,
    total: f64,
    monthly_total: f64,
}

#[derive(Serialize)]
struct GoalResponse {
    #[serde(flatten)]
    goal: Goal,
    percentage: u32,
    remaining: f64,
    complete: bool,
    days_left: i64,
}

#[derive(Serialize)]
struct AlertsResponse {
    alerts: Vec<zenspend::Alert>,
    counts: AlertCounts,
}

#[derive(Serialize)]
struct ChatResponse {
    state: CoachState,
    messages: Vec<ChatMessage>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/overview - Dashboard cards
async fn get_overview(State(state): State<AppState>) -> ApiResult<Overview> {
    let ws = state.lock()?;
    ok(ws.overview()?)
}

/// GET /api/categories
async fn get_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let ws = state.lock()?;
    ok(ws.categories().all().to_vec())
}

/// GET /api/transactions?q=&category= - Search transactions
async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<Vec<Transaction>> {
    let category: CategorySelector = query
        .category
        .as_deref()
        .unwrap_or("all")
        .parse()?;
    let filter = TransactionFilter::new(query.q.as_deref().unwrap_or(""), category);

    let ws = state.lock()?;
    ok(filter.apply_owned(ws.transactions()))
}

/// GET /api/budgets - Per-category progress
async fn get_budgets(State(state): State<AppState>) -> ApiResult<BudgetsResponse> {
    let ws = state.lock()?;
    ok(BudgetsResponse {
        budgets: ws.budget_rows()?,
        summary: ws.budget_summary()?,
    })
}

/// GET /api/burn-rate
async fn get_burn_rate(State(state): State<AppState>) -> ApiResult<BurnRateResponse> {
    let ws = state.lock()?;
    let burn_rate = ws.burn_rate();
    ok(BurnRateResponse {
        message: burn_rate.status.message(),
        burn_rate,
    })
}

/// GET /api/subscriptions
async fn get_subscriptions(State(state): State<AppState>) -> ApiResult<SubscriptionsResponse> {
    let ws = state.lock()?;
    let subscriptions = ws.subscriptions();
    ok(SubscriptionsResponse {
        total: total_amount(subscriptions),
        monthly_total: total_monthly_cost(subscriptions),
        subscriptions: subscriptions.to_vec(),
    })
}

fn goal_response(goal: &Goal, today: chrono::NaiveDate) -> Result<GoalResponse, ApiError> {
    Ok(GoalResponse {
        percentage: goal.percentage()?,
        remaining: goal.remaining(),
        complete: goal.is_complete(),
        days_left: goal.days_left(today),
        goal: goal.clone(),
    })
}

/// GET /api/goals
async fn get_goals(State(state): State<AppState>) -> ApiResult<Vec<GoalResponse>> {
    let ws = state.lock()?;
    let goals = ws
        .goals()
        .iter()
        .map(|goal| goal_response(goal, ws.today()))
        .collect::<Result<Vec<_>, _>>()?;
    ok(goals)
}

/// POST /api/goals/:id/contributions - Add money to a goal
async fn add_contribution(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ContributionRequest>,
) -> ApiResult<Contribution> {
    let mut ws = state.lock()?;
    ok(ws.add_to_goal(&id, request.amount)?)
}

/// GET /api/alerts?type=
async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> ApiResult<AlertsResponse> {
    let alert_type = match query.alert_type.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(raw.parse::<AlertType>()?),
    };

    let ws = state.lock()?;
    ok(AlertsResponse {
        alerts: ws.alerts().filter(alert_type).into_iter().cloned().collect(),
        counts: ws.alerts().counts(),
    })
}

/// DELETE /api/alerts/:id - Dismiss an alert
async fn dismiss_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AlertCounts> {
    let mut ws = state.lock()?;
    ws.dismiss_alert(&id)?;
    ok(ws.alerts().counts())
}

/// GET /api/analytics
async fn get_analytics(State(state): State<AppState>) -> ApiResult<Analytics> {
    let ws = state.lock()?;
    ok(ws.analytics())
}

fn chat_snapshot(ws: &Workspace) -> ChatResponse {
    ChatResponse {
        state: ws.coach().state(),
        messages: ws.coach().messages().to_vec(),
    }
}

/// GET /api/coach - Chat transcript
async fn get_chat(State(state): State<AppState>) -> ApiResult<ChatResponse> {
    let ws = state.lock()?;
    ok(chat_snapshot(&ws))
}

/// POST /api/coach - Ask the coach; responds once the reply is in
async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatMessage> {
    // The lock is released while the coach is "typing"
    let pending = {
        let mut ws = state.lock()?;
        ws.coach_mut().submit(&request.message)?
    };

    // The exchange runs on its own task so a dropped request still lands the reply
    let exchange_state = state.clone();
    let exchange = tokio::spawn(async move {
        let reply = pending.resolve().await;
        let finished = exchange_state.lock()?.coach_mut().finish(reply).cloned();
        Ok::<_, ApiError>(finished)
    });

    let finished = exchange.await.map_err(|e| {
        error!("coach reply task failed: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "coach reply failed")
    })??;
    match finished {
        Some(message) => ok(message),
        None => Err(ApiError::new(StatusCode::CONFLICT, "chat was cleared before the reply arrived")),
    }
}

/// DELETE /api/coach - Clear the chat
async fn clear_chat(State(state): State<AppState>) -> ApiResult<ChatResponse> {
    let mut ws = state.lock()?;
    ws.coach_mut().clear();
    ok(chat_snapshot(&ws))
}

/// GET /api/settings
async fn get_settings(State(state): State<AppState>) -> ApiResult<Settings> {
    let ws = state.lock()?;
    ok(ws.settings().clone())
}

/// PUT /api/settings/currency
async fn set_currency(
    State(state): State<AppState>,
    Json(request): Json<CurrencyRequest>,
) -> ApiResult<Settings> {
    let mut ws = state.lock()?;
    ws.settings_mut().set_currency(request.currency);
    ok(ws.settings().clone())
}

/// POST /api/settings/notifications/:kind/toggle
async fn toggle_notification(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Settings> {
    let kind: NotificationKind = kind.parse()?;

    let mut ws = state.lock()?;
    ws.settings_mut().toggle(kind);
    ok(ws.settings().clone())
}

// ============================================================================
// Router
// ============================================================================

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/overview", get(get_overview))
        .route("/categories", get(get_categories))
        .route("/transactions", get(get_transactions))
        .route("/budgets", get(get_budgets))
        .route("/burn-rate", get(get_burn_rate))
        .route("/subscriptions", get(get_subscriptions))
        .route("/goals", get(get_goals))
        .route("/goals/:id/contributions", post(add_contribution))
        .route("/alerts", get(get_alerts))
        .route("/alerts/:id", axum::routing::delete(dismiss_alert))
        .route("/analytics", get(get_analytics))
        .route("/coach", get(get_chat).post(post_chat).delete(clear_chat))
        .route("/settings", get(get_settings))
        .route("/settings/currency", put(set_currency))
        .route("/settings/notifications/:kind/toggle", post(toggle_notification))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = ServerCli::parse();
    init_tracing(cli.common.log_filter("info"));

    println!("🌐 ZenSpend - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let ws = Workspace::load(
        cli.common.data.as_deref(),
        cli.common.coach_delay(),
        Local::now().date_naive(),
    )?;
    println!("✓ Loaded {} transactions", ws.transactions().len());

    let app = router(AppState::new(ws));

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.bind))?;

    info!(bind = %cli.bind, "server listening");
    println!("\n🚀 Server running on http://{}", cli.bind);
    println!("   API: http://{}/api/overview", cli.bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use zenspend::FixtureStore;

    fn app() -> Router {
        app_with_delay(Duration::ZERO)
    }

    fn app_with_delay(coach_delay: Duration) -> Router {
        let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        router(AppState::new(Workspace::new(FixtureStore::builtin(), coach_delay, today)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
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
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_transaction_search() {
        let app = app();

        let (_, body) = send(&app, "GET", "/api/transactions?q=UBER", None).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], "2");

        let (_, body) = send(&app, "GET", "/api/transactions?category=transport", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "GET", "/api/transactions?category=rent", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_budgets() {
        let (status, body) = send(&app(), "GET", "/api/budgets", None).await;
        assert_eq!(status, StatusCode::OK);

        let shopping = body["data"]["budgets"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["category"] == "shopping")
            .unwrap()
            .clone();
        assert_eq!(shopping["percentage"], 104);
        assert_eq!(shopping["status"], "over");
        assert_eq!(body["data"]["summary"]["over"], 1);
    }

    #[tokio::test]
    async fn test_goal_contributions() {
        let app = app();

        let (status, body) =
            send(&app, "POST", "/api/goals/4/contributions", Some(json!({ "amount": 500.0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["current"], 1000.0);
        assert_eq!(body["data"]["reached_target"], true);

        let (_, body) =
            send(&app, "POST", "/api/goals/4/contributions", Some(json!({ "amount": 100.0 }))).await;
        assert_eq!(body["data"]["reached_target"], false);

        let (status, _) =
            send(&app, "POST", "/api/goals/99/contributions", Some(json!({ "amount": 100.0 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, "POST", "/api/goals/1/contributions", Some(json!({ "amount": 0.0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "GET", "/api/goals", None).await;
        assert_eq!(body["data"][3]["complete"], true);
    }

    #[tokio::test]
    async fn test_alerts_filter_and_dismiss() {
        let app = app();

        let (_, body) = send(&app, "GET", "/api/alerts?type=warning", None).await;
        let alerts = body["data"]["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["id"], "1");

        let (status, body) = send(&app, "DELETE", "/api/alerts/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["warning"], 0);

        let (status, _) = send(&app, "DELETE", "/api/alerts/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "GET", "/api/alerts?type=urgent", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_coach_exchange() {
        let app = app();

        let (status, body) = send(
            &app,
            "POST",
            "/api/coach",
            Some(json!({ "message": "Where can I cut expenses?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "assistant");

        let (_, body) = send(&app, "GET", "/api/coach", None).await;
        assert_eq!(body["data"]["state"], "idle");
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 3);

        let (status, _) = send(&app, "POST", "/api/coach", Some(json!({ "message": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "DELETE", "/api/coach", None).await;
        assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_coach_busy_while_typing() {
        let app = app_with_delay(Duration::from_millis(200));

        let first_app = app.clone();
        let first = tokio::spawn(async move {
            send(
                &first_app,
                "POST",
                "/api/coach",
                Some(json!({ "message": "Where can I cut expenses?" })),
            )
            .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let (_, body) = send(&app, "GET", "/api/coach", None).await;
        assert_eq!(body["data"]["state"], "typing");

        let (status, body) = send(
            &app,
            "POST",
            "/api/coach",
            Some(json!({ "message": "How much did I spend on food this month?" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "coach is still typing a reply");

        let (status, body) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "assistant");
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_request_still_finishes_reply() {
        let app = app_with_delay(Duration::from_millis(200));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            send(
                &app,
                "POST",
                "/api/coach",
                Some(json!({ "message": "Where can I cut expenses?" })),
            ),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;

        let (_, body) = send(&app, "GET", "/api/coach", None).await;
        assert_eq!(body["data"]["state"], "idle");
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["role"], "assistant");

        let (status, _) = send(
            &app,
            "POST",
            "/api/coach",
            Some(json!({ "message": "What are my biggest spending categories?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_settings() {
        let app = app();

        let (_, body) = send(&app, "POST", "/api/settings/notifications/bill_reminders/toggle", None).await;
        assert_eq!(body["data"]["notifications"]["bill_reminders"], true);

        let (_, body) = send(&app, "PUT", "/api/settings/currency", Some(json!({ "currency": "EUR" }))).await;
        assert_eq!(body["data"]["currency"], "EUR");

        let (status, _) = send(&app, "POST", "/api/settings/notifications/sms/toggle", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_burn_rate() {
        let (_, body) = send(&app(), "GET", "/api/burn-rate", None).await;

        assert_eq!(body["data"]["expected_usage"], 65);
        assert_eq!(body["data"]["status"], "caution");
        assert_eq!(body["data"]["message"], "Watch your spending");
    }
}
