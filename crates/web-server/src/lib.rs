// In crates/web-server/src/lib.rs

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::{get, post},
};
use api_client::ApiEnvelope;
use app_config::types::ServerSettings;
use engine::{AnalysisState, CollectionState, DashboardState, SignalFeedSnapshot, Views};
use events::DashboardEvent;
use futures::{sink::SinkExt, stream::StreamExt};
use core_types::SignalStatus;
use events::NotificationKind;
use preferences::{
    ConfirmationChecklist, GeneralSettings, IndicatorSettings, NotificationSettings, SettingsForm,
};
use serde::Serialize;
use serde_json::{Map, Value};
use signals::SignalCriteria;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod notifier;
pub mod types;

pub use error::{Error, Result};
pub use notifier::spawn_notifier;
use types::{
    AnalysisSelection, AssetRequest, CollectionRequest, FormName, FormView, IndicatorSummary,
    SignalList, StatusChange,
};

pub type WsCache = Arc<Mutex<VecDeque<DashboardEvent>>>;
pub const WS_CACHE_SIZE: usize = 200;

type Reply<T> = Result<Json<ApiEnvelope<T>>>;

fn ok<T>(data: T) -> Reply<T> {
    Ok(Json(ApiEnvelope::success(data)))
}

/// The four tabs of the settings page, each an independent form.
#[derive(Clone, Default)]
pub struct SettingsForms {
    pub indicators: Arc<RwLock<SettingsForm<IndicatorSettings>>>,
    pub notifications: Arc<RwLock<SettingsForm<NotificationSettings>>>,
    pub general: Arc<RwLock<SettingsForm<GeneralSettings>>>,
    pub confirmations: Arc<RwLock<SettingsForm<ConfirmationChecklist>>>,
}

#[derive(Clone)]
pub struct AppState {
    pub views: Views,
    pub forms: SettingsForms,
    pub ws_tx: broadcast::Sender<DashboardEvent>,
    pub ws_cache: WsCache,
}

impl AppState {
    pub fn new(views: Views, ws_tx: broadcast::Sender<DashboardEvent>, ws_cache: WsCache) -> Self {
        Self {
            views,
            forms: SettingsForms::default(),
            ws_tx,
            ws_cache,
        }
    }
}

/// Runs `$body` with `$form` bound to the named settings form.
macro_rules! with_form {
    ($forms:expr, $name:expr, |$form:ident| $body:expr) => {
        match $name {
            FormName::Indicators => {
                let $form = &$forms.indicators;
                $body
            }
            FormName::Notifications => {
                let $form = &$forms.notifications;
                $body
            }
            FormName::General => {
                let $form = &$forms.general;
                $body
            }
            FormName::Confirmations => {
                let $form = &$forms.confirmations;
                $body
            }
        }
    };
}

/// Keeps the newest events for clients that connect later.
pub fn record_events(ws_tx: &broadcast::Sender<DashboardEvent>, cache: WsCache) -> JoinHandle<()> {
    let mut rx = ws_tx.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let mut cache = cache.lock().unwrap_or_else(|p| p.into_inner());
                    if cache.len() >= WS_CACHE_SIZE {
                        cache.pop_front();
                    }
                    cache.push_back(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Replay cache fell behind the event stream.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/refresh", post(refresh_dashboard))
        .route("/signals", get(get_signals))
        .route("/signals/page", get(get_signals_page))
        .route("/signals/criteria", post(set_signal_criteria))
        .route("/signals/refresh", post(refresh_signals))
        .route("/signals/{id}/status", post(set_signal_status))
        .route("/analysis", get(get_analysis))
        .route("/analysis/selection", post(select_analysis))
        .route("/analysis/refresh", post(refresh_analysis))
        .route("/collection", get(get_collection))
        .route("/collection/refresh", post(refresh_collection))
        .route("/collection/start", post(start_collection))
        .route("/collection/stop", post(stop_collection))
        .route("/collection/compare", post(compare_prices))
        .route("/collection/optimize", post(optimize_simulation))
        .route("/indicators", get(get_indicator_summary))
        .route("/confirmations/{index}/toggle", post(toggle_confirmation))
        .route("/confirmations/enable-all", post(enable_all_confirmations))
        .route("/confirmations/disable-all", post(disable_all_confirmations))
        .route("/settings/{form}", get(get_form).patch(update_form))
        .route("/settings/{form}/save", post(save_form))
        .route("/settings/{form}/reset", post(reset_form));

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(ws_handler))
        .nest("/api", api_router)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let addr_str = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", addr_str);

    let listener = TcpListener::bind(&addr_str)
        .await
        .map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServeError)?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

// --- Dashboard ---

async fn get_dashboard(State(state): State<AppState>) -> Reply<DashboardState> {
    ok(state.views.dashboard.state().await)
}

async fn refresh_dashboard(State(state): State<AppState>) -> Reply<DashboardState> {
    state.views.dashboard.refresh().await;
    ok(state.views.dashboard.state().await)
}

// --- Signals ---

async fn get_signals(
    State(state): State<AppState>,
    Query(criteria): Query<SignalCriteria>,
) -> Reply<SignalList> {
    let signals = state.views.signals.matching(&criteria).await;
    let total = state.views.signals.all().await.len();
    ok(SignalList {
        signals,
        total,
        criteria,
    })
}

async fn get_signals_page(State(state): State<AppState>) -> Reply<SignalFeedSnapshot> {
    ok(state.views.signals.snapshot().await)
}

async fn set_signal_criteria(
    State(state): State<AppState>,
    Json(criteria): Json<SignalCriteria>,
) -> Reply<SignalFeedSnapshot> {
    tracing::debug!(?criteria, "Signal filter changed.");
    state.views.signals.set_criteria(criteria).await;
    ok(state.views.signals.snapshot().await)
}

async fn refresh_signals(State(state): State<AppState>) -> Reply<SignalFeedSnapshot> {
    state.views.signals.refresh().await;
    ok(state.views.signals.snapshot().await)
}

async fn set_signal_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(change): Json<StatusChange>,
) -> Reply<SignalFeedSnapshot> {
    if !state.views.signals.set_status(id, change.status).await {
        return Err(Error::NotFound(format!("signal {}", id)));
    }
    if change.status == SignalStatus::Expired {
        notify_expiry(&state, id).await;
    }
    ok(state.views.signals.snapshot().await)
}

async fn notify_expiry(state: &AppState, id: u64) {
    let Some(signal) = state.views.signals.all().await.into_iter().find(|s| s.id == id) else {
        return;
    };
    let notification = {
        let form = state.forms.notifications.read().await;
        notifier::notification_for(form.values(), NotificationKind::SignalExpired, signal)
    };
    if let Some(notification) = notification {
        tracing::info!(id, channels = ?notification.channels, "Notifying about an expired signal.");
        let _ = state.ws_tx.send(DashboardEvent::Notification(notification));
    }
}

// --- Analysis ---

async fn get_analysis(State(state): State<AppState>) -> Reply<AnalysisState> {
    ok(state.views.analysis.state().await)
}

async fn select_analysis(
    State(state): State<AppState>,
    Json(selection): Json<AnalysisSelection>,
) -> Reply<AnalysisState> {
    state.views.analysis.select(selection.asset, selection.timeframe).await;
    ok(state.views.analysis.state().await)
}

async fn refresh_analysis(State(state): State<AppState>) -> Reply<AnalysisState> {
    state.views.analysis.refresh().await;
    ok(state.views.analysis.state().await)
}

// --- Data collection ---

async fn get_collection(State(state): State<AppState>) -> Reply<CollectionState> {
    ok(state.views.collection.state().await)
}

async fn refresh_collection(State(state): State<AppState>) -> Reply<CollectionState> {
    state.views.collection.refresh().await;
    ok(state.views.collection.state().await)
}

async fn start_collection(
    State(state): State<AppState>,
    Json(request): Json<CollectionRequest>,
) -> Reply<CollectionState> {
    state.views.collection.start(request.method).await;
    ok(state.views.collection.state().await)
}

async fn stop_collection(
    State(state): State<AppState>,
    Json(request): Json<CollectionRequest>,
) -> Reply<CollectionState> {
    state.views.collection.stop(request.method).await;
    ok(state.views.collection.state().await)
}

async fn compare_prices(
    State(state): State<AppState>,
    Json(request): Json<AssetRequest>,
) -> Reply<CollectionState> {
    state.views.collection.compare(request.asset).await;
    ok(state.views.collection.state().await)
}

async fn optimize_simulation(
    State(state): State<AppState>,
    Json(request): Json<AssetRequest>,
) -> Reply<CollectionState> {
    state.views.collection.optimize(request.asset).await;
    ok(state.views.collection.state().await)
}

// --- Settings ---

async fn view_of<T: Serialize>(form: &RwLock<SettingsForm<T>>) -> Result<FormView> {
    FormView::of(&*form.read().await)
}

async fn get_form(State(state): State<AppState>, Path(name): Path<String>) -> Reply<FormView> {
    let name: FormName = name.parse()?;
    ok(with_form!(state.forms, name, |form| view_of(form).await)?)
}

async fn update_form(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(changes): Json<Map<String, Value>>,
) -> Reply<FormView> {
    let name: FormName = name.parse()?;
    let view = with_form!(state.forms, name, |form| {
        let mut form = form.write().await;
        form.set_fields(changes)?;
        FormView::of(&*form)
    })?;
    ok(view)
}

/// Marks the form as saving, waits out its save delay without holding the
/// lock, then completes the save unless an edit came in meanwhile.
async fn save_one<T: Serialize>(name: FormName, form: &RwLock<SettingsForm<T>>) -> Result<FormView> {
    let (ticket, delay) = {
        let mut form = form.write().await;
        (form.begin_save(), form.save_delay())
    };
    tokio::time::sleep(delay).await;

    let mut form = form.write().await;
    if form.finish_save(ticket) {
        tracing::info!(form = %name, "Settings saved.");
    } else {
        tracing::debug!(form = %name, "Save superseded by a newer edit.");
    }
    FormView::of(&*form)
}

async fn save_form(State(state): State<AppState>, Path(name): Path<String>) -> Reply<FormView> {
    let name: FormName = name.parse()?;
    ok(with_form!(state.forms, name, |form| save_one(name, form).await)?)
}

async fn reset_form(State(state): State<AppState>, Path(name): Path<String>) -> Reply<FormView> {
    let name: FormName = name.parse()?;
    let view = with_form!(state.forms, name, |form| {
        let mut form = form.write().await;
        form.reset();
        FormView::of(&*form)
    })?;
    ok(view)
}

async fn get_indicator_summary(State(state): State<AppState>) -> Reply<IndicatorSummary> {
    ok(IndicatorSummary::of(state.forms.indicators.read().await.values()))
}

async fn toggle_confirmation(State(state): State<AppState>, Path(index): Path<usize>) -> Reply<FormView> {
    let mut form = state.forms.confirmations.write().await;
    form.edit(|checklist| checklist.toggle(index))?;
    ok(FormView::of(&*form)?)
}

async fn enable_all_confirmations(State(state): State<AppState>) -> Reply<FormView> {
    let mut form = state.forms.confirmations.write().await;
    form.edit(|checklist| {
        checklist.enable_all();
        Ok(())
    })?;
    ok(FormView::of(&*form)?)
}

async fn disable_all_confirmations(State(state): State<AppState>) -> Reply<FormView> {
    let mut form = state.forms.confirmations.write().await;
    form.edit(|checklist| {
        checklist.disable_all();
        Ok(())
    })?;
    ok(FormView::of(&*form)?)
}

// --- WebSocket ---

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading the cache so nothing published in between is lost.
    let mut rx = state.ws_tx.subscribe();

    let history: Vec<DashboardEvent> = {
        let cache = state.ws_cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.iter().cloned().collect()
    };
    for event in history {
        let Ok(json) = serde_json::to_string(&event) else {
            continue;
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            tracing::debug!("Client disconnected during replay.");
            return;
        }
    }

    loop {
        tokio::select! {
            recv = rx.recv() => match recv {
                Ok(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!(error = %e, kind = event.kind(), "Failed to serialize event.");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "WebSocket client lagged behind; events dropped.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("WebSocket client disconnected.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use engine::Engine;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let settings =
            app_config::settings_from_toml("[data_source]\nsimulated_latency_ms = 0\nseed = 3").unwrap();
        let (ws_tx, _) = broadcast::channel(64);
        let engine = Engine::from_settings(&settings, ws_tx.clone()).unwrap();
        AppState::new(engine.views(), ws_tx, WsCache::default())
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_plain_ok() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signals_are_seeded_and_filtered_by_query() {
        let app = create_router(test_state());
        let (status, body) = call(&app, "POST", "/api/signals/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["total"], 8);

        let (_, body) = call(&app, "GET", "/api/signals?min_confidence=101", None).await;
        assert_eq!(body["data"]["signals"].as_array().unwrap().len(), 0);
        assert_eq!(body["data"]["total"], 8);

        let (_, body) = call(&app, "GET", "/api/signals?asset=all&type=all", None).await;
        assert_eq!(body["data"]["signals"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn bad_filter_value_is_rejected() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/api/signals?asset=DOGEUSD").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_signal_status_change_is_not_found() {
        let app = create_router(test_state());
        let (status, body) =
            call(&app, "POST", "/api/signals/999/status", Some(serde_json::json!({"status": "expired"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn analysis_selection_changes_the_pair() {
        let app = create_router(test_state());
        let (status, body) = call(
            &app,
            "POST",
            "/api/analysis/selection",
            Some(serde_json::json!({"asset": "GBPUSD", "timeframe": "1h"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["asset"], "GBPUSD");
        assert_eq!(body["data"]["timeframe"], "1h");
        assert_eq!(body["data"]["snapshot"]["asset"], "GBPUSD");
        assert!(body["data"]["indicators"]["indicators"]["rsi"].is_object());
        assert!(body["data"]["stability"]["stability_report"]["overall_stability"].is_number());
        assert!(body["data"]["performance"]["success_rate"].is_number());
    }

    #[tokio::test]
    async fn indicator_summary_follows_the_form() {
        let app = create_router(test_state());
        let (_, body) = call(&app, "GET", "/api/indicators", None).await;
        assert_eq!(body["data"]["enabled"].as_array().unwrap().len(), 5);
        assert_eq!(body["data"]["total_weight"], 100);

        call(&app, "PATCH", "/api/settings/indicators", Some(serde_json::json!({"rsiEnabled": false}))).await;
        let (status, body) = call(&app, "GET", "/api/indicators", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["enabled"], serde_json::json!(["macd", "ma", "bb", "stoch"]));
        assert_eq!(body["data"]["total_weight"], 80);
        assert!(!body["data"]["hints"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn expiring_a_signal_notifies_when_enabled() {
        let state = test_state();
        let mut rx = state.ws_tx.subscribe();
        let app = create_router(state);
        let (_, body) = call(&app, "POST", "/api/signals/refresh", None).await;
        let id = body["data"]["signals"][0]["id"].as_u64().unwrap();

        call(&app, "POST", &format!("/api/signals/{}/status", id), Some(serde_json::json!({"status": "expired"}))).await;
        assert!(std::iter::from_fn(|| rx.try_recv().ok()).all(|e| !matches!(e, DashboardEvent::Notification(_))));

        call(&app, "PATCH", "/api/settings/notifications", Some(serde_json::json!({"notifyOnSignalExpiry": true}))).await;
        call(&app, "POST", &format!("/api/signals/{}/status", id), Some(serde_json::json!({"status": "expired"}))).await;
        let notification = std::iter::from_fn(|| rx.try_recv().ok()).find_map(|e| match e {
            DashboardEvent::Notification(n) => Some(n),
            _ => None,
        });
        let notification = notification.expect("expiry notification");
        assert_eq!(notification.kind, NotificationKind::SignalExpired);
        assert_eq!(notification.signal.id, id);
    }

    #[tokio::test]
    async fn settings_form_edit_then_unknown_field() {
        let app = create_router(test_state());
        let (status, body) =
            call(&app, "PATCH", "/api/settings/general", Some(serde_json::json!({"darkMode": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["values"]["darkMode"], true);
        assert_eq!(body["data"]["dirty"], true);

        let (status, body) =
            call(&app, "PATCH", "/api/settings/general", Some(serde_json::json!({"colour": "red"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, _) = call(&app, "GET", "/api/settings/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn save_waits_out_the_delay_and_succeeds() {
        let app = create_router(test_state());
        call(&app, "PATCH", "/api/settings/notifications", Some(serde_json::json!({"minConfidence": 85}))).await;

        let (status, body) = call(&app, "POST", "/api/settings/notifications/save", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "success");
        assert_eq!(body["data"]["dirty"], false);
    }

    #[tokio::test]
    async fn confirmation_toggles() {
        let app = create_router(test_state());
        let (status, body) = call(&app, "POST", "/api/confirmations/3/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["values"]["checks"][3]["active"], true);

        let (status, _) = call(&app, "POST", "/api/confirmations/40/toggle", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = call(&app, "POST", "/api/confirmations/disable-all", None).await;
        let checks = body["data"]["values"]["checks"].as_array().unwrap();
        assert!(checks.iter().all(|c| c["active"] == false));

        let (_, body) = call(&app, "POST", "/api/settings/confirmations/reset", None).await;
        assert_eq!(body["data"]["values"]["checks"][0]["active"], true);
    }

    #[tokio::test]
    async fn collection_channels_start_and_stop() {
        let app = create_router(test_state());
        let (status, body) =
            call(&app, "POST", "/api/collection/start", Some(serde_json::json!({"method": "websocket"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["overview"]["status"]["websocket"]["active"], true);

        let (_, body) =
            call(&app, "POST", "/api/collection/stop", Some(serde_json::json!({"method": "websocket"}))).await;
        assert_eq!(body["data"]["overview"]["status"]["websocket"]["active"], false);
    }

    #[tokio::test]
    async fn recorder_keeps_only_the_newest_events() {
        let (ws_tx, _) = broadcast::channel(512);
        let cache = WsCache::default();
        let recorder = record_events(&ws_tx, cache.clone());

        for i in 0..(WS_CACHE_SIZE + 5) {
            ws_tx
                .send(DashboardEvent::Log(events::WsLogMessage {
                    timestamp: chrono::Utc::now(),
                    level: "INFO".to_string(),
                    message: i.to_string(),
                }))
                .unwrap();
        }
        drop(ws_tx);
        recorder.await.unwrap();

        let cache = cache.lock().unwrap();
        assert_eq!(cache.len(), WS_CACHE_SIZE);
        match cache.front() {
            Some(DashboardEvent::Log(log)) => assert_eq!(log.message, "5"),
            other => panic!("unexpected first entry: {:?}", other),
        }
    }
}
