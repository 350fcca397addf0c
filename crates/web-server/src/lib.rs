//! # AutoFi Web Server
//!
//! JSON-over-HTTP surface of the engine plus a WebSocket event stream.
//!
//! Commands are `POST` requests acting as the account named by the `x-caller`
//! header; views are `GET` requests. Every command runs as one engine
//! transaction, so a rejected request leaves the protocol untouched.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use engine::Engine;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod caller;
pub mod dto;
pub mod error;
pub mod handlers;

use handlers::{portfolio, rebalance, strategies, stream, vault};

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

/// Builds the full router over `engine`.
pub fn router(engine: Arc<Engine>) -> Router {
    let app_state = Arc::new(AppState { engine });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    let vault_routes = Router::new()
        .route("/", get(vault::info))
        .route("/users/:address", get(vault::user))
        .route("/deposit", post(vault::deposit))
        .route("/withdraw", post(vault::withdraw))
        .route("/execute-strategy", post(vault::execute_strategy))
        .route("/rebalance", post(vault::rebalance))
        .route("/strategy-manager", post(vault::set_strategy_manager))
        .route("/rebalance-executor", post(vault::set_rebalance_executor))
        .route("/pause", post(vault::pause))
        .route("/unpause", post(vault::unpause))
        .route("/emergency-withdraw", post(vault::emergency_withdraw))
        .route("/transfer-ownership", post(vault::transfer_ownership));

    let strategy_routes = Router::new()
        .route("/", get(strategies::list).post(strategies::register))
        .route("/active", get(strategies::active))
        .route("/:address", get(strategies::get))
        .route("/:address/activate", post(strategies::activate))
        .route("/:address/deactivate", post(strategies::deactivate))
        .route("/:address/allocation", post(strategies::update_allocation))
        .route("/:address/execute", post(strategies::record_execution))
        .route(
            "/:address/performance",
            get(strategies::performance).post(strategies::update_performance),
        );

    let manager_routes = Router::new()
        .route("/", get(strategies::manager))
        .route("/vault", post(strategies::set_vault))
        .route("/rebalance-executor", post(strategies::set_rebalance_executor))
        .route("/pause", post(strategies::pause))
        .route("/unpause", post(strategies::unpause))
        .route("/reset-allocations", post(strategies::reset_allocations))
        .route("/transfer-ownership", post(strategies::transfer_ownership));

    let rebalance_routes = Router::new()
        .route("/execute", post(rebalance::execute))
        .route("/auto", post(rebalance::trigger_auto))
        .route("/emergency", post(rebalance::emergency))
        .route("/config", get(rebalance::config).post(rebalance::update_config))
        .route("/reset-history", post(rebalance::reset_history))
        .route("/vault", post(rebalance::set_vault))
        .route("/strategy-manager", post(rebalance::set_strategy_manager))
        .route("/pause", post(rebalance::pause))
        .route("/unpause", post(rebalance::unpause))
        .route("/transfer-ownership", post(rebalance::transfer_ownership))
        .route("/analyze", post(rebalance::analyze))
        .route("/optimal-allocation", post(rebalance::optimal_allocation))
        .route("/status", get(rebalance::status))
        .route("/history", get(rebalance::history))
        .route("/history/:id", get(rebalance::history_entry));

    Router::new()
        .route("/api/health", get(handlers::health))
        .nest("/api/vault", vault_routes)
        .nest("/api/strategies", strategy_routes)
        .nest("/api/strategy-manager", manager_routes)
        .nest("/api/rebalance", rebalance_routes)
        .route("/api/portfolio", get(portfolio::summary))
        .route("/api/events", get(portfolio::events))
        .route("/ws", get(stream::websocket_handler))
        .fallback(handlers::fallback)
        .with_state(app_state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Serves the API on `addr` until the process is stopped.
///
/// Tracing is initialised by the binary, not here.
pub async fn run_server(engine: Arc<Engine>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use engine::{InMemoryCustody, ManualClock, ProtocolState};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const OWNER: &str = "0x0101010101010101010101010101010101010101";
    const VAULT: &str = "0x0202020202020202020202020202020202020202";
    const EXECUTOR: &str = "0x0404040404040404040404040404040404040404";
    const ALICE: &str = "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a";
    const AAVE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const T0: u64 = 1_700_000_000;

    fn test_config() -> configuration::Config {
        let toml = format!(
            r#"
            [deployment]
            owner = "{OWNER}"
            vault = "{VAULT}"
            strategy_manager = "0x0303030303030303030303030303030303030303"
            rebalance_executor = "{EXECUTOR}"
            asset_token = "0x0505050505050505050505050505050505050505"
            reward_token = "0x0606060606060606060606060606060606060606"

            [rebalance]
            threshold_bps = 1000
            max_rebalance_amount = "10000000000"
            cooldown_secs = 3600

            [[strategies]]
            address = "{AAVE}"
            name = "Aave USDC"
            max_allocation_bps = 5000
            activate = true
            allocation_bps = 3000
            "#
        );
        configuration::load_config_str(&toml).unwrap()
    }

    fn app() -> Router {
        let (state, _) = ProtocolState::bootstrap(&test_config(), T0).unwrap();
        let engine = Engine::new(
            state,
            Arc::new(ManualClock::new(T0)),
            Arc::new(InMemoryCustody::default()),
            None,
        );
        router(Arc::new(engine))
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(uri: &str, caller: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("x-caller", caller)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn non_owner_pause_is_forbidden() {
        let app = app();

        let (status, body) = call(&app, post("/api/vault/pause", ALICE, json!({}))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "NotOwner");
        assert_eq!(body["kind"], "authorization");
    }

    #[tokio::test]
    async fn deposit_is_reflected_in_user_info() {
        let app = app();

        let (status, body) = call(
            &app,
            post("/api/vault/deposit", ALICE, json!({ "amount": "250000000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shares"], "250000000");

        let (status, info) = call(&app, get(&format!("/api/vault/users/{ALICE}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["balance"], "250000000");
        assert_eq!(info["share_bps"], 10_000);
        assert_eq!(info["is_locked"], true);
    }

    #[tokio::test]
    async fn policy_rejections_map_to_precondition_failed() {
        let app = app();

        let (status, body) = call(
            &app,
            post("/api/vault/deposit", ALICE, json!({ "amount": "1" })),
        )
        .await;

        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["error"], "DepositTooSmall");
        assert_eq!(body["kind"], "policy");
    }

    #[tokio::test]
    async fn missing_or_malformed_caller_is_a_bad_request() {
        let app = app();

        let request = Request::post("/api/vault/pause").body(Body::empty()).unwrap();
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BadRequest");

        let (status, _) = call(&app, post("/api/vault/pause", "0x1234", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let app = app();

        let (status, body) = call(
            &app,
            post("/api/vault/deposit", ALICE, json!({ "amount": "lots" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "request");
    }

    #[tokio::test]
    async fn strategy_views_and_lookups() {
        let app = app();

        let (status, active) = call(&app, get("/api/strategies/active")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(active[0]["strategy_address"], AAVE);
        assert_eq!(active[0]["allocation"], 3000);

        let unknown = "0x0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c";
        let (status, body) = call(&app, get(&format!("/api/strategies/{unknown}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NotFound");
    }

    #[tokio::test]
    async fn rebalance_history_lookup_and_cooldown() {
        let app = app();
        let request = json!({ "strategies": [AAVE], "amounts": ["1000"], "reason": "manual" });

        let (status, body) = call(&app, post("/api/rebalance/execute", VAULT, request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rebalance_id"], 0);

        let (status, body) = call(&app, post("/api/rebalance/execute", VAULT, request)).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
        assert_eq!(body["error"], "CooldownNotPassed");

        let (status, record) = call(&app, get("/api/rebalance/history/0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["reason"], "manual");

        let (status, body) = call(&app, get("/api/rebalance/history/7")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "InvalidRebalanceId");

        let (_, view) = call(&app, get("/api/rebalance/status")).await;
        assert_eq!(view["can_execute"], false);
        assert_eq!(view["rebalance_count"], 1);
    }

    #[tokio::test]
    async fn optimal_allocation_splits_evenly() {
        let app = app();
        let strategies = [AAVE, VAULT, EXECUTOR];

        let (status, body) = call(
            &app,
            post(
                "/api/rebalance/optimal-allocation",
                ALICE,
                json!({ "strategies": strategies, "current_allocations": [0, 0, 0] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allocations"], json!([3334, 3333, 3333]));
    }

    #[tokio::test]
    async fn committed_commands_appear_in_the_event_journal() {
        let app = app();
        call(&app, post("/api/vault/pause", OWNER, json!({}))).await;

        let (status, events) = call(&app, get("/api/events?limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(events.as_array().map(Vec::len), Some(1));
        assert_eq!(events[0]["label"], "Vault.Paused");
    }

    #[tokio::test]
    async fn portfolio_reports_tvl_and_allocation() {
        let app = app();
        call(
            &app,
            post("/api/vault/deposit", ALICE, json!({ "amount": "1000000000" })),
        )
        .await;

        let (status, report) = call(&app, get("/api/portfolio")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["total_allocation_bps"], 3000);
        assert_eq!(report["active_strategies"], 1);
    }

    #[tokio::test]
    async fn unknown_routes_return_json_not_found() {
        let (status, body) = call(&app(), get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "lookup");
    }
}
