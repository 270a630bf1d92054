//! RpcServer ties together the HTTP server and handler implementations.
//!
//! One JSON-RPC 2.0 endpoint at `POST /rpc` plus a few plain GET routes
//! (`/health`, `/metrics`, `/account/{address}`).

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rpc::auth::{require_hmac, AuthConfig};
use crate::rpc::handlers::{RpcDeps, RpcHandler};
use crate::txpool::pool::Tx;
use crate::utils::metrics::METRICS;

/// JSON-RPC 2.0 request structure (simplified)
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<Value>,
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    fn result(id: Option<Value>, v: Value) -> Self {
        Self { jsonrpc: "2.0".into(), result: Some(v), error: None, id }
    }
    fn error(id: Option<Value>, code: i32, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(serde_json::json!({"code": code, "message": message})),
            id,
        }
    }
}

pub struct RpcServer<D: RpcDeps> {
    addr: SocketAddr,
    deps: Arc<D>,
    auth: Arc<AuthConfig>,
}

impl<D: RpcDeps> RpcServer<D> {
    pub fn new(addr: SocketAddr, deps: Arc<D>, auth: AuthConfig) -> Self {
        Self { addr, deps, auth: Arc::new(auth) }
    }

    /// Construct the router and serve until shutdown is signalled.
    pub async fn start(self, mut shutdown_rx: watch::Receiver<bool>) -> anyhow::Result<()> {
        let handler = Arc::new(RpcHandler::new(self.deps.clone()));

        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/metrics", get(metrics_handler))
            .route("/rpc", post(json_rpc_endpoint::<D>))
            .route("/account/{address}", get(account_endpoint::<D>))
            .with_state(handler)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn_with_state(self.auth.clone(), require_hmac)),
            );

        info!("Starting RPC server on {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // resolves when shutdown flips to true (or the sender drops)
                while !*shutdown_rx.borrow() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;
        Ok(())
    }
}

/// /metrics: text exposition of the registry
async fn metrics_handler() -> String {
    METRICS.render()
}

/// GET /account/{address}
async fn account_endpoint<D: RpcDeps>(
    State(rh): State<Arc<RpcHandler<D>>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    match rh.get_account(address).await {
        Ok(Some(acc)) => Json(acc).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("err: {:?}", e)).into_response(),
    }
}

/// JSON-RPC router: single endpoint POST /rpc
async fn json_rpc_endpoint<D: RpcDeps>(
    State(rh): State<Arc<RpcHandler<D>>>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let req: JsonRpcRequest = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(_) => return Json(JsonRpcResponse::error(None, -32700, "Parse error")),
    };
    Json(dispatch(&rh, req).await)
}

/// First positional param, or the named field, as a string.
fn string_param(params: &Option<Value>, name: &str) -> Option<String> {
    let params = params.as_ref()?;
    if params.is_array() {
        params.get(0)?.as_str().map(|s| s.to_string())
    } else {
        params.get(name)?.as_str().map(|s| s.to_string())
    }
}

/// Dispatch one parsed JSON-RPC request.
pub async fn dispatch<D: RpcDeps>(rh: &RpcHandler<D>, req: JsonRpcRequest) -> JsonRpcResponse {
    let id = req.id.clone();
    match req.method.as_str() {
        "status" => match rh.status().await {
            Ok(v) => JsonRpcResponse::result(id, v),
            Err(e) => JsonRpcResponse::error(id, -32000, &format!("{:?}", e)),
        },
        "submit_tx" => {
            let Some(params) = req.params else {
                return JsonRpcResponse::error(id, -32602, "missing params");
            };
            let tx_val = if params.is_array() {
                params.get(0).cloned().unwrap_or(Value::Null)
            } else {
                params
            };
            match serde_json::from_value::<Tx>(tx_val) {
                Ok(tx) => match rh.submit_tx(tx).await {
                    Ok(res) => JsonRpcResponse::result(id, serde_json::json!(res)),
                    Err(e) => JsonRpcResponse::error(id, -32002, &format!("{:?}", e)),
                },
                Err(e) => JsonRpcResponse::error(id, -32602, &format!("invalid params: {:?}", e)),
            }
        }
        "get_account" => {
            let Some(addr) = string_param(&req.params, "address") else {
                return JsonRpcResponse::error(id, -32602, "missing address");
            };
            match rh.get_account(addr).await {
                Ok(Some(acc)) => JsonRpcResponse::result(id, serde_json::json!(acc)),
                Ok(None) => JsonRpcResponse::error(id, -32001, "account not found"),
                Err(e) => JsonRpcResponse::error(id, -32000, &format!("{:?}", e)),
            }
        }
        "get_receipt" => {
            let Some(tx_id) = string_param(&req.params, "tx_id") else {
                return JsonRpcResponse::error(id, -32602, "missing tx_id");
            };
            match rh.get_receipt(tx_id).await {
                Some(r) => JsonRpcResponse::result(id, serde_json::json!(r)),
                None => JsonRpcResponse::error(id, -32001, "receipt not found"),
            }
        }
        "mempool_size" => match rh.mempool_size().await {
            Ok(n) => JsonRpcResponse::result(id, serde_json::json!(n)),
            Err(e) => JsonRpcResponse::error(id, -32000, &format!("{:?}", e)),
        },
        "token_balance_of" => {
            let Some(addr) = string_param(&req.params, "address") else {
                return JsonRpcResponse::error(id, -32602, "missing address");
            };
            str_result(id, rh.token_balance_of(addr).await)
        }
        "token_total_supply" => str_result(id, rh.token_total_supply().await),
        "stable_balance_of" => {
            let Some(addr) = string_param(&req.params, "address") else {
                return JsonRpcResponse::error(id, -32602, "missing address");
            };
            str_result(id, rh.stable_balance_of(addr).await)
        }
        "stable_total_supply" => str_result(id, rh.stable_total_supply().await),
        "depositor_balance_of" => {
            let Some(addr) = string_param(&req.params, "address") else {
                return JsonRpcResponse::error(id, -32602, "missing address");
            };
            str_result(id, rh.depositor_balance_of(addr).await)
        }
        "fee_rate" => str_result(id, rh.fee_rate().await),
        "oracle_price" => str_result(id, rh.oracle_price().await),
        _ => JsonRpcResponse::error(id, -32601, "Method not found"),
    }
}

fn str_result(id: Option<Value>, res: anyhow::Result<String>) -> JsonRpcResponse {
    match res {
        Ok(v) => JsonRpcResponse::result(id, serde_json::json!(v)),
        Err(e) => JsonRpcResponse::error(id, -32000, &format!("{:?}", e)),
    }
}
