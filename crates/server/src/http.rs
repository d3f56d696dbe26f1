//! Local HTTP host for the command bridge.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use consoleport_engine::{AbilityGate, CommandBridge};
use consoleport_registry::BridgeConfig;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{errors::ApiError, render::render_listing};

/// Address used when no bind address is given.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Read-only state shared by every request.
#[derive(Debug)]
struct AppState {
    bridge: CommandBridge,
    groups: IndexMap<String, Vec<String>>,
    callers: IndexMap<String, Vec<String>>,
}

impl AppState {
    /// Abilities of the caller identified by the bearer token, if any.
    fn gate_for(&self, headers: &HeaderMap) -> AbilityGate {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);
        match token.and_then(|token| self.callers.get(token)) {
            Some(abilities) => AbilityGate::new(abilities.iter().cloned()),
            None => AbilityGate::default(),
        }
    }
}

/// Host configuration for a local HTTP server instance.
#[derive(Debug)]
pub struct BridgeHttpServer {
    bind_address: SocketAddr,
    state: Arc<AppState>,
}

impl BridgeHttpServer {
    pub fn new(bind_address: SocketAddr, bridge: CommandBridge, config: &BridgeConfig) -> Self {
        let state = AppState {
            bridge,
            groups: config.groups.clone(),
            callers: config.callers.clone(),
        };
        Self {
            bind_address,
            state: Arc::new(state),
        }
    }

    /// Start the server and return a handle for inspection and shutdown.
    pub async fn start(self) -> Result<RunningBridgeHttpServer> {
        let cancellation_token = CancellationToken::new();
        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        let bound_address = listener.local_addr()?;
        let router = router(self.state);

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let _ = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
            }
        });
        info!(address = %bound_address, "command bridge listening");

        Ok(RunningBridgeHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running HTTP server.
#[derive(Debug)]
pub struct RunningBridgeHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningBridgeHttpServer {
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for in-flight requests to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("HTTP server task failed: {error}"))
    }
}

/// Resolve a safe local bind address for the HTTP server.
pub fn resolve_bind_address(bind_address: Option<&str>) -> Result<SocketAddr> {
    let address = bind_address.unwrap_or(DEFAULT_BIND_ADDRESS);
    let parsed: SocketAddr = address
        .parse()
        .map_err(|error| anyhow!("invalid HTTP bind address '{address}': {error}"))?;
    if !is_loopback(parsed.ip()) {
        return Err(anyhow!("HTTP server must bind to a loopback address"));
    }
    Ok(parsed)
}

fn is_loopback(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(ip) => ip.is_loopback(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/commands", get(list_commands))
        .route("/commands/{command}", post(run_command))
        .with_state(state)
}

/// JSON for API clients, plain text for everything else.
fn wants_json(headers: &HeaderMap) -> bool {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("json"));
    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"));
    accepts_json || is_xhr
}

async fn list_commands(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let gate = state.gate_for(&headers);
    let listing = state.bridge.list_for_client(&state.groups, &gate);
    debug!(groups = listing.len(), "listing commands");

    if wants_json(&headers) {
        Json(listing).into_response()
    } else {
        render_listing(&listing).into_response()
    }
}

async fn run_command(
    State(state): State<Arc<AppState>>,
    Path(command): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let input = parse_body(&headers, &body)?;
    let gate = state.gate_for(&headers);

    let result = tokio::task::spawn_blocking({
        let state = Arc::clone(&state);
        move || state.bridge.run(&command, &input, &gate)
    })
    .await
    .map_err(|error| ApiError::Internal(format!("command task failed: {error}")))??;

    if wants_json(&headers) {
        return Ok(Json(result).into_response());
    }

    let back = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("/commands");
    let location = redirect_target(back, result.status, &result.command);
    let location = HeaderValue::from_str(&location).map_err(|error| ApiError::Internal(error.to_string()))?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

/// An empty body is an empty field map. Form posts are decoded as fields;
/// anything else must be a JSON object.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    if is_form(headers) {
        return Ok(parse_form(body));
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ApiError::BadRequest("request body must be a JSON object".into())),
        Err(error) => Err(ApiError::BadRequest(format!("invalid JSON body: {error}"))),
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| {
            content_type
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}

/// Repeated keys and `name[]` keys collect into arrays; single keys stay strings.
fn parse_form(body: &[u8]) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        let (name, is_list) = match key.strip_suffix("[]") {
            Some(name) => (name.to_string(), true),
            None => (key.to_string(), false),
        };
        let value = Value::String(value.into_owned());
        match fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if is_list => {
                fields.insert(name, Value::Array(vec![value]));
            }
            None => {
                fields.insert(name, value);
            }
        }
    }
    fields
}

fn redirect_target(back: &str, status: i32, command: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("status", &status.to_string())
        .append_pair("command", command)
        .finish();
    let separator = if back.contains('?') { '&' } else { '?' };
    format!("{back}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_must_be_loopback() {
        assert_eq!(resolve_bind_address(None).expect("default").to_string(), DEFAULT_BIND_ADDRESS);
        assert!(resolve_bind_address(Some("[::1]:9000")).is_ok());
        assert!(resolve_bind_address(Some("0.0.0.0:8080")).is_err());
        assert!(resolve_bind_address(Some("localhost")).is_err());
    }

    #[test]
    fn json_is_negotiated_from_accept_or_xhr() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(wants_json(&headers));

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(wants_json(&headers));
    }

    #[test]
    fn redirect_carries_status_and_command() {
        assert_eq!(redirect_target("/commands", 0, "cache:clear"), "/commands?status=0&command=cache%3Aclear");
        assert_eq!(redirect_target("/commands?tab=db", 2, "migrate"), "/commands?tab=db&status=2&command=migrate");
    }

    #[test]
    fn body_parsing_accepts_empty_and_rejects_non_objects() {
        let headers = HeaderMap::new();
        assert!(parse_body(&headers, b"").expect("empty body").is_empty());
        assert_eq!(parse_body(&headers, br#"{"step":"5"}"#).expect("object")["step"], "5");
        assert!(matches!(parse_body(&headers, b"[1]"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_body(&headers, b"{"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn form_bodies_decode_into_fields() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );

        let fields = parse_body(&headers, b"step=1&seeders[]=users&tag=a&tag=b&note=two+words").expect("form body");
        assert_eq!(fields["step"], "1");
        assert_eq!(fields["seeders"], serde_json::json!(["users"]));
        assert_eq!(fields["tag"], serde_json::json!(["a", "b"]));
        assert_eq!(fields["note"], "two words");
    }
}
