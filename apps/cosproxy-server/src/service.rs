//! The gateway service implementing hyper's `Service` trait.
//!
//! Requests are turned into web action invocations: query parameters become
//! plain arguments, and the raw request is passed along as `__ow_headers`,
//! `__ow_body` (base64), `__ow_method`, and `__ow_path`.
//!
//! | Route | Action |
//! |-------|--------|
//! | `GET`/`POST /read` | [`read_object`] |
//! | `POST /write` | [`write_object`] |
//! | `GET /health` | health probe |

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::Bytes;
use cosproxy_actions::{
    ActionArgs, ActionError, ActionFailure, StoreConnector, read_object, write_object,
};
use cosproxy_core::ProxyConfig;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::ProxyResponseBody;

type Response = http::Response<ProxyResponseBody>;

/// The gateway service.
#[derive(Debug, Clone)]
pub struct ActionGateway {
    config: Arc<ProxyConfig>,
    connector: Arc<dyn StoreConnector>,
}

impl ActionGateway {
    /// Create a gateway running actions against stores built by `connector`.
    #[must_use]
    pub fn new(config: ProxyConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }
}

impl Service<http::Request<Incoming>> for ActionGateway {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let connector = Arc::clone(&self.connector);

        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let response = handle_request(req, &config, connector.as_ref(), &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Which action a request invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Read,
    Write,
}

/// Process one request through routing, argument building, and the action.
pub async fn handle_request<B>(
    req: http::Request<B>,
    config: &ProxyConfig,
    connector: &dyn StoreConnector,
    request_id: &str,
) -> Response
where
    B: http_body::Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    debug!(%method, %path, request_id, "processing request");

    if method == Method::GET && path == "/health" {
        return health_check_response();
    }
    if method == Method::OPTIONS {
        return cors_preflight_response();
    }

    let action = match path.as_str() {
        "/read" if method == Method::GET || method == Method::POST => Action::Read,
        "/write" if method == Method::POST => Action::Write,
        "/read" | "/write" => {
            return message_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
        }
        _ => return message_response(StatusCode::NOT_FOUND, "no such action"),
    };

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(error = %e, request_id, "failed to collect request body");
            return message_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read request body");
        }
    };

    let args = match build_action_args(&parts, &body) {
        Ok(args) => args,
        Err(e) => {
            warn!(error = %e, request_id, "invalid invocation arguments");
            return failure_response(&ActionFailure::new(&e, None, None));
        }
    };

    info!(?action, request_id, body_len = body.len(), "invoking action");

    match action {
        Action::Read => match read_object(&args, config, connector).await {
            Ok(out) => {
                let content = if out.base64_encoded {
                    match BASE64_STANDARD.decode(&out.body) {
                        Ok(bytes) => Bytes::from(bytes),
                        Err(e) => {
                            error!(error = %e, request_id, "read action produced invalid base64");
                            return message_response(
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "invalid encoded object body",
                            );
                        }
                    }
                } else {
                    Bytes::from(out.body)
                };
                let mut response = http::Response::new(ProxyResponseBody::new(content));
                for (name, value) in &out.headers {
                    if let (Ok(name), Ok(value)) = (
                        http::header::HeaderName::from_bytes(name.as_bytes()),
                        HeaderValue::from_str(value),
                    ) {
                        response.headers_mut().insert(name, value);
                    }
                }
                response
            }
            Err(failure) => failure_response(&failure),
        },
        Action::Write => match write_object(&args, config, connector).await {
            Ok(out) => json_response(StatusCode::OK, &out.body),
            Err(failure) => failure_response(&failure),
        },
    }
}

/// Translate an HTTP request into web action arguments.
fn build_action_args(parts: &http::request::Parts, body: &Bytes) -> Result<ActionArgs, ActionError> {
    let query: serde_json::Map<String, serde_json::Value> = parts
        .uri
        .query()
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
                .collect()
        })
        .unwrap_or_default();

    let mut args = ActionArgs::from_value(serde_json::Value::Object(query))?;
    args.headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_owned()))
        })
        .collect();
    args.body = (!body.is_empty()).then(|| BASE64_STANDARD.encode(body));
    args.method = Some(parts.method.as_str().to_ascii_lowercase());
    args.path = Some(parts.uri.path().to_owned());

    Ok(args)
}

/// Serialize `value` into a JSON response.
fn json_response(status: StatusCode, value: &impl Serialize) -> Response {
    match serde_json::to_vec(value) {
        Ok(json) => {
            let mut response = http::Response::new(ProxyResponseBody::new(json));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            let mut response = http::Response::new(ProxyResponseBody::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

/// Respond with an action's failure result object.
fn failure_response(failure: &ActionFailure) -> Response {
    let status = StatusCode::from_u16(failure.kind.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, failure)
}

/// Respond with `{"message": ...}`.
fn message_response(status: StatusCode, message: &str) -> Response {
    json_response(status, &serde_json::json!({ "message": message }))
}

/// Produce a health check response.
fn health_check_response() -> Response {
    http::Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(ProxyResponseBody::new(
            r#"{"status":"running","service":"cosproxy"}"#,
        ))
        .expect("static health response should be valid")
}

/// Produce a CORS preflight response.
fn cors_preflight_response() -> Response {
    http::Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "*, Content-Type")
        .header("Access-Control-Max-Age", "86400")
        .body(ProxyResponseBody::empty())
        .expect("static CORS response should be valid")
}

/// Add common response headers to every response.
fn add_common_headers(mut response: Response, request_id: &str) -> Response {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert("Server", HeaderValue::from_static("cosproxy"));
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));

    response
}
