use crate::address::{normalize, AddressValue};
use crate::api::api_error::APIError;
use crate::api::model::{LookupParams, LookupResult};
use crate::api::server::AppState;
use crate::redirect::Redirect;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::uri::PathAndQuery;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/asn", get(asn))
        .fallback(redirect)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.http_timeout))
        .with_state(state)
}

/// The client's IP, with IPv4-mapped IPv6 addresses (from dual stack listeners) unmapped.
fn client_ip(client_addr: SocketAddr) -> IpAddr {
    match client_addr.ip() {
        IpAddr::V6(v6_addr) => v6_addr
            .to_ipv4_mapped()
            .map_or(IpAddr::V6(v6_addr), IpAddr::V4),
        ip @ IpAddr::V4(_) => ip,
    }
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

#[allow(clippy::unused_async)]
async fn asn(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Query(params), _): WithRejection<Query<LookupParams>, APIError>,
) -> Result<Json<LookupResult>, APIError> {
    let (ip, addr) = match params.ip {
        Some(ip) => {
            let addr = normalize(&ip)?;
            (ip, addr)
        }
        None => {
            let ip = client_ip(client_addr);
            (ip.to_string(), AddressValue::from(ip))
        }
    };
    let table = state.resolver.snapshot();
    Ok(Json(LookupResult::new(ip, table.find(addr))))
}

#[allow(clippy::unused_async)]
async fn redirect(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Response {
    let target = uri.path_and_query().map_or(uri.path(), PathAndQuery::as_str);
    let ip = client_ip(client_addr);
    let asn = state.resolver.lookup(ip.into());

    match state.redirects.resolve(target, asn) {
        Redirect::Asn(url) | Redirect::Default(url) => {
            tracing::debug!("redirecting {ip} (AS{asn}) for {target:?} to {url}");
            (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, url.to_string())],
            )
                .into_response()
        }
        Redirect::UnknownTarget => (
            StatusCode::NOT_FOUND,
            format!("Unknown target / not configured target {target:?}"),
        )
            .into_response(),
        Redirect::NoDefault => {
            tracing::debug!("no redirect for {ip} (AS{asn}) and no default for {target:?}");
            (
                StatusCode::NOT_FOUND,
                format!("No default target configured for {target:?}"),
            )
                .into_response()
        }
    }
}
