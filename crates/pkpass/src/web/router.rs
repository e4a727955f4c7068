//! Request router for the PassKit web-service protocol.
//!
//! Dispatches inbound requests by path prefix to one of three endpoint
//! handlers and translates service results into status codes and response
//! bodies. Protocol reference:
//! <https://developer.apple.com/library/archive/documentation/PassKit/Reference/PassKit_WebService/WebService.html>
//!
//! The router is transport-agnostic: it consumes `http::Request<Bytes>` and
//! produces `http::Response<Bytes>`, so any host server can adapt it. A
//! request outside the protocol's path space yields `None`, letting the host
//! pass it to the next handler in its chain.

use crate::package::PKPASS_MIME_TYPE;
use crate::web::service::PassKitService;
use crate::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{AUTHORIZATION, CONTENT_TYPE, IF_MODIFIED_SINCE, LAST_MODIFIED};
use http::{HeaderMap, Request, Response, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use tracing::warn;

const JSON_MIME_TYPE: &str = "application/json";

/// `Authorization` header scheme for pass requests.
const AUTH_PREFIX: &str = "ApplePass ";

#[derive(Deserialize)]
struct RegistrationPayload {
    #[serde(rename = "pushToken")]
    push_token: Option<String>,
}

#[derive(Deserialize)]
struct LogsPayload {
    logs: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssociatedPassesBody {
    last_updated: Option<String>,
    serial_numbers: Option<Vec<String>>,
}

/// Routes PassKit web-service requests to a [`PassKitService`].
///
/// Holds no per-request state; one router instance serves any number of
/// concurrent requests.
pub struct PassKitRouter<S> {
    service: S,
}

impl<S: PassKitService> PassKitRouter<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Consumes the router, returning the service.
    pub fn into_service(self) -> S {
        self.service
    }

    /// Handles one request.
    ///
    /// Returns `Ok(None)` when the path is outside the `/v1` protocol space,
    /// `Ok(Some(response))` for every handled request (including client
    /// errors, which become 400/401/404/405 responses), and `Err` only for
    /// malformed request JSON or a service that violated its contract.
    pub async fn handle(&self, request: Request<Bytes>) -> Result<Option<Response<Bytes>>> {
        let path = request.uri().path().to_owned();
        let Some(rest) = path.strip_prefix("/v1") else {
            return Ok(None);
        };

        if let Some(devices_path) = strip_segment(rest, "/devices") {
            return self.handle_devices(request, devices_path).await.map(Some);
        }

        if let Some(passes_path) = strip_segment(rest, "/passes") {
            return self.handle_passes(request, passes_path).await.map(Some);
        }

        if rest == "/log" {
            return self.handle_logs(request).await.map(Some);
        }

        warn!(path = %rest, "unknown path, returning 404");
        empty_response(StatusCode::NOT_FOUND).map(Some)
    }

    /// Registration family:
    /// - `POST   /v1/devices/{device}/registrations/{passType}/{serial}`
    /// - `DELETE /v1/devices/{device}/registrations/{passType}/{serial}`
    /// - `GET    /v1/devices/{device}/registrations/{passType}?passesUpdatedSince=tag`
    async fn handle_devices(
        &self,
        request: Request<Bytes>,
        sub_path: &str,
    ) -> Result<Response<Bytes>> {
        let parts: Vec<&str> = sub_path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != 3 && parts.len() != 4 {
            warn!(path = %sub_path, "/devices: wrong number of segments, returning 400");
            return empty_response(StatusCode::BAD_REQUEST);
        }

        if !parts[1].eq_ignore_ascii_case("registrations") {
            warn!(segment = %parts[1], "/devices: unexpected path segment, returning 400");
            return empty_response(StatusCode::BAD_REQUEST);
        }

        let device_id = parts[0];
        let pass_type = parts[2];
        let serial = parts.get(3).copied();

        match request.method().as_str() {
            "POST" => {
                let Some(auth_token) = authorization_token(request.headers()) else {
                    return empty_response(StatusCode::UNAUTHORIZED);
                };

                let Some(serial) = serial else {
                    warn!(path = %sub_path, "/devices: serial number missing in registration, returning 400");
                    return empty_response(StatusCode::BAD_REQUEST);
                };

                let payload: RegistrationPayload = serde_json::from_slice(request.body())?;
                let push_token = match payload.push_token {
                    Some(token) if !token.is_empty() => token,
                    _ => {
                        warn!("/devices: pushToken not found, returning 400");
                        return empty_response(StatusCode::BAD_REQUEST);
                    }
                };

                let status = self
                    .service
                    .register_device(device_id, pass_type, serial, &auth_token, &push_token)
                    .await;
                empty_response(status)
            }

            "DELETE" => {
                let Some(auth_token) = authorization_token(request.headers()) else {
                    return empty_response(StatusCode::UNAUTHORIZED);
                };

                let Some(serial) = serial else {
                    warn!(path = %sub_path, "/devices: serial number missing in unregistration, returning 400");
                    return empty_response(StatusCode::BAD_REQUEST);
                };

                let status = self
                    .service
                    .unregister_device(device_id, pass_type, serial, &auth_token)
                    .await;
                empty_response(status)
            }

            "GET" => {
                if serial.is_some() {
                    warn!(path = %sub_path, "/devices: extra segment in associated-passes request, returning 400");
                    return empty_response(StatusCode::BAD_REQUEST);
                }

                let tag = query_param(request.uri(), "passesUpdatedSince");
                let (status, serials, new_tag) = self
                    .service
                    .get_associated_passes(device_id, pass_type, tag.as_deref())
                    .await;

                if status == StatusCode::OK {
                    let body = serde_json::to_vec(&AssociatedPassesBody {
                        last_updated: new_tag,
                        serial_numbers: serials,
                    })?;
                    Ok(Response::builder()
                        .status(StatusCode::OK)
                        .header(CONTENT_TYPE, JSON_MIME_TYPE)
                        .body(Bytes::from(body))?)
                } else {
                    empty_response(status)
                }
            }

            method => {
                warn!(%method, "/devices: unknown method, returning 405");
                empty_response(StatusCode::METHOD_NOT_ALLOWED)
            }
        }
    }

    /// Pass fetch: `GET /v1/passes/{passType}/{serial}`.
    async fn handle_passes(
        &self,
        request: Request<Bytes>,
        sub_path: &str,
    ) -> Result<Response<Bytes>> {
        if request.method() != &http::Method::GET {
            warn!(method = %request.method(), "/passes should be GET, returning 405");
            return empty_response(StatusCode::METHOD_NOT_ALLOWED);
        }

        let parts: Vec<&str> = sub_path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != 2 {
            warn!(path = %sub_path, "/passes: wrong number of segments, returning 400");
            return empty_response(StatusCode::BAD_REQUEST);
        }

        let pass_type = parts[0];
        let serial = parts[1];

        let Some(auth_token) = authorization_token(request.headers()) else {
            return empty_response(StatusCode::UNAUTHORIZED);
        };

        // An unparseable If-Modified-Since is treated as not provided.
        let if_modified_since = request
            .headers()
            .get(IF_MODIFIED_SINCE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map(|value| value.with_timezone(&Utc));

        let (status, pass, last_modified) = self
            .service
            .get_pass(pass_type, serial, &auth_token, if_modified_since)
            .await;

        if status == StatusCode::OK {
            let pass = pass.ok_or_else(|| {
                Error::ServiceContract(
                    "get_pass must return pass content when status is 200".into(),
                )
            })?;
            let last_modified = last_modified.ok_or_else(|| {
                Error::ServiceContract(
                    "get_pass must return a last-modified timestamp when status is 200".into(),
                )
            })?;

            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, PKPASS_MIME_TYPE)
                .header(LAST_MODIFIED, http_date(&last_modified))
                .body(Bytes::from(pass))?)
        } else {
            empty_response(status)
        }
    }

    /// Log submission: `POST /v1/log` with body `{"logs": ["..."]}`.
    async fn handle_logs(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        if request.method() != &http::Method::POST {
            warn!(method = %request.method(), "/log should be POST, returning 405");
            return empty_response(StatusCode::METHOD_NOT_ALLOWED);
        }

        if request.body().is_empty() {
            return empty_response(StatusCode::OK);
        }

        let payload: LogsPayload = serde_json::from_slice(request.body())?;
        if let Some(logs) = payload.logs {
            if !logs.is_empty() {
                self.service.process_logs(logs).await;
            }
        }

        empty_response(StatusCode::OK)
    }
}

/// Extracts the pass authorization token (`Authorization: ApplePass XXXX`).
///
/// A missing header, a different scheme, or a blank token all count as
/// absent.
fn authorization_token(headers: &HeaderMap) -> Option<String> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        warn!("'Authorization' header not found");
        return None;
    };

    let value = value.to_str().ok()?;
    let Some(token) = value.strip_prefix(AUTH_PREFIX) else {
        warn!("'Authorization' header is invalid: should start with '{AUTH_PREFIX}'");
        return None;
    };

    if token.trim().is_empty() {
        warn!("'Authorization' header is invalid: token is empty");
        return None;
    }

    Some(token.to_owned())
}

/// Strips `prefix` from `path` when it ends there or is followed by a `/`,
/// so `/devicesfoo` does not match `/devices`.
fn strip_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// First value of a query parameter, taken verbatim.
fn query_param(uri: &Uri, name: &str) -> Option<String> {
    uri.query()?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_owned())
    })
}

/// RFC 1123 date for `Last-Modified` headers.
fn http_date(value: &DateTime<Utc>) -> String {
    value.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn empty_response(status: StatusCode) -> Result<Response<Bytes>> {
    Ok(Response::builder().status(status).body(Bytes::new())?)
}
