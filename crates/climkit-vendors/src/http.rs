//! Shared HTTP plumbing for vendor clients

use std::time::Duration;

use climkit_core::VendorError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::error::SetupError;

/// Per-request timeout applied to every vendor call
///
/// The coordinator imposes no timeout of its own; this is the vendor
/// client's.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> Result<reqwest::Client, SetupError> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|err| SetupError::Http(err.to_string()))
}

/// Map a reqwest failure onto the vendor error taxonomy
pub(crate) fn map_transport(err: reqwest::Error) -> VendorError {
    if err.is_timeout() {
        VendorError::Timeout(err.to_string())
    } else if err.is_decode() {
        VendorError::Payload(err.to_string())
    } else {
        VendorError::Transport(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Classify a non-success response
///
/// 401/403 is configuration-fatal; anything else non-2xx is a rejection
/// carrying the API's reason string when it gave one.
pub(crate) async fn check_status(response: Response) -> Result<Response, VendorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(VendorError::AuthFailed(format!("HTTP {status}")));
    }
    let reason = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.reason.or(body.message))
        .unwrap_or_else(|| format!("HTTP {status}"));
    Err(VendorError::Rejected { reason })
}
