//! One-shot SigV4-signed GET against an API Gateway endpoint.
//!
//! Credentials are resolved once, up front; a missing credential is an error
//! before anything touches the network. After that, [`SignedInvoker::invoke`]
//! never fails: transport and HTTP errors are folded into the returned
//! [`InvokeResult`] so the caller can always print a summary.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::SystemTime;
use thiserror::Error;

/// Signing name of API Gateway.
pub const SERVICE_NAME: &str = "execute-api";

/// Status reported when no upstream status is available.
pub const FALLBACK_STATUS: u16 = 500;

#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("no AWS credentials available: {0}")]
    MissingCredentials(String),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status} for url ({url})")]
    Status {
        status: u16,
        url: String,
        response: UpstreamResponse,
    },
}

/// Body and headers of a response that came back with an error status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpstreamResponse {
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

/// What the invocation produced, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResult {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    /// The original response behind an error status, kept for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamResponse>,
}

impl InvokeResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    fn from_error(err: InvokeError) -> Self {
        let body = err.to_string();
        match err {
            InvokeError::Status {
                status, response, ..
            } => Self {
                status_code: status,
                body,
                headers: BTreeMap::new(),
                upstream: Some(response),
            },
            _ => Self {
                status_code: FALLBACK_STATUS,
                body,
                headers: BTreeMap::new(),
                upstream: None,
            },
        }
    }
}

pub struct SignedInvoker {
    credentials: Credentials,
    region: String,
    http: reqwest::Client,
}

impl SignedInvoker {
    /// Builds an invoker around already-resolved credentials.
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Result<Self, InvokeError> {
        // Certificate verification stays on; nothing here relaxes reqwest's defaults.
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            credentials,
            region: region.into(),
            http,
        })
    }

    /// Resolves credentials through the AWS default provider chain
    /// (environment, shared profile, container and instance metadata).
    pub async fn from_environment(region: &str) -> Result<Self, InvokeError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        let provider = sdk_config.credentials_provider().ok_or_else(|| {
            InvokeError::MissingCredentials("no credentials provider configured".to_string())
        })?;
        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| InvokeError::MissingCredentials(e.to_string()))?;

        tracing::debug!(
            region,
            access_key_id = credentials.access_key_id(),
            session_token = credentials.session_token().is_some(),
            "Resolved AWS credentials"
        );

        Self::new(credentials, region)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Signs and sends `GET url`, folding any failure into the result.
    pub async fn invoke(&self, url: &str) -> InvokeResult {
        match self.try_invoke(url).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(url, error = %err, "Error making request");
                if let InvokeError::Status { response, .. } = &err {
                    tracing::error!(
                        body = %response.body,
                        headers = ?response.headers,
                        "Upstream error response"
                    );
                }
                InvokeResult::from_error(err)
            }
        }
    }

    async fn try_invoke(&self, url: &str) -> Result<InvokeResult, InvokeError> {
        let headers = self.signed_headers("GET", url)?;
        tracing::debug!(url, headers = ?redacted(&headers), "Sending signed request");

        let response = self.http.get(url).headers(headers).send().await?;

        let status = response.status();
        let response_headers = header_map(response.headers());
        let body = response.text().await?;

        tracing::info!(status = status.as_u16(), "Received response");
        tracing::debug!(headers = ?response_headers, body = %body, "Response details");

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                response: UpstreamResponse {
                    body,
                    headers: response_headers,
                },
            });
        }

        Ok(InvokeResult {
            status_code: status.as_u16(),
            body,
            headers: response_headers,
            upstream: None,
        })
    }

    /// Computes the SigV4 headers (`authorization`, `x-amz-date` and, for
    /// temporary credentials, `x-amz-security-token`) for an empty-bodied request.
    pub fn signed_headers(&self, method: &str, url: &str) -> Result<HeaderMap, InvokeError> {
        let identity = self.credentials.clone().into();
        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SERVICE_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| InvokeError::Signing(e.to_string()))?
            .into();

        let signable = SignableRequest::new(method, url, std::iter::empty(), SignableBody::Bytes(&[]))
            .map_err(|e| InvokeError::Signing(e.to_string()))?;
        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| InvokeError::Signing(e.to_string()))?
            .into_parts();

        let mut headers = HeaderMap::new();
        for (name, value) in instructions.headers() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| InvokeError::Signing(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| InvokeError::Signing(e.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// Request headers whose values are secrets and never reach the logs.
const SECRET_HEADERS: [&str; 2] = ["authorization", "x-amz-security-token"];

fn redacted(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers = header_map(headers);
    for name in SECRET_HEADERS {
        if let Some(value) = headers.get_mut(name) {
            *value = "<redacted>".to_string();
        }
    }
    headers
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
