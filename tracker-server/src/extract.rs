use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// JSON request body whose failures are reported as [`ApiError`]s.
///
/// An empty body reads as `{}`, so required-field checks produce the message.
/// The content type is not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), "Failed to read request body"))?;

        let body: &[u8] = if bytes.trim_ascii().is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(body).map(ApiJson).map_err(|e| {
            tracing::debug!(error = %e, "rejected request body");
            ApiError::bad_request("Invalid request body")
        })
    }
}

/// Reads a closed-set value (status, type, category) as text.
///
/// Numbers and booleans are kept as their JSON text so that they fail the
/// closed-set parse with its own message instead of a body error.
pub(crate) fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(serde::de::Error::custom("expected a string")),
    }
}

/// Optional text that a PATCH may clear: absent stays `None` (with
/// `#[serde(default)]`), `null` or blank becomes `Some(None)`.
pub(crate) fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(value.filter(|v| !v.trim().is_empty())))
}
