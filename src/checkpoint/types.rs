//! Checkpoint request/response types and error definitions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::validation::ApiVersion;

/// Verification id returned when the client is disabled.
pub const DISABLED_VERIFICATION_ID: &str = "DODGEBALL_IS_DISABLED";

/// Server-side state of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// In process on the server.
    Pending,
    /// Waiting on some external action, for example MFA.
    Blocked,
    /// Workflow evaluated successfully.
    Complete,
    /// Workflow execution failure.
    Failed,
}

/// Decision carried by a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    Approved,
    Denied,
    Pending,
    Error,
}

/// Snapshot of a verification as last reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub id: String,
    pub status: VerificationStatus,
    pub outcome: VerificationOutcome,
}

/// Error entry reported by the API (or synthesized by the engine).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Response to a checkpoint submission or a verification poll.
///
/// Only `success` is required. Every other field tolerates absence and
/// `null`, so any body the API sends back is a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResponse {
    pub success: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<ApiError>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    /// A verification with an unknown status or outcome decodes as `None`.
    #[serde(default, deserialize_with = "lenient_verification", skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_timeout: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_verification<'de, D>(deserializer: D) -> Result<Option<Verification>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

impl CheckpointResponse {
    /// Failed response carrying a FAILED/ERROR verification with an empty id.
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![ApiError {
                code,
                message: message.into(),
            }],
            version: ApiVersion::V1.to_string(),
            verification: Some(Verification {
                id: String::new(),
                status: VerificationStatus::Failed,
                outcome: VerificationOutcome::Error,
            }),
            is_timeout: false,
        }
    }

    /// Response returned when polling gave up after repeated failures.
    pub fn retry_exhausted() -> Self {
        Self {
            success: false,
            errors: vec![ApiError {
                code: 503,
                message: "Service Unavailable: Maximum retry count exceeded".to_string(),
            }],
            version: ApiVersion::V1.to_string(),
            verification: None,
            is_timeout: true,
        }
    }

    /// Approval synthesized locally when the client is disabled.
    pub fn disabled() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            version: ApiVersion::V1.to_string(),
            verification: Some(Verification {
                id: DISABLED_VERIFICATION_ID.to_string(),
                status: VerificationStatus::Complete,
                outcome: VerificationOutcome::Approved,
            }),
            is_timeout: false,
        }
    }

    pub fn status(&self) -> Option<VerificationStatus> {
        self.verification.as_ref().map(|v| v.status)
    }

    pub fn outcome(&self) -> Option<VerificationOutcome> {
        self.verification.as_ref().map(|v| v.outcome)
    }

    pub fn verification_id(&self) -> Option<&str> {
        self.verification.as_ref().map(|v| v.id.as_str())
    }
}

/// The event being checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointEvent {
    /// Client IP address. Required.
    pub ip: String,
    pub data: Map<String, Value>,
}

impl CheckpointEvent {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub url: String,
}

/// Caller options for one checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointOptions {
    /// Ask the API to block until resolved. Defaults to true.
    pub sync: Option<bool>,
    /// Requested timeout in milliseconds. None or ≤ 0 means "no timeout".
    pub timeout: Option<i64>,
    pub webhook: Option<Webhook>,
}

/// One checkpoint call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckpointRequest {
    pub checkpoint_name: String,
    pub event: Option<CheckpointEvent>,
    pub source_token: Option<String>,
    pub session_id: String,
    pub user_id: Option<String>,
    pub use_verification_id: Option<String>,
    pub options: CheckpointOptions,
}

impl CheckpointRequest {
    pub fn new(checkpoint_name: impl Into<String>, event: CheckpointEvent, session_id: impl Into<String>) -> Self {
        Self {
            checkpoint_name: checkpoint_name.into(),
            event: Some(event),
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_source_token(mut self, source_token: impl Into<String>) -> Self {
        self.source_token = Some(source_token.into());
        self
    }

    pub fn with_verification_id(mut self, verification_id: impl Into<String>) -> Self {
        self.use_verification_id = Some(verification_id.into());
        self
    }

    pub fn with_options(mut self, options: CheckpointOptions) -> Self {
        self.options = options;
        self
    }

    /// Check required parameters and return the event.
    pub fn validate(&self) -> Result<&CheckpointEvent, CheckpointError> {
        if self.checkpoint_name.is_empty() {
            return Err(CheckpointError::MissingParameter { name: "checkpointName" });
        }
        let event = self
            .event
            .as_ref()
            .ok_or(CheckpointError::MissingParameter { name: "event" })?;
        if event.ip.is_empty() {
            return Err(CheckpointError::MissingParameter { name: "event.ip" });
        }
        if self.session_id.is_empty() {
            return Err(CheckpointError::MissingParameter { name: "sessionId" });
        }
        Ok(event)
    }
}

/// Programmer errors raised by `checkpoint`. Network failures are never
/// reported here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    #[error("Missing required parameter: {name}")]
    MissingParameter { name: &'static str },
}

/// JSON body POSTed to the checkpoint endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct SubmissionBody<'a> {
    pub event: SubmissionEvent<'a>,
    pub options: SubmissionOptions<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionEvent<'a> {
    #[serde(rename = "type")]
    pub event_type: &'a str,
    pub ip: &'a str,
    pub data: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionOptions<'a> {
    pub sync: bool,
    /// Milliseconds.
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<&'a Webhook>,
}
