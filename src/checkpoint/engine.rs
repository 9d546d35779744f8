//! Verification resolution engine.
//!
//! # Responsibilities
//! - Validate checkpoint parameters
//! - Submit the checkpoint, retrying while no response comes back
//! - Poll a pending verification with exponential backoff until it
//!   resolves, the caller's time budget runs out, or polls keep failing
//!
//! # Exit paths
//! ```text
//! disabled                      → local approval, no network
//! all submissions failed        → synthesized 500 error
//! submission success:false      → returned unchanged
//! resolved                      → last polled response
//! MAX_RETRY_COUNT failed polls  → synthesized 503 timeout
//! time budget spent             → last (still pending) response
//! ```

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use tracing::{Instrument, Span};

use crate::checkpoint::session::ResolutionSession;
use crate::checkpoint::types::{
    CheckpointError, CheckpointEvent, CheckpointRequest, CheckpointResponse, SubmissionBody, SubmissionEvent,
    SubmissionOptions, VerificationStatus,
};
use crate::config::{validate_config, ConfigError, DodgeballConfig, ValidatedConfig};
use crate::http::{construct_api_headers, construct_api_url, ApiHeaders, ApiRequest, CallIdentity};
use crate::http::{ReqwestTransport, Transport, TransportError};
use crate::observability::logging::{log_at, Logger};
use crate::observability::metrics;
use crate::observability::tracing::checkpoint_span;
use crate::resilience::{retry_immediately, MAX_RETRY_COUNT};

const UNKNOWN_EVALUATION_ERROR: &str = "Unknown evaluation error";

/// Dodgeball API client.
///
/// Cheap to clone; clones share configuration and the HTTP connection
/// pool. Concurrent `checkpoint` calls are independent.
#[derive(Clone)]
pub struct Dodgeball {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    secret_key: String,
    config: ValidatedConfig,
    /// `{api_url}/{version}/`
    base_url: String,
    logger: Logger,
    transport: Arc<dyn Transport>,
}

impl Dodgeball {
    /// Create a client that talks to the API over HTTP.
    pub fn new(secret_key: impl Into<String>, config: DodgeballConfig) -> Result<Self, ConfigError> {
        Self::with_transport(secret_key, config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(
        secret_key: impl Into<String>,
        config: DodgeballConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let secret_key = secret_key.into();
        let config = validate_config(&secret_key, &config)?;
        let base_url = construct_api_url(config.api_url.as_str(), config.api_version.as_str());
        let logger = Logger::new(config.log_level);

        log_at!(
            logger,
            trace,
            base_url = %base_url,
            enabled = config.is_enabled,
            "Dodgeball client initialized"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                secret_key,
                config,
                base_url,
                logger,
                transport,
            }),
        })
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.inner.config
    }

    pub fn logger(&self) -> Logger {
        self.inner.logger
    }

    /// Submit a checkpoint and resolve it to a response.
    ///
    /// Only missing parameters are reported as `Err`; every network or
    /// remote failure comes back as a `success: false` response.
    pub async fn checkpoint(&self, request: &CheckpointRequest) -> Result<CheckpointResponse, CheckpointError> {
        let event = request.validate()?;

        let start = Instant::now();
        let span = checkpoint_span(&request.checkpoint_name);
        let response = self.resolve(request, event).instrument(span).await;
        metrics::record_checkpoint(response.decision().as_str(), start);

        Ok(response)
    }

    async fn resolve(&self, request: &CheckpointRequest, event: &CheckpointEvent) -> CheckpointResponse {
        let inner = &self.inner;

        if !inner.config.is_enabled {
            log_at!(inner.logger, info, "Dodgeball is disabled, approving checkpoint locally");
            return CheckpointResponse::disabled();
        }

        let mut session = ResolutionSession::new(request.options.timeout);
        let headers = construct_api_headers(
            &inner.secret_key,
            CallIdentity {
                verification_id: request.use_verification_id.as_deref(),
                source_token: request.source_token.as_deref(),
                customer_id: request.user_id.as_deref(),
                session_id: Some(&request.session_id),
            },
        );

        let body = SubmissionBody {
            event: SubmissionEvent {
                event_type: &request.checkpoint_name,
                ip: &event.ip,
                data: &event.data,
            },
            options: SubmissionOptions {
                sync: request.options.sync.unwrap_or(true),
                timeout: session.active_timeout().as_millis() as u64,
                webhook: request.options.webhook.as_ref(),
            },
        };
        let body = match serde_json::to_value(&body) {
            Ok(body) => body,
            Err(e) => {
                log_at!(inner.logger, error, error = %e, "Failed to encode checkpoint body");
                return CheckpointResponse::error(500, UNKNOWN_EVALUATION_ERROR);
            }
        };

        let submit_url = format!("{}checkpoint", inner.base_url);
        let attempted = retry_immediately(MAX_RETRY_COUNT, |attempt| {
            let api_request = self.api_request(Method::POST, &submit_url, &headers, Some(body.clone()));
            async move {
                let result = self.execute(api_request).await;
                if let Err(e) = &result {
                    log_at!(self.inner.logger, warn, attempt, error = %e, "Checkpoint submission produced no response");
                }
                result
            }
        })
        .await;
        session.record_submission_attempts(attempted.attempts);

        let mut response = match attempted.result {
            Ok(response) => response,
            Err(e) => {
                log_at!(
                    inner.logger,
                    error,
                    attempts = attempted.attempts,
                    error = %e,
                    "Checkpoint submission failed"
                );
                metrics::record_submission("no_response", attempted.attempts);
                return CheckpointResponse::error(500, UNKNOWN_EVALUATION_ERROR);
            }
        };

        if !response.success {
            log_at!(inner.logger, info, errors = ?response.errors, "Checkpoint rejected by API");
            metrics::record_submission("rejected", attempted.attempts);
            return response;
        }
        metrics::record_submission("accepted", attempted.attempts);

        let Some(verification_id) = response.verification_id().map(str::to_owned) else {
            log_at!(inner.logger, warn, "Successful checkpoint response without a verification");
            return response;
        };
        Span::current().record("verification_id", verification_id.as_str());

        let mut resolved = response.status() != Some(VerificationStatus::Pending);
        let poll_url = format!("{}verification/{}", inner.base_url, verification_id);

        while session.should_poll(resolved) {
            let wait = session.next_wait();
            log_at!(inner.logger, trace, wait_ms = wait.as_millis() as u64, "Waiting before next poll");
            tokio::time::sleep(wait).await;

            let poll = self.api_request(Method::GET, &poll_url, &headers, None);
            match self.execute(poll).await {
                Ok(polled) if polled.success && polled.verification.is_some() => {
                    session.record_poll_success();
                    resolved = polled.status() != Some(VerificationStatus::Pending);
                    metrics::record_poll(if resolved { "resolved" } else { "pending" });
                    log_at!(
                        inner.logger,
                        trace,
                        status = ?polled.status(),
                        outcome = ?polled.outcome(),
                        repeats = session.repeats(),
                        "Polled verification"
                    );
                    response = polled;
                }
                Ok(polled) => {
                    session.record_poll_failure();
                    metrics::record_poll("rejected");
                    log_at!(
                        inner.logger,
                        warn,
                        failures = session.failures(),
                        errors = ?polled.errors,
                        "Verification poll returned no status"
                    );
                }
                Err(e) => {
                    session.record_poll_failure();
                    metrics::record_poll("no_response");
                    log_at!(
                        inner.logger,
                        warn,
                        failures = session.failures(),
                        error = %e,
                        "Verification poll produced no response"
                    );
                }
            }
        }

        if session.retries_exhausted() {
            log_at!(
                inner.logger,
                error,
                verification_id = %verification_id,
                failures = session.failures(),
                "Maximum retry count exceeded while polling verification"
            );
            metrics::record_retry_exhausted();
            return CheckpointResponse::retry_exhausted();
        }

        log_at!(
            inner.logger,
            trace,
            decision = %response.decision(),
            repeats = session.repeats(),
            "Returning response"
        );
        response
    }

    fn api_request(&self, method: Method, url: &str, headers: &ApiHeaders, body: Option<serde_json::Value>) -> ApiRequest {
        ApiRequest {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            body,
            timeout: self.inner.config.request_timeout,
        }
    }

    /// One transport call, decoded as a checkpoint response.
    async fn execute(&self, request: ApiRequest) -> Result<CheckpointResponse, TransportError> {
        let body = self.inner.transport.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::types::{CheckpointOptions, Webhook, DISABLED_VERIFICATION_ID};
    use crate::http::request::{CUSTOMER_ID_HEADER, SECRET_KEY_HEADER, SESSION_ID_HEADER};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned replies in order and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Option<Value>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Option<Value>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
            self.requests.lock().unwrap().push(request);
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(body) => Ok(body),
                None => Err(TransportError::Status {
                    status: 502,
                    body: "Bad Gateway".to_string(),
                }),
            }
        }
    }

    fn verification(status: &str, outcome: &str) -> Option<Value> {
        Some(json!({
            "success": true,
            "errors": [],
            "version": "v1",
            "verification": {"id": "ver-1", "status": status, "outcome": outcome}
        }))
    }

    fn client(transport: Arc<ScriptedTransport>) -> Dodgeball {
        let config = DodgeballConfig {
            api_url: "https://api.example.com".to_string(),
            ..Default::default()
        };
        Dodgeball::with_transport("test-secret-key", config, transport).unwrap()
    }

    fn request() -> CheckpointRequest {
        CheckpointRequest::new(
            "PAYMENT",
            CheckpointEvent::new("127.0.0.1").with_data("amount", 100),
            "session-1",
        )
        .with_user_id("user-1")
    }

    fn with_timeout(timeout: i64) -> CheckpointRequest {
        request().with_options(CheckpointOptions {
            timeout: Some(timeout),
            ..Default::default()
        })
    }

    #[test]
    fn test_rejects_missing_secret_key() {
        let err = Dodgeball::new("", DodgeballConfig::default()).err().unwrap();
        assert!(matches!(err, ConfigError::MissingConfig { .. }));
    }

    #[tokio::test]
    async fn test_disabled_client_approves_without_network() {
        let transport = ScriptedTransport::new(vec![]);
        let config = DodgeballConfig {
            is_enabled: false,
            ..Default::default()
        };
        let dodgeball = Dodgeball::with_transport("test-secret-key", config, transport.clone()).unwrap();

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_allowed());
        assert_eq!(resp.verification_id(), Some(DISABLED_VERIFICATION_ID));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_parameters_abort_before_network() {
        let transport = ScriptedTransport::new(vec![]);
        let dodgeball = client(transport.clone());

        let mut no_session = request();
        no_session.session_id.clear();
        let err = dodgeball.checkpoint(&no_session).await.unwrap_err();
        assert_eq!(err, CheckpointError::MissingParameter { name: "sessionId" });

        let mut no_event = request();
        no_event.event = None;
        let err = dodgeball.checkpoint(&no_event).await.unwrap_err();
        assert_eq!(err, CheckpointError::MissingParameter { name: "event" });

        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_decision_skips_polling() {
        let transport = ScriptedTransport::new(vec![verification("COMPLETE", "APPROVED")]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_allowed());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let submit = &requests[0];
        assert_eq!(submit.method, Method::POST);
        assert_eq!(submit.url, "https://api.example.com/v1/checkpoint");
        assert_eq!(submit.headers[SECRET_KEY_HEADER], "test-secret-key");
        assert_eq!(submit.headers[SESSION_ID_HEADER], "session-1");
        assert_eq!(submit.headers[CUSTOMER_ID_HEADER], "user-1");
        assert_eq!(
            submit.body,
            Some(json!({
                "event": {"type": "PAYMENT", "ip": "127.0.0.1", "data": {"amount": 100}},
                "options": {"sync": true, "timeout": 100}
            }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_options_reach_submission_body() {
        let transport = ScriptedTransport::new(vec![verification("COMPLETE", "DENIED")]);
        let dodgeball = client(transport.clone());

        let req = request().with_options(CheckpointOptions {
            sync: Some(false),
            timeout: Some(300),
            webhook: Some(Webhook {
                url: "https://hooks.example.com/dodgeball".to_string(),
            }),
        });
        let resp = dodgeball.checkpoint(&req).await.unwrap();
        assert!(resp.is_denied());

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(
            body["options"],
            json!({"sync": false, "timeout": 300, "webhook": {"url": "https://hooks.example.com/dodgeball"}})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_retries_until_response() {
        let transport = ScriptedTransport::new(vec![None, None, verification("COMPLETE", "APPROVED")]);
        let dodgeball = client(transport.clone());

        let start = tokio::time::Instant::now();
        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_allowed());
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_exhaustion_synthesizes_error() {
        let transport = ScriptedTransport::new(vec![None, None, None, verification("COMPLETE", "APPROVED")]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(!resp.success);
        assert!(resp.has_error());
        assert!(!resp.is_timed_out());
        assert_eq!(resp.errors[0].code, 500);
        assert_eq!(resp.errors[0].message, "Unknown evaluation error");
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undecodable_submission_counts_as_no_response() {
        let transport = ScriptedTransport::new(vec![
            Some(json!({"message": "Internal Server Error"})),
            verification("COMPLETE", "APPROVED"),
        ]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_allowed());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_rejection_is_returned_unchanged() {
        let rejection = json!({
            "success": false,
            "errors": [{"code": 400, "message": "Unknown checkpoint"}],
            "version": "v1"
        });
        let transport = ScriptedTransport::new(vec![Some(rejection.clone())]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert_eq!(resp, serde_json::from_value::<CheckpointResponse>(rejection).unwrap());
        assert!(resp.has_error());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_with_null_errors_is_not_resubmitted() {
        let transport = ScriptedTransport::new(vec![
            Some(json!({"success": false, "errors": null, "version": "v1"})),
            verification("COMPLETE", "APPROVED"),
        ]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(!resp.success);
        assert!(resp.errors.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_approval_with_null_errors_is_accepted() {
        let transport = ScriptedTransport::new(vec![Some(json!({
            "success": true,
            "errors": null,
            "version": "v1",
            "verification": {"id": "ver-1", "status": "COMPLETE", "outcome": "APPROVED"}
        }))]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_allowed());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_resolved() {
        let transport = ScriptedTransport::new(vec![
            verification("PENDING", "PENDING"),
            verification("PENDING", "PENDING"),
            verification("COMPLETE", "APPROVED"),
        ]);
        let dodgeball = client(transport.clone());

        let start = tokio::time::Instant::now();
        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_allowed());
        assert_eq!(start.elapsed(), Duration::from_millis(100 + 200));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        for poll in &requests[1..] {
            assert_eq!(poll.method, Method::GET);
            assert_eq!(poll.url, "https://api.example.com/v1/verification/ver-1");
            assert!(poll.body.is_none());
            assert_eq!(poll.headers[SECRET_KEY_HEADER], "test-secret-key");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_submission_is_not_polled() {
        let transport = ScriptedTransport::new(vec![verification("BLOCKED", "PENDING")]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_running());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_polls_synthesize_timeout() {
        let transport = ScriptedTransport::new(vec![verification("PENDING", "PENDING"), None, None, None]);
        let dodgeball = client(transport.clone());

        let start = tokio::time::Instant::now();
        let resp = dodgeball.checkpoint(&request()).await.unwrap();

        assert!(resp.is_timed_out());
        assert!(resp.has_error());
        assert!(!resp.is_running());
        assert!(resp.verification.is_none());
        assert_eq!(resp.errors[0].code, 503);
        assert_eq!(transport.requests().len(), 1 + MAX_RETRY_COUNT as usize);
        assert_eq!(start.elapsed(), Duration::from_millis(100 + 200 + 400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_without_status_counts_as_failure() {
        let transport = ScriptedTransport::new(vec![
            verification("PENDING", "PENDING"),
            Some(json!({"success": true, "errors": [], "version": "v1"})),
            Some(json!({"success": false, "errors": [{"code": 500, "message": "oops"}]})),
            verification("COMPLETE", "PENDING"),
        ]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&request()).await.unwrap();
        assert!(resp.is_undecided());
        assert_eq!(transport.requests().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_budget_returns_pending_response() {
        let transport = ScriptedTransport::new(vec![
            verification("PENDING", "PENDING"),
            verification("PENDING", "PENDING"),
            verification("PENDING", "PENDING"),
            verification("COMPLETE", "APPROVED"),
        ]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&with_timeout(1_000)).await.unwrap();
        assert!(resp.success);
        assert!(resp.is_running());
        assert!(!resp.is_timed_out());
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_moderate_timeout_is_delegated_to_api() {
        let transport = ScriptedTransport::new(vec![verification("PENDING", "PENDING")]);
        let dodgeball = client(transport.clone());

        let resp = dodgeball.checkpoint(&with_timeout(300)).await.unwrap();
        assert!(resp.is_running());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body.as_ref().unwrap()["options"]["timeout"], json!(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_are_independent() {
        let approve = ScriptedTransport::new(vec![verification("COMPLETE", "APPROVED")]);
        let deny = ScriptedTransport::new(vec![verification("PENDING", "PENDING"), verification("COMPLETE", "DENIED")]);
        let a = client(approve);
        let b = client(deny);

        let (qa, qb) = (request(), request());
        let (ra, rb) = tokio::join!(a.checkpoint(&qa), b.checkpoint(&qb));
        assert!(ra.unwrap().is_allowed());
        assert!(rb.unwrap().is_denied());
    }
}
