//! Request construction.
//!
//! # Responsibilities
//! - Build versioned endpoint URLs from the configured base URL
//! - Build the header set carrying the secret key and call identifiers
//! - Describe one outgoing request for the transport
//!
//! # Design Decisions
//! - Headers are a sorted map so two header sets compare by content
//! - Placeholder identifier values ("", "null", "undefined") are dropped

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

pub const SECRET_KEY_HEADER: &str = "Dodgeball-Secret-Key";
pub const VERIFICATION_ID_HEADER: &str = "Dodgeball-Verification-Id";
pub const SOURCE_TOKEN_HEADER: &str = "Dodgeball-Source-Token";
pub const CUSTOMER_ID_HEADER: &str = "Dodgeball-Customer-Id";
pub const SESSION_ID_HEADER: &str = "Dodgeball-Session-Id";

/// Header name → value.
pub type ApiHeaders = BTreeMap<&'static str, String>;

/// One request handed to a `Transport`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: ApiHeaders,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Identifiers attached to every request of one checkpoint call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallIdentity<'a> {
    pub verification_id: Option<&'a str>,
    pub source_token: Option<&'a str>,
    pub customer_id: Option<&'a str>,
    pub session_id: Option<&'a str>,
}

/// Append the version segment to `url`, inserting exactly one `/` before it.
pub fn construct_api_url(url: &str, version: &str) -> String {
    let base = url.trim_end_matches('/');
    format!("{}/{}/", base, version)
}

/// Build the header set for a call.
pub fn construct_api_headers(secret_key: &str, identity: CallIdentity<'_>) -> ApiHeaders {
    let mut headers = ApiHeaders::new();
    headers.insert(SECRET_KEY_HEADER, secret_key.to_string());

    let optional = [
        (VERIFICATION_ID_HEADER, identity.verification_id),
        (SOURCE_TOKEN_HEADER, identity.source_token),
        (CUSTOMER_ID_HEADER, identity.customer_id),
        (SESSION_ID_HEADER, identity.session_id),
    ];
    for (name, value) in optional {
        if let Some(value) = value.filter(|v| is_meaningful(v)) {
            headers.insert(name, value.to_string());
        }
    }

    headers
}

fn is_meaningful(value: &str) -> bool {
    !value.is_empty() && value != "null" && value != "undefined"
}
