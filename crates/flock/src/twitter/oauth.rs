//! OAuth 1.0a request signing
//!
//! Twitter's v1.1 endpoints require every request to carry an
//! `Authorization: OAuth ...` header with an HMAC-SHA1 signature over the
//! normalized method, URL, and parameters. This module builds that header.
//! Uses synchronous primitives only; no token refresh is involved (tokens
//! are pre-issued and long-lived).

use base64::prelude::*;
use hmac::{Hmac, Mac};
use rand::{Rng, distributions::Alphanumeric};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// OAuth 1.0a user-context credentials
#[derive(Debug, Clone)]
pub struct OAuth1 {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl OAuth1 {
    /// Length of the random nonce attached to each request
    const NONCE_LEN: usize = 32;

    /// Build the `Authorization` header value for one request.
    ///
    /// `params` must contain every query and body parameter the request
    /// will actually carry; the signature covers them all.
    pub fn authorization_header(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        self.header_with(method, url, params, &nonce, &timestamp)
    }

    /// Header assembly with caller-supplied nonce and timestamp
    fn header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.extend_from_slice(&oauth_params);

        let base = signature_base_string(method, url, &all_params);
        let signature = sign(&base, &self.consumer_secret, &self.access_token_secret);

        // Only the oauth_* parameters plus the signature go into the header
        let mut header_params: Vec<(&str, String)> = oauth_params
            .iter()
            .map(|(k, v)| (*k, percent_encode(v)))
            .collect();
        header_params.push(("oauth_signature", percent_encode(&signature)));
        header_params.sort();

        let joined = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {}", joined)
    }
}

/// RFC 3986 percent-encoding with the unreserved set Twitter expects
fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Build the signature base string: method, base URL, and the
/// lexicographically sorted, percent-encoded parameter list
fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// HMAC-SHA1 over the base string, keyed by both secrets, base64-encoded
fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base.as_bytes());

    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}
