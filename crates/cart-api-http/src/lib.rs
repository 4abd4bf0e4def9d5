// # HTTP Cart API
//
// This crate provides the storefront cart API client for the cart controller.
//
// ## Wire Format
//
// Every mutation is a single request:
//
// ```http
// POST /cart/add/
// X-CSRFToken: <token>
// Content-Type: application/x-www-form-urlencoded
//
// product_id=42&quantity=1
// ```
//
// The storefront answers JSON such as `{"success": true, "cart_count": 3}`.
// Rejections come back as `{"success": false}` with a 400 or 404 status; those
// are business failures and are returned as parsed responses, not errors.
//
// ## Error Mapping
//
// Only bodies that are not cart JSON become errors, classified by status:
//
// - 401/403 → `Error::Forbidden` (CSRF verification or session rejected)
// - 429 → `Error::RateLimited`
// - 5xx → `Error::Server`
// - anything else → `Error::Parse`
//
// Send failures (DNS, refused connection, timeout) → `Error::Http`.
//
// ## Security Requirements
//
// - CSRF token NEVER appears in logs or Debug output
// - Construction fails fast if the token is empty

use async_trait::async_trait;
use cart_core::config::ApiConfig;
use cart_core::traits::{CartApi, CartMutation, Endpoint, MutationResponse};
use cart_core::{Error, Result};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// Header carrying the anti-forgery token
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Longest body excerpt included in error messages
const BODY_EXCERPT_LEN: usize = 200;

/// Storefront cart API over HTTP
///
/// Stateless and single-shot: one request per call, no retries, no caching.
/// The session cookie the storefront sets is kept for the lifetime of the
/// client so consecutive calls hit the same cart.
pub struct HttpCartApi {
    /// Anti-forgery token
    /// ⚠️ NEVER log this value
    csrf_token: String,

    /// Absolute add endpoint
    add_url: Url,

    /// Absolute update endpoint
    update_url: Url,

    /// Absolute remove endpoint
    remove_url: Url,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the CSRF token
impl std::fmt::Debug for HttpCartApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCartApi")
            .field("csrf_token", &"<REDACTED>")
            .field("add_url", &self.add_url.as_str())
            .field("update_url", &self.update_url.as_str())
            .field("remove_url", &self.remove_url.as_str())
            .finish()
    }
}

impl HttpCartApi {
    /// Create a new HTTP cart API client
    ///
    /// # Errors
    ///
    /// `Error::Config` if the configuration is invalid (empty token, bad URL,
    /// relative endpoint path) or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("Invalid cart API base URL: {}", e)))?;

        let join = |endpoint: Endpoint| -> Result<Url> {
            base.join(config.path(endpoint)).map_err(|e| {
                Error::config(format!("Invalid {} endpoint path: {}", endpoint, e))
            })
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api = Self {
            csrf_token: config.csrf_token.clone(),
            add_url: join(Endpoint::Add)?,
            update_url: join(Endpoint::Update)?,
            remove_url: join(Endpoint::Remove)?,
            client,
        };

        tracing::debug!("Cart API configured: {:?}", api);
        Ok(api)
    }

    /// Absolute URL of an endpoint
    pub fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Add => &self.add_url,
            Endpoint::Update => &self.update_url,
            Endpoint::Remove => &self.remove_url,
        }
    }
}

/// Turn an unparseable response into an error
fn classify_failure(status: StatusCode, body: &[u8], parse_error: &Error) -> Error {
    let excerpt: String = String::from_utf8_lossy(body)
        .chars()
        .take(BODY_EXCERPT_LEN)
        .collect();

    match status.as_u16() {
        401 | 403 => Error::forbidden(format!(
            "CSRF verification or session rejected. Status: {}",
            status
        )),
        429 => Error::rate_limited(format!(
            "Too many cart requests. Status: {}",
            status
        )),
        500..=599 => Error::server(format!("{} - {}", status, excerpt.trim())),
        _ => Error::parse(format!(
            "Invalid cart response ({}): {}",
            status, parse_error
        )),
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    /// Submit one mutation
    ///
    /// # API Call
    ///
    /// ```http
    /// POST <endpoint>
    /// X-CSRFToken: <token>
    /// Content-Type: application/x-www-form-urlencoded
    /// ```
    async fn submit(&self, mutation: &CartMutation) -> Result<MutationResponse> {
        let endpoint = mutation.endpoint();
        let url = self.endpoint_url(endpoint);
        let fields = mutation.form_fields();

        tracing::debug!("POST {} ({} field(s))", url, fields.len());

        let response = self
            .client
            .post(url.clone())
            .header(CSRF_HEADER, &self.csrf_token)
            .form(&fields)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", endpoint, e)))?;

        match MutationResponse::from_slice(&body) {
            Ok(parsed) => {
                if !status.is_success() {
                    tracing::debug!(
                        "{} answered {} with success={}",
                        endpoint,
                        status,
                        parsed.success
                    );
                }
                Ok(parsed)
            }
            Err(e) => {
                let err = classify_failure(status, &body, &e);
                tracing::warn!("{} response unusable: {}", endpoint, err);
                Err(err)
            }
        }
    }

    fn api_name(&self) -> &'static str {
        "http"
    }
}
