//! Configuration types for the cart controller
//!
//! This module defines all configuration structures used throughout the workspace.

use serde::{Deserialize, Serialize};

/// Main controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Page markup contract
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// User-visible notice texts
    #[serde(default)]
    pub notices: NoticeConfig,

    /// Capacity of the controller event channel
    ///
    /// When full, new controller events are dropped (with a warning log).
    /// Flows never wait on a slow event consumer.
    ///
    /// Default: 256 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ControllerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            selectors: SelectorConfig::default(),
            notices: NoticeConfig::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.selectors.validate()?;

        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Class names, attribute names and element ids the controller relies on
///
/// The template layer must render elements matching these names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Class of add-to-cart controls
    #[serde(default = "default_add_class")]
    pub add_class: String,

    /// Class of quantity inputs
    #[serde(default = "default_quantity_class")]
    pub quantity_class: String,

    /// Class of remove controls
    #[serde(default = "default_remove_class")]
    pub remove_class: String,

    /// Class of line subtotal cells
    #[serde(default = "default_subtotal_class")]
    pub subtotal_class: String,

    /// Data attribute (without the `data-` prefix) carrying the product or line-item id
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,

    /// Element id of the cart-count display
    #[serde(default = "default_count_element_id")]
    pub count_element_id: String,

    /// Element id of the cart-total display
    #[serde(default = "default_total_element_id")]
    pub total_element_id: String,
}

impl SelectorConfig {
    /// Validate that no selector is empty
    pub fn validate(&self) -> Result<(), crate::Error> {
        let fields = [
            ("add_class", &self.add_class),
            ("quantity_class", &self.quantity_class),
            ("remove_class", &self.remove_class),
            ("subtotal_class", &self.subtotal_class),
            ("id_attribute", &self.id_attribute),
            ("count_element_id", &self.count_element_id),
            ("total_element_id", &self.total_element_id),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(crate::Error::config(format!("Selector {} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            add_class: default_add_class(),
            quantity_class: default_quantity_class(),
            remove_class: default_remove_class(),
            subtotal_class: default_subtotal_class(),
            id_attribute: default_id_attribute(),
            count_element_id: default_count_element_id(),
            total_element_id: default_total_element_id(),
        }
    }
}

/// Notice texts shown to the user
///
/// `None` means the failure is silent. The remove flow has no business-failure
/// notice at all: a rejected removal is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Add rejected by the server
    #[serde(default = "default_add_rejected")]
    pub add_rejected: String,

    /// Quantity update rejected by the server
    #[serde(default = "default_update_rejected")]
    pub update_rejected: String,

    /// Add request failed before a response was parsed
    #[serde(default = "default_add_transport_failed")]
    pub add_transport_failed: Option<String>,

    /// Quantity update request failed before a response was parsed
    #[serde(default = "default_update_transport_failed")]
    pub update_transport_failed: Option<String>,

    /// Remove request failed before a response was parsed
    #[serde(default = "default_remove_transport_failed")]
    pub remove_transport_failed: Option<String>,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            add_rejected: default_add_rejected(),
            update_rejected: default_update_rejected(),
            add_transport_failed: default_add_transport_failed(),
            update_transport_failed: default_update_transport_failed(),
            remove_transport_failed: default_remove_transport_failed(),
        }
    }
}

/// Cart API endpoint configuration
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the CSRF token.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Storefront origin, e.g. `https://shop.example.com`
    pub base_url: String,

    /// Anti-forgery token sent as `X-CSRFToken` on every mutation
    pub csrf_token: String,

    /// Path of the add endpoint
    #[serde(default = "default_add_path")]
    pub add_path: String,

    /// Path of the update endpoint
    #[serde(default = "default_update_path")]
    pub update_path: String,

    /// Path of the remove endpoint
    #[serde(default = "default_remove_path")]
    pub remove_path: String,

    /// Transport timeout for a single request (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("csrf_token", &"<REDACTED>")
            .field("add_path", &self.add_path)
            .field("update_path", &self.update_path)
            .field("remove_path", &self.remove_path)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Create an API configuration with the default endpoint paths
    pub fn new(base_url: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            csrf_token: csrf_token.into(),
            add_path: default_add_path(),
            update_path: default_update_path(),
            remove_path: default_remove_path(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the transport timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Path for the given endpoint
    pub fn path(&self, endpoint: crate::traits::Endpoint) -> &str {
        match endpoint {
            crate::traits::Endpoint::Add => &self.add_path,
            crate::traits::Endpoint::Update => &self.update_path,
            crate::traits::Endpoint::Remove => &self.remove_path,
        }
    }

    /// Validate the API configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("Cart API base URL cannot be empty"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Cart API base URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }
        if self.csrf_token.is_empty() {
            return Err(crate::Error::config("CSRF token cannot be empty"));
        }
        for path in [&self.add_path, &self.update_path, &self.remove_path] {
            if !path.starts_with('/') {
                return Err(crate::Error::config(format!(
                    "Endpoint path must start with '/'. Got: {}",
                    path
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Cart API timeout must be > 0"));
        }
        Ok(())
    }
}

fn default_event_channel_capacity() -> usize {
    256
}

fn default_add_class() -> String {
    "add-to-cart".to_string()
}

fn default_quantity_class() -> String {
    "qty-input".to_string()
}

fn default_remove_class() -> String {
    "remove-item".to_string()
}

fn default_subtotal_class() -> String {
    "item-sub".to_string()
}

fn default_id_attribute() -> String {
    "id".to_string()
}

fn default_count_element_id() -> String {
    "cart-count".to_string()
}

fn default_total_element_id() -> String {
    "cart-total".to_string()
}

fn default_add_rejected() -> String {
    "Could not add to cart.".to_string()
}

fn default_update_rejected() -> String {
    "Could not update quantity.".to_string()
}

fn default_add_transport_failed() -> Option<String> {
    Some("Error adding to cart.".to_string())
}

fn default_update_transport_failed() -> Option<String> {
    Some("Error updating quantity.".to_string())
}

fn default_remove_transport_failed() -> Option<String> {
    Some("Error removing item.".to_string())
}

fn default_add_path() -> String {
    "/cart/add/".to_string()
}

fn default_update_path() -> String {
    "/cart/update/".to_string()
}

fn default_remove_path() -> String {
    "/cart/remove/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
