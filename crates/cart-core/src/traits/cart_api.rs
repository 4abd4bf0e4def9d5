// # Cart API Trait
//
// Defines the interface for submitting cart mutations to the storefront.
//
// ## Implementations
//
// - HTTP (form-encoded POST with CSRF header): `cart-api-http` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use cart_core::{CartApi, CartMutation};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* CartApi implementation */;
//
//     let response = api.submit(&CartMutation::add("42")).await?;
//     if response.is_success() {
//         println!("cart now holds {:?} items", response.cart_count);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Fixed quantity sent by the add flow
pub const ADD_QUANTITY: &str = "1";

/// Server endpoint targeted by a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Add a product to the cart
    Add,
    /// Change a line item's quantity
    Update,
    /// Remove a line item
    Remove,
}

impl Endpoint {
    /// Short name used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Add => "add",
            Endpoint::Update => "update",
            Endpoint::Remove => "remove",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound cart mutation
///
/// Identifiers and quantities are opaque: they are sent exactly as read
/// from the page. The server is the sole authority on their validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMutation {
    /// Add `quantity` of a product
    Add {
        /// Product identifier
        product_id: String,
        /// Always [`ADD_QUANTITY`] when built by the controller
        quantity: String,
    },
    /// Set a line item's quantity
    Update {
        /// Line-item identifier
        item_id: String,
        /// Raw input value
        quantity: String,
    },
    /// Remove a line item
    Remove {
        /// Line-item identifier
        item_id: String,
    },
}

impl CartMutation {
    /// Add one unit of a product
    pub fn add(product_id: impl Into<String>) -> Self {
        Self::Add {
            product_id: product_id.into(),
            quantity: ADD_QUANTITY.to_string(),
        }
    }

    /// Set the quantity of a line item
    pub fn update(item_id: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self::Update {
            item_id: item_id.into(),
            quantity: quantity.into(),
        }
    }

    /// Remove a line item
    pub fn remove(item_id: impl Into<String>) -> Self {
        Self::Remove {
            item_id: item_id.into(),
        }
    }

    /// Endpoint this mutation is sent to
    pub fn endpoint(&self) -> Endpoint {
        match self {
            CartMutation::Add { .. } => Endpoint::Add,
            CartMutation::Update { .. } => Endpoint::Update,
            CartMutation::Remove { .. } => Endpoint::Remove,
        }
    }

    /// Form body fields, in wire order
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            CartMutation::Add {
                product_id,
                quantity,
            } => vec![("product_id", product_id), ("quantity", quantity)],
            CartMutation::Update { item_id, quantity } => {
                vec![("item_id", item_id), ("quantity", quantity)]
            }
            CartMutation::Remove { item_id } => vec![("item_id", item_id)],
        }
    }
}

/// Parsed cart API response
///
/// Only `success` drives client behavior for update and remove; the add
/// flow also reads `cart_count`. The remaining fields are what the
/// storefront returns alongside and are kept for logging and callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Whether the mutation was applied. Absent or falsy means failure.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub success: bool,

    /// Number of items in the cart after the mutation
    #[serde(default, deserialize_with = "deserialize_count")]
    pub cart_count: Option<u64>,

    /// Cart total after the mutation, as a decimal string
    #[serde(default)]
    pub total: Option<String>,

    /// Updated line subtotal (update endpoint only)
    #[serde(default)]
    pub sub: Option<String>,

    /// Server-side failure reason
    #[serde(default)]
    pub error: Option<String>,
}

impl MutationResponse {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// A successful response carrying a cart count
    pub fn succeeded(cart_count: u64) -> Self {
        Self {
            success: true,
            cart_count: Some(cart_count),
            ..Self::default()
        }
    }

    /// A rejected response
    pub fn rejected() -> Self {
        Self::default()
    }

    /// Whether the server applied the mutation
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Accepts any JSON value for the success flag, using JSON truthiness:
/// `false`, `null`, `0` and `""` are false, everything else is true.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

/// Accepts the item count as a JSON number or numeric string.
/// Anything that is not a non-negative whole number reads as no count.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| {
                    f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64
                })
                .map(|f| f as u64)
        }),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Trait for cart API implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - One call = one request. No retries, no backoff, no caching.
/// - A response whose body parses is returned as `Ok`, even with
///   `success: false` and a non-2xx status. The controller decides
///   what a business failure means for the page.
/// - `Err` is reserved for transport and parse failures.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Submit a mutation and parse the response
    async fn submit(&self, mutation: &CartMutation) -> Result<MutationResponse, crate::Error>;

    /// Get the API implementation name (for logging/debugging)
    fn api_name(&self) -> &'static str;

    /// Add one unit of a product
    async fn add_item(&self, product_id: &str) -> Result<MutationResponse, crate::Error> {
        self.submit(&CartMutation::add(product_id)).await
    }

    /// Set a line item's quantity
    async fn update_quantity(
        &self,
        item_id: &str,
        quantity: &str,
    ) -> Result<MutationResponse, crate::Error> {
        self.submit(&CartMutation::update(item_id, quantity)).await
    }

    /// Remove a line item
    async fn remove_item(&self, item_id: &str) -> Result<MutationResponse, crate::Error> {
        self.submit(&CartMutation::remove(item_id)).await
    }
}
