// # cartctl - Cart Controller Driver
//
// Thin integration layer: all cart behavior lives in cart-core and the
// storefront client in cart-api-http. This binary only:
// 1. Reads configuration from environment variables
// 2. Initializes tracing and the runtime
// 3. Renders a minimal in-memory page holding one cart control
// 4. Dispatches one user action through the controller and reports the result
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Storefront
// - `CART_BASE_URL`: Storefront origin (http or https)
// - `CART_CSRF_TOKEN`: Anti-forgery token sent as `X-CSRFToken`
// - `CART_TIMEOUT_SECS`: Request timeout in seconds (optional, default 30)
//
// ### Action
// - `CART_ACTION`: One of add, update, remove
// - `CART_TARGET_ID`: Product id (add) or line-item id (update, remove)
// - `CART_QUANTITY`: New quantity, sent as typed (update only)
//
// ### Logging
// - `CART_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export CART_BASE_URL=https://shop.example.com
// export CART_CSRF_TOKEN=$(cat csrftoken)
// export CART_ACTION=add
// export CART_TARGET_ID=42
//
// cartctl
// ```

use anyhow::Result;
use async_trait::async_trait;
use cart_api_http::HttpCartApi;
use cart_core::traits::{Notifier, Resynchronizer};
use cart_core::{
    ApiConfig, CartController, ControllerConfig, FlowOutcome, MemoryElement, MemoryPage, UiEvent,
};
use std::env;
use std::process::ExitCode;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Action completed (including a server-side rejection)
/// - 1: Configuration or startup error
/// - 2: Runtime error (transport failure or failed resynchronization)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<CartExitCode> for ExitCode {
    fn from(code: CartExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Cart action requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Update,
    Remove,
}

impl Action {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "update" => Ok(Self::Update),
            "remove" => Ok(Self::Remove),
            _ => anyhow::bail!(
                "CART_ACTION '{}' is not supported. \
                Supported actions: add, update, remove",
                value
            ),
        }
    }
}

/// Application configuration
struct Config {
    base_url: String,
    csrf_token: String,
    action: String,
    target_id: String,
    quantity: Option<String>,
    timeout_secs: Option<u64>,
    log_level: String,
}

// Custom Debug implementation that hides the CSRF token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("csrf_token", &"<REDACTED>")
            .field("action", &self.action)
            .field("target_id", &self.target_id)
            .field("quantity", &self.quantity)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| {
                anyhow::anyhow!("{} is required. Set it via: export {}=...", name, name)
            })
        };

        let timeout_secs = match lookup("CART_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("CART_TIMEOUT_SECS must be a whole number. Got: {}", raw)
            })?),
            None => None,
        };

        Ok(Self {
            base_url: required("CART_BASE_URL")?,
            csrf_token: required("CART_CSRF_TOKEN")?,
            action: lookup("CART_ACTION").unwrap_or_else(|| "add".to_string()),
            target_id: required("CART_TARGET_ID")?,
            quantity: lookup("CART_QUANTITY"),
            timeout_secs,
            log_level: lookup("CART_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks the storefront URL scheme, the token, the action and its
    /// arguments, numeric ranges, and the log level.
    fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            anyhow::bail!(
                "CART_BASE_URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            );
        }

        if self.base_url.starts_with("http://") {
            eprintln!(
                "WARNING: CART_BASE_URL uses HTTP (not HTTPS). \
                The CSRF token will be sent in clear text."
            );
        }

        if self.csrf_token.trim().is_empty() {
            anyhow::bail!("CART_CSRF_TOKEN cannot be empty");
        }

        let token_lower = self.csrf_token.to_lowercase();
        if token_lower.contains("your_token") || token_lower.contains("replace_me") {
            anyhow::bail!(
                "CART_CSRF_TOKEN appears to be a placeholder. \
                Copy the csrftoken cookie from a storefront session."
            );
        }

        let action = Action::parse(&self.action)?;

        if self.target_id.is_empty() {
            anyhow::bail!("CART_TARGET_ID cannot be empty");
        }

        // Quantity is forwarded verbatim; the storefront validates it
        if action == Action::Update && self.quantity.is_none() {
            anyhow::bail!("CART_QUANTITY is required when CART_ACTION=update");
        }

        if let Some(timeout) = self.timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "CART_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }

    fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(&self.base_url, &self.csrf_token);
        match self.timeout_secs {
            Some(secs) => config.with_timeout_secs(secs),
            None => config,
        }
    }
}

fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "CART_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

/// Prints user-facing notices to stderr
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        warn!("Notice shown: {}", message);
        eprintln!("{}", message);
    }
}

/// A terminal has no cart view to reload; the reload request is only logged
struct LoggedResync;

#[async_trait]
impl Resynchronizer for LoggedResync {
    async fn resynchronize(&self) -> cart_core::Result<()> {
        info!("Cart view reload requested");
        Ok(())
    }
}

/// Render a page holding the control for `action` plus the cart summary
fn render_page(config: &Config, action: Action) -> (MemoryPage, UiEvent) {
    let page = MemoryPage::new();
    page.insert(MemoryElement::new().with_id("cart-count").with_text("0"));

    let event = match action {
        Action::Add => UiEvent::click(
            page.insert(
                MemoryElement::new()
                    .with_class("add-to-cart")
                    .with_data("id", &config.target_id),
            ),
        ),
        Action::Update => UiEvent::change(
            page.insert(
                MemoryElement::new()
                    .with_class("qty-input")
                    .with_data("id", &config.target_id)
                    .with_value(config.quantity.clone().unwrap_or_default()),
            ),
        ),
        Action::Remove => UiEvent::click(
            page.insert(
                MemoryElement::new()
                    .with_class("remove-item")
                    .with_data("id", &config.target_id),
            ),
        ),
    };

    page.insert(MemoryElement::new().with_id("cart-total").with_text("0.00"));
    (page, event)
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CartExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return CartExitCode::ConfigError.into();
    }

    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CartExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CartExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(outcome) => exit_code_for(&outcome),
            Err(e) => {
                error!("cartctl error: {}", e);
                CartExitCode::ConfigError
            }
        }
    });

    code.into()
}

fn exit_code_for(outcome: &FlowOutcome) -> CartExitCode {
    match outcome {
        FlowOutcome::TransportFailed { .. } | FlowOutcome::ResyncFailed { .. } => {
            CartExitCode::RuntimeError
        }
        _ => CartExitCode::CleanShutdown,
    }
}

/// Dispatch the configured action and print the resulting page state
async fn run(config: Config) -> Result<FlowOutcome> {
    let action = Action::parse(&config.action)?;
    let api = HttpCartApi::new(&config.api_config())?;
    let (page, event) = render_page(&config, action);

    let (controller, events) = CartController::new(
        Box::new(api),
        Box::new(page.clone()),
        Box::new(StderrNotifier),
        Box::new(LoggedResync),
        ControllerConfig::default(),
    )?;

    info!("Dispatching {:?} for {}", action, config.target_id);
    let outcome = controller.dispatch(event).await;

    // Closing the last sender ends the event stream
    drop(controller);
    let mut events = ReceiverStream::new(events);
    while let Some(event) = events.next().await {
        info!("Controller event: {:?}", event);
    }

    println!("outcome: {:?}", outcome);
    for id in ["cart-count", "cart-total"] {
        println!("{}: {}", id, page.text_by_id(id).unwrap_or_default());
    }

    Ok(outcome)
}
