//! Cart interaction controller
//!
//! The CartController is responsible for:
//! - Binding add, quantity and remove elements once the page is ready
//! - Turning user events into cart mutations
//! - Applying server responses to the page
//! - Recomputing the displayed total on quantity input
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │    Page     │─── UiEvent ───┐
//! └─────────────┘               │
//!                               ▼
//!                      ┌────────────────┐
//!                      │ CartController │
//!                      └────────────────┘
//!                               │
//!       ┌───────────────┬───────┴───────┬────────────────┐
//!       │               │               │                │
//!       ▼               ▼               ▼                ▼
//! ┌──────────┐   ┌────────────┐  ┌──────────────┐  ┌──────────┐
//! │ CartApi  │   │ Page       │  │Resynchronizer│  │ Notifier │
//! │ (mutate) │   │ (patch)    │  │ (full resync)│  │ (notice) │
//! └──────────┘   └────────────┘  └──────────────┘  └──────────┘
//! ```
//!
//! ## Flows
//!
//! | Trigger | Request | Success | Rejected | Transport failure |
//! |---|---|---|---|---|
//! | click add control | `product_id`, `quantity=1` | set cart count | notice | notice |
//! | change quantity input | `item_id`, `quantity` | full resync | notice | notice |
//! | click remove control | `item_id` | full resync | silent | notice |
//! | input on quantity input | none | | | |
//!
//! Remove rejections are silent.

use crate::config::{ControllerConfig, NoticeConfig};
use crate::error::{Error, Result};
use crate::totals::SubtotalSumCalculator;
use crate::traits::{
    CartApi, CartMutation, ElementId, Endpoint, Notifier, Page, Resynchronizer, TotalsCalculator,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, trace, warn};

/// Kind of user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    /// Activation of a control
    Click,
    /// Committed value change of an input
    Change,
    /// Raw input (every keystroke)
    Input,
}

/// A user interaction with a page element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiEvent {
    /// Element the event targets
    pub target: ElementId,
    /// What happened
    pub kind: UiEventKind,
}

impl UiEvent {
    /// A click on `target`
    pub fn click(target: ElementId) -> Self {
        Self {
            target,
            kind: UiEventKind::Click,
        }
    }

    /// A committed change on `target`
    pub fn change(target: ElementId) -> Self {
        Self {
            target,
            kind: UiEventKind::Change,
        }
    }

    /// A raw input on `target`
    pub fn input(target: ElementId) -> Self {
        Self {
            target,
            kind: UiEventKind::Input,
        }
    }
}

/// Role an element was bound with at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Add-to-cart control
    AddControl,
    /// Quantity input
    QuantityInput,
    /// Remove control
    RemoveControl,
}

/// What a single dispatched event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Target was not bound at attach time
    Unbound,
    /// Target is bound but does not listen to this event kind
    NotListening,
    /// Target has no identifier attribute; nothing was sent
    MissingIdentifier {
        binding: Binding,
    },
    /// Add succeeded and the count display now shows `count`
    CountUpdated {
        count: u64,
    },
    /// Add succeeded but there was no count display or no count to show
    CountNotDisplayed,
    /// Mutation succeeded and a full resynchronization was triggered
    Resynchronized,
    /// Mutation succeeded but the resynchronization failed
    ResyncFailed {
        error: String,
    },
    /// Server rejected the mutation
    Rejected {
        notice: Option<String>,
    },
    /// Request failed before a response was parsed
    TransportFailed {
        notice: Option<String>,
        error: String,
    },
    /// Displayed total was recomputed locally
    TotalRecomputed {
        total: Option<String>,
    },
}

/// Events emitted by the CartController
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Page scanned and elements bound
    Attached {
        add_controls: usize,
        quantity_inputs: usize,
        remove_controls: usize,
    },

    /// Mutation request issued
    RequestSent {
        endpoint: Endpoint,
        element: ElementId,
    },

    /// Cart count display updated
    CountUpdated {
        count: u64,
    },

    /// Full resynchronization triggered
    Resynchronized {
        endpoint: Endpoint,
    },

    /// Server rejected a mutation
    Rejected {
        endpoint: Endpoint,
        error: Option<String>,
    },

    /// Request failed before a response was parsed
    TransportFailed {
        endpoint: Endpoint,
        error: String,
    },

    /// Displayed total recomputed locally
    TotalRecomputed {
        total: Option<String>,
    },
}

/// Cart interaction controller
///
/// Scans the page once at construction. Elements rendered afterwards are
/// not bound: events targeting them yield [`FlowOutcome::Unbound`].
///
/// ## Threading
///
/// The controller is cheap to clone and every [`dispatch`](Self::dispatch)
/// is an independent future. Overlapping dispatches are not ordered with
/// respect to each other; the server is last-write-wins and update/remove
/// resynchronize afterwards.
#[derive(Clone)]
pub struct CartController {
    inner: Arc<Inner>,
}

struct Inner {
    /// Cart API for mutations
    api: Box<dyn CartApi>,

    /// Rendered page
    page: Box<dyn Page>,

    /// User-visible notices
    notifier: Box<dyn Notifier>,

    /// Full resynchronization
    resync: Box<dyn Resynchronizer>,

    /// Local total recomputation strategy
    totals: Box<dyn TotalsCalculator>,

    /// Selectors and notice texts
    config: ControllerConfig,

    /// Elements bound at attach time
    bindings: HashMap<ElementId, Binding>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl CartController {
    /// Create a controller using the default totals strategy and bind the page
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields controller events
    pub fn new(
        api: Box<dyn CartApi>,
        page: Box<dyn Page>,
        notifier: Box<dyn Notifier>,
        resync: Box<dyn Resynchronizer>,
        config: ControllerConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        Self::with_totals_calculator(
            api,
            page,
            notifier,
            resync,
            Box::new(SubtotalSumCalculator::new()),
            config,
        )
    }

    /// Create a controller with a page-specific totals strategy and bind the page
    pub fn with_totals_calculator(
        api: Box<dyn CartApi>,
        page: Box<dyn Page>,
        notifier: Box<dyn Notifier>,
        resync: Box<dyn Resynchronizer>,
        totals: Box<dyn TotalsCalculator>,
        config: ControllerConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let bindings = scan(page.as_ref(), &config);

        let count_of = |kind: Binding| bindings.values().filter(|b| **b == kind).count();
        let attached = ControllerEvent::Attached {
            add_controls: count_of(Binding::AddControl),
            quantity_inputs: count_of(Binding::QuantityInput),
            remove_controls: count_of(Binding::RemoveControl),
        };

        info!(
            "Cart controller attached via {} API ({} totals): {:?}",
            api.api_name(),
            totals.calculator_name(),
            attached
        );

        let controller = Self {
            inner: Arc::new(Inner {
                api,
                page,
                notifier,
                resync,
                totals,
                config,
                bindings,
                event_tx: tx,
            }),
        };
        controller.emit_event(attached);

        Ok((controller, rx))
    }

    /// Role `element` was bound with, if any
    pub fn binding(&self, element: ElementId) -> Option<Binding> {
        self.inner.bindings.get(&element).copied()
    }

    /// All elements bound with `kind`, in document order
    pub fn bound_elements(&self, kind: Binding) -> Vec<ElementId> {
        let mut elements: Vec<ElementId> = self
            .inner
            .bindings
            .iter()
            .filter(|(_, binding)| **binding == kind)
            .map(|(element, _)| *element)
            .collect();
        elements.sort();
        elements
    }

    /// Handle a user event
    ///
    /// Never fails: every failure is turned into a notice (or silence) and
    /// reported in the returned outcome.
    pub async fn dispatch(&self, event: UiEvent) -> FlowOutcome {
        let Some(binding) = self.binding(event.target) else {
            trace!("Ignoring {:?} on unbound element {}", event.kind, event.target);
            return FlowOutcome::Unbound;
        };

        match (binding, event.kind) {
            (Binding::AddControl, UiEventKind::Click) => self.add_to_cart(event.target).await,
            (Binding::QuantityInput, UiEventKind::Change) => {
                self.update_quantity(event.target).await
            }
            (Binding::QuantityInput, UiEventKind::Input) => self.recompute_total(),
            (Binding::RemoveControl, UiEventKind::Click) => self.remove_item(event.target).await,
            _ => FlowOutcome::NotListening,
        }
    }

    /// Handle a user event on a separate task
    ///
    /// Mirrors a browser event loop: the caller does not wait for the
    /// response and there is no way to cancel the request.
    pub fn spawn_dispatch(&self, event: UiEvent) -> tokio::task::JoinHandle<FlowOutcome> {
        let controller = self.clone();
        tokio::spawn(async move { controller.dispatch(event).await })
    }

    /// Add-to-cart flow
    async fn add_to_cart(&self, element: ElementId) -> FlowOutcome {
        let Some(product_id) = self.identifier(element, Binding::AddControl) else {
            return FlowOutcome::MissingIdentifier {
                binding: Binding::AddControl,
            };
        };

        let mutation = CartMutation::add(product_id);
        let notices = &self.inner.config.notices;

        match self.submit(element, &mutation).await {
            Ok(response) if response.is_success() => {
                let selectors = &self.inner.config.selectors;
                let display = self.inner.page.element_by_id(&selectors.count_element_id);

                match (response.cart_count, display) {
                    (Some(count), Some(display))
                        if self
                            .inner
                            .page
                            .set_text_content(display, &count.to_string()) =>
                    {
                        info!("Cart count updated to {}", count);
                        self.emit_event(ControllerEvent::CountUpdated { count });
                        FlowOutcome::CountUpdated { count }
                    }
                    (count, shown) => {
                        let has_display = shown.is_some();
                        debug!(
                            "Add succeeded without count update (count: {:?}, display present: {})",
                            count, has_display
                        );
                        FlowOutcome::CountNotDisplayed
                    }
                }
            }
            Ok(response) => self.rejected(
                Endpoint::Add,
                response.error,
                Some(notices.add_rejected.as_str()),
            ),
            Err(e) => {
                self.transport_failed(Endpoint::Add, e, notices.add_transport_failed.as_deref())
            }
        }
    }

    /// Quantity update flow
    async fn update_quantity(&self, element: ElementId) -> FlowOutcome {
        let Some(item_id) = self.identifier(element, Binding::QuantityInput) else {
            return FlowOutcome::MissingIdentifier {
                binding: Binding::QuantityInput,
            };
        };

        // Passed through as typed; the server validates
        let quantity = self.inner.page.value(element).unwrap_or_default();
        let mutation = CartMutation::update(item_id, quantity);
        let notices = &self.inner.config.notices;

        match self.submit(element, &mutation).await {
            Ok(response) if response.is_success() => self.resynchronize(Endpoint::Update).await,
            Ok(response) => self.rejected(
                Endpoint::Update,
                response.error,
                Some(notices.update_rejected.as_str()),
            ),
            Err(e) => self.transport_failed(
                Endpoint::Update,
                e,
                notices.update_transport_failed.as_deref(),
            ),
        }
    }

    /// Remove flow
    async fn remove_item(&self, element: ElementId) -> FlowOutcome {
        let Some(item_id) = self.identifier(element, Binding::RemoveControl) else {
            return FlowOutcome::MissingIdentifier {
                binding: Binding::RemoveControl,
            };
        };

        let mutation = CartMutation::remove(item_id);
        let NoticeConfig {
            remove_transport_failed,
            ..
        } = &self.inner.config.notices;

        match self.submit(element, &mutation).await {
            Ok(response) if response.is_success() => self.resynchronize(Endpoint::Remove).await,
            // Rejected removals are silent
            Ok(response) => self.rejected(Endpoint::Remove, response.error, None),
            Err(e) => {
                self.transport_failed(Endpoint::Remove, e, remove_transport_failed.as_deref())
            }
        }
    }

    /// Local total recomputation, no server contact
    fn recompute_total(&self) -> FlowOutcome {
        let total = self
            .inner
            .totals
            .recalculate(self.inner.page.as_ref(), &self.inner.config.selectors);

        trace!("Displayed total recomputed: {:?}", total);
        self.emit_event(ControllerEvent::TotalRecomputed {
            total: total.clone(),
        });
        FlowOutcome::TotalRecomputed { total }
    }

    /// Read the identifier attribute of a bound element
    fn identifier(&self, element: ElementId, binding: Binding) -> Option<String> {
        let attribute = &self.inner.config.selectors.id_attribute;
        let id = self.inner.page.data_attribute(element, attribute);
        if id.is_none() {
            warn!(
                "{:?} {} has no data-{} attribute, not sending a request",
                binding, element, attribute
            );
        }
        id
    }

    /// Issue a single mutation request
    async fn submit(
        &self,
        element: ElementId,
        mutation: &CartMutation,
    ) -> Result<crate::traits::MutationResponse> {
        let endpoint = mutation.endpoint();
        debug!("Sending {} request: {:?}", endpoint, mutation.form_fields());

        self.emit_event(ControllerEvent::RequestSent { endpoint, element });

        let response = self.inner.api.submit(mutation).await?;
        debug!("{} response: {:?}", endpoint, response);
        Ok(response)
    }

    /// Trigger a full resynchronization after a successful mutation
    async fn resynchronize(&self, endpoint: Endpoint) -> FlowOutcome {
        match self.inner.resync.resynchronize().await {
            Ok(()) => {
                info!("{} succeeded, page resynchronized", endpoint);
                self.emit_event(ControllerEvent::Resynchronized { endpoint });
                FlowOutcome::Resynchronized
            }
            Err(e) => {
                error!("{} succeeded but resynchronization failed: {}", endpoint, e);
                FlowOutcome::ResyncFailed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Handle a business failure (`success: false`)
    fn rejected(
        &self,
        endpoint: Endpoint,
        server_error: Option<String>,
        notice: Option<&str>,
    ) -> FlowOutcome {
        warn!(
            "{} rejected by server: {}",
            endpoint,
            server_error.as_deref().unwrap_or("no reason given")
        );

        if let Some(message) = notice {
            self.inner.notifier.notify(message);
        }

        self.emit_event(ControllerEvent::Rejected {
            endpoint,
            error: server_error,
        });
        FlowOutcome::Rejected {
            notice: notice.map(str::to_string),
        }
    }

    /// Handle a failure before a response was parsed
    fn transport_failed(&self, endpoint: Endpoint, err: Error, notice: Option<&str>) -> FlowOutcome {
        error!("{} request failed: {}", endpoint, err);

        if let Some(message) = notice {
            self.inner.notifier.notify(message);
        }

        let error = err.to_string();
        self.emit_event(ControllerEvent::TransportFailed {
            endpoint,
            error: error.clone(),
        });
        FlowOutcome::TransportFailed {
            notice: notice.map(str::to_string),
            error,
        }
    }

    /// Emit a controller event
    fn emit_event(&self, event: ControllerEvent) {
        match self.inner.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // Flows never wait on the event consumer
                warn!(
                    "Event channel full, dropping event. Consider increasing event_channel_capacity."
                );
            }
            Err(TrySendError::Closed(_)) => {
                trace!("Event receiver dropped, event discarded");
            }
        }
    }
}

/// Bind every element matching the configured classes
///
/// An element carrying more than one controller class keeps the first
/// binding in add, quantity, remove order.
fn scan(page: &dyn Page, config: &ControllerConfig) -> HashMap<ElementId, Binding> {
    let selectors = &config.selectors;
    let mut bindings = HashMap::new();

    for (class, binding) in [
        (&selectors.add_class, Binding::AddControl),
        (&selectors.quantity_class, Binding::QuantityInput),
        (&selectors.remove_class, Binding::RemoveControl),
    ] {
        for element in page.elements_by_class(class) {
            if let Some(existing) = bindings.get(&element) {
                warn!(
                    "Element {} already bound as {:?}, ignoring class {}",
                    element, existing, class
                );
                continue;
            }
            bindings.insert(element, binding);
        }
    }

    bindings
}
