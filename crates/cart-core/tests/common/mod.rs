//! Test doubles and common utilities for controller contract tests
//!
//! This module provides minimal test doubles that record what the controller
//! asked for without implementing real functionality.

#![allow(dead_code)]

use cart_core::error::{Error, Result};
use cart_core::page::{MemoryElement, MemoryPage, RecordingNotifier, RecordingResync};
use cart_core::traits::{CartApi, CartMutation, ElementId, MutationResponse};
use cart_core::{CartController, ControllerConfig, ControllerEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// What a scripted API call should produce
#[derive(Debug, Clone)]
pub enum Reply {
    /// Parsed response
    Respond(MutationResponse),
    /// Transport failure
    Fail(String),
}

/// A CartApi that replays scripted replies and records every mutation
///
/// When the script runs out, the fallback reply is used.
pub struct ScriptedCartApi {
    /// Call counter for submit()
    submit_call_count: Arc<AtomicUsize>,
    /// Recorded mutations
    submitted: Arc<Mutex<Vec<CartMutation>>>,
    /// Replies consumed in order
    script: Arc<Mutex<VecDeque<Reply>>>,
    /// Reply used once the script is exhausted
    fallback: Reply,
}

impl ScriptedCartApi {
    /// An API that always answers `reply`
    pub fn always(reply: Reply) -> Self {
        Self {
            submit_call_count: Arc::new(AtomicUsize::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: reply,
        }
    }

    /// An API that answers `success: true` with the given count
    pub fn succeeding(cart_count: u64) -> Self {
        Self::always(Reply::Respond(MutationResponse::succeeded(cart_count)))
    }

    /// An API that answers `success: false`
    pub fn rejecting() -> Self {
        Self::always(Reply::Respond(MutationResponse::rejected()))
    }

    /// An API whose requests never produce a response
    pub fn unreachable() -> Self {
        Self::always(Reply::Fail("connection refused".to_string()))
    }

    /// Queue a reply ahead of the fallback
    pub fn then(self, reply: Reply) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    /// Get the number of times submit() was called
    pub fn submit_call_count(&self) -> usize {
        self.submit_call_count.load(Ordering::SeqCst)
    }

    /// Get the list of mutations that were submitted
    pub fn submitted(&self) -> Vec<CartMutation> {
        self.submitted.lock().unwrap().clone()
    }

    /// Create a new ScriptedCartApi that shares counters and script with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            submit_call_count: Arc::clone(&other.submit_call_count),
            submitted: Arc::clone(&other.submitted),
            script: Arc::clone(&other.script),
            fallback: other.fallback.clone(),
        }
    }
}

#[async_trait::async_trait]
impl CartApi for ScriptedCartApi {
    async fn submit(&self, mutation: &CartMutation) -> Result<MutationResponse> {
        self.submit_call_count.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(mutation.clone());

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(message) => Err(Error::http(message)),
        }
    }

    fn api_name(&self) -> &'static str {
        "scripted"
    }
}

/// Handles to a rendered cart page
pub struct CartPage {
    pub page: MemoryPage,
    pub add_buttons: Vec<ElementId>,
    pub quantity_inputs: Vec<ElementId>,
    pub remove_buttons: Vec<ElementId>,
    pub subtotals: Vec<ElementId>,
    pub count: ElementId,
    pub total: ElementId,
}

/// Render a cart page like the storefront template does
///
/// `lines` are (line-item id, quantity, subtotal text).
pub fn cart_page(product_ids: &[&str], lines: &[(&str, &str, &str)]) -> CartPage {
    let page = MemoryPage::new();

    let count = page.insert(MemoryElement::new().with_id("cart-count").with_text("0"));

    let add_buttons = product_ids
        .iter()
        .map(|id| {
            page.insert(
                MemoryElement::new()
                    .with_class("btn")
                    .with_class("add-to-cart")
                    .with_data("id", *id)
                    .with_text("Add to cart"),
            )
        })
        .collect();

    let mut quantity_inputs = Vec::new();
    let mut remove_buttons = Vec::new();
    let mut subtotals = Vec::new();
    for (item_id, quantity, subtotal) in lines {
        quantity_inputs.push(
            page.insert(
                MemoryElement::new()
                    .with_class("qty-input")
                    .with_data("id", *item_id)
                    .with_value(*quantity),
            ),
        );
        subtotals.push(page.insert(MemoryElement::new().with_class("item-sub").with_text(*subtotal)));
        remove_buttons.push(
            page.insert(
                MemoryElement::new()
                    .with_class("remove-item")
                    .with_data("id", *item_id)
                    .with_text("Remove"),
            ),
        );
    }

    let total = page.insert(MemoryElement::new().with_id("cart-total").with_text("0.00"));

    CartPage {
        page,
        add_buttons,
        quantity_inputs,
        remove_buttons,
        subtotals,
        count,
        total,
    }
}

/// A controller wired to recording collaborators
pub struct Harness {
    pub controller: CartController,
    pub events: mpsc::Receiver<ControllerEvent>,
    pub notifier: RecordingNotifier,
    pub resync: RecordingResync,
}

/// Attach a controller to `page` with default configuration
pub fn attach(api: ScriptedCartApi, page: &MemoryPage) -> Harness {
    attach_with_config(api, page, ControllerConfig::default())
}

/// Attach a controller to `page`
pub fn attach_with_config(api: ScriptedCartApi, page: &MemoryPage, config: ControllerConfig) -> Harness {
    let notifier = RecordingNotifier::new();
    let resync = RecordingResync::new();

    let (controller, events) = CartController::new(
        Box::new(api),
        Box::new(page.clone()),
        Box::new(notifier.clone()),
        Box::new(resync.clone()),
        config,
    )
    .expect("controller construction succeeds");

    Harness {
        controller,
        events,
        notifier,
        resync,
    }
}

/// Drain every event currently buffered
pub fn drain(events: &mut mpsc::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
