//! Contract Test: Remove Flow
//!
//! Constraints verified:
//! - The remove request carries only the line-item id
//! - Success triggers a full resynchronization
//! - Rejection is silent: no notice, no resynchronization, no page change
//! - A transport failure still shows a notice

mod common;

use cart_core::traits::{CartMutation, MutationResponse};
use cart_core::{ControllerEvent, Endpoint, FlowOutcome, UiEvent};
use common::*;

#[tokio::test]
async fn remove_sends_only_item_id() {
    let cart = cart_page(&[], &[("5", "1", "2.00"), ("6", "1", "3.00")]);
    let api = ScriptedCartApi::succeeding(1);
    let probe = ScriptedCartApi::sharing_counters_with(&api);
    let harness = attach(api, &cart.page);

    harness
        .controller
        .dispatch(UiEvent::click(cart.remove_buttons[1]))
        .await;

    let submitted = probe.submitted();
    assert_eq!(submitted, vec![CartMutation::remove("6")]);
    assert_eq!(submitted[0].form_fields(), vec![("item_id", "6")]);
}

#[tokio::test]
async fn successful_remove_resynchronizes() {
    let cart = cart_page(&[], &[("5", "1", "2.00")]);
    let harness = attach(ScriptedCartApi::succeeding(0), &cart.page);

    let outcome = harness
        .controller
        .dispatch(UiEvent::click(cart.remove_buttons[0]))
        .await;

    assert_eq!(outcome, FlowOutcome::Resynchronized);
    assert_eq!(harness.resync.count(), 1);
}

#[tokio::test]
async fn rejected_remove_is_silent() {
    let cart = cart_page(&[], &[("5", "1", "2.00")]);
    let reply = Reply::Respond(
        MutationResponse::from_slice(br#"{"success": false}"#).unwrap(),
    );
    let mut harness = attach(ScriptedCartApi::always(reply), &cart.page);
    let total_before = cart.page.text_by_id("cart-total");

    let outcome = harness
        .controller
        .dispatch(UiEvent::click(cart.remove_buttons[0]))
        .await;

    assert_eq!(outcome, FlowOutcome::Rejected { notice: None });
    assert!(harness.notifier.messages().is_empty(), "remove rejection must be silent");
    assert_eq!(harness.resync.count(), 0);
    assert_eq!(cart.page.text_by_id("cart-total"), total_before);
    assert!(drain(&mut harness.events).contains(&ControllerEvent::Rejected {
        endpoint: Endpoint::Remove,
        error: None,
    }));
}

#[tokio::test]
async fn transport_failure_on_remove_shows_notice() {
    let cart = cart_page(&[], &[("5", "1", "2.00")]);
    let harness = attach(ScriptedCartApi::unreachable(), &cart.page);

    let outcome = harness
        .controller
        .dispatch(UiEvent::click(cart.remove_buttons[0]))
        .await;

    assert!(matches!(outcome, FlowOutcome::TransportFailed { .. }));
    assert_eq!(harness.notifier.messages(), vec!["Error removing item."]);
    assert_eq!(harness.resync.count(), 0);
}
