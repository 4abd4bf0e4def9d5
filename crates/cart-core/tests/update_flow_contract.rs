//! Contract Test: Quantity Update Flow
//!
//! Constraints verified:
//! - Only a committed change sends a request; raw input never does
//! - The quantity is sent exactly as typed (no client-side validation)
//! - Success triggers a full resynchronization
//! - Rejection shows a notice and does not resynchronize
//! - A transport failure shows a distinct notice and does not resynchronize
//! - Identical updates behave identically (no client-side deduplication)

mod common;

use cart_core::traits::CartMutation;
use cart_core::{ControllerEvent, Endpoint, FlowOutcome, UiEvent};
use common::*;

#[tokio::test]
async fn change_sends_item_id_and_raw_value() {
    let cart = cart_page(&[], &[("17", "2", "10.00")]);
    let api = ScriptedCartApi::succeeding(2);
    let probe = ScriptedCartApi::sharing_counters_with(&api);
    let harness = attach(api, &cart.page);

    cart.page.set_value(cart.quantity_inputs[0], " -4x");
    harness
        .controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;

    assert_eq!(probe.submitted(), vec![CartMutation::update("17", " -4x")]);
}

#[tokio::test]
async fn successful_update_resynchronizes() {
    let cart = cart_page(&[], &[("17", "2", "10.00")]);
    let mut harness = attach(ScriptedCartApi::succeeding(5), &cart.page);

    let outcome = harness
        .controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;

    assert_eq!(outcome, FlowOutcome::Resynchronized);
    assert_eq!(harness.resync.count(), 1);
    assert!(harness.notifier.messages().is_empty());
    assert!(drain(&mut harness.events).contains(&ControllerEvent::Resynchronized {
        endpoint: Endpoint::Update
    }));
}

#[tokio::test]
async fn rejected_update_shows_notice_without_resync() {
    let cart = cart_page(&[], &[("17", "2", "10.00")]);
    let harness = attach(ScriptedCartApi::rejecting(), &cart.page);

    let outcome = harness
        .controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;

    assert_eq!(
        outcome,
        FlowOutcome::Rejected {
            notice: Some("Could not update quantity.".to_string())
        }
    );
    assert_eq!(harness.resync.count(), 0);
    assert_eq!(harness.notifier.messages(), vec!["Could not update quantity."]);
}

#[tokio::test]
async fn transport_failure_shows_distinct_notice_without_resync() {
    let cart = cart_page(&[], &[("17", "2", "10.00")]);
    let harness = attach(ScriptedCartApi::unreachable(), &cart.page);

    let outcome = harness
        .controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;

    assert!(matches!(outcome, FlowOutcome::TransportFailed { .. }));
    assert_eq!(harness.resync.count(), 0);
    assert_eq!(harness.notifier.messages(), vec!["Error updating quantity."]);
    assert_ne!(
        harness.notifier.messages()[0],
        "Could not update quantity.",
        "transport failure notice must differ from rejection notice"
    );
}

#[tokio::test]
async fn identical_updates_behave_identically() {
    let cart = cart_page(&[], &[("17", "3", "15.00")]);
    let api = ScriptedCartApi::succeeding(3);
    let probe = ScriptedCartApi::sharing_counters_with(&api);
    let harness = attach(api, &cart.page);

    let first = harness
        .controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;
    let second = harness
        .controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;

    assert_eq!(first, FlowOutcome::Resynchronized);
    assert_eq!(first, second);
    assert_eq!(probe.submit_call_count(), 2, "no client-side deduplication");
    assert_eq!(harness.resync.count(), 2);
}

#[tokio::test]
async fn resync_failure_is_reported() {
    let cart = cart_page(&[], &[("17", "2", "10.00")]);
    let notifier = cart_core::RecordingNotifier::new();
    let (controller, _events) = cart_core::CartController::new(
        Box::new(ScriptedCartApi::succeeding(1)),
        Box::new(cart.page.clone()),
        Box::new(notifier.clone()),
        Box::new(cart_core::RecordingResync::failing()),
        cart_core::ControllerConfig::default(),
    )
    .unwrap();

    let outcome = controller
        .dispatch(UiEvent::change(cart.quantity_inputs[0]))
        .await;

    assert!(matches!(outcome, FlowOutcome::ResyncFailed { .. }));
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn input_event_never_contacts_server() {
    let cart = cart_page(&[], &[("17", "2", "10.00"), ("18", "1", "4.25")]);
    let api = ScriptedCartApi::succeeding(1);
    let probe = ScriptedCartApi::sharing_counters_with(&api);
    let harness = attach(api, &cart.page);

    let outcome = harness
        .controller
        .dispatch(UiEvent::input(cart.quantity_inputs[1]))
        .await;

    assert_eq!(
        outcome,
        FlowOutcome::TotalRecomputed {
            total: Some("14.25".to_string())
        }
    );
    assert_eq!(probe.submit_call_count(), 0);
    assert_eq!(harness.resync.count(), 0);
    assert_eq!(cart.page.text_by_id("cart-total").as_deref(), Some("14.25"));
}
