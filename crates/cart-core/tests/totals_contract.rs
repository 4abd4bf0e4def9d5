//! Contract Test: Local Total Recomputation
//!
//! Constraints verified:
//! - The total is the sum of all rendered subtotal cells
//! - Non-numeric cells count as zero
//! - The total is formatted with exactly two decimal places
//! - A page without a total display is left untouched

mod common;

use cart_core::traits::{Page, TotalsCalculator};
use cart_core::{FlowOutcome, SelectorConfig, SubtotalSumCalculator, UiEvent};
use common::*;

#[test]
fn garbage_cells_count_as_zero() {
    let cart = cart_page(&[], &[("1", "1", "10.00"), ("2", "1", "abc"), ("3", "1", "5.5")]);

    let total = SubtotalSumCalculator::new().recalculate(&cart.page, &SelectorConfig::default());

    assert_eq!(total.as_deref(), Some("15.50"));
    assert_eq!(cart.page.text_by_id("cart-total").as_deref(), Some("15.50"));
}

#[test]
fn empty_cart_total_is_zero() {
    let cart = cart_page(&[], &[]);

    let total = SubtotalSumCalculator::new().recalculate(&cart.page, &SelectorConfig::default());

    assert_eq!(total.as_deref(), Some("0.00"));
}

#[test]
fn missing_total_display_writes_nothing() {
    let cart = cart_page(&[], &[("1", "1", "10.00")]);
    cart.page.remove(cart.total);

    let total = SubtotalSumCalculator::new().recalculate(&cart.page, &SelectorConfig::default());

    assert_eq!(total, None);
    assert_eq!(cart.page.text_by_id("cart-count").as_deref(), Some("0"));
}

#[tokio::test]
async fn input_recomputes_from_current_cells() {
    let cart = cart_page(&[], &[("1", "1", "10.00"), ("2", "1", "2.00")]);
    let harness = attach(ScriptedCartApi::succeeding(1), &cart.page);

    // Template script rewrote a subtotal before the input event reached us
    assert!(cart.page.set_text_content(cart.subtotals[1], "7.25"));

    let outcome = harness
        .controller
        .dispatch(UiEvent::input(cart.quantity_inputs[1]))
        .await;

    assert_eq!(
        outcome,
        FlowOutcome::TotalRecomputed {
            total: Some("17.25".to_string())
        }
    );
}

#[test]
fn negative_zero_cells_show_zero_total() {
    let cart = cart_page(&[], &[("1", "0", "-0"), ("2", "0", "-0.00")]);

    let total = SubtotalSumCalculator::new().recalculate(&cart.page, &SelectorConfig::default());

    assert_eq!(total.as_deref(), Some("0.00"));
    assert_eq!(cart.page.text_by_id("cart-total").as_deref(), Some("0.00"));
}
