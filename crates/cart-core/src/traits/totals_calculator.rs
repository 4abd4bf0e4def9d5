// # Totals Calculator Trait
//
// Strategy for recomputing the displayed cart total without contacting the server.
//
// The default strategy is `cart_core::totals::SubtotalSumCalculator`. A page that
// knows more (unit prices, discounts) injects its own implementation into the
// controller.

use crate::config::SelectorConfig;
use crate::traits::page::Page;

/// Trait for local total recomputation strategies
pub trait TotalsCalculator: Send + Sync {
    /// Recompute and display the cart total
    ///
    /// Returns the text written to the total display, or `None` if nothing
    /// was displayed (e.g. the page has no total element).
    fn recalculate(&self, page: &dyn Page, selectors: &SelectorConfig) -> Option<String>;

    /// Get the strategy name (for logging/debugging)
    fn calculator_name(&self) -> &'static str;
}
