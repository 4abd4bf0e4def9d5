//! Local cart total recomputation
//!
//! Gives immediate feedback while a quantity is being edited, before the
//! authoritative resynchronization happens. Nothing here talks to the server.
//!
//! Subtotal cells are parsed leniently: the longest leading decimal number
//! is used and anything unparseable counts as zero, so a cell reading
//! `"12.50 USD"` contributes `12.5` and a cell reading `"n/a"` contributes `0`.

use crate::config::SelectorConfig;
use crate::traits::{Page, TotalsCalculator};
use tracing::trace;

/// Parse the leading decimal number of `text`
///
/// Leading whitespace is skipped. Accepts an optional sign, digits with an
/// optional fractional part, and an optional exponent. Returns `0.0` when no
/// number is present or the result is not finite.
pub fn parse_leading_number(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    // Adding positive zero turns -0 into 0
    match s[..end].parse::<f64>() {
        Ok(value) if value.is_finite() => value + 0.0,
        _ => 0.0,
    }
}

/// Sum subtotal texts, counting unparseable entries as zero
pub fn sum_subtotals<I, S>(texts: I) -> f64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    texts
        .into_iter()
        .map(|text| parse_leading_number(text.as_ref()))
        .fold(0.0, |acc, value| acc + value)
}

/// Format a total with exactly two decimal places
///
/// Rounds to the nearest cent using the exact binary value. A value that
/// lies exactly halfway between two cents (`1.125`) rounds away from zero
/// (`"1.13"`), unlike `{:.2}` which rounds such ties to even. Zero is never
/// shown as `"-0.00"`.
pub fn format_total(total: f64) -> String {
    // Exact ties at the third decimal are odd multiples of 1/8
    let eighths = total * 8.0;
    let rounded = if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (total * 100.0).round() / 100.0
    } else {
        total
    };
    format!("{:.2}", rounded + 0.0)
}

/// Default totals strategy: sum every rendered subtotal cell
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtotalSumCalculator;

impl SubtotalSumCalculator {
    /// Create the default calculator
    pub fn new() -> Self {
        Self
    }
}

impl TotalsCalculator for SubtotalSumCalculator {
    fn recalculate(&self, page: &dyn Page, selectors: &SelectorConfig) -> Option<String> {
        let cells = page.elements_by_class(&selectors.subtotal_class);
        let total = sum_subtotals(
            cells
                .iter()
                .map(|cell| page.text_content(*cell).unwrap_or_default()),
        );
        let text = format_total(total);

        trace!("Recomputed total {} from {} subtotal cell(s)", text, cells.len());

        let element = page.element_by_id(&selectors.total_element_id)?;
        if page.set_text_content(element, &text) {
            Some(text)
        } else {
            None
        }
    }

    fn calculator_name(&self) -> &'static str {
        "subtotal-sum"
    }
}
