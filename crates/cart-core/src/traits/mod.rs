//! Core traits for the cart controller
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`CartApi`]: Submit cart mutations to the storefront
//! - [`Page`]: Read and patch the rendered storefront page
//! - [`Notifier`]: Show blocking notices to the user
//! - [`Resynchronizer`]: Discard client state and re-render from the server
//! - [`TotalsCalculator`]: Recompute the displayed cart total locally

pub mod cart_api;
pub mod page;
pub mod totals_calculator;

pub use cart_api::{CartApi, CartMutation, Endpoint, MutationResponse};
pub use page::{ElementId, Notifier, Page, Resynchronizer};
pub use totals_calculator::TotalsCalculator;
