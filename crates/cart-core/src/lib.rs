// # cart-core
//
// Core library for the storefront cart interaction controller.
//
// ## Architecture Overview
//
// This library provides the client-side cart interaction model:
// - **CartApi**: Trait for the server-side cart mutation endpoints
// - **Page**: Trait for the rendered storefront page (element lookup, text updates)
// - **Notifier**: Trait for blocking user-visible notices
// - **Resynchronizer**: Trait for full resynchronization with server state
// - **TotalsCalculator**: Pluggable strategy for the locally displayed cart total
// - **CartController**: Binds page elements and runs the add/update/remove flows
//
// ## Design Principles
//
// 1. **Server is authoritative**: The client never validates quantities and only
//    trusts state after a successful mutation or a full resynchronization
// 2. **Injected collaborators**: CSRF token, page, reload and totals are passed in,
//    never read from ambient globals
// 3. **Library-First**: All flows can be driven headlessly (see `MemoryPage`)
// 4. **No retries**: Each user action produces exactly one request

pub mod config;
pub mod controller;
pub mod error;
pub mod page;
pub mod totals;
pub mod traits;

// Re-export core types for convenience
pub use config::{ApiConfig, ControllerConfig, NoticeConfig, SelectorConfig};
pub use controller::{Binding, CartController, ControllerEvent, FlowOutcome, UiEvent, UiEventKind};
pub use error::{Error, Result};
pub use page::{MemoryElement, MemoryPage, RecordingNotifier, RecordingResync};
pub use totals::{SubtotalSumCalculator, format_total, parse_leading_number, sum_subtotals};
pub use traits::{
    CartApi, CartMutation, ElementId, Endpoint, MutationResponse, Notifier, Page,
    Resynchronizer, TotalsCalculator,
};
