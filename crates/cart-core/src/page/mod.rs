//! Page implementations
//!
//! This module provides headless implementations of the page-side traits.

pub mod memory;

pub use memory::{MemoryElement, MemoryPage, RecordingNotifier, RecordingResync};
