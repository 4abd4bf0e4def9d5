// # Memory Page
//
// In-memory implementation of Page, Notifier and Resynchronizer.
//
// ## Purpose
//
// Provides a headless page so the controller flows can run without a
// browser: in tests, and in `cartctl` where the "page" is just the
// handful of elements an action needs.
//
// ## Behavior
//
// - Elements are addressed by insertion index (`ElementId`)
// - Removed elements keep their slot; lookups on them return `None`
// - Clones share the same underlying elements

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::Error;
use crate::traits::{ElementId, Notifier, Page, Resynchronizer};

/// A single element of a [`MemoryPage`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    /// `id` attribute
    pub id: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// `data-*` attributes, keyed without the prefix
    pub data: HashMap<String, String>,
    /// Form control value
    pub value: Option<String>,
    /// Text content
    pub text: String,
}

impl MemoryElement {
    /// Create an empty element
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `id` attribute
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set a `data-*` attribute
    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Set the form control value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// In-memory page
///
/// # Example
///
/// ```rust
/// use cart_core::page::{MemoryElement, MemoryPage};
/// use cart_core::traits::Page;
///
/// let page = MemoryPage::new();
/// let count = page.insert(MemoryElement::new().with_id("cart-count").with_text("0"));
///
/// page.set_text_content(count, "3");
/// assert_eq!(page.text_by_id("cart-count").as_deref(), Some("3"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    inner: Arc<RwLock<Vec<Option<MemoryElement>>>>,
}

impl MemoryPage {
    /// Create an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its handle
    pub fn insert(&self, element: MemoryElement) -> ElementId {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.push(Some(element));
        ElementId(guard.len() - 1)
    }

    /// Remove an element; its handle becomes dangling
    pub fn remove(&self, element: ElementId) -> Option<MemoryElement> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.get_mut(element.0).and_then(Option::take)
    }

    /// Set a form control value (what a user typing into the input does)
    pub fn set_value(&self, element: ElementId, value: impl Into<String>) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match guard.get_mut(element.0).and_then(Option::as_mut) {
            Some(el) => {
                el.value = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Snapshot of an element
    pub fn get(&self, element: ElementId) -> Option<MemoryElement> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(element.0).cloned().flatten()
    }

    /// Text content of the element with the given `id` attribute
    pub fn text_by_id(&self, id: &str) -> Option<String> {
        self.element_by_id(id)
            .and_then(|element| self.text_content(element))
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the page has no live elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_element<T>(&self, element: ElementId, f: impl FnOnce(&MemoryElement) -> T) -> Option<T> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(element.0).and_then(Option::as_ref).map(f)
    }
}

impl Page for MemoryPage {
    fn elements_by_class(&self, class: &str) -> Vec<ElementId> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(el) if el.has_class(class) => Some(ElementId(index)),
                _ => None,
            })
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|el| el.id.as_deref() == Some(id)))
            .map(ElementId)
    }

    fn data_attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.with_element(element, |el| el.data.get(name).cloned())
            .flatten()
    }

    fn value(&self, element: ElementId) -> Option<String> {
        self.with_element(element, |el| el.value.clone()).flatten()
    }

    fn text_content(&self, element: ElementId) -> Option<String> {
        self.with_element(element, |el| el.text.clone())
    }

    fn set_text_content(&self, element: ElementId, text: &str) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match guard.get_mut(element.0).and_then(Option::as_mut) {
            Some(el) => {
                el.text = text.to_string();
                true
            }
            None => false,
        }
    }
}

/// Notifier that records every notice
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Create a notifier with no recorded notices
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices shown so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

/// Resynchronizer that counts invocations instead of reloading
#[derive(Debug, Clone, Default)]
pub struct RecordingResync {
    count: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingResync {
    /// Create a resynchronizer that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resynchronizer that always fails
    pub fn failing() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }

    /// Number of resynchronizations requested
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resynchronizer for RecordingResync {
    async fn resynchronize(&self) -> Result<(), Error> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::resync("resynchronization disabled"));
        }
        Ok(())
    }
}
