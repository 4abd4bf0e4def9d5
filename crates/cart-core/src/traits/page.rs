// # Page Traits
//
// Defines the interfaces between the controller and the rendered storefront page.
//
// ## Purpose
//
// The controller never touches a concrete DOM. It reads identifiers and
// values through [`Page`], shows notices through [`Notifier`] and triggers
// full resynchronization through [`Resynchronizer`].
//
// ## Implementations
//
// - In-memory (headless): `cart_core::page::MemoryPage`
// - Browser bindings live outside this workspace

use async_trait::async_trait;

/// Opaque handle to an element of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read/patch access to the rendered page
///
/// All methods are synchronous: the page is local state, only the
/// cart API is remote.
pub trait Page: Send + Sync {
    /// All elements carrying `class`, in document order
    fn elements_by_class(&self, class: &str) -> Vec<ElementId>;

    /// The element with the given `id` attribute, if rendered
    fn element_by_id(&self, id: &str) -> Option<ElementId>;

    /// Value of the `data-<name>` attribute
    fn data_attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Current value of a form control
    fn value(&self, element: ElementId) -> Option<String>;

    /// Text content of an element
    fn text_content(&self, element: ElementId) -> Option<String>;

    /// Replace the text content of an element
    ///
    /// Returns `false` if the element no longer exists.
    fn set_text_content(&self, element: ElementId, text: &str) -> bool;
}

/// Blocking, user-visible notices
pub trait Notifier: Send + Sync {
    /// Show a notice to the user
    fn notify(&self, message: &str);
}

/// Full resynchronization with server state
///
/// Client-rendered cart state is only authoritative after this completes.
/// A browser binding reloads the page; other implementations may re-fetch
/// and patch the cart fragment instead.
#[async_trait]
pub trait Resynchronizer: Send + Sync {
    /// Discard client cart state and re-render from the server
    async fn resynchronize(&self) -> Result<(), crate::Error>;
}
