//! Host capability traits and the geometry primitives they exchange.
//!
//! The crate never measures anything itself. Whatever surface the sections
//! live on (a browser document, a terminal grid, a canvas) supplies element
//! geometry through [`ElementHost`] and the ambient viewport through
//! [`ViewportHost`]. Scroll and resize subscriptions are inverted the same
//! way: the host observes its own events and forwards them to
//! [`ViewportTracker::handle_scroll`](crate::viewport::ViewportTracker::handle_scroll)
//! and [`handle_resize`](crate::viewport::ViewportTracker::handle_resize).

#[derive(Clone, Copy, Debug, PartialEq)]
/// Document-space bounding box of one element: absolute top offset and height.
pub struct ElementBox {
    /// Distance from the top of the document to the element's top edge.
    pub top: f64,
    /// Vertical extent of the element. Expected positive; zero-height
    /// elements are degenerate and classify by their top edge alone.
    pub height: f64,
}

impl ElementBox {
    #[must_use]
    /// Document-space offset of the element's bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Geometry provider for the elements sections are attached to.
///
/// `E` is an opaque element handle owned by the host; the manager stores it
/// per section and hands it back here for measurement.
pub trait ElementHost<E> {
    /// Current bounding box of the element in document space.
    fn bounding_box(&self, element: &E) -> ElementBox;

    /// Whether the element is withdrawn from layout entirely. Hidden
    /// elements are skipped during viewport-driven updates without
    /// unloading them.
    fn is_hidden(&self, element: &E) -> bool;
}

/// Ambient viewport measurements, used to seed a tracker from the host.
pub trait ViewportHost {
    /// Visible height of the scrollable surface.
    fn viewport_height(&self) -> f64;

    /// Current vertical scroll offset of the surface.
    fn scroll_offset(&self) -> f64;
}
