//! Viewport window state and the visibility classification it drives.
//!
//! A [`ViewportTracker`] holds the currently visible vertical extent of the
//! host surface and answers one question: given an element's bounding box,
//! how much of the viewport does it occupy and across which edge is it
//! moving? The answer feeds the section manager's load/unload decisions.
//!
//! Note the deliberate semantic: [`Visibility::fraction`] is the fraction of
//! the *viewport* the element occupies vertically, not the fraction of the
//! element that is visible. A slim element fully inside the window reports
//! `1.0`.

use crate::error::Error;
use crate::geometry::{ElementBox, ViewportHost};
use tracing::error;

#[derive(Clone, Copy, Debug, PartialEq)]
/// The visible vertical extent of the host surface, `[top, bottom]`.
pub struct ViewportWindow {
    /// Current scroll offset (document-space top of the window).
    pub top: f64,
    /// Visible height of the surface.
    pub height: f64,
}

impl ViewportWindow {
    #[must_use]
    /// Document-space bottom of the window. Always `top + height`, so it
    /// follows both scroll and resize updates.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which viewport edge an element is currently crossing.
pub enum TransitionEdge {
    /// Exiting or entering across the top edge.
    Top,
    /// No transition: fully inside or fully outside the window.
    None,
    /// Exiting or entering across the bottom edge.
    Bottom,
}

impl TransitionEdge {
    #[must_use]
    /// Numeric encoding: `-1` top, `0` none, `1` bottom.
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Top => -1,
            Self::None => 0,
            Self::Bottom => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Result of classifying one element against the viewport window.
pub struct Visibility {
    /// Fraction of the viewport's vertical extent the element occupies,
    /// in `[0, 1]`.
    pub fraction: f64,
    /// Edge the element is transitioning across, if any.
    pub edge: TransitionEdge,
    /// For elements spanning the whole window: how far the viewport has
    /// scrolled through the element, in `[0, 1]`. Absent otherwise.
    pub position: Option<f64>,
}

/// Live viewport state plus the visibility classification over it.
///
/// One tracker per host context. The host forwards its scroll and resize
/// events to [`handle_scroll`](Self::handle_scroll) and
/// [`handle_resize`](Self::handle_resize); nothing else mutates the window.
pub struct ViewportTracker {
    window: ViewportWindow,
}

impl ViewportTracker {
    #[must_use]
    /// Creates a tracker with an explicit initial scroll offset and height.
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            window: ViewportWindow { top, height },
        }
    }

    #[must_use]
    /// Creates a tracker seeded from the host's ambient viewport.
    pub fn from_host(host: &impl ViewportHost) -> Self {
        Self::new(host.scroll_offset(), host.viewport_height())
    }

    #[must_use]
    /// Current viewport window.
    pub fn window(&self) -> ViewportWindow {
        self.window
    }

    /// Scroll notification: replaces the window's top offset.
    pub fn handle_scroll(&mut self, top: f64) {
        self.window.top = top;
    }

    /// Resize notification: replaces the window's height, keeping the
    /// current top offset.
    pub fn handle_resize(&mut self, height: f64) {
        self.window.height = height;
    }

    /// Classifies an element's bounding box against the current window.
    ///
    /// The five cases, checked in priority order (the first two boundary
    /// comparisons are inclusive, so exact edge contact counts as out of
    /// view and classification is total for finite inputs):
    ///
    /// 1. fully out of view: `fraction` 0, no edge
    /// 2. spans the whole window: `fraction` 1, `position` reports scroll
    ///    progress through the element
    /// 3. fully contained: `fraction` 1, no edge
    /// 4. crossing the top edge: partial `fraction`, [`TransitionEdge::Top`]
    /// 5. crossing the bottom edge: partial `fraction`, [`TransitionEdge::Bottom`]
    ///
    /// # Errors
    ///
    /// [`Error::UnclassifiedGeometry`] if no case matches, which only
    /// non-finite inputs can produce.
    pub fn compute_visibility(&self, element: &ElementBox) -> Result<Visibility, Error> {
        let etop = element.top;
        let ebottom = element.bottom();
        let top = self.window.top;
        let bottom = self.window.bottom();

        // Fully out of view; edge contact counts as out.
        if ebottom <= top || etop >= bottom {
            return Ok(Visibility {
                fraction: 0.0,
                edge: TransitionEdge::None,
                position: None,
            });
        }
        // Fills the window (and possibly stretches outside it).
        if etop <= top && ebottom >= bottom {
            return Ok(Visibility {
                fraction: 1.0,
                edge: TransitionEdge::None,
                position: Some((bottom - etop) / element.height),
            });
        }
        // Fully inside the window without filling it.
        if etop >= top && ebottom <= bottom {
            return Ok(Visibility {
                fraction: 1.0,
                edge: TransitionEdge::None,
                position: None,
            });
        }
        // Transitioning across the top edge.
        if etop < top && ebottom < bottom {
            return Ok(Visibility {
                fraction: (ebottom - top) / element.height,
                edge: TransitionEdge::Top,
                position: None,
            });
        }
        // Transitioning across the bottom edge.
        if etop > top && etop < bottom && ebottom > bottom {
            return Ok(Visibility {
                fraction: (bottom - etop) / element.height,
                edge: TransitionEdge::Bottom,
                position: None,
            });
        }

        error!(?element, window = ?self.window, "geometry matched no visibility case");
        Err(Error::UnclassifiedGeometry {
            element: *element,
            window: self.window,
        })
    }

    #[must_use]
    /// Normalized progress of the element's top edge through the window.
    ///
    /// Returns `0.0` while the element's top is below the window's bottom,
    /// then `(bottom - etop) / window height`. Independent of the element's
    /// own height, and deliberately unclamped: elements above the window
    /// report values past `1.0`.
    pub fn fraction_from_top(&self, element: &ElementBox) -> f64 {
        let bottom = self.window.bottom();
        if element.top > bottom {
            0.0
        } else {
            (bottom - element.top) / self.window.height
        }
    }
}

#[cfg(test)]
#[path = "tests/viewport.rs"]
mod tests;
