//! Failure cases surfaced by the tracker and manager.
//!
//! The coordination core prefers silent no-ops for expected edges (unloading
//! an unloaded section, stepping past a boundary without looping). The two
//! situations that would otherwise corrupt state, resolving an invalid
//! section target or geometry that matches no classification case, fail
//! fast instead.

use crate::geometry::ElementBox;
use crate::viewport::ViewportWindow;

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SectionManager`](crate::manager::SectionManager) and
/// [`ViewportTracker`](crate::viewport::ViewportTracker) operations.
pub enum Error {
    /// A navigation target index does not resolve to a section.
    #[error("section index {index} out of range (have {len} sections)")]
    IndexOutOfRange {
        /// The index that failed to resolve.
        index: usize,
        /// Number of sections in the collection at the time.
        len: usize,
    },

    /// Navigation was requested before any section was added.
    #[error("no sections have been added yet")]
    NoSections,

    /// An element/viewport pair matched none of the visibility cases.
    ///
    /// Unreachable for finite inputs with positive height; reaching it
    /// means the host reported non-finite geometry.
    #[error("geometry matched no visibility case (element {element:?}, window {window:?})")]
    UnclassifiedGeometry {
        /// The element box that failed to classify.
        element: ElementBox,
        /// The viewport window it was tested against.
        window: ViewportWindow,
    },
}
