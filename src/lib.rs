//! sector: viewport-driven section lifecycle and navigation.
//!
//! The crate coordinates a linear sequence of content sections on a
//! scrollable surface: it tracks which section is active, loads and unloads
//! sections as they cross the viewport, and exposes directional navigation
//! with optional wraparound. It is host-agnostic by construction: element
//! measurement and scroll/resize observation are capabilities the host
//! supplies through the [`geometry`] traits, so the same core drives a
//! browser-like document, a terminal grid, or a test harness.
//!
//! Two loosely coupled pieces:
//!
//! - [`viewport::ViewportTracker`] turns an element bounding box and the
//!   live viewport window into a normalized visibility fraction and a
//!   transition edge.
//! - [`manager::SectionManager`] owns the ordered section collection and
//!   the current pointer, drives load/unload from tracker results, and
//!   provides `next`/`prev`/`move_to`/`jump_to` navigation.
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod section;
pub mod viewport;

pub use config::Config;
pub use error::Error;
pub use geometry::{ElementBox, ElementHost, ViewportHost};
pub use manager::{MoveOptions, SectionManager};
pub use section::{NavDirection, Section, SectionConfig, VisibilityUpdate};
pub use viewport::{TransitionEdge, ViewportTracker, ViewportWindow, Visibility};
