//! Section representation for viewport-coordinated pages.
//!
//! A section is one navigable content unit: an opaque host element plus the
//! owner-supplied behavior hooks fired as the unit loads, unloads, and moves
//! through the viewport. Sections are created once through
//! [`SectionManager::add`](crate::manager::SectionManager::add), which
//! assigns a stable `key` and threads the `next`/`prev` chain; nothing
//! removes or reorders them afterwards.

use crate::viewport::TransitionEdge;
use serde_json::Value;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Direction of a navigation move through the section order.
pub enum NavDirection {
    /// Toward a higher key.
    Forward,
    /// Toward a lower key.
    Backward,
}

impl NavDirection {
    #[must_use]
    /// The opposite direction. Applied when a wraparound move needs to keep
    /// its apparent direction despite jumping the "wrong" way through keys.
    pub fn inverted(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    #[must_use]
    /// Numeric encoding: `1` forward, `-1` backward.
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Per-tick visibility context handed to a section's update hook.
pub struct VisibilityUpdate {
    /// Fraction of the viewport the section's element occupies, `[0, 1]`.
    pub fraction: f64,
    /// Viewport edge the element is crossing, if any.
    pub edge: TransitionEdge,
    /// Scroll progress through an oversized element; `0.0` when the
    /// classification carried no position.
    pub position: f64,
}

/// Hook fired on load and unload transitions. Receives the navigation
/// direction when the transition came from a navigation call, `None` when
/// it came from viewport crossing.
pub type LifecycleHook = Box<dyn FnMut(Option<NavDirection>)>;

/// Hook fired on every update pass. Receives visibility context in
/// viewport-checked mode, `None` in unconditional tick mode.
pub type UpdateHook = Box<dyn FnMut(Option<&VisibilityUpdate>)>;

/// Hook fired with an opaque payload when the host requests a deeplink.
pub type DeeplinkHook = Box<dyn FnMut(&Value)>;

/// Owner-supplied configuration for one section.
///
/// The hooks are opaque to the coordination core; anything they render or
/// animate is the owner's business. Only `element` is required to mean
/// something: it is handed back to the host for measurement.
pub struct SectionConfig<E> {
    /// Host-owned handle to the renderable region this section occupies.
    pub element: E,
    /// Fired when the section transitions to loaded.
    pub on_load: LifecycleHook,
    /// Fired when the section transitions to unloaded.
    pub on_unload: LifecycleHook,
    /// Fired on every update pass that reaches this section.
    pub on_update: UpdateHook,
    /// Optional deeplink pass-through; never fired by navigation itself.
    pub on_deeplink: Option<DeeplinkHook>,
}

/// One content unit in the managed sequence.
///
/// `visible` only transitions through `load` and `unload`; `key` and the
/// sibling links are set exactly once at append time. Sibling links are
/// indices into the owning collection rather than references, so the chain
/// carries no ownership.
pub struct Section<E> {
    element: E,
    visible: bool,
    key: usize,
    next: Option<usize>,
    prev: Option<usize>,
    on_load: LifecycleHook,
    on_unload: LifecycleHook,
    on_update: UpdateHook,
    on_deeplink: Option<DeeplinkHook>,
}

impl<E> Section<E> {
    pub(crate) fn new(config: SectionConfig<E>, key: usize, prev: Option<usize>) -> Self {
        Self {
            element: config.element,
            visible: false,
            key,
            next: None,
            prev,
            on_load: config.on_load,
            on_unload: config.on_unload,
            on_update: config.on_update,
            on_deeplink: config.on_deeplink,
        }
    }

    pub(crate) fn set_next(&mut self, next: usize) {
        self.next = Some(next);
    }

    #[must_use]
    /// The host element this section is attached to.
    pub fn element(&self) -> &E {
        &self.element
    }

    #[must_use]
    /// Whether the section is currently loaded.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    /// Stable insertion index, assigned at append time.
    pub fn key(&self) -> usize {
        self.key
    }

    #[must_use]
    /// Index of the following section, absent for the tail.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    #[must_use]
    /// Index of the preceding section, absent for the head.
    pub fn prev(&self) -> Option<usize> {
        self.prev
    }

    /// Marks the section loaded and fires the load hook.
    ///
    /// Deliberately unguarded: re-loading an already-loaded section fires
    /// the hook again. Only unload is idempotent.
    pub(crate) fn load(&mut self, direction: Option<NavDirection>) {
        self.visible = true;
        debug!(key = self.key, ?direction, "section loaded");
        (self.on_load)(direction);
    }

    /// Marks the section unloaded and fires the unload hook.
    ///
    /// Returns `false` without firing anything if the section was not
    /// loaded; "nothing to do" is not an error.
    pub(crate) fn unload(&mut self, direction: Option<NavDirection>) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        debug!(key = self.key, ?direction, "section unloaded");
        (self.on_unload)(direction);
        true
    }

    pub(crate) fn update(&mut self, context: Option<&VisibilityUpdate>) {
        (self.on_update)(context);
    }

    /// Fires the deeplink hook with an opaque payload, if one was supplied.
    ///
    /// A pass-through for the host: navigation never calls this.
    pub fn deeplink(&mut self, vars: &Value) {
        if let Some(hook) = self.on_deeplink.as_mut() {
            hook(vars);
        }
    }
}
