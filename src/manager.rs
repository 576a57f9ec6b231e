//! The coordination core: an ordered section collection, the current
//! pointer, and the operations that move it.
//!
//! A [`SectionManager`] owns its sections, the host capability it measures
//! them through, and the [`ViewportTracker`] holding window state. Two
//! independent drivers mutate section state: viewport-driven
//! [`update`](SectionManager::update) passes (load when a section's
//! visibility fraction crosses zero, unload when it returns there) and the
//! navigation calls ([`next`](SectionManager::next),
//! [`prev`](SectionManager::prev), [`move_to`](SectionManager::move_to),
//! [`jump_to`](SectionManager::jump_to)), which act on the current pointer
//! regardless of what is on screen.

use crate::error::Error;
use crate::geometry::ElementHost;
use crate::section::{NavDirection, Section, SectionConfig, VisibilityUpdate};
use crate::viewport::ViewportTracker;
use serde_json::Value;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
/// Caller-supplied adjustments to a navigation move.
pub struct MoveOptions {
    /// Explicit direction to report to the affected sections, replacing the
    /// key-comparison default.
    pub override_direction: Option<NavDirection>,
    /// Marks the move as a wraparound; the reported direction is inverted
    /// so the apparent transition direction survives the index jump.
    /// Navigation sets this itself when looping.
    pub looped: bool,
}

/// Owner of the section sequence and its navigation state.
///
/// `E` is the host's opaque element handle, `H` the capability that
/// measures it. Sections are append-only; `current` is a sentinel `None`
/// only until the first [`add`](Self::add).
pub struct SectionManager<E, H> {
    host: H,
    tracker: ViewportTracker,
    sections: Vec<Section<E>>,
    current: Option<usize>,
    paused: bool,
    loop_navigation: bool,
}

impl<E, H: ElementHost<E>> SectionManager<E, H> {
    #[must_use]
    /// Creates an empty manager.
    ///
    /// `loop_navigation` is captured for the manager's lifetime: `true`
    /// makes [`next`](Self::next)/[`prev`](Self::prev) wrap around the
    /// boundary, `false` makes them stop there.
    pub fn new(host: H, tracker: ViewportTracker, loop_navigation: bool) -> Self {
        Self {
            host,
            tracker,
            sections: Vec::new(),
            current: None,
            paused: false,
            loop_navigation,
        }
    }

    /// Appends a section built from `config`.
    ///
    /// The new section's `key` is its insertion index; it is linked as
    /// `next` of the previous tail and the tail becomes its `prev`. The
    /// first section added becomes current immediately but is not loaded;
    /// loading is always caller- or viewport-triggered.
    ///
    /// Returns the assigned key.
    pub fn add(&mut self, config: SectionConfig<E>) -> usize {
        let key = self.sections.len();
        let prev = key.checked_sub(1);
        let section = Section::new(config, key, prev);
        if let Some(tail) = prev {
            self.sections[tail].set_next(key);
        } else {
            self.current = Some(key);
        }
        self.sections.push(section);
        key
    }

    /// Runs one update pass over every section.
    ///
    /// A no-op while paused. With `check_viewport` set, each section whose
    /// element the host reports hidden is skipped; every other element is
    /// classified against the viewport window, loading sections whose
    /// visibility fraction rises above zero (before their positional update
    /// fires) and unloading loaded sections whose fraction returns to zero.
    /// Without `check_viewport`, every section's update hook fires with no
    /// visibility context, the tick mode for sections animating
    /// independently of scroll.
    ///
    /// # Errors
    ///
    /// [`Error::UnclassifiedGeometry`] if the host reports non-finite
    /// geometry; the pass stops at the offending section.
    pub fn update(&mut self, check_viewport: bool) -> Result<(), Error> {
        if self.paused {
            return Ok(());
        }
        if !check_viewport {
            for section in &mut self.sections {
                section.update(None);
            }
            return Ok(());
        }

        let Self {
            host,
            tracker,
            sections,
            ..
        } = self;
        for section in sections {
            if host.is_hidden(section.element()) {
                continue;
            }
            let bbox = host.bounding_box(section.element());
            let visibility = tracker.compute_visibility(&bbox)?;
            if visibility.fraction > 0.0 {
                if !section.is_visible() {
                    section.load(None);
                }
                let context = VisibilityUpdate {
                    fraction: visibility.fraction,
                    edge: visibility.edge,
                    position: visibility.position.unwrap_or(0.0),
                };
                section.update(Some(&context));
            } else if section.is_visible() {
                section.unload(None);
            }
        }
        Ok(())
    }

    /// Moves the current pointer to `target`, unloading the section it
    /// leaves and loading the one it lands on.
    ///
    /// The direction reported to both hooks defaults to
    /// [`NavDirection::Forward`] when moving toward a higher key, is
    /// replaced wholesale by [`MoveOptions::override_direction`], and is
    /// inverted when [`MoveOptions::looped`] is set. The unload is
    /// idempotent; the load is not (re-targeting the current section
    /// re-fires its load hook).
    ///
    /// `target` is an index into the collection; a section's `key` is its
    /// index, so `section.key()` addresses it directly.
    ///
    /// # Errors
    ///
    /// [`Error::NoSections`] before the first [`add`](Self::add),
    /// [`Error::IndexOutOfRange`] if `target` does not resolve.
    pub fn move_to(&mut self, target: usize, options: MoveOptions) -> Result<(), Error> {
        let current = self.current.ok_or(Error::NoSections)?;
        if target >= self.sections.len() {
            return Err(Error::IndexOutOfRange {
                index: target,
                len: self.sections.len(),
            });
        }
        let computed = if self.sections[current].key() < self.sections[target].key() {
            NavDirection::Forward
        } else {
            NavDirection::Backward
        };
        let mut direction = options.override_direction.unwrap_or(computed);
        if options.looped {
            direction = direction.inverted();
        }
        debug!(from = current, to = target, ?direction, "move_to");
        self.sections[current].unload(Some(direction));
        self.sections[target].load(Some(direction));
        self.current = Some(target);
        Ok(())
    }

    /// Loads `target` and makes it current without unloading the section
    /// being left: overlay-style navigation where the previous section
    /// stays live underneath.
    ///
    /// The direction is always the key comparison;
    /// [`MoveOptions::override_direction`] and [`MoveOptions::looped`] are
    /// not honored here.
    ///
    /// # Errors
    ///
    /// [`Error::NoSections`] before the first [`add`](Self::add),
    /// [`Error::IndexOutOfRange`] if `target` does not resolve.
    pub fn jump_to(&mut self, target: usize, _options: MoveOptions) -> Result<(), Error> {
        let current = self.current.ok_or(Error::NoSections)?;
        if target >= self.sections.len() {
            return Err(Error::IndexOutOfRange {
                index: target,
                len: self.sections.len(),
            });
        }
        let direction = if self.sections[current].key() < self.sections[target].key() {
            NavDirection::Forward
        } else {
            NavDirection::Backward
        };
        debug!(from = current, to = target, ?direction, "jump_to");
        self.sections[target].load(Some(direction));
        self.current = Some(target);
        Ok(())
    }

    /// Advances the current pointer to the next section.
    ///
    /// With looping enabled, stepping past the tail wraps to the first
    /// section with the reported direction preserved as forward. On the
    /// in-bounds branch the caller's `options` are deliberately not
    /// forwarded; only the wrap branch carries them.
    ///
    /// # Errors
    ///
    /// [`Error::NoSections`] before the first [`add`](Self::add).
    pub fn next(&mut self, options: MoveOptions) -> Result<(), Error> {
        let current = self.current.ok_or(Error::NoSections)?;
        let neighbor = self.sections[current].next();
        if self.loop_navigation {
            let looped = MoveOptions {
                looped: true,
                ..options
            };
            if let Some(next) = neighbor {
                self.move_to(next, MoveOptions::default())
            } else {
                self.move_to(0, looped)
            }
        } else if let Some(next) = neighbor {
            self.move_to(next, options)
        } else {
            Ok(())
        }
    }

    /// Steps the current pointer back to the previous section.
    ///
    /// Mirror of [`next`](Self::next): with looping enabled, stepping past
    /// the head wraps to the last section, reported as a backward move.
    ///
    /// # Errors
    ///
    /// [`Error::NoSections`] before the first [`add`](Self::add).
    pub fn prev(&mut self, options: MoveOptions) -> Result<(), Error> {
        let current = self.current.ok_or(Error::NoSections)?;
        let neighbor = self.sections[current].prev();
        if self.loop_navigation {
            let looped = MoveOptions {
                looped: true,
                ..options
            };
            if let Some(prev) = neighbor {
                self.move_to(prev, MoveOptions::default())
            } else {
                self.move_to(self.sections.len() - 1, looped)
            }
        } else if let Some(prev) = neighbor {
            self.move_to(prev, options)
        } else {
            Ok(())
        }
    }

    /// Fires `target`'s deeplink hook with an opaque payload.
    ///
    /// Pure pass-through for the host; no navigation state changes.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `target` does not resolve.
    pub fn deeplink(&mut self, target: usize, vars: &Value) -> Result<(), Error> {
        let len = self.sections.len();
        let section = self
            .sections
            .get_mut(target)
            .ok_or(Error::IndexOutOfRange { index: target, len })?;
        section.deeplink(vars);
        Ok(())
    }

    /// Suppresses update passes until [`unpause`](Self::unpause).
    /// Navigation is unaffected.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Lifts [`pause`](Self::pause).
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    #[must_use]
    /// Whether update passes are currently suppressed.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    /// All sections in insertion order.
    pub fn sections(&self) -> &[Section<E>] {
        &self.sections
    }

    #[must_use]
    /// The current section, `None` only before the first [`add`](Self::add).
    pub fn current(&self) -> Option<&Section<E>> {
        self.current.map(|index| &self.sections[index])
    }

    #[must_use]
    /// The viewport tracker driving visibility decisions.
    pub fn tracker(&self) -> &ViewportTracker {
        &self.tracker
    }

    /// Forwards a host scroll notification to the tracker.
    pub fn notify_scroll(&mut self, top: f64) {
        self.tracker.handle_scroll(top);
    }

    /// Forwards a host resize notification to the tracker.
    pub fn notify_resize(&mut self, height: f64) {
        self.tracker.handle_resize(height);
    }
}

#[cfg(test)]
#[path = "tests/manager.rs"]
mod tests;
