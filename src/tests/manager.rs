use super::{MoveOptions, SectionManager};
use crate::error::Error;
use crate::geometry::{ElementBox, ElementHost};
use crate::section::{NavDirection, SectionConfig, VisibilityUpdate};
use crate::viewport::ViewportTracker;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Hook {
    Load {
        key: usize,
        direction: Option<NavDirection>,
    },
    Unload {
        key: usize,
        direction: Option<NavDirection>,
    },
    Tick {
        key: usize,
        viewport: bool,
    },
    Deeplink {
        key: usize,
    },
}

type Log = Rc<RefCell<Vec<Hook>>>;

struct Element {
    top: f64,
    height: f64,
    hidden: Rc<Cell<bool>>,
}

struct Host;

impl ElementHost<Element> for Host {
    fn bounding_box(&self, element: &Element) -> ElementBox {
        ElementBox {
            top: element.top,
            height: element.height,
        }
    }

    fn is_hidden(&self, element: &Element) -> bool {
        element.hidden.get()
    }
}

/// Builds a manager over a window covering rows 0..100, with one section per
/// `(top, height)` box and every hook appending to a shared log.
fn build(
    loop_navigation: bool,
    boxes: &[(f64, f64)],
) -> (SectionManager<Element, Host>, Log, Vec<Rc<Cell<bool>>>) {
    let tracker = ViewportTracker::new(0.0, 100.0);
    let mut manager = SectionManager::new(Host, tracker, loop_navigation);
    let log: Log = Rc::default();
    let mut hidden_flags = Vec::new();

    for (key, &(top, height)) in boxes.iter().enumerate() {
        let hidden = Rc::new(Cell::new(false));
        hidden_flags.push(Rc::clone(&hidden));
        let on_load = {
            let log = Rc::clone(&log);
            Box::new(move |direction| log.borrow_mut().push(Hook::Load { key, direction }))
                as Box<dyn FnMut(Option<NavDirection>)>
        };
        let on_unload = {
            let log = Rc::clone(&log);
            Box::new(move |direction| log.borrow_mut().push(Hook::Unload { key, direction }))
                as Box<dyn FnMut(Option<NavDirection>)>
        };
        let on_update = {
            let log = Rc::clone(&log);
            Box::new(move |context: Option<&VisibilityUpdate>| {
                log.borrow_mut().push(Hook::Tick {
                    key,
                    viewport: context.is_some(),
                });
            }) as Box<dyn FnMut(Option<&VisibilityUpdate>)>
        };
        let on_deeplink = {
            let log = Rc::clone(&log);
            Some(
                Box::new(move |_vars: &serde_json::Value| {
                    log.borrow_mut().push(Hook::Deeplink { key });
                }) as Box<dyn FnMut(&serde_json::Value)>,
            )
        };

        manager.add(SectionConfig {
            element: Element {
                top,
                height,
                hidden,
            },
            on_load,
            on_unload,
            on_update,
            on_deeplink,
        });
    }

    (manager, log, hidden_flags)
}

fn take(log: &Log) -> Vec<Hook> {
    log.borrow_mut().drain(..).collect()
}

fn current_key(manager: &SectionManager<Element, Host>) -> usize {
    manager.current().expect("manager has sections").key()
}

/// Three sections stacked to fill rows 0..300; only the first is in the
/// 0..100 window.
fn stacked() -> (SectionManager<Element, Host>, Log, Vec<Rc<Cell<bool>>>) {
    build(true, &[(0.0, 100.0), (100.0, 100.0), (200.0, 100.0)])
}

#[test]
fn test_links_form_a_chain() {
    let (manager, _, _) = build(true, &[(0.0, 10.0), (10.0, 10.0), (20.0, 10.0), (30.0, 10.0)]);
    let sections = manager.sections();

    for (i, section) in sections.iter().enumerate() {
        assert_eq!(section.key(), i);
    }
    for i in 0..sections.len() - 1 {
        assert_eq!(sections[i].next(), Some(i + 1));
        assert_eq!(sections[i + 1].prev(), Some(i));
    }
    assert_eq!(sections[0].prev(), None);
    assert_eq!(sections[sections.len() - 1].next(), None);
}

#[test]
fn test_first_add_sets_current_without_loading() {
    let (manager, log, _) = build(true, &[(0.0, 10.0)]);
    assert_eq!(current_key(&manager), 0);
    assert!(!manager.sections()[0].is_visible());
    assert!(take(&log).is_empty());
}

#[test]
fn test_unload_is_idempotent() {
    let (mut manager, log, _) = build(true, &[(0.0, 10.0)]);
    manager.sections[0].load(None);
    take(&log);

    assert!(manager.sections[0].unload(None));
    assert!(!manager.sections[0].unload(None));
    assert_eq!(
        take(&log),
        vec![Hook::Unload {
            key: 0,
            direction: None
        }]
    );
}

#[test]
fn test_move_to_reports_forward_direction() {
    let (mut manager, log, _) = stacked();
    manager.move_to(2, MoveOptions::default()).unwrap();

    assert_eq!(current_key(&manager), 2);
    // Section 0 was never loaded, so only the load fires.
    assert_eq!(
        take(&log),
        vec![Hook::Load {
            key: 2,
            direction: Some(NavDirection::Forward)
        }]
    );
}

#[test]
fn test_move_to_unloads_the_section_it_leaves() {
    let (mut manager, log, _) = stacked();
    manager.move_to(1, MoveOptions::default()).unwrap();
    take(&log);

    manager.move_to(0, MoveOptions::default()).unwrap();
    assert_eq!(
        take(&log),
        vec![
            Hook::Unload {
                key: 1,
                direction: Some(NavDirection::Backward)
            },
            Hook::Load {
                key: 0,
                direction: Some(NavDirection::Backward)
            },
        ]
    );
}

#[test]
fn test_move_to_current_refires_load() {
    // Loading is deliberately unguarded; retargeting the current section
    // fires its load hook again.
    let (mut manager, log, _) = stacked();
    manager.move_to(0, MoveOptions::default()).unwrap();
    manager.move_to(0, MoveOptions::default()).unwrap();

    let events = take(&log);
    let loads = events
        .iter()
        .filter(|e| matches!(e, Hook::Load { key: 0, .. }))
        .count();
    assert_eq!(loads, 2);
}

#[test]
fn test_override_direction_replaces_key_comparison() {
    let (mut manager, log, _) = stacked();
    manager
        .move_to(
            2,
            MoveOptions {
                override_direction: Some(NavDirection::Backward),
                looped: false,
            },
        )
        .unwrap();

    assert_eq!(
        take(&log),
        vec![Hook::Load {
            key: 2,
            direction: Some(NavDirection::Backward)
        }]
    );
}

#[test]
fn test_looped_option_inverts_direction() {
    let (mut manager, log, _) = stacked();
    manager
        .move_to(
            1,
            MoveOptions {
                override_direction: None,
                looped: true,
            },
        )
        .unwrap();

    assert_eq!(
        take(&log),
        vec![Hook::Load {
            key: 1,
            direction: Some(NavDirection::Backward)
        }]
    );
}

#[test]
fn test_wraparound_next_preserves_forward_direction() {
    // Keys 0,1,2 starting at 0: three next() calls visit 1, 2, then wrap to
    // 0, and the wrap still reads as a forward move.
    let (mut manager, log, _) = stacked();

    manager.next(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 1);
    assert!(take(&log).contains(&Hook::Load {
        key: 1,
        direction: Some(NavDirection::Forward)
    }));

    manager.next(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 2);
    assert!(take(&log).contains(&Hook::Load {
        key: 2,
        direction: Some(NavDirection::Forward)
    }));

    manager.next(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 0);
    assert!(take(&log).contains(&Hook::Load {
        key: 0,
        direction: Some(NavDirection::Forward)
    }));
}

#[test]
fn test_wraparound_prev_preserves_backward_direction() {
    let (mut manager, log, _) = stacked();

    manager.prev(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 2);
    assert!(take(&log).contains(&Hook::Load {
        key: 2,
        direction: Some(NavDirection::Backward)
    }));

    manager.prev(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 1);
    assert!(take(&log).contains(&Hook::Load {
        key: 1,
        direction: Some(NavDirection::Backward)
    }));
}

#[test]
fn test_no_loop_boundary_is_a_noop() {
    let (mut manager, log, _) = build(false, &[(0.0, 10.0), (10.0, 10.0)]);

    manager.prev(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 0);
    assert!(take(&log).is_empty());

    manager.next(MoveOptions::default()).unwrap();
    manager.next(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 1);
}

#[test]
fn test_next_neighbor_branch_drops_caller_options() {
    // With looping on, the in-bounds branch does not forward caller
    // options; an override only takes effect on the wrap branch.
    let override_back = MoveOptions {
        override_direction: Some(NavDirection::Backward),
        looped: false,
    };

    let (mut manager, log, _) = stacked();
    manager.next(override_back).unwrap();
    assert!(take(&log).contains(&Hook::Load {
        key: 1,
        direction: Some(NavDirection::Forward)
    }));

    // Without looping the same options are forwarded.
    let (mut manager, log, _) = build(false, &[(0.0, 10.0), (10.0, 10.0)]);
    manager.next(override_back).unwrap();
    assert!(take(&log).contains(&Hook::Load {
        key: 1,
        direction: Some(NavDirection::Backward)
    }));
}

#[test]
fn test_jump_to_keeps_previous_section_loaded() {
    let (mut manager, log, _) = stacked();
    manager.move_to(1, MoveOptions::default()).unwrap();
    take(&log);

    // Override and looped are not honored by jump_to; the key comparison
    // wins and no unload fires.
    manager
        .jump_to(
            0,
            MoveOptions {
                override_direction: Some(NavDirection::Forward),
                looped: true,
            },
        )
        .unwrap();

    assert_eq!(current_key(&manager), 0);
    assert!(manager.sections()[1].is_visible());
    assert_eq!(
        take(&log),
        vec![Hook::Load {
            key: 0,
            direction: Some(NavDirection::Backward)
        }]
    );
}

#[test]
fn test_out_of_range_targets_fail() {
    let (mut manager, _, _) = build(true, &[(0.0, 10.0)]);
    assert!(matches!(
        manager.move_to(5, MoveOptions::default()),
        Err(Error::IndexOutOfRange { index: 5, len: 1 })
    ));
    assert!(matches!(
        manager.jump_to(5, MoveOptions::default()),
        Err(Error::IndexOutOfRange { index: 5, len: 1 })
    ));
    assert!(matches!(
        manager.deeplink(5, &json!({})),
        Err(Error::IndexOutOfRange { index: 5, len: 1 })
    ));
}

#[test]
fn test_navigation_before_any_add_fails() {
    let tracker = ViewportTracker::new(0.0, 100.0);
    let mut manager: SectionManager<Element, Host> = SectionManager::new(Host, tracker, true);
    assert!(matches!(
        manager.move_to(0, MoveOptions::default()),
        Err(Error::NoSections)
    ));
    assert!(matches!(
        manager.next(MoveOptions::default()),
        Err(Error::NoSections)
    ));
    assert!(manager.current().is_none());
}

#[test]
fn test_viewport_update_loads_visible_sections() {
    let (mut manager, log, _) = stacked();
    manager.update(true).unwrap();

    // Only section 0 occupies the 0..100 window; its load fires before its
    // positional update.
    assert_eq!(
        take(&log),
        vec![
            Hook::Load {
                key: 0,
                direction: None
            },
            Hook::Tick {
                key: 0,
                viewport: true
            },
        ]
    );
    assert!(manager.sections()[0].is_visible());
    assert!(!manager.sections()[1].is_visible());
}

#[test]
fn test_viewport_update_unloads_departed_sections() {
    let (mut manager, log, _) = stacked();
    manager.update(true).unwrap();
    take(&log);

    manager.notify_scroll(200.0);
    manager.update(true).unwrap();

    let events = take(&log);
    assert!(events.contains(&Hook::Unload {
        key: 0,
        direction: None
    }));
    assert!(events.contains(&Hook::Load {
        key: 2,
        direction: None
    }));
    assert!(!manager.sections()[0].is_visible());
    assert!(manager.sections()[2].is_visible());
}

#[test]
fn test_repeated_updates_do_not_refire_load() {
    let (mut manager, log, _) = stacked();
    manager.update(true).unwrap();
    take(&log);

    manager.update(true).unwrap();
    // Already-loaded section just gets its positional update.
    assert_eq!(
        take(&log),
        vec![Hook::Tick {
            key: 0,
            viewport: true
        }]
    );
}

#[test]
fn test_hidden_elements_are_skipped_entirely() {
    let (mut manager, log, hidden) = stacked();
    manager.update(true).unwrap();
    take(&log);
    assert!(manager.sections()[0].is_visible());

    // Hide the loaded section and scroll it out: skipped, so it stays
    // loaded and no unload fires.
    hidden[0].set(true);
    manager.notify_scroll(200.0);
    manager.update(true).unwrap();

    let events = take(&log);
    assert!(!events.contains(&Hook::Unload {
        key: 0,
        direction: None
    }));
    assert!(manager.sections()[0].is_visible());
}

#[test]
fn test_tick_mode_updates_every_section() {
    let (mut manager, log, _) = stacked();
    manager.update(false).unwrap();

    // No visibility context, no loads, every section ticked in order.
    assert_eq!(
        take(&log),
        vec![
            Hook::Tick {
                key: 0,
                viewport: false
            },
            Hook::Tick {
                key: 1,
                viewport: false
            },
            Hook::Tick {
                key: 2,
                viewport: false
            },
        ]
    );
    assert!(manager.sections().iter().all(|s| !s.is_visible()));
}

#[test]
fn test_pause_gates_updates_but_not_navigation() {
    let (mut manager, log, _) = stacked();
    manager.pause();

    manager.update(true).unwrap();
    manager.update(false).unwrap();
    assert!(take(&log).is_empty());
    assert!(manager.sections().iter().all(|s| !s.is_visible()));

    // Navigation still works while paused.
    manager.next(MoveOptions::default()).unwrap();
    assert_eq!(current_key(&manager), 1);
    assert!(!take(&log).is_empty());

    manager.unpause();
    manager.update(true).unwrap();
    assert!(!take(&log).is_empty());
}

#[test]
fn test_update_propagates_bad_geometry() {
    let (mut manager, _, _) = build(true, &[(f64::NAN, 50.0)]);
    assert!(matches!(
        manager.update(true),
        Err(Error::UnclassifiedGeometry { .. })
    ));
}

#[test]
fn test_deeplink_is_a_pure_pass_through() {
    let (mut manager, log, _) = stacked();
    manager.deeplink(1, &json!({ "anchor": "intro" })).unwrap();

    // Fires the hook without loading anything or moving current.
    assert_eq!(take(&log), vec![Hook::Deeplink { key: 1 }]);
    assert_eq!(current_key(&manager), 0);
    assert!(!manager.sections()[1].is_visible());
}

#[test]
fn test_navigation_never_fires_deeplink() {
    let (mut manager, log, _) = stacked();
    manager.next(MoveOptions::default()).unwrap();
    manager.prev(MoveOptions::default()).unwrap();
    manager.move_to(2, MoveOptions::default()).unwrap();
    manager.jump_to(0, MoveOptions::default()).unwrap();

    assert!(!take(&log)
        .iter()
        .any(|e| matches!(e, Hook::Deeplink { .. })));
}

#[test]
fn test_spanning_section_receives_scroll_position() {
    // A 400-row section against the 0..100 window: the update hook sees the
    // fraction pinned at 1 and a position tracking scroll progress.
    let context: Rc<RefCell<Option<VisibilityUpdate>>> = Rc::default();
    let tracker = ViewportTracker::new(0.0, 100.0);
    let mut manager = SectionManager::new(Host, tracker, true);

    let recorded = Rc::clone(&context);
    manager.add(SectionConfig {
        element: Element {
            top: 0.0,
            height: 400.0,
            hidden: Rc::new(Cell::new(false)),
        },
        on_load: Box::new(|_| {}),
        on_unload: Box::new(|_| {}),
        on_update: Box::new(move |ctx: Option<&VisibilityUpdate>| {
            *recorded.borrow_mut() = ctx.copied();
        }),
        on_deeplink: None,
    });

    manager.update(true).unwrap();
    let first = context.borrow().expect("update fired");
    assert!((first.fraction - 1.0).abs() < 1e-9);
    assert!((first.position - 0.25).abs() < 1e-9);

    manager.notify_scroll(100.0);
    manager.update(true).unwrap();
    let second = context.borrow().expect("update fired");
    assert!((second.position - 0.5).abs() < 1e-9);
}

#[test]
fn test_partial_sections_get_zero_position() {
    // Sections that carry no position in their classification see the
    // documented 0.0 default.
    let context: Rc<RefCell<Option<VisibilityUpdate>>> = Rc::default();
    let tracker = ViewportTracker::new(0.0, 100.0);
    let mut manager = SectionManager::new(Host, tracker, true);

    let recorded = Rc::clone(&context);
    manager.add(SectionConfig {
        element: Element {
            top: 80.0,
            height: 40.0,
            hidden: Rc::new(Cell::new(false)),
        },
        on_load: Box::new(|_| {}),
        on_unload: Box::new(|_| {}),
        on_update: Box::new(move |ctx: Option<&VisibilityUpdate>| {
            *recorded.borrow_mut() = ctx.copied();
        }),
        on_deeplink: None,
    });

    manager.update(true).unwrap();
    let update = context.borrow().expect("update fired");
    assert!((update.position - 0.0).abs() < 1e-9);
    assert!((update.fraction - 0.5).abs() < 1e-9);
}
