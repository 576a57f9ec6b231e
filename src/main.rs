//! sector: interactive demo host for viewport-driven section coordination.
//!
//! Renders a strip of colored sections on the terminal, treats terminal rows
//! as document space, and wires keyboard scrolling into the tracker's
//! scroll/resize notifications. On clean exit it prints a JSON report of
//! section activity.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use ratatui::crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use sector::section::NavDirection;
use sector::{
    Config, ElementBox, ElementHost, MoveOptions, SectionConfig, SectionManager, ViewportHost,
    ViewportTracker,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

/// Rows reserved for the status bar at the bottom of the screen.
const STATUS_ROWS: u16 = 3;

#[derive(Parser)]
#[command(name = "sector")]
#[command(about = "Viewport-driven section lifecycle demo", long_about = None)]
struct Args {
    /// Load a section layout from a JSON manifest
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Number of sections in the built-in layout
    #[arg(long, default_value_t = 6)]
    count: usize,

    /// Disable next/prev wraparound regardless of sector.toml
    #[arg(long)]
    no_loop: bool,
}

#[derive(Deserialize)]
/// One entry in a `--layout` manifest.
struct SectionSpec {
    label: String,
    rows: u16,
}

#[derive(Serialize)]
struct SectionReport {
    key: usize,
    label: String,
    loaded: bool,
    loads: u32,
    unloads: u32,
    ticks: u32,
    deeplinks: u32,
}

#[derive(Serialize)]
struct SessionReport {
    sections: Vec<SectionReport>,
}

/// Element handle for the demo: a fixed slot in row-space.
struct DemoElement {
    top: f64,
    height: f64,
}

/// Geometry provider over [`DemoElement`]. Nothing is ever hidden here;
/// the hidden path is covered by the library tests.
struct DemoHost;

impl ElementHost<DemoElement> for DemoHost {
    fn bounding_box(&self, element: &DemoElement) -> ElementBox {
        ElementBox {
            top: element.top,
            height: element.height,
        }
    }

    fn is_hidden(&self, _element: &DemoElement) -> bool {
        false
    }
}

/// Ambient viewport at startup, before any scrolling has happened.
struct InitialViewport {
    height: f64,
}

impl ViewportHost for InitialViewport {
    fn viewport_height(&self) -> f64 {
        self.height
    }

    fn scroll_offset(&self) -> f64 {
        0.0
    }
}

#[derive(Default)]
/// Mutable per-section state shared between the hooks and the renderer.
struct SectionStatus {
    label: String,
    loaded: bool,
    loads: u32,
    unloads: u32,
    ticks: u32,
    deeplinks: u32,
    fraction: f64,
    edge: i8,
    position: f64,
    last_direction: Option<i8>,
}

struct DemoApp {
    manager: SectionManager<DemoElement, DemoHost>,
    statuses: Vec<Rc<RefCell<SectionStatus>>>,
    scroll: f64,
    doc_height: f64,
    view_height: f64,
    scroll_step: f64,
    message: Option<String>,
}

impl DemoApp {
    fn new(specs: Vec<SectionSpec>, loop_navigation: bool, view_height: f64) -> Self {
        let tracker = ViewportTracker::from_host(&InitialViewport {
            height: view_height,
        });
        let mut manager = SectionManager::new(DemoHost, tracker, loop_navigation);
        let mut statuses = Vec::new();
        let mut top = 0.0;

        for spec in specs {
            let height = f64::from(spec.rows);
            let status = Rc::new(RefCell::new(SectionStatus {
                label: spec.label,
                ..SectionStatus::default()
            }));

            let on_load = {
                let status = Rc::clone(&status);
                Box::new(move |direction: Option<NavDirection>| {
                    let mut s = status.borrow_mut();
                    s.loaded = true;
                    s.loads += 1;
                    s.last_direction = direction.map(NavDirection::as_i8);
                }) as Box<dyn FnMut(Option<NavDirection>)>
            };
            let on_unload = {
                let status = Rc::clone(&status);
                Box::new(move |direction: Option<NavDirection>| {
                    let mut s = status.borrow_mut();
                    s.loaded = false;
                    s.unloads += 1;
                    s.last_direction = direction.map(NavDirection::as_i8);
                }) as Box<dyn FnMut(Option<NavDirection>)>
            };
            let on_update = {
                let status = Rc::clone(&status);
                Box::new(
                    move |context: Option<&sector::VisibilityUpdate>| match context {
                        Some(context) => {
                            let mut s = status.borrow_mut();
                            s.fraction = context.fraction;
                            s.edge = context.edge.as_i8();
                            s.position = context.position;
                        }
                        None => status.borrow_mut().ticks += 1,
                    },
                ) as Box<dyn FnMut(Option<&sector::VisibilityUpdate>)>
            };
            let on_deeplink = {
                let status = Rc::clone(&status);
                Some(Box::new(move |_vars: &serde_json::Value| {
                    status.borrow_mut().deeplinks += 1;
                }) as Box<dyn FnMut(&serde_json::Value)>)
            };

            manager.add(SectionConfig {
                element: DemoElement { top, height },
                on_load,
                on_unload,
                on_update,
                on_deeplink,
            });
            statuses.push(status);
            top += height;
        }

        Self {
            manager,
            statuses,
            scroll: 0.0,
            doc_height: top,
            view_height,
            scroll_step: 3.0,
            message: None,
        }
    }

    fn scroll_to(&mut self, top: f64) -> io::Result<()> {
        let max = (self.doc_height - self.view_height).max(0.0);
        self.scroll = top.clamp(0.0, max);
        self.manager.notify_scroll(self.scroll);
        self.manager.update(true).map_err(io::Error::other)
    }

    fn scroll_by(&mut self, delta: f64) -> io::Result<()> {
        self.scroll_to(self.scroll + delta)
    }

    /// Follow a navigation move: put the new current section at the top of
    /// the window.
    fn follow_current(&mut self) -> io::Result<()> {
        let top = self.manager.current().map(|s| s.element().top);
        if let Some(top) = top {
            self.scroll_to(top)
        } else {
            Ok(())
        }
    }

    fn resize(&mut self, rows: u16) -> io::Result<()> {
        self.view_height = f64::from(rows.saturating_sub(STATUS_ROWS));
        self.manager.notify_resize(self.view_height);
        self.scroll_to(self.scroll)
    }

    fn report(&self) -> SessionReport {
        let sections = self
            .manager
            .sections()
            .iter()
            .zip(&self.statuses)
            .map(|(section, status)| {
                let status = status.borrow();
                SectionReport {
                    key: section.key(),
                    label: status.label.clone(),
                    loaded: section.is_visible(),
                    loads: status.loads,
                    unloads: status.unloads,
                    ticks: status.ticks,
                    deeplinks: status.deeplinks,
                }
            })
            .collect();
        SessionReport { sections }
    }
}

fn builtin_layout(count: usize) -> Vec<SectionSpec> {
    // Alternate heights so some sections overflow the window and some sit
    // well inside it.
    (0..count)
        .map(|i| SectionSpec {
            label: format!("section {i}"),
            rows: if i % 2 == 0 { 14 } else { 7 },
        })
        .collect()
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut cfg = Config::load();
    if args.no_loop {
        cfg.loop_navigation = false;
    }

    let specs = match args.layout {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        }
        None => builtin_layout(args.count),
    };

    if specs.is_empty() {
        eprintln!("No sections to show");
        return Ok(());
    }

    run_tui(specs, &cfg)
}

fn run_tui(specs: Vec<SectionSpec>, cfg: &Config) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let rows = terminal.size()?.height;
    let mut app = DemoApp::new(
        specs,
        cfg.loop_navigation,
        f64::from(rows.saturating_sub(STATUS_ROWS)),
    );
    #[allow(clippy::cast_precision_loss)]
    {
        app.scroll_step = cfg.scroll_step as f64;
    }

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    } else {
        let json = serde_json::to_string_pretty(&app.report()).map_err(io::Error::other)?;
        println!("{json}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut DemoApp,
) -> io::Result<()> {
    // Seed visibility state before the first keypress.
    app.scroll_to(0.0)?;

    loop {
        terminal.draw(|f| draw(f, app))?;

        match event::read()? {
            Event::Resize(_, rows) => app.resize(rows)?,
            Event::Key(key) => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Up => app.scroll_by(-app.scroll_step)?,
                KeyCode::Down => app.scroll_by(app.scroll_step)?,
                KeyCode::PageUp => app.scroll_by(-app.view_height)?,
                KeyCode::PageDown => app.scroll_by(app.view_height)?,
                KeyCode::Char('n') => {
                    app.manager
                        .next(MoveOptions::default())
                        .map_err(io::Error::other)?;
                    app.follow_current()?;
                }
                KeyCode::Char('p') => {
                    app.manager
                        .prev(MoveOptions::default())
                        .map_err(io::Error::other)?;
                    app.follow_current()?;
                }
                KeyCode::Char('d') => {
                    if let Some(key) = app.manager.current().map(sector::Section::key) {
                        let vars = serde_json::json!({ "key": key, "scroll": app.scroll });
                        app.manager.deeplink(key, &vars).map_err(io::Error::other)?;
                        app.message = Some(format!("deeplink fired for section {key}"));
                    }
                }
                KeyCode::Char('t') => {
                    app.manager.update(false).map_err(io::Error::other)?;
                    app.message = Some("ticked all sections".to_string());
                }
                KeyCode::Char(' ') => {
                    if app.manager.is_paused() {
                        app.manager.unpause();
                        app.message = Some("unpaused".to_string());
                    } else {
                        app.manager.pause();
                        app.message = Some("paused".to_string());
                    }
                }
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let index = c
                        .to_digit(10)
                        .and_then(|d| usize::try_from(d).ok())
                        .unwrap_or(0);
                    if index >= 1 && index <= app.manager.sections().len() {
                        app.manager
                            .move_to(index - 1, MoveOptions::default())
                            .map_err(io::Error::other)?;
                        app.follow_current()?;
                    } else {
                        app.message = Some(format!("no section {index}"));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw(f: &mut Frame, app: &DemoApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(STATUS_ROWS)])
        .split(f.area());
    let area = chunks[0];
    let view_height = f64::from(area.height);

    let current_key = app.manager.current().map(sector::Section::key);

    for (section, status) in app.manager.sections().iter().zip(&app.statuses) {
        let status = status.borrow();
        let top = section.element().top - app.scroll;
        let bottom = top + section.element().height;
        if bottom <= 0.0 || top >= view_height {
            continue;
        }

        let y0 = top.max(0.0) as u16;
        let y1 = bottom.min(view_height) as u16;
        if y1 <= y0 {
            continue;
        }
        let rect = Rect {
            x: area.x,
            y: area.y + y0,
            width: area.width,
            height: y1 - y0,
        };

        let border_style = if current_key == Some(section.key()) {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if section.is_visible() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let state = if section.is_visible() {
            "loaded"
        } else {
            "unloaded"
        };
        let nav = status
            .last_direction
            .map_or_else(String::new, |d| format!("  nav {d}"));
        let detail = format!(
            "{state}  vis {:.2}  edge {}  pos {:.2}  loads {}{nav}",
            status.fraction, status.edge, status.position, status.loads
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} [{}] ", status.label, section.key()));
        let body = Paragraph::new(Line::from(detail)).block(block);
        f.render_widget(body, rect);
    }

    let paused = if app.manager.is_paused() {
        "  PAUSED"
    } else {
        ""
    };
    let window = app.manager.tracker().window();
    let help = format!(
        "scroll {:.0}..{:.0}{paused}  |  up/down/pgup/pgdn scroll  n/p navigate  1-9 move  d deeplink  t tick  space pause  q quit",
        window.top,
        window.bottom(),
    );
    let status_line = app.message.clone().unwrap_or_default();
    let bar = Paragraph::new(vec![Line::from(help), Line::from(status_line)])
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(bar, chunks[1]);
}
