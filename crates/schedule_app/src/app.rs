use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use schedule_core::{
    config::WindowConfig,
    occurrence::{CalendarEvent, Repeater, RepeaterUnit},
    render::{render_lines, WindowRow},
    Direction, OccurrenceStore, Query, WindowStatus, WindowedList,
};
use tracing::{debug, info, warn};

/// Idle steps the host runs per simulated frame.
const STEPS_PER_FRAME: usize = 64;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) events_file: Option<PathBuf>,
    pub(crate) anchor: NaiveDate,
    pub(crate) search: Option<String>,
    pub(crate) scroll_steps: usize,
    pub(crate) window: WindowConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            window: WindowConfig::from_env().context("window settings")?,
            ..Self::default()
        };
        if let Ok(path) = std::env::var("SCHEDULE_EVENTS_FILE") {
            config.events_file = Some(PathBuf::from(path));
        }
        if let Ok(anchor) = std::env::var("SCHEDULE_ANCHOR") {
            config.anchor = NaiveDate::parse_from_str(anchor.trim(), "%Y-%m-%d")
                .with_context(|| format!("SCHEDULE_ANCHOR `{anchor}` is not YYYY-MM-DD"))?;
        }
        if let Ok(search) = std::env::var("SCHEDULE_SEARCH") {
            if !search.trim().is_empty() {
                config.search = Some(search);
            }
        }
        if let Ok(steps) = std::env::var("SCHEDULE_SCROLL_STEPS") {
            if let Ok(value) = steps.trim().parse::<usize>() {
                config.scroll_steps = value;
            }
        }
        Ok(config)
    }

    /// Environment settings, or the defaults when any of them is invalid.
    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|err| {
            warn!("ignoring schedule settings: {err:#}");
            Self::default()
        })
    }

    fn query(&self) -> Query {
        self.search
            .as_deref()
            .map(Query::with_text)
            .unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            events_file: None,
            anchor: Local::now().date_naive(),
            search: None,
            scroll_steps: 3,
            window: WindowConfig::default(),
        }
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    let start = Instant::now();
    let store = load_store(&config)?;
    info!(events = store.len(), anchor = %config.anchor, "store ready");

    let mut list = WindowedList::open(&store, config.anchor, &config.query(), config.window.clone());
    let ran = list.run_until_idle(STEPS_PER_FRAME);
    debug!(steps = ran, "initial idle pass");

    for frame in 0..config.scroll_steps {
        let Some(edge) = last_row_position(&list) else {
            break;
        };
        list.drag_started(Direction::Forward);
        list.note_realized(edge);
        let ran = list.run_until_idle(STEPS_PER_FRAME);
        list.drag_stopped();
        debug!(frame, steps = ran, edge, "scrolled towards tail");
    }

    match list.status() {
        WindowStatus::Empty => println!("No events"),
        WindowStatus::Loading => println!("Loading…"),
        WindowStatus::Populated => {
            for line in render_lines(&list.rows()) {
                println!("{line}");
            }
        }
    }
    info!(
        groups = list.chain().len(),
        elapsed_ms = %start.elapsed().as_millis(),
        "schedule rendered"
    );
    Ok(())
}

fn load_store(config: &AppConfig) -> Result<OccurrenceStore> {
    match &config.events_file {
        Some(path) => OccurrenceStore::load_json(path)
            .with_context(|| format!("failed to load events from {}", path.display())),
        None => OccurrenceStore::from_events(sample_events(config.anchor))
            .context("failed to build sample events"),
    }
}

/// Position of the last materialized node, standing in for the row a real
/// view reports when it scrolls to the bottom.
fn last_row_position(list: &WindowedList) -> Option<i64> {
    list.rows().iter().rev().find_map(WindowRow::position)
}

fn sample_events(anchor: NaiveDate) -> Vec<CalendarEvent> {
    let at = |offset: i64, hour: u32| {
        (anchor + Duration::days(offset))
            .and_hms_opt(hour, 0, 0)
            .unwrap_or_default()
    };
    vec![
        CalendarEvent {
            id: 1,
            start: at(0, 9),
            end: at(0, 10),
            summary: "Standup".into(),
            location: "Room 2".into(),
            all_day: false,
            calendar_id: "work".into(),
            repeat: Some(Repeater {
                amount: 1,
                unit: RepeaterUnit::Day,
                until: None,
            }),
        },
        CalendarEvent {
            id: 2,
            start: at(-3, 0),
            end: at(-1, 0),
            summary: "Conference".into(),
            location: "Lisbon".into(),
            all_day: true,
            calendar_id: "work".into(),
            repeat: None,
        },
        CalendarEvent {
            id: 3,
            start: at(2, 19),
            end: at(2, 21),
            summary: "Choir".into(),
            location: String::new(),
            all_day: false,
            calendar_id: "personal".into(),
            repeat: Some(Repeater {
                amount: 1,
                unit: RepeaterUnit::Week,
                until: None,
            }),
        },
        CalendarEvent {
            id: 4,
            start: at(10, 12),
            end: at(10, 13),
            summary: "Rent due".into(),
            location: String::new(),
            all_day: false,
            calendar_id: "personal".into(),
            repeat: Some(Repeater {
                amount: 1,
                unit: RepeaterUnit::Month,
                until: None,
            }),
        },
    ]
}
