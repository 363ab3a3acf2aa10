mod error;
pub mod geometry;
pub mod gesture;
pub mod layout;
mod mutations;
mod queries;

pub use error::EngineError;
pub use geometry::{Rect, RenderFrame, RenderRect};
pub use gesture::{Cell, DragState, PointerEvent, Surface};
pub use layout::{DayLayout, Placement, WeekLayout, layout_day, layout_week};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::model::*;
use crate::observability::STORE_ERRORS_TOTAL;
use crate::store::{CATEGORIES_KEY, SCHEDULE_KEY, Store};

// ── Confirmation gate ────────────────────────────────────

/// Yes/no gate in front of every destructive operation.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a gated operation. A declined prompt is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Cancelled,
}

// ── Id allocation ────────────────────────────────────────

pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Creation-timestamp ids, forced strictly increasing so two allocations in
/// the same millisecond (or a clock step backwards) never collide.
#[derive(Debug, Default)]
struct IdClock {
    last: i64,
}

impl IdClock {
    fn next(&mut self) -> i64 {
        let id = now_ms().max(self.last + 1);
        self.last = id;
        id
    }

    fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }
}

// ── Engine ───────────────────────────────────────────────

/// The weekly timetable: blocks, categories, and the drag gesture in
/// progress. Every mutation that changes a collection writes it through to
/// the store.
pub struct Timetable<S: Store> {
    grid: GridConfig,
    surface: Surface,
    store: S,
    schedule: Schedule,
    categories: Categories,
    drag: DragState,
    ids: IdClock,
}

impl<S: Store> Timetable<S> {
    /// Load both collections from `store`. Missing or malformed values
    /// start empty and category entries that fail to decode are dropped.
    /// Blocks that do not fit `grid` are dropped and dangling category
    /// references are repaired, with the repair written back. When the
    /// category registry is unreadable as a whole, block references are
    /// left untouched so the stored assignments survive.
    pub fn open(store: S, grid: GridConfig, surface: Surface) -> Self {
        let raw_schedule: Schedule = match load_value(&store, SCHEDULE_KEY) {
            Loaded::Value(schedule) => schedule,
            Loaded::Absent | Loaded::Unreadable => Schedule::new(),
        };
        let loaded = load_categories(&store);
        let registry_readable = loaded.is_some();
        let (raw_categories, dropped) = loaded.unwrap_or_default();

        let mut engine = Self {
            grid,
            surface,
            store,
            schedule: Schedule::new(),
            categories: Categories::new(),
            drag: DragState::Idle,
            ids: IdClock::default(),
        };

        let categories = engine.sanitize_categories(&raw_categories);
        let categories_changed = dropped > 0 || categories != raw_categories;
        engine.categories = categories;

        if !registry_readable {
            warn!("category registry unreadable, keeping block category references as stored");
        }
        let schedule = engine.sanitize_schedule(&raw_schedule, registry_readable);
        let schedule_changed = schedule != raw_schedule;
        engine.schedule = schedule;

        for block in engine.schedule.values() {
            engine.ids.observe(block.id.0);
        }
        for category in engine.categories.iter() {
            engine.ids.observe(category.id.0);
        }

        if schedule_changed {
            engine.persist_schedule();
        }
        if categories_changed {
            engine.persist_categories();
        }

        info!(
            blocks = engine.schedule.len(),
            categories = engine.categories.len(),
            "timetable opened"
        );
        engine
    }

    /// Drop duplicate category ids, keeping the first.
    fn sanitize_categories(&self, raw: &Categories) -> Categories {
        let mut seen = std::collections::HashSet::new();
        let mut out = Categories::new();
        for category in raw.iter() {
            if seen.insert(category.id) {
                out.push_back(category.clone());
            } else {
                warn!(id = %category.id, "dropping duplicate category");
            }
        }
        out
    }

    /// Re-key blocks by their own id, drop blocks whose span does not fit
    /// the grid, and, with `repair_refs`, point dangling category
    /// references at the fallback.
    fn sanitize_schedule(&self, raw: &Schedule, repair_refs: bool) -> Schedule {
        let fallback = self.categories.front().map(|c| c.id);
        let mut out = Schedule::new();
        for block in raw.values() {
            if self.check_span(block.start, block.end).is_err() {
                warn!(id = %block.id, start = block.start, end = block.end, "dropping block outside grid");
                continue;
            }
            let mut block = block.clone();
            if repair_refs
                && let Some(cid) = block.category_id
                && self.category(cid).is_none()
            {
                warn!(id = %block.id, category = %cid, "repairing dangling category reference");
                block.category_id = fallback;
            }
            out.insert(block.id, block);
        }
        out
    }

    pub(super) fn check_span(&self, start: Slot, end: Slot) -> Result<(), EngineError> {
        let total_slots = self.grid.total_slots();
        if start < end && end <= total_slots {
            Ok(())
        } else {
            Err(EngineError::InvalidSpan { start, end, total_slots })
        }
    }

    // ── Persistence ──────────────────────────────────────

    pub(super) fn persist_schedule(&self) {
        write_through(&self.store, SCHEDULE_KEY, &self.schedule);
    }

    pub(super) fn persist_categories(&self) {
        write_through(&self.store, CATEGORIES_KEY, &self.categories);
    }

    /// Hand back the store, e.g. to reopen over it.
    pub fn into_store(self) -> S {
        self.store
    }
}

enum Loaded<T> {
    Absent,
    Value(T),
    /// Load failed or the stored value did not decode.
    Unreadable,
}

fn load_value<S: Store, T: DeserializeOwned>(store: &S, key: &str) -> Loaded<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::Absent,
        Err(e) => {
            warn!(key, "store load failed, starting empty: {e}");
            metrics::counter!(STORE_ERRORS_TOTAL, "op" => "load").increment(1);
            return Loaded::Unreadable;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Loaded::Value(value),
        Err(e) => {
            warn!(key, "malformed stored value, starting empty: {e}");
            metrics::counter!(STORE_ERRORS_TOTAL, "op" => "decode").increment(1);
            Loaded::Unreadable
        }
    }
}

/// Decode the registry entry by entry; a bad entry costs only itself.
/// Returns the surviving categories and how many were dropped, or `None`
/// when the stored value is unreadable as a whole.
fn load_categories<S: Store>(store: &S) -> Option<(Categories, usize)> {
    let entries: Vec<serde_json::Value> = match load_value(store, CATEGORIES_KEY) {
        Loaded::Value(entries) => entries,
        Loaded::Absent => return Some((Categories::new(), 0)),
        Loaded::Unreadable => return None,
    };
    let mut categories = Categories::new();
    let mut dropped = 0;
    for entry in entries {
        match serde_json::from_value::<Category>(entry) {
            Ok(category) => categories.push_back(category),
            Err(e) => {
                warn!("dropping malformed category entry: {e}");
                metrics::counter!(STORE_ERRORS_TOTAL, "op" => "decode").increment(1);
                dropped += 1;
            }
        }
    }
    Some((categories, dropped))
}

fn write_through<S: Store, T: Serialize>(store: &S, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(key, "failed to encode value: {e}");
            metrics::counter!(STORE_ERRORS_TOTAL, "op" => "encode").increment(1);
            return;
        }
    };
    if let Err(e) = store.store(key, &json) {
        // In-memory state stays authoritative; the next write retries.
        warn!(key, "store write failed: {e}");
        metrics::counter!(STORE_ERRORS_TOTAL, "op" => "store").increment(1);
    }
}
