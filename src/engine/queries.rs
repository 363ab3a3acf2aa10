use crate::model::*;
use crate::observability::LAYOUT_DURATION_SECONDS;
use crate::store::Store;

use super::geometry::{Rect, RenderFrame, preview_rect, render_block};
use super::layout::{DayLayout, WeekLayout, layout_day, layout_week};
use super::{DragState, Surface, Timetable};

impl<S: Store> Timetable<S> {
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn block(&self, id: BlockId) -> Option<&ScheduleBlock> {
        self.schedule.get(&id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// One day's blocks in `(start, id)` order.
    pub fn blocks_on(&self, day: Day) -> Vec<&ScheduleBlock> {
        let mut blocks: Vec<&ScheduleBlock> =
            self.schedule.values().filter(|b| b.day == day).collect();
        blocks.sort_by_key(|b| (b.start, b.id));
        blocks
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn day_layout(&self, day: Day) -> DayLayout {
        layout_day(self.blocks_on(day))
    }

    /// Full recompute of every day's lanes.
    pub fn layout(&self) -> WeekLayout {
        let started = std::time::Instant::now();
        let week = layout_week(&self.schedule);
        metrics::histogram!(LAYOUT_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        week
    }

    /// Rectangle for the drag in progress, if any.
    pub fn preview(&self) -> Option<Rect> {
        self.drag
            .interval()
            .map(|interval| preview_rect(&self.grid, &interval))
    }

    pub fn render(&self) -> RenderFrame {
        let week = self.layout();
        let mut blocks = Vec::with_capacity(self.schedule.len());
        for (_, day) in week.iter() {
            for placement in &day.placements {
                let Some(block) = self.schedule.get(&placement.block_id) else {
                    continue;
                };
                let color = block
                    .category_id
                    .and_then(|cid| self.category(cid))
                    .map(|c| c.color);
                blocks.push(render_block(&self.grid, block, placement, color));
            }
        }
        RenderFrame {
            blocks,
            preview: self.preview(),
            show_category_hint: self.categories.is_empty(),
        }
    }
}
