use serde::Serialize;

use crate::model::*;

use super::layout::Placement;

/// Share of the surface width taken by one day, in percent.
pub const DAY_WIDTH: f64 = 100.0 / 7.0;

/// Absolutely positioned rectangle. All four fields are percentages of the
/// grid surface, so blocks and the drag preview line up exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
}

/// Map a slot span on a day to a rectangle, splitting the day into
/// `total_cols` lanes and taking lane `col`.
pub fn span_rect(grid: &GridConfig, day: Day, span: SlotSpan, col: u32, total_cols: u32) -> Rect {
    let total_slots = grid.total_slots() as f64;
    let lanes = total_cols.max(1) as f64;
    let width = DAY_WIDTH / lanes;
    Rect {
        top: span.start as f64 / total_slots * 100.0,
        height: span.len() as f64 / total_slots * 100.0,
        left: day.index() as f64 * DAY_WIDTH + col as f64 * width,
        width,
    }
}

pub fn block_rect(grid: &GridConfig, block: &ScheduleBlock, placement: &Placement) -> Rect {
    span_rect(grid, block.day, block.span(), placement.col, placement.total_cols)
}

/// The drag preview always spans the full day width.
pub fn preview_rect(grid: &GridConfig, interval: &DayInterval) -> Rect {
    span_rect(grid, interval.day, interval.span, 0, 1)
}

// ── Render frame ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRect {
    pub id: BlockId,
    #[serde(flatten)]
    pub rect: Rect,
    pub background_color: String,
    pub title: String,
    pub time_label: String,
}

/// Everything a rendering surface needs for one paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub blocks: Vec<RenderRect>,
    pub preview: Option<Rect>,
    /// Set when no categories exist yet.
    pub show_category_hint: bool,
}

pub fn render_block(
    grid: &GridConfig,
    block: &ScheduleBlock,
    placement: &Placement,
    color: Option<Color>,
) -> RenderRect {
    RenderRect {
        id: block.id,
        rect: block_rect(grid, block, placement),
        background_color: color.map_or(DEFAULT_BLOCK_COLOR, Color::hex).to_string(),
        title: block.title.clone(),
        time_label: grid.span_label(&block.span()),
    }
}
