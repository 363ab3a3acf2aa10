use crate::model::*;

/// One grid cell: a day column and a slot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub day: Day,
    pub slot: Slot,
}

/// Pixel size of one cell on the drawing surface. The surface origin is
/// the top-left corner of the Monday column at the grid's first slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Surface {
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        Self { cell_width, cell_height }
    }

    /// Resolve pixel coordinates to a cell, or `None` when off the grid.
    pub fn resolve(&self, grid: &GridConfig, x: f64, y: f64) -> Option<Cell> {
        if !(self.cell_width > 0.0 && self.cell_height > 0.0) {
            return None;
        }
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let day = Day::from_index((x / self.cell_width).floor() as usize)?;
        let slot = (y / self.cell_height).floor();
        if slot >= grid.total_slots() as f64 {
            return None;
        }
        Some(Cell { day, slot: slot as Slot })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    /// Pointer left the grid surface; finishes the drag like `Up`.
    Leave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// The day is locked to `start.day` for the whole drag.
    Dragging { start: Cell, current: Cell },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Slots currently covered by the drag, inclusive of both end cells.
    pub fn interval(&self) -> Option<DayInterval> {
        match *self {
            DragState::Idle => None,
            DragState::Dragging { start, current } => {
                let lo = start.slot.min(current.slot);
                let hi = start.slot.max(current.slot);
                Some(DayInterval { day: start.day, span: SlotSpan::new(lo, hi + 1) })
            }
        }
    }

    /// Advance the gesture by one pointer event.
    ///
    /// Returns the next state and, when a drag finishes over more than one
    /// slot, the interval it covered (end-exclusive). A drag that never left
    /// its first slot yields nothing.
    pub fn step(
        self,
        event: PointerEvent,
        grid: &GridConfig,
        surface: &Surface,
    ) -> (DragState, Option<DayInterval>) {
        match (self, event) {
            (DragState::Idle, PointerEvent::Down { x, y }) => match surface.resolve(grid, x, y) {
                Some(cell) => (DragState::Dragging { start: cell, current: cell }, None),
                None => (DragState::Idle, None),
            },
            (DragState::Idle, _) => (DragState::Idle, None),

            (DragState::Dragging { start, current }, PointerEvent::Move { x, y }) => {
                let current = match surface.resolve(grid, x, y) {
                    Some(cell) if cell.day == start.day => cell,
                    _ => current,
                };
                (DragState::Dragging { start, current }, None)
            }
            // A second press mid-drag is ignored; the first drag still owns the pointer.
            (dragging @ DragState::Dragging { .. }, PointerEvent::Down { .. }) => (dragging, None),

            (DragState::Dragging { start, current }, PointerEvent::Up | PointerEvent::Leave) => {
                if start.slot == current.slot {
                    return (DragState::Idle, None);
                }
                (DragState::Idle, self.interval())
            }
        }
    }
}
