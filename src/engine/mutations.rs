use tracing::{debug, info};

use crate::model::*;
use crate::observability::*;
use crate::store::Store;

use super::{Confirm, EngineError, Outcome, PointerEvent, Timetable};

impl<S: Store> Timetable<S> {
    /// Feed one pointer event to the drag gesture. When a drag completes
    /// over a non-degenerate interval, returns an unsaved draft block for
    /// the edit form; pass it to `save_block` to keep it.
    pub fn pointer(&mut self, event: PointerEvent) -> Option<ScheduleBlock> {
        let was_dragging = self.drag.is_dragging();
        let (next, finished) = self.drag.step(event, &self.grid, &self.surface);
        self.drag = next;

        match finished {
            Some(interval) => {
                metrics::counter!(GESTURES_TOTAL, "outcome" => "committed").increment(1);
                let id = BlockId(self.ids.next());
                let category = self.categories.front().map(|c| c.id);
                debug!(%id, day = %interval.day, start = interval.span.start, end = interval.span.end, "drag produced draft");
                Some(ScheduleBlock::draft(id, interval, category))
            }
            None => {
                if was_dragging && !next.is_dragging() {
                    metrics::counter!(GESTURES_TOTAL, "outcome" => "discarded").increment(1);
                    debug!("drag discarded: no slots covered");
                }
                None
            }
        }
    }

    /// Insert or replace a block by id.
    pub fn save_block(&mut self, block: ScheduleBlock) -> Result<(), EngineError> {
        self.check_span(block.start, block.end)?;
        if let Some(cid) = block.category_id
            && self.category(cid).is_none()
        {
            return Err(EngineError::UnknownCategory(cid));
        }
        if self.schedule.get(&block.id) == Some(&block) {
            return Ok(());
        }

        let id = block.id;
        self.ids.observe(id.0);
        self.schedule = self.schedule.update(id, block);
        self.persist_schedule();
        metrics::counter!(BLOCKS_SAVED_TOTAL).increment(1);
        info!(%id, "block saved");
        Ok(())
    }

    pub fn delete_block(
        &mut self,
        id: BlockId,
        confirm: &mut impl Confirm,
    ) -> Result<Outcome, EngineError> {
        let block = self.schedule.get(&id).ok_or(EngineError::BlockNotFound(id))?;
        let prompt = format!(
            "Delete \"{}\" ({} {})?",
            block.title,
            block.day,
            self.grid.span_label(&block.span())
        );
        if !confirm.confirm(&prompt) {
            debug!(%id, "block delete declined");
            return Ok(Outcome::Cancelled);
        }

        self.schedule = self.schedule.without(&id);
        self.persist_schedule();
        metrics::counter!(BLOCKS_DELETED_TOTAL).increment(1);
        info!(%id, "block deleted");
        Ok(Outcome::Applied)
    }

    /// Register a new category (`draft.id == None`) or update one in place.
    pub fn save_category(&mut self, draft: CategoryDraft) -> Result<CategoryId, EngineError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidName);
        }

        let id = match draft.id {
            None => {
                let id = CategoryId(self.ids.next());
                self.categories.push_back(Category {
                    id,
                    name: name.to_string(),
                    color: draft.color,
                });
                id
            }
            Some(id) => {
                let index = self
                    .categories
                    .iter()
                    .position(|c| c.id == id)
                    .ok_or(EngineError::CategoryNotFound(id))?;
                let updated = Category {
                    id,
                    name: name.to_string(),
                    color: draft.color,
                };
                if self.categories[index] == updated {
                    return Ok(id);
                }
                self.categories = self.categories.update(index, updated);
                id
            }
        };

        self.persist_categories();
        metrics::counter!(CATEGORIES_SAVED_TOTAL).increment(1);
        info!(%id, "category saved");
        Ok(id)
    }

    /// Remove a category. Blocks that used it move to the first remaining
    /// category (or none) and are written before the category disappears,
    /// so no reader ever sees a block pointing at a missing category.
    pub fn delete_category(
        &mut self,
        id: CategoryId,
        confirm: &mut impl Confirm,
    ) -> Result<Outcome, EngineError> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(EngineError::CategoryNotFound(id))?;
        let in_use = self
            .schedule
            .values()
            .filter(|b| b.category_id == Some(id))
            .count();
        let prompt = format!(
            "Delete category \"{}\"? {in_use} block(s) will be reassigned.",
            self.categories[index].name
        );
        if !confirm.confirm(&prompt) {
            debug!(%id, "category delete declined");
            return Ok(Outcome::Cancelled);
        }

        let fallback = self.categories.iter().find(|c| c.id != id).map(|c| c.id);
        if in_use > 0 {
            self.schedule = reassign_category(&self.schedule, id, fallback);
            self.persist_schedule();
        }

        let mut categories = self.categories.clone();
        categories.remove(index);
        self.categories = categories;
        self.persist_categories();

        metrics::counter!(CATEGORIES_DELETED_TOTAL).increment(1);
        info!(%id, reassigned = in_use, "category deleted");
        Ok(Outcome::Applied)
    }
}

/// Point every block tagged `from` at `to`.
fn reassign_category(schedule: &Schedule, from: CategoryId, to: Option<CategoryId>) -> Schedule {
    schedule
        .values()
        .filter(|b| b.category_id == Some(from))
        .fold(schedule.clone(), |acc, b| {
            acc.update(
                b.id,
                ScheduleBlock {
                    category_id: to,
                    ..b.clone()
                },
            )
        })
}
