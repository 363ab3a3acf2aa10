use std::fmt::Write as _;
use std::io::{self, BufRead, Lines, Write};

use crate::command::{Command, HELP, parse_command};
use crate::engine::{Confirm, EngineError, Outcome, PointerEvent, Timetable};
use crate::model::*;
use crate::store::Store;

/// Drive `engine` from line commands on `input`, writing replies to `out`.
///
/// Confirmation prompts read their answer from the next input line. Parse
/// and engine errors are reported and the loop continues; only I/O errors
/// on the streams end it early.
pub fn run<S: Store, I: BufRead, W: Write>(
    engine: &mut Timetable<S>,
    input: I,
    mut out: W,
) -> io::Result<()> {
    let mut draft: Option<ScheduleBlock> = None;
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        let reply = {
            let mut prompter = Prompter { lines: &mut lines, out: &mut out };
            execute(engine, &mut draft, cmd, &mut prompter)
        };
        match reply {
            Ok(text) if text.is_empty() => {}
            Ok(text) => writeln!(out, "{text}")?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        out.flush()?;
    }
    Ok(())
}

/// Confirmation gate that asks on the console.
struct Prompter<'a, I, W> {
    lines: &'a mut Lines<I>,
    out: &'a mut W,
}

impl<I: BufRead, W: Write> Confirm for Prompter<'_, I, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.out, "{prompt} [y/N] ").and_then(|()| self.out.flush()).is_err() {
            return false;
        }
        match self.lines.next() {
            Some(Ok(answer)) => {
                let answer = answer.trim();
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            }
            _ => false,
        }
    }
}

fn execute<S: Store>(
    engine: &mut Timetable<S>,
    draft: &mut Option<ScheduleBlock>,
    cmd: Command,
    confirm: &mut impl Confirm,
) -> Result<String, EngineError> {
    let pointer = match cmd {
        Command::PointerDown { x, y } => Some(PointerEvent::Down { x, y }),
        Command::PointerMove { x, y } => Some(PointerEvent::Move { x, y }),
        Command::PointerUp => Some(PointerEvent::Up),
        Command::PointerLeave => Some(PointerEvent::Leave),
        _ => None,
    };
    if let Some(event) = pointer {
        return Ok(pointer_reply(engine, draft, event));
    }

    match cmd {
        Command::Edit { id } => {
            let block = engine.block(id).cloned().ok_or(EngineError::BlockNotFound(id))?;
            let text = format!("editing {}", describe_block(engine, &block));
            *draft = Some(block);
            Ok(text)
        }
        Command::Title(title) => edit_draft(engine, draft, |b| b.title = title),
        Command::Describe(description) => edit_draft(engine, draft, |b| b.description = description),
        Command::Time { start, end } => edit_draft(engine, draft, |b| {
            b.start = start;
            b.end = end;
        }),
        Command::MoveTo(day) => edit_draft(engine, draft, |b| b.day = day),
        Command::SetCategory(category_id) => edit_draft(engine, draft, |b| b.category_id = category_id),
        Command::Save => {
            let Some(block) = draft.clone() else {
                return Ok(NO_DRAFT.to_string());
            };
            engine.save_block(block.clone())?;
            *draft = None;
            Ok(format!("saved {}", describe_block(engine, &block)))
        }
        Command::Discard => Ok(match draft.take() {
            Some(block) => format!("discarded draft {}", block.id),
            None => NO_DRAFT.to_string(),
        }),
        Command::Delete { id } => match engine.delete_block(id, confirm)? {
            Outcome::Applied => {
                if draft.as_ref().is_some_and(|b| b.id == id) {
                    *draft = None;
                }
                Ok(format!("deleted block {id}"))
            }
            Outcome::Cancelled => Ok("cancelled".to_string()),
        },
        Command::AddCategory { name, color } => {
            let id = engine.save_category(CategoryDraft { id: None, name, color })?;
            Ok(format!("category {id} added"))
        }
        Command::EditCategory { id, name, color } => {
            engine.save_category(CategoryDraft { id: Some(id), name, color })?;
            Ok(format!("category {id} updated"))
        }
        Command::DeleteCategory { id } => match engine.delete_category(id, confirm)? {
            Outcome::Applied => {
                // Keep an open draft consistent with the registry.
                if let Some(block) = draft.as_mut()
                    && block.category_id == Some(id)
                {
                    block.category_id = engine.categories().front().map(|c| c.id);
                }
                Ok(format!("deleted category {id}"))
            }
            Outcome::Cancelled => Ok("cancelled".to_string()),
        },
        Command::Categories => Ok(list_categories(engine)),
        Command::Palette => Ok(Color::all().map(|c| c.hex()).collect::<Vec<_>>().join(" ")),
        Command::List => Ok(list_blocks(engine)),
        Command::Render => Ok(serde_json::to_string_pretty(&engine.render())
            .unwrap_or_else(|e| format!("render failed: {e}"))),
        Command::Help => Ok(HELP.to_string()),
        Command::PointerDown { .. }
        | Command::PointerMove { .. }
        | Command::PointerUp
        | Command::PointerLeave
        | Command::Quit => Ok(String::new()),
    }
}

const NO_DRAFT: &str = "no draft: drag on the grid or `edit ID` first";

fn pointer_reply<S: Store>(
    engine: &mut Timetable<S>,
    draft: &mut Option<ScheduleBlock>,
    event: PointerEvent,
) -> String {
    if let Some(block) = engine.pointer(event) {
        let text = format!("draft {}", describe_block(engine, &block));
        *draft = Some(block);
        return text;
    }
    match engine.drag_state().interval() {
        Some(interval) => format!(
            "dragging {} {}",
            interval.day,
            engine.grid().span_label(&interval.span)
        ),
        None => String::new(),
    }
}

fn edit_draft<S: Store>(
    engine: &Timetable<S>,
    draft: &mut Option<ScheduleBlock>,
    edit: impl FnOnce(&mut ScheduleBlock),
) -> Result<String, EngineError> {
    let Some(block) = draft.as_mut() else {
        return Ok(NO_DRAFT.to_string());
    };
    edit(block);
    Ok(format!("draft {}", describe_block(engine, block)))
}

fn describe_block<S: Store>(engine: &Timetable<S>, block: &ScheduleBlock) -> String {
    let time = if block.start < block.end {
        engine.grid().span_label(&block.span())
    } else {
        format!("[{}, {})", block.start, block.end)
    };
    let category = block
        .category_id
        .and_then(|id| engine.category(id))
        .map_or("uncategorized", |c| c.name.as_str());
    format!("{} {} {} {:?} ({category})", block.id, block.day, time, block.title)
}

fn list_categories<S: Store>(engine: &Timetable<S>) -> String {
    if engine.categories().is_empty() {
        return "no categories yet: cat-add NAME COLOR".to_string();
    }
    let mut text = String::new();
    for c in engine.categories().iter() {
        let _ = writeln!(text, "{} {} {}", c.id, c.color, c.name);
    }
    text.trim_end().to_string()
}

fn list_blocks<S: Store>(engine: &Timetable<S>) -> String {
    let week = engine.layout();
    let mut text = String::new();
    for (day, layout) in week.iter() {
        for placement in &layout.placements {
            let Some(block) = engine.block(placement.block_id) else {
                continue;
            };
            let _ = writeln!(
                text,
                "{day} lane {}/{} {}",
                placement.col + 1,
                placement.total_cols,
                describe_block(engine, block)
            );
        }
    }
    if text.is_empty() {
        return "no blocks".to_string();
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::engine::Surface;
    use crate::store::MemoryStore;

    fn engine() -> Timetable<MemoryStore> {
        Timetable::open(MemoryStore::new(), GridConfig::default(), Surface::new(100.0, 10.0))
    }

    fn run_script(engine: &mut Timetable<MemoryStore>, script: &str) -> String {
        let mut out = Vec::new();
        run(engine, Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn drag_edit_and_save() {
        let mut tt = engine();
        let out = run_script(
            &mut tt,
            "cat-add Study #64b5f6\ndown 150 35\nmove 150 75\nup\ntitle Algebra\nsave\nlist\n",
        );
        assert!(out.contains("dragging Tue 09:30-09:40"), "{out}");
        assert!(out.contains("saved"), "{out}");
        assert!(out.contains("Tue lane 1/1"), "{out}");

        let blocks: Vec<_> = tt.schedule().values().cloned().collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "Algebra");
        assert_eq!((blocks[0].day, blocks[0].start, blocks[0].end), (Day::Tue, 3, 8));
        assert_eq!(blocks[0].category_id, tt.categories().front().map(|c| c.id));
    }

    #[test]
    fn delete_asks_first() {
        let mut tt = engine();
        run_script(&mut tt, "down 5 5\nmove 5 25\nup\nsave\n");
        let id = *tt.schedule().keys().next().unwrap();

        let out = run_script(&mut tt, &format!("delete {id}\nn\n"));
        assert!(out.contains("[y/N]"), "{out}");
        assert!(out.contains("cancelled"), "{out}");
        assert!(tt.block(id).is_some());

        let out = run_script(&mut tt, &format!("delete {id}\ny\n"));
        assert!(out.contains("deleted block"), "{out}");
        assert!(tt.block(id).is_none());
    }

    #[test]
    fn prompt_at_end_of_input_declines() {
        let mut tt = engine();
        run_script(&mut tt, "down 5 5\nmove 5 25\nup\nsave\n");
        let id = *tt.schedule().keys().next().unwrap();
        run_script(&mut tt, &format!("delete {id}\n"));
        assert!(tt.block(id).is_some());
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let mut tt = engine();
        let out = run_script(&mut tt, "bogus\ntitle x\nedit 12\ncats\nquit\ncats\n");
        assert!(out.contains("unknown command: bogus"), "{out}");
        assert!(out.contains("no draft"), "{out}");
        assert!(out.contains("block not found: 12"), "{out}");
        // quit stops before the second `cats`
        assert_eq!(out.matches("no categories yet").count(), 1, "{out}");
    }

    #[test]
    fn invalid_time_keeps_draft() {
        let mut tt = engine();
        let out = run_script(&mut tt, "down 5 5\nmove 5 25\nup\ntime 9 4\nsave\ntime 4 9\nsave\n");
        assert!(out.contains("invalid span [9, 4)"), "{out}");
        let block = tt.schedule().values().next().unwrap();
        assert_eq!((block.start, block.end), (4, 9));
    }

    #[test]
    fn render_emits_json_frame() {
        let mut tt = engine();
        let out = run_script(&mut tt, "down 5 5\nmove 5 25\nup\nsave\nrender\n");
        let start = out.find('{').unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out[start..]).unwrap();
        assert_eq!(frame["blocks"].as_array().unwrap().len(), 1);
        assert_eq!(frame["showCategoryHint"], true);
        assert_eq!(frame["blocks"][0]["backgroundColor"], DEFAULT_BLOCK_COLOR);
    }
}
