use crate::model::*;

/// Parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    /// Load an existing block into the draft.
    Edit { id: BlockId },
    Title(String),
    Describe(Option<String>),
    Time { start: Slot, end: Slot },
    MoveTo(Day),
    SetCategory(Option<CategoryId>),
    Save,
    Discard,
    Delete { id: BlockId },
    AddCategory { name: String, color: Color },
    EditCategory { id: CategoryId, name: String, color: Color },
    DeleteCategory { id: CategoryId },
    Categories,
    Palette,
    List,
    Render,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    WrongArity(&'static str, &'static str),
    BadNumber(String),
    BadColor(String),
    BadDay(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(c) => write!(f, "unknown command: {c} (try `help`)"),
            CommandError::WrongArity(cmd, usage) => write!(f, "usage: {cmd} {usage}"),
            CommandError::BadNumber(s) => write!(f, "not a number: {s}"),
            CommandError::BadColor(s) => {
                write!(f, "color not in palette: {s} (see `palette`)")
            }
            CommandError::BadDay(s) => write!(f, "unknown day: {s}"),
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
pointer:    down X Y | move X Y | up | leave
draft:      edit ID | title TEXT | desc [TEXT] | time START END | day DAY
            category ID|none | save | discard
blocks:     delete ID | list | render
categories: cat-add NAME COLOR | cat-edit ID NAME COLOR | cat-delete ID
            cats | palette
other:      help | quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    if head.is_empty() {
        return Err(CommandError::Empty);
    }
    let args: Vec<&str> = rest.split_whitespace().collect();

    match head.to_ascii_lowercase().as_str() {
        "down" => {
            let (x, y) = parse_point("down", &args)?;
            Ok(Command::PointerDown { x, y })
        }
        "move" => {
            let (x, y) = parse_point("move", &args)?;
            Ok(Command::PointerMove { x, y })
        }
        "up" => Ok(Command::PointerUp),
        "leave" => Ok(Command::PointerLeave),
        "edit" => Ok(Command::Edit { id: BlockId(single_int("edit", "ID", &args)?) }),
        "title" => {
            if rest.is_empty() {
                return Err(CommandError::WrongArity("title", "TEXT"));
            }
            Ok(Command::Title(rest.to_string()))
        }
        "desc" => Ok(Command::Describe((!rest.is_empty()).then(|| rest.to_string()))),
        "time" => {
            let [start, end] = args[..] else {
                return Err(CommandError::WrongArity("time", "START END"));
            };
            Ok(Command::Time {
                start: parse_number(start)?,
                end: parse_number(end)?,
            })
        }
        "day" => {
            let [day] = args[..] else {
                return Err(CommandError::WrongArity("day", "DAY"));
            };
            day.parse()
                .map(Command::MoveTo)
                .map_err(|_| CommandError::BadDay(day.to_string()))
        }
        "category" => match args[..] {
            [none] if none.eq_ignore_ascii_case("none") => Ok(Command::SetCategory(None)),
            [id] => Ok(Command::SetCategory(Some(CategoryId(parse_number(id)?)))),
            _ => Err(CommandError::WrongArity("category", "ID|none")),
        },
        "save" => Ok(Command::Save),
        "discard" => Ok(Command::Discard),
        "delete" => Ok(Command::Delete { id: BlockId(single_int("delete", "ID", &args)?) }),
        "cat-add" => {
            let (name, color) = parse_name_and_color("cat-add", "NAME COLOR", &args)?;
            Ok(Command::AddCategory { name, color })
        }
        "cat-edit" => {
            let Some((id, tail)) = args.split_first() else {
                return Err(CommandError::WrongArity("cat-edit", "ID NAME COLOR"));
            };
            let (name, color) = parse_name_and_color("cat-edit", "ID NAME COLOR", tail)?;
            Ok(Command::EditCategory {
                id: CategoryId(parse_number(id)?),
                name,
                color,
            })
        }
        "cat-delete" => Ok(Command::DeleteCategory {
            id: CategoryId(single_int("cat-delete", "ID", &args)?),
        }),
        "cats" => Ok(Command::Categories),
        "palette" => Ok(Command::Palette),
        "list" => Ok(Command::List),
        "render" => Ok(Command::Render),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse().map_err(|_| CommandError::BadNumber(s.to_string()))
}

fn single_int(cmd: &'static str, usage: &'static str, args: &[&str]) -> Result<i64, CommandError> {
    let [value] = args[..] else {
        return Err(CommandError::WrongArity(cmd, usage));
    };
    parse_number(value)
}

fn parse_point(cmd: &'static str, args: &[&str]) -> Result<(f64, f64), CommandError> {
    let [x, y] = args[..] else {
        return Err(CommandError::WrongArity(cmd, "X Y"));
    };
    Ok((parse_number(x)?, parse_number(y)?))
}

/// `NAME... COLOR`: the last word is the color, the rest is the name.
fn parse_name_and_color(
    cmd: &'static str,
    usage: &'static str,
    args: &[&str],
) -> Result<(String, Color), CommandError> {
    let Some((color, name)) = args.split_last() else {
        return Err(CommandError::WrongArity(cmd, usage));
    };
    if name.is_empty() {
        return Err(CommandError::WrongArity(cmd, usage));
    }
    let color = Color::from_hex(color).ok_or_else(|| CommandError::BadColor(color.to_string()))?;
    Ok((name.join(" "), color))
}
