use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Slot index within a day, counted from the grid's start hour.
pub type Slot = u32;

/// Blocks keyed by id. Mutations replace the whole value.
pub type Schedule = im::OrdMap<BlockId, ScheduleBlock>;

/// Categories in registration order.
pub type Categories = im::Vector<Category>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Days ─────────────────────────────────────────────────────────

/// Day of the week, Monday first. Persisted as its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    /// Display ordinal, 0 = Monday.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Day> {
        Day::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown day: {s}"))
    }
}

// ── Slot spans ───────────────────────────────────────────────────

/// Half-open slot interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpan {
    pub start: Slot,
    pub end: Slot,
}

impl SlotSpan {
    pub fn new(start: Slot, end: Slot) -> Self {
        debug_assert!(start < end, "SlotSpan start must be before end");
        Self { start, end }
    }

    pub fn len(&self) -> Slot {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &SlotSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_slot(&self, slot: Slot) -> bool {
        self.start <= slot && slot < self.end
    }
}

/// A span pinned to a day. This is what a completed drag produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayInterval {
    pub day: Day,
    pub span: SlotSpan,
}

// ── Palette ──────────────────────────────────────────────────────

/// The fixed category palette.
pub const PALETTE: [&str; 12] = [
    "#e57373",
    "#f06292",
    "#ba68c8",
    "#9575cd",
    "#7986cb",
    "#64b5f6",
    "#4dd0e1",
    "#4db6ac",
    "#81c784",
    "#dce775",
    "#ffb74d",
    "#a1887f",
];

/// Fill for blocks without a category.
pub const DEFAULT_BLOCK_COLOR: &str = "#9e9e9e";

/// A palette entry. Serialized as its hex string; anything outside the
/// palette fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(usize);

impl Color {
    pub fn all() -> impl Iterator<Item = Color> {
        (0..PALETTE.len()).map(Color)
    }

    pub fn from_hex(hex: &str) -> Option<Color> {
        PALETTE
            .iter()
            .position(|p| p.eq_ignore_ascii_case(hex))
            .map(Color)
    }

    pub fn hex(self) -> &'static str {
        PALETTE[self.0]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color(0)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("color not in palette: {value}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.hex().to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

// ── Blocks & categories ──────────────────────────────────────────

pub const PLACEHOLDER_TITLE: &str = "New block";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub id: BlockId,
    pub day: Day,
    pub start: Slot,
    pub end: Slot,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl ScheduleBlock {
    /// A fresh block for the edit form, before it has been saved.
    pub fn draft(id: BlockId, interval: DayInterval, category_id: Option<CategoryId>) -> Self {
        Self {
            id,
            day: interval.day,
            start: interval.span.start,
            end: interval.span.end,
            title: PLACEHOLDER_TITLE.to_string(),
            description: None,
            category_id,
        }
    }

    pub fn span(&self) -> SlotSpan {
        SlotSpan { start: self.start, end: self.end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: Color,
}

/// Input to `save_category`: `id == None` registers a new category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub id: Option<CategoryId>,
    pub name: String,
    pub color: Color,
}

// ── Grid configuration ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDay { start_hour: u8, end_hour: u8 },
    HourOutOfRange(u8),
    SlotMinutes(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDay { start_hour, end_hour } => {
                write!(f, "day must end after it starts: {start_hour}..{end_hour}")
            }
            ConfigError::HourOutOfRange(h) => write!(f, "hour out of range: {h}"),
            ConfigError::SlotMinutes(m) => {
                write!(f, "slot length must divide an hour, got {m} minutes")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Visible hours and slot granularity of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    start_hour: u8,
    end_hour: u8,
    slot_minutes: u8,
}

impl GridConfig {
    pub fn new(start_hour: u8, end_hour: u8, slot_minutes: u8) -> Result<Self, ConfigError> {
        if end_hour > 24 {
            return Err(ConfigError::HourOutOfRange(end_hour));
        }
        if end_hour <= start_hour {
            return Err(ConfigError::EmptyDay { start_hour, end_hour });
        }
        if slot_minutes == 0 || 60 % slot_minutes != 0 {
            return Err(ConfigError::SlotMinutes(slot_minutes));
        }
        Ok(Self { start_hour, end_hour, slot_minutes })
    }

    pub fn start_hour(&self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u8 {
        self.end_hour
    }

    pub fn slot_minutes(&self) -> u8 {
        self.slot_minutes
    }

    pub fn slots_per_hour(&self) -> Slot {
        60 / self.slot_minutes as Slot
    }

    pub fn total_slots(&self) -> Slot {
        (self.end_hour - self.start_hour) as Slot * self.slots_per_hour()
    }

    /// Wall-clock label (`HH:MM`) of a slot boundary.
    pub fn slot_label(&self, slot: Slot) -> String {
        let minutes = self.start_hour as u32 * 60 + slot * self.slot_minutes as u32;
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    pub fn span_label(&self, span: &SlotSpan) -> String {
        format!("{}-{}", self.slot_label(span.start), self.slot_label(span.end))
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { start_hour: 9, end_hour: 23, slot_minutes: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let s = SlotSpan::new(3, 8);
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert!(s.contains_slot(3));
        assert!(s.contains_slot(7));
        assert!(!s.contains_slot(8)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = SlotSpan::new(0, 4);
        let b = SlotSpan::new(2, 6);
        let c = SlotSpan::new(4, 6);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn day_order_and_labels() {
        assert_eq!(Day::Mon.index(), 0);
        assert_eq!(Day::Sun.index(), 6);
        assert_eq!(Day::from_index(1), Some(Day::Tue));
        assert_eq!(Day::from_index(7), None);
        assert_eq!("tue".parse::<Day>(), Ok(Day::Tue));
        assert!("Tuesday".parse::<Day>().is_err());
        assert_eq!(serde_json::to_string(&Day::Wed).unwrap(), "\"Wed\"");
    }

    #[test]
    fn palette_colors() {
        assert_eq!(Color::all().count(), PALETTE.len());
        let c = Color::from_hex("#64B5F6").unwrap();
        assert_eq!(c.hex(), "#64b5f6");
        assert!(Color::from_hex("#000000").is_none());
        assert!(serde_json::from_str::<Color>("\"#123456\"").is_err());
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#64b5f6\"");
    }

    #[test]
    fn block_json_shape() {
        let block = ScheduleBlock {
            id: BlockId(1700000000000),
            day: Day::Tue,
            start: 3,
            end: 8,
            title: "Gym".into(),
            description: None,
            category_id: Some(CategoryId(7)),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["categoryId"], 7);
        assert_eq!(json["day"], "Tue");
        assert!(json.get("description").is_none());

        let parsed: ScheduleBlock = serde_json::from_str(
            r#"{"id":5,"day":"Fri","start":0,"end":2,"title":"x","categoryId":null}"#,
        )
        .unwrap();
        assert_eq!(parsed.category_id, None);
        assert_eq!(parsed.span(), SlotSpan::new(0, 2));
    }

    #[test]
    fn grid_defaults() {
        let grid = GridConfig::default();
        assert_eq!(grid.slots_per_hour(), 6);
        assert_eq!(grid.total_slots(), 84);
        assert_eq!(grid.slot_label(0), "09:00");
        assert_eq!(grid.slot_label(9), "10:30");
        assert_eq!(grid.span_label(&SlotSpan::new(3, 8)), "09:30-10:20");
    }

    #[test]
    fn grid_rejects_bad_config() {
        assert_eq!(
            GridConfig::new(10, 10, 10),
            Err(ConfigError::EmptyDay { start_hour: 10, end_hour: 10 })
        );
        assert_eq!(GridConfig::new(0, 25, 10), Err(ConfigError::HourOutOfRange(25)));
        assert_eq!(GridConfig::new(9, 17, 7), Err(ConfigError::SlotMinutes(7)));
        assert_eq!(GridConfig::new(9, 17, 0), Err(ConfigError::SlotMinutes(0)));
        assert_eq!(GridConfig::new(0, 24, 15).unwrap().total_slots(), 96);
    }
}
