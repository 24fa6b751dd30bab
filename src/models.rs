use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::time::TimeOfDay;

/// Opaque task identifier, assigned once at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed block palette; purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskColor {
    Purple,
    Green,
    Pink,
    Yellow,
    Blue,
}

impl TaskColor {
    pub const PALETTE: [TaskColor; 5] = [
        TaskColor::Purple,
        TaskColor::Green,
        TaskColor::Pink,
        TaskColor::Yellow,
        TaskColor::Blue,
    ];

    /// Palette entry for the n-th block, wrapping around
    pub fn nth(n: usize) -> Self {
        Self::PALETTE[n % Self::PALETTE.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskColor::Purple => "purple",
            TaskColor::Green => "green",
            TaskColor::Pink => "pink",
            TaskColor::Yellow => "yellow",
            TaskColor::Blue => "blue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub color: TaskColor,
    // Reserved: nothing in the planner flips this
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(title: String, start_time: TimeOfDay, end_time: TimeOfDay, color: TaskColor) -> Self {
        Self {
            id: TaskId::generate(),
            title,
            start_time,
            end_time,
            color,
            completed: false,
        }
    }

    pub fn start_minutes(&self) -> u16 {
        self.start_time.minutes()
    }

    pub fn end_minutes(&self) -> u16 {
        self.end_time.minutes()
    }

    /// Length of the block in minutes
    pub fn duration_minutes(&self) -> u16 {
        self.end_minutes().saturating_sub(self.start_minutes())
    }

    /// Half-open containment: `start <= minute < end`
    pub fn contains(&self, minute: u16) -> bool {
        self.start_minutes() <= minute && minute < self.end_minutes()
    }
}

/// One self-rating for a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub rating: u8,
}

impl DailyLogEntry {
    pub fn new(date: NaiveDate, rating: u8) -> Self {
        Self { date, rating }
    }
}

mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::time::date_string(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::time::parse_date(&s).map_err(serde::de::Error::custom)
    }
}

/// Which screen the planner is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Build,
    Focus,
    Review,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Build => "build",
            View::Focus => "focus",
            View::Review => "review",
        }
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(View::Build),
            "focus" => Ok(View::Focus),
            "review" => Ok(View::Review),
            other => Err(format!("Unknown view: {}", other)),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
