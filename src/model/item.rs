// File: ./src/model/item.rs
use crate::error::ParseError;
use crate::model::Slot;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COLOR: &str = "#2196f3";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Recurrence is stored with the event but never expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    // Persisted as "" to stay readable by the web widget's storage format
    #[default]
    #[serde(rename = "", alias = "none")]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl Recurrence {
    pub const ALL: [Recurrence; 5] = [
        Recurrence::None,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Custom => "custom",
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower.is_empty() {
            return Ok(Recurrence::None);
        }
        Recurrence::ALL
            .into_iter()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| ParseError::InvalidRecurrence(s.to_string()))
    }
}

/// A single-occurrence calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: Slot,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Event {
    pub(crate) fn from_draft(id: String, draft: EventDraft, day: NaiveDate) -> Self {
        Event {
            id,
            title: draft.title.trim().to_string(),
            date: Slot::new(day, draft.time),
            description: draft.description,
            recurrence: draft.recurrence,
            color: draft.color,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.date.time()
    }

    /// The form fields of this event, e.g. to prefill an edit.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            time: self.time(),
            description: self.description.clone(),
            recurrence: self.recurrence,
            color: self.color.clone(),
        }
    }
}

/// The user-editable fields of an event, before a date is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub time: NaiveTime,
    pub description: String,
    pub recurrence: Recurrence,
    pub color: String,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, time: NaiveTime) -> Self {
        Self {
            title: title.into(),
            time,
            description: String::new(),
            recurrence: Recurrence::None,
            color: default_color(),
        }
    }
}
