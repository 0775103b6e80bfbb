// File: ./src/model/parser.rs
// Handles smart text input parsing
use crate::color_utils;
use crate::error::ParseError;
use crate::model::item::{EventDraft, Recurrence};
use chrono::{NaiveTime, Timelike};

/// Parses a time of day typed by the user: `9:30`, `09:30`, `9:30pm`, `9am`.
pub fn parse_time(input: &str) -> Result<NaiveTime, ParseError> {
    let raw = input.trim();
    let err = || ParseError::InvalidTime(raw.to_string());
    let lower = raw.to_lowercase();

    let (clock, pm) = if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim_end(), Some(true))
    } else {
        (lower.as_str(), None)
    };

    let (h, m) = match clock.split_once(':') {
        Some(parts) => parts,
        None if pm.is_some() => (clock, "00"),
        None => return Err(err()),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(h) || h.len() > 2 || !digits(m) || m.len() != 2 {
        return Err(err());
    }

    let mut hour: u32 = h.parse().map_err(|_| err())?;
    let minute: u32 = m.parse().map_err(|_| err())?;
    if let Some(pm) = pm {
        if !(1..=12).contains(&hour) {
            return Err(err());
        }
        hour = hour % 12 + if pm { 12 } else { 0 };
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)
}

#[derive(Default)]
struct SmartInput {
    title: String,
    time: Option<NaiveTime>,
    recurrence: Option<Recurrence>,
    color: Option<String>,
}

impl SmartInput {
    fn has_tokens(&self) -> bool {
        self.time.is_some() || self.recurrence.is_some() || self.color.is_some()
    }

    /// Consumes one trailing word if it is a token for a field not set yet.
    fn take_token(&mut self, word: &str) -> bool {
        // 1. Time (@09:00, @9am)
        if self.time.is_none()
            && let Some(val) = word.strip_prefix('@')
            && let Ok(time) = parse_time(val)
        {
            self.time = Some(time);
            return true;
        }
        // 2. Recurrence (~weekly)
        if self.recurrence.is_none()
            && let Some(val) = word.strip_prefix('~')
            && !val.is_empty()
            && let Ok(rec) = val.parse::<Recurrence>()
        {
            self.recurrence = Some(rec);
            return true;
        }
        // 3. Color (#4caf50)
        if self.color.is_none()
            && word.starts_with('#')
            && let Some(color) = color_utils::normalize_hex(word)
        {
            self.color = Some(color);
            return true;
        }
        false
    }
}

// Tokens are read from the end of the line, one per field. The first word
// that is not a token, or repeats a field already read, ends the run and
// everything before it is the title, kept verbatim.
fn parse_smart(input: &str) -> SmartInput {
    let mut parsed = SmartInput::default();
    let mut rest = input.trim_end();

    while !rest.is_empty() {
        let (head, word) = rest.rsplit_once(char::is_whitespace).unwrap_or(("", rest));
        if !parsed.take_token(word) {
            break;
        }
        rest = head.trim_end();
    }
    parsed.title = rest.trim_start().to_string();
    parsed
}

impl EventDraft {
    /// Builds a draft from a one-line entry such as `Standup @09:00 ~weekly #4caf50`.
    /// The tokens go at the end of the line; the text before them is the title.
    pub fn from_smart_input(input: &str, default_color: &str) -> Result<Self, ParseError> {
        let parsed = parse_smart(input);
        let time = parsed.time.ok_or(ParseError::MissingTime)?;
        let mut draft = EventDraft::new(parsed.title, time);
        draft.recurrence = parsed.recurrence.unwrap_or_default();
        draft.color = parsed.color.unwrap_or_else(|| default_color.to_string());
        Ok(draft)
    }

    /// Re-applies an edited smart line. The time is kept when the line has
    /// none; the description is never touched.
    pub fn apply_smart_input(&mut self, input: &str, default_color: &str) {
        let parsed = parse_smart(input);
        self.title = parsed.title;
        if let Some(time) = parsed.time {
            self.time = time;
        }
        self.recurrence = parsed.recurrence.unwrap_or_default();
        self.color = parsed.color.unwrap_or_else(|| default_color.to_string());
    }

    /// Formats the draft so that parsing the line gives the same draft back.
    /// A title ending in token-like words gets every field spelled out, so
    /// those words read as repeats and stay in the title.
    pub fn to_smart_string(&self, default_color: &str) -> String {
        let explicit = parse_smart(&self.title).has_tokens();
        let mut s = format!(
            "{} @{:02}:{:02}",
            self.title,
            self.time.hour(),
            self.time.minute()
        );
        if explicit || self.recurrence != Recurrence::None {
            s.push_str(&format!(" ~{}", self.recurrence));
        }
        if explicit || !self.color.eq_ignore_ascii_case(default_color) {
            s.push_str(&format!(" {}", self.color));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_COLOR;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_24_hour_times() {
        assert_eq!(parse_time("09:00").unwrap(), hm(9, 0));
        assert_eq!(parse_time("9:05").unwrap(), hm(9, 5));
        assert_eq!(parse_time(" 23:59 ").unwrap(), hm(23, 59));
    }

    #[test]
    fn parses_meridiem_times() {
        assert_eq!(parse_time("9am").unwrap(), hm(9, 0));
        assert_eq!(parse_time("12am").unwrap(), hm(0, 0));
        assert_eq!(parse_time("12:30pm").unwrap(), hm(12, 30));
        assert_eq!(parse_time("7:15 PM").unwrap(), hm(19, 15));
    }

    #[test]
    fn rejects_bad_times() {
        for bad in ["", "9", "24:00", "9:5", "13pm", "ab:cd", "+9:00", "10:60"] {
            assert!(parse_time(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn smart_input_extracts_tokens() {
        let draft =
            EventDraft::from_smart_input("Team standup @09:30 ~weekly #4CAF50", DEFAULT_COLOR)
                .unwrap();
        assert_eq!(draft.title, "Team standup");
        assert_eq!(draft.time, hm(9, 30));
        assert_eq!(draft.recurrence, Recurrence::Weekly);
        assert_eq!(draft.color, "#4caf50");
    }

    #[test]
    fn smart_input_keeps_unrecognised_tokens_in_title() {
        let draft =
            EventDraft::from_smart_input("Call @mom #1 ~soon @8pm", DEFAULT_COLOR).unwrap();
        assert_eq!(draft.title, "Call @mom #1 ~soon");
        assert_eq!(draft.time, hm(20, 0));
        assert_eq!(draft.color, DEFAULT_COLOR);
        assert_eq!(draft.recurrence, Recurrence::None);
    }

    #[test]
    fn smart_input_requires_time() {
        assert_eq!(
            EventDraft::from_smart_input("Lunch", DEFAULT_COLOR),
            Err(ParseError::MissingTime)
        );
    }

    #[test]
    fn apply_keeps_time_and_description() {
        let mut draft = EventDraft::new("Lunch", hm(12, 0));
        draft.description = "bring salad".into();
        draft.recurrence = Recurrence::Daily;
        draft.apply_smart_input("Long lunch", DEFAULT_COLOR);
        assert_eq!(draft.title, "Long lunch");
        assert_eq!(draft.time, hm(12, 0));
        assert_eq!(draft.description, "bring salad");
        assert_eq!(draft.recurrence, Recurrence::None);
    }

    #[test]
    fn smart_string_round_trips() {
        let mut draft = EventDraft::new("Review", hm(14, 5));
        draft.recurrence = Recurrence::Monthly;
        draft.color = "#ff8800".into();
        let line = draft.to_smart_string(DEFAULT_COLOR);
        assert_eq!(line, "Review @14:05 ~monthly #ff8800");

        let back = EventDraft::from_smart_input(&line, DEFAULT_COLOR).unwrap();
        assert_eq!(back, draft);
    }

    #[test]
    fn token_like_titles_survive_an_edit() {
        for title in ["Party @8pm", "Sale #ff0000", "Trip ~weekly", "Team  sync", "@9am"] {
            let mut draft = EventDraft::new(title, hm(9, 0));
            let line = draft.to_smart_string(DEFAULT_COLOR);
            draft.apply_smart_input(&line, DEFAULT_COLOR);
            assert_eq!(draft.title, title, "line was {line:?}");
            assert_eq!(draft.time, hm(9, 0));
            assert_eq!(draft.recurrence, Recurrence::None);
            assert_eq!(draft.color, DEFAULT_COLOR);
        }
        assert_eq!(
            EventDraft::new("Party @8pm", hm(9, 0)).to_smart_string(DEFAULT_COLOR),
            "Party @8pm @09:00 ~none #2196f3"
        );
    }

    #[test]
    fn repeated_field_ends_the_token_run() {
        let draft = EventDraft::from_smart_input("Dinner @7pm @19:30 #00ff00", DEFAULT_COLOR)
            .unwrap();
        assert_eq!(draft.title, "Dinner @7pm");
        assert_eq!(draft.time, hm(19, 30));
        assert_eq!(draft.color, "#00ff00");

        // Words after the tokens make them part of the title
        assert_eq!(
            EventDraft::from_smart_input("Lunch @12:00 with Bob", DEFAULT_COLOR),
            Err(ParseError::MissingTime)
        );
    }
}
