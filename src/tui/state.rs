use crate::grid;
use crate::model::Event;
use chrono::{Days, NaiveDate, Weekday};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Creating,
    Editing,
    EditingDescription,
    ConfirmDelete,
    Moving,
}

/// Interaction state owned by the UI: cursor day, selection, form buffer and
/// the event being moved. None of it is persisted.
pub struct AppState {
    pub cursor: NaiveDate,
    pub today: NaiveDate,
    pub week_start: Weekday,
    pub default_color: String,
    pub selected_event: usize,
    pub mode: InputMode,
    pub input_buffer: String,
    pub cursor_position: usize,
    /// Event being edited or awaiting delete confirmation.
    pub editing_id: Option<String>,
    /// Event picked up with `m`.
    pub moving_id: Option<String>,
    pub message: String,
}

impl AppState {
    pub fn new(today: NaiveDate, week_start: Weekday, default_color: &str) -> Self {
        Self {
            cursor: today,
            today,
            week_start,
            default_color: default_color.to_string(),
            selected_event: 0,
            mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            editing_id: None,
            moving_id: None,
            message: "a: Add | e: Edit | m: Move | d: Delete".to_string(),
        }
    }

    // --- Day cursor ---

    pub fn move_days(&mut self, delta: i64) {
        let target = if delta >= 0 {
            self.cursor.checked_add_days(Days::new(delta as u64))
        } else {
            self.cursor.checked_sub_days(Days::new(delta.unsigned_abs()))
        };
        if let Some(day) = target {
            self.set_cursor(day);
        }
    }

    pub fn next_month(&mut self) {
        self.set_cursor(grid::next_month(self.cursor));
    }

    pub fn prev_month(&mut self) {
        self.set_cursor(grid::prev_month(self.cursor));
    }

    pub fn go_today(&mut self) {
        self.set_cursor(self.today);
    }

    fn set_cursor(&mut self, day: NaiveDate) {
        if day != self.cursor {
            self.cursor = day;
            self.selected_event = 0;
        }
    }

    // --- Event selection within the cursor day ---

    pub fn next_event(&mut self, count: usize) {
        if count == 0 {
            self.selected_event = 0;
            return;
        }
        self.selected_event = (self.selected_event + 1) % count;
    }

    pub fn previous_event(&mut self, count: usize) {
        if count == 0 {
            self.selected_event = 0;
            return;
        }
        self.selected_event = if self.selected_event == 0 {
            count - 1
        } else {
            (self.selected_event - 1).min(count - 1)
        };
    }

    /// The highlighted event among `day_events` (the cursor day's events, in display order).
    pub fn selected<'a>(&self, day_events: &[&'a Event]) -> Option<&'a Event> {
        if day_events.is_empty() {
            return None;
        }
        let idx = self.selected_event.min(day_events.len() - 1);
        Some(day_events[idx])
    }

    // --- Input buffer ---

    pub fn start_input(&mut self, mode: InputMode, initial: &str) {
        self.mode = mode;
        self.input_buffer = initial.to_string();
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Back to normal mode, dropping any buffer and pending edit or move.
    pub fn cancel(&mut self) {
        self.mode = InputMode::Normal;
        self.editing_id = None;
        self.moving_id = None;
        self.reset_input();
    }

    pub fn move_cursor_left(&mut self) {
        let cursor_moved_left = self.cursor_position.saturating_sub(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_left);
    }
    pub fn move_cursor_right(&mut self) {
        let cursor_moved_right = self.cursor_position.saturating_add(1);
        self.cursor_position = self.clamp_cursor(cursor_moved_right);
    }
    pub fn enter_char(&mut self, new_char: char) {
        let idx = self.byte_index();
        self.input_buffer.insert(idx, new_char);
        self.move_cursor_right();
    }
    pub fn delete_char(&mut self) {
        if self.cursor_position != 0 {
            let current_index = self.cursor_position;
            let from_left_to_current_index = current_index - 1;
            let before_char_to_delete = self.input_buffer.chars().take(from_left_to_current_index);
            let after_char_to_delete = self.input_buffer.chars().skip(current_index);
            self.input_buffer = before_char_to_delete.chain(after_char_to_delete).collect();
            self.move_cursor_left();
        }
    }
    pub fn reset_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
    fn byte_index(&self) -> usize {
        self.input_buffer
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input_buffer.len())
    }
    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.input_buffer.chars().count())
    }
}
