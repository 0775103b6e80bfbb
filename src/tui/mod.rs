pub mod action;
pub mod state;
pub mod view;

use crate::config::Config;
use crate::error::StoreError;
use crate::model::EventDraft;
use crate::storage::Storage;
use crate::store::EventStore;
use action::Action;
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use state::{AppState, InputMode};
use std::{io, time::Duration};
use tracing::{error, info};

pub fn run<S: Storage>(config: &Config, mut store: EventStore<S>) -> Result<()> {
    let mut app_state = AppState::new(
        Local::now().date_naive(),
        config.week_start.weekday(),
        &config.default_color,
    );
    if let Some(e) = store.take_load_error() {
        app_state.message = format!("Could not read saved events, starting empty: {}", e);
    }

    // Panic Hook: restore the terminal before printing the panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        error!("panic: {}", info);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app_state, &mut store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app_state: &mut AppState,
    store: &mut EventStore<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| view::draw(f, app_state, store.events()))?;

        if !event::poll(Duration::from_millis(250))? {
            app_state.today = Local::now().date_naive();
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = handle_key(app_state, store, key)
            && !apply_action(app_state, store, action)
        {
            info!("quitting");
            return Ok(());
        }
    }
}

/// Translates a key press into a store action, updating UI state on the way.
pub fn handle_key<S: Storage>(
    state: &mut AppState,
    store: &EventStore<S>,
    key: KeyEvent,
) -> Option<Action> {
    match state.mode {
        InputMode::Creating | InputMode::Editing | InputMode::EditingDescription => {
            handle_input_key(state, store, key)
        }
        InputMode::ConfirmDelete => {
            let id = state.editing_id.take();
            state.mode = InputMode::Normal;
            match (key.code, id) {
                (KeyCode::Char('y') | KeyCode::Char('Y'), Some(id)) => {
                    Some(Action::DeleteEvent(id))
                }
                _ => {
                    state.message = "Delete cancelled.".to_string();
                    None
                }
            }
        }
        InputMode::Moving => match key.code {
            KeyCode::Enter => state
                .moving_id
                .take()
                .map(|id| Action::MoveEvent(id, state.cursor)),
            KeyCode::Esc => {
                state.cancel();
                state.message = "Move cancelled.".to_string();
                None
            }
            code => {
                navigate(state, code);
                None
            }
        },
        InputMode::Normal => handle_normal_key(state, store, key),
    }
}

fn navigate(state: &mut AppState, code: KeyCode) -> bool {
    match code {
        KeyCode::Left | KeyCode::Char('h') => state.move_days(-1),
        KeyCode::Right | KeyCode::Char('l') => state.move_days(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_days(-7),
        KeyCode::Down | KeyCode::Char('j') => state.move_days(7),
        KeyCode::PageDown | KeyCode::Char('n') => state.next_month(),
        KeyCode::PageUp | KeyCode::Char('p') => state.prev_month(),
        KeyCode::Char('t') => state.go_today(),
        _ => return false,
    }
    true
}

fn handle_normal_key<S: Storage>(
    state: &mut AppState,
    store: &EventStore<S>,
    key: KeyEvent,
) -> Option<Action> {
    if navigate(state, key.code) {
        return None;
    }
    let day_events = store.events_on(state.cursor);
    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Action::Quit);
        }
        KeyCode::Tab => state.next_event(day_events.len()),
        KeyCode::BackTab => state.previous_event(day_events.len()),
        KeyCode::Char('a') => {
            state.start_input(InputMode::Creating, "");
            state.message = "Example: Standup @09:00 ~weekly #4caf50".to_string();
        }
        KeyCode::Char(c @ ('e' | 'E' | 'd' | 'm')) => {
            let Some(event) = state.selected(&day_events) else {
                state.message = "No event selected.".to_string();
                return None;
            };
            let id = event.id.clone();
            match c {
                'e' => {
                    let line = event.to_draft().to_smart_string(&state.default_color);
                    state.start_input(InputMode::Editing, &line);
                    state.editing_id = Some(id);
                }
                'E' => {
                    let description = event.description.clone();
                    state.start_input(InputMode::EditingDescription, &description);
                    state.editing_id = Some(id);
                }
                'd' => {
                    state.message = format!("Delete '{}'? (y/n)", event.title);
                    state.mode = InputMode::ConfirmDelete;
                    state.editing_id = Some(id);
                }
                _ => {
                    state.message = format!(
                        "Moving '{}': pick a day, Enter to drop, Esc to cancel",
                        event.title
                    );
                    state.mode = InputMode::Moving;
                    state.moving_id = Some(id);
                }
            }
        }
        _ => {}
    }
    None
}

fn handle_input_key<S: Storage>(
    state: &mut AppState,
    store: &EventStore<S>,
    key: KeyEvent,
) -> Option<Action> {
    match key.code {
        KeyCode::Enter => return submit_input(state, store),
        KeyCode::Esc => state.cancel(),
        KeyCode::Left => state.move_cursor_left(),
        KeyCode::Right => state.move_cursor_right(),
        KeyCode::Backspace => state.delete_char(),
        KeyCode::Char(c) => state.enter_char(c),
        _ => {}
    }
    None
}

fn submit_input<S: Storage>(state: &mut AppState, store: &EventStore<S>) -> Option<Action> {
    if state.mode == InputMode::Creating {
        return match EventDraft::from_smart_input(&state.input_buffer, &state.default_color) {
            Ok(draft) => Some(Action::CreateEvent(state.cursor, draft)),
            Err(e) => {
                state.message = e.to_string();
                None
            }
        };
    }

    let Some(event) = state.editing_id.as_deref().and_then(|id| store.get(id)) else {
        state.cancel();
        state.message = "That event no longer exists.".to_string();
        return None;
    };
    let mut draft = event.to_draft();
    if state.mode == InputMode::Editing {
        draft.apply_smart_input(&state.input_buffer, &state.default_color);
    } else {
        draft.description = state.input_buffer.trim().to_string();
    }
    Some(Action::UpdateEvent(event.id.clone(), event.day(), draft))
}

/// Runs `action` against the store and reports the outcome in the status line.
/// Returns false when the app should quit.
pub fn apply_action<S: Storage>(
    state: &mut AppState,
    store: &mut EventStore<S>,
    action: Action,
) -> bool {
    let result = match action {
        Action::Quit => return false,
        Action::CreateEvent(day, draft) => store
            .create(draft, day)
            .map(|e| format!("Added '{}' at {}.", e.title, e.date)),
        Action::UpdateEvent(id, day, draft) => store
            .update(&id, draft, day)
            .map(|e| format!("Updated '{}'.", e.title)),
        Action::DeleteEvent(id) => store
            .delete(&id)
            .map(|e| format!("Deleted '{}'.", e.title)),
        Action::MoveEvent(id, day) => store
            .move_event(&id, day)
            .map(|e| format!("Moved '{}' to {}.", e.title, e.date)),
    };

    match result {
        Ok(msg) => {
            state.cancel();
            state.message = msg;
        }
        Err(e) => {
            let message = error_message(state.mode, &e);
            // Keep a create/edit prompt open so the input can be fixed
            let fixable = matches!(
                state.mode,
                InputMode::Creating | InputMode::Editing | InputMode::EditingDescription
            ) && matches!(
                e,
                StoreError::Conflict { .. } | StoreError::EmptyTitle | StoreError::InvalidColor(_)
            );
            if !fixable {
                state.cancel();
            }
            state.message = message;
            if !matches!(e, StoreError::Conflict { .. }) {
                error!(error = %e, "event change rejected");
            }
        }
    }
    true
}

fn error_message(mode: InputMode, e: &StoreError) -> String {
    match e {
        StoreError::Conflict { .. } if mode == InputMode::Moving => {
            "Cannot move event: conflict detected with another event at that time.".to_string()
        }
        StoreError::Conflict { .. } => {
            "There is already an event scheduled at this date and time. Please choose another time."
                .to_string()
        }
        other => format!("Error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::{NaiveDate, Weekday};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn press(
        state: &mut AppState,
        store: &mut EventStore<MemoryStorage>,
        code: KeyCode,
    ) -> bool {
        match handle_key(state, store, KeyEvent::new(code, KeyModifiers::NONE)) {
            Some(action) => apply_action(state, store, action),
            None => true,
        }
    }

    fn type_line(state: &mut AppState, store: &mut EventStore<MemoryStorage>, line: &str) {
        for c in line.chars() {
            press(state, store, KeyCode::Char(c));
        }
        press(state, store, KeyCode::Enter);
    }

    fn setup() -> (AppState, EventStore<MemoryStorage>) {
        let state = AppState::new(day(2024, 3, 4), Weekday::Sun, "#2196f3");
        (state, EventStore::open(MemoryStorage::new()))
    }

    #[test]
    fn add_then_conflict_keeps_prompt_open() {
        let (mut state, mut store) = setup();
        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "Standup @09:00");
        assert_eq!(store.len(), 1);
        assert_eq!(store.events()[0].date.to_string(), "2024-03-04T09:00");
        assert_eq!(state.mode, InputMode::Normal);

        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "Other @9:00");
        assert_eq!(store.len(), 1);
        assert_eq!(state.mode, InputMode::Creating);
        assert!(state.message.starts_with("There is already an event"));
    }

    #[test]
    fn move_with_keyboard_drop() {
        let (mut state, mut store) = setup();
        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "Standup @09:00");

        press(&mut state, &mut store, KeyCode::Char('m'));
        assert_eq!(state.mode, InputMode::Moving);
        press(&mut state, &mut store, KeyCode::Right);
        press(&mut state, &mut store, KeyCode::Enter);

        assert_eq!(state.mode, InputMode::Normal);
        assert_eq!(store.events()[0].date.to_string(), "2024-03-05T09:00");
    }

    #[test]
    fn move_onto_taken_slot_is_reported() {
        let (mut state, mut store) = setup();
        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "A @09:00");
        press(&mut state, &mut store, KeyCode::Right);
        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "B @09:00");

        press(&mut state, &mut store, KeyCode::Char('m'));
        press(&mut state, &mut store, KeyCode::Left);
        press(&mut state, &mut store, KeyCode::Enter);

        assert_eq!(state.mode, InputMode::Normal);
        assert!(state.message.starts_with("Cannot move event"));
        assert_eq!(store.events_on(day(2024, 3, 5))[0].title, "B");
    }

    #[test]
    fn delete_needs_confirmation() {
        let (mut state, mut store) = setup();
        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "Standup @09:00");

        press(&mut state, &mut store, KeyCode::Char('d'));
        press(&mut state, &mut store, KeyCode::Char('n'));
        assert_eq!(store.len(), 1);

        press(&mut state, &mut store, KeyCode::Char('d'));
        press(&mut state, &mut store, KeyCode::Char('y'));
        assert!(store.is_empty());
    }

    #[test]
    fn edit_prefills_and_updates_in_place() {
        let (mut state, mut store) = setup();
        press(&mut state, &mut store, KeyCode::Char('a'));
        type_line(&mut state, &mut store, "Standup @09:00 ~daily");
        let id = store.events()[0].id.clone();

        press(&mut state, &mut store, KeyCode::Char('e'));
        assert_eq!(state.input_buffer, "Standup @09:00 ~daily");
        for _ in 0.."@09:00 ~daily".len() {
            press(&mut state, &mut store, KeyCode::Backspace);
        }
        type_line(&mut state, &mut store, "@10:30");

        let event = store.get(&id).unwrap();
        assert_eq!(event.date.to_string(), "2024-03-04T10:30");
        assert_eq!(event.title, "Standup");

        press(&mut state, &mut store, KeyCode::Char('E'));
        type_line(&mut state, &mut store, "daily sync");
        assert_eq!(store.get(&id).unwrap().description, "daily sync");
    }

    #[test]
    fn unchanged_edit_keeps_a_token_like_title() {
        let json = r##"[
            {"id":"1","title":"Party @8pm","date":"2024-03-04T09:00","description":"","recurrence":"","color":"#2196f3"},
            {"id":"2","title":"Team  sync #ff0000","date":"2024-03-04T11:00","description":"","recurrence":"weekly","color":"#4caf50"}
        ]"##;
        let (mut state, _) = setup();
        let mut store = EventStore::open(MemoryStorage::with_contents(json));
        let before = store.events().to_vec();

        for index in 0..2 {
            state.selected_event = index;
            press(&mut state, &mut store, KeyCode::Char('e'));
            assert_eq!(state.mode, InputMode::Editing);
            press(&mut state, &mut store, KeyCode::Enter);
            assert_eq!(state.mode, InputMode::Normal);
        }
        assert_eq!(store.events(), before.as_slice());
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let (mut state, mut store) = setup();
        assert!(!press(&mut state, &mut store, KeyCode::Char('q')));
    }
}
