use crate::model::EventDraft;
use chrono::NaiveDate;

/// A request from the UI to the event store.
#[derive(Debug)]
pub enum Action {
    CreateEvent(NaiveDate, EventDraft),
    UpdateEvent(String, NaiveDate, EventDraft),
    DeleteEvent(String),
    MoveEvent(String, NaiveDate),
    Quit,
}
