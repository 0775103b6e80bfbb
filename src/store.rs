//! The event store: the single owner of the event set.
//!
//! Every mutation checks the one-event-per-slot rule, is applied to a copy of
//! the set, saved in full through the injected [`Storage`], and only then
//! committed in memory. A rejected or failed mutation leaves the store as it
//! was.

use crate::color_utils;
use crate::error::{StorageError, StoreError};
use crate::model::{Event, EventDraft, Slot};
use crate::storage::Storage;
use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct EventStore<S: Storage> {
    storage: S,
    events: Vec<Event>,
    load_error: Option<StorageError>,
}

impl<S: Storage> EventStore<S> {
    /// Loads the stored events. Unreadable or malformed data opens an empty
    /// store; the error is kept for [`EventStore::take_load_error`].
    pub fn open(storage: S) -> Self {
        let (events, load_error) = match storage.load() {
            Ok(Some(events)) => {
                debug!(count = events.len(), "loaded events");
                (events, None)
            }
            Ok(None) => (Vec::new(), None),
            Err(e) => {
                warn!(error = %e, "could not load stored events, starting empty");
                (Vec::new(), Some(e))
            }
        };
        Self {
            storage,
            events,
            load_error,
        }
    }

    /// The error hit while loading, if any. Returns it only once.
    pub fn take_load_error(&mut self) -> Option<StorageError> {
        self.load_error.take()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// All events, in creation order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events on `day`, earliest first.
    pub fn events_on(&self, day: NaiveDate) -> Vec<&Event> {
        let mut found: Vec<&Event> = self.events.iter().filter(|e| e.day() == day).collect();
        found.sort_by_key(|e| e.date);
        found
    }

    pub fn create(&mut self, draft: EventDraft, day: NaiveDate) -> Result<Event, StoreError> {
        validate(&draft)?;
        self.ensure_free(Slot::new(day, draft.time), None)?;

        let event = Event::from_draft(Uuid::new_v4().to_string(), draft, day);
        let mut next = self.events.clone();
        next.push(event.clone());
        self.commit(next)?;

        debug!(id = %event.id, date = %event.date, "created event");
        Ok(event)
    }

    /// Replaces every field of `id` except the id itself.
    pub fn update(
        &mut self,
        id: &str,
        draft: EventDraft,
        day: NaiveDate,
    ) -> Result<Event, StoreError> {
        let idx = self.index_of(id)?;
        validate(&draft)?;
        self.ensure_free(Slot::new(day, draft.time), Some(id))?;

        let event = Event::from_draft(id.to_string(), draft, day);
        let mut next = self.events.clone();
        next[idx] = event.clone();
        self.commit(next)?;

        debug!(id = %event.id, date = %event.date, "updated event");
        Ok(event)
    }

    pub fn delete(&mut self, id: &str) -> Result<Event, StoreError> {
        let idx = self.index_of(id)?;
        let mut next = self.events.clone();
        let removed = next.remove(idx);
        self.commit(next)?;

        debug!(id = %removed.id, "deleted event");
        Ok(removed)
    }

    /// Reschedules `id` onto `day`, keeping its time of day.
    pub fn move_event(&mut self, id: &str, day: NaiveDate) -> Result<Event, StoreError> {
        let idx = self.index_of(id)?;
        let slot = self.events[idx].date.with_date(day);
        self.ensure_free(slot, Some(id))?;

        let mut next = self.events.clone();
        next[idx].date = slot;
        let event = next[idx].clone();
        self.commit(next)?;

        debug!(id = %event.id, date = %event.date, "moved event");
        Ok(event)
    }

    fn index_of(&self, id: &str) -> Result<usize, StoreError> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn ensure_free(&self, slot: Slot, except: Option<&str>) -> Result<(), StoreError> {
        match self
            .events
            .iter()
            .find(|e| e.date == slot && Some(e.id.as_str()) != except)
        {
            Some(existing) => {
                debug!(%slot, existing = %existing.id, "slot already taken");
                Err(StoreError::Conflict {
                    slot,
                    existing: existing.id.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn commit(&mut self, next: Vec<Event>) -> Result<(), StoreError> {
        if let Err(e) = self.storage.save(&next) {
            warn!(error = %e, "failed to persist events, change discarded");
            return Err(e.into());
        }
        self.events = next;
        Ok(())
    }
}

fn validate(draft: &EventDraft) -> Result<(), StoreError> {
    if draft.title.trim().is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    if color_utils::parse_hex(&draft.color).is_none() {
        return Err(StoreError::InvalidColor(draft.color.clone()));
    }
    Ok(())
}
