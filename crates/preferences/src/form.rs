// In crates/preferences/src/form.rs

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{Error, Result};

/// How long a save takes. Nothing is persisted; the delay is all there is.
pub const SAVE_DELAY: Duration = Duration::from_millis(1500);

/// How long `success` is shown before the form reads as `idle` again.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Idle,
    Saving,
    Success,
    Error,
}

/// Proof that a save was started. A save only completes if no edit happened
/// in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SaveTicket {
    revision: u64,
}

/// Local state of one settings page.
///
/// Values are never mutated in place: every edit builds a new `T` and swaps it
/// in, so a failed edit leaves the previous values untouched.
#[derive(Debug, Clone)]
pub struct SettingsForm<T> {
    values: T,
    dirty: bool,
    status: SaveStatus,
    succeeded_at: Option<Instant>,
    revision: u64,
    save_delay: Duration,
}

impl<T: Default> Default for SettingsForm<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> SettingsForm<T> {
    pub fn new(values: T) -> Self {
        Self {
            values,
            dirty: false,
            status: SaveStatus::Idle,
            succeeded_at: None,
            revision: 0,
            save_delay: SAVE_DELAY,
        }
    }

    pub fn with_save_delay(mut self, save_delay: Duration) -> Self {
        self.save_delay = save_delay;
        self
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save_delay(&self) -> Duration {
        self.save_delay
    }

    /// The save status as of now. `success` turns back into `idle` once
    /// [`SUCCESS_DISPLAY`] has elapsed.
    pub fn status(&self) -> SaveStatus {
        match (self.status, self.succeeded_at) {
            (SaveStatus::Success, Some(at)) if at.elapsed() >= SUCCESS_DISPLAY => SaveStatus::Idle,
            (status, _) => status,
        }
    }

    fn replace(&mut self, values: T) {
        self.values = values;
        self.dirty = true;
        self.status = SaveStatus::Idle;
        self.succeeded_at = None;
        self.revision += 1;
    }

    /// Marks the form as saving.
    pub fn begin_save(&mut self) -> SaveTicket {
        self.status = SaveStatus::Saving;
        self.succeeded_at = None;
        SaveTicket { revision: self.revision }
    }

    /// Completes a save started with `ticket`. Returns `false`, and leaves the
    /// form as the later edit left it, when the values changed in between.
    pub fn finish_save(&mut self, ticket: SaveTicket) -> bool {
        if ticket.revision != self.revision {
            tracing::debug!("Save superseded by a later edit.");
            return false;
        }
        self.status = SaveStatus::Success;
        self.succeeded_at = Some(Instant::now());
        self.dirty = false;
        true
    }

    /// Starts a save, waits out the save delay and completes it.
    pub async fn save(&mut self) -> SaveStatus {
        let ticket = self.begin_save();
        tokio::time::sleep(self.save_delay).await;
        self.finish_save(ticket);
        self.status()
    }
}

impl<T: Clone> SettingsForm<T> {
    /// Applies `change` to a copy of the values and swaps the copy in if it succeeds.
    pub fn edit<R>(&mut self, change: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut next = self.values.clone();
        let outcome = change(&mut next)?;
        self.replace(next);
        Ok(outcome)
    }
}

impl<T: Default> SettingsForm<T> {
    /// Restores the built-in defaults. Counts as an edit.
    pub fn reset(&mut self) {
        self.replace(T::default());
    }
}

impl<T: Serialize + DeserializeOwned> SettingsForm<T> {
    /// Replaces the field called `name` (its serialized name) with `value`.
    ///
    /// Unknown names and values of the wrong type are rejected and leave the
    /// form unchanged. Range hints are not checked here.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        let Value::Object(mut fields) = serde_json::to_value(&self.values)? else {
            return Err(Error::NotAnObject);
        };
        match fields.get_mut(name) {
            Some(slot) => *slot = value,
            None => return Err(Error::UnknownField(name.to_string())),
        }

        let next: T = serde_json::from_value(Value::Object(fields)).map_err(|e| Error::InvalidValue {
            field: name.to_string(),
            reason: e.to_string(),
        })?;
        self.replace(next);
        tracing::debug!(field = name, "Setting changed.");
        Ok(())
    }

    /// Applies several fields at once; either all of them land or none do.
    pub fn set_fields(&mut self, changes: serde_json::Map<String, Value>) -> Result<()> {
        let Value::Object(mut fields) = serde_json::to_value(&self.values)? else {
            return Err(Error::NotAnObject);
        };
        for (name, value) in changes {
            match fields.get_mut(&name) {
                Some(slot) => *slot = value,
                None => return Err(Error::UnknownField(name)),
            }
        }

        let next: T = serde_json::from_value(Value::Object(fields)).map_err(|e| Error::InvalidValue {
            field: "<batch>".to_string(),
            reason: e.to_string(),
        })?;
        self.replace(next);
        Ok(())
    }
}
