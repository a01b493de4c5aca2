use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::storage::{Storage, Thread, ThreadSummary};
use crate::ai::replies::ReplyEngine;
use crate::ai::{AvoidItem, Mode, Suggestion};
use crate::capture::ImagePayload;
use crate::chat::{GenerationSettings, Turn};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Action {
    Generate,
    Extract,
}

/// What the generate action hands back to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub suggestions: Vec<Suggestion>,
    pub avoid: Vec<AvoidItem>,
    pub mode: Mode,
    pub detected_language: String,
    pub safety_flags: Vec<String>,
    /// Stored settings after any write-back.
    pub settings: GenerationSettings,
    /// Set once, when spicy mode was just switched off by the backend's verdict.
    pub notice: Option<String>,
}

/// Releases the in-flight slot however the action ends.
struct InFlight<'a> {
    manager: &'a ThreadManager,
    key: (String, Action),
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.manager.in_flight.lock().remove(&self.key);
    }
}

/// Thread-level actions on top of the store and the reply engine.
///
/// Writes to one thread are serialized through a per-thread lock; different
/// threads never wait on each other beyond the short storage calls. Each
/// thread allows one outstanding generate and one outstanding extract.
pub struct ThreadManager {
    storage: Mutex<Storage>,
    engine: RwLock<ReplyEngine>,
    thread_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    in_flight: Mutex<HashSet<(String, Action)>>,
    epochs: Mutex<HashMap<String, u64>>,
}

impl ThreadManager {
    pub fn new(storage: Storage, engine: ReplyEngine) -> Self {
        Self {
            storage: Mutex::new(storage),
            engine: RwLock::new(engine),
            thread_locks: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            epochs: Mutex::new(HashMap::new()),
        }
    }

    /// Swap the backend, e.g. after the API key changed. Calls already
    /// running finish on the old one.
    pub fn replace_engine(&self, engine: ReplyEngine) {
        *self.engine.write() = engine;
    }

    fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        self.thread_locks
            .lock()
            .entry(id.to_string())
            .or_default()
            .clone()
    }

    fn begin(&self, id: &str, action: Action) -> Result<InFlight<'_>> {
        let key = (id.to_string(), action);
        if !self.in_flight.lock().insert(key.clone()) {
            log::warn!("{:?} already running for thread {}", action, id);
            return Err(AppError::Busy);
        }
        Ok(InFlight { manager: self, key })
    }

    fn epoch(&self, id: &str) -> u64 {
        self.epochs.lock().get(id).copied().unwrap_or(0)
    }

    /// The view for this thread went away; outstanding results are dropped.
    pub fn detach(&self, id: &str) {
        *self.epochs.lock().entry(id.to_string()).or_insert(0) += 1;
    }

    fn load(&self, id: &str) -> Result<Thread> {
        self.storage
            .lock()
            .get_thread(id)?
            .ok_or_else(|| AppError::ThreadNotFound(id.to_string()))
    }

    /// Read-modify-write one thread under its lock.
    fn update<F>(&self, id: &str, f: F) -> Result<Thread>
    where
        F: FnOnce(&mut Thread) -> Result<()>,
    {
        let lock = self.lock_for(id);
        let _held = lock.lock();
        let mut thread = self.load(id)?;
        f(&mut thread)?;
        self.storage.lock().save_thread(&thread)
    }

    pub fn list_threads(&self) -> Result<Vec<ThreadSummary>> {
        self.storage.lock().list_threads()
    }

    pub fn get_thread(&self, id: &str) -> Result<Thread> {
        self.load(id)
    }

    pub fn create_thread(&self, contact_name: &str) -> Result<Thread> {
        let thread = self.storage.lock().create_thread(contact_name)?;
        log::info!("Created thread {} ({})", thread.id, thread.contact_name);
        Ok(thread)
    }

    /// Blank names are ignored and the thread is returned unchanged.
    pub fn rename_thread(&self, id: &str, contact_name: &str) -> Result<Thread> {
        let name = contact_name.trim();
        if name.is_empty() {
            return self.load(id);
        }
        self.update(id, |t| {
            t.contact_name = name.to_string();
            Ok(())
        })
    }

    pub fn delete_thread(&self, id: &str) -> Result<()> {
        self.detach(id);
        {
            let lock = self.lock_for(id);
            let _held = lock.lock();
            self.storage.lock().delete_thread(id)?;
        }
        self.thread_locks.lock().remove(id);
        self.epochs.lock().remove(id);
        log::info!("Deleted thread {}", id);
        Ok(())
    }

    pub fn add_manual_turn(&self, id: &str) -> Result<Thread> {
        self.update(id, |t| {
            t.transcript.add_manual();
            Ok(())
        })
    }

    pub fn edit_turn(&self, id: &str, turn_id: &str, text: &str) -> Result<Thread> {
        self.update(id, |t| {
            t.transcript
                .edit(turn_id, text)
                .map(|_| ())
                .ok_or_else(|| AppError::TurnNotFound(turn_id.to_string()))
        })
    }

    pub fn remove_turn(&self, id: &str, turn_id: &str) -> Result<Thread> {
        self.update(id, |t| {
            t.transcript
                .remove(turn_id)
                .map(|_| ())
                .ok_or_else(|| AppError::TurnNotFound(turn_id.to_string()))
        })
    }

    pub fn toggle_speaker(&self, id: &str, turn_id: &str) -> Result<Thread> {
        self.update(id, |t| {
            t.transcript
                .toggle_speaker(turn_id)
                .map(|_| ())
                .ok_or_else(|| AppError::TurnNotFound(turn_id.to_string()))
        })
    }

    pub fn update_settings(&self, id: &str, settings: GenerationSettings) -> Result<Thread> {
        let settings = settings.normalized();
        self.update(id, |t| {
            t.settings = settings;
            Ok(())
        })
    }

    /// Read a screenshot and append its turns to the thread.
    ///
    /// Returns `None` when the thread was detached before extraction finished;
    /// nothing is written in that case.
    pub async fn extract_from_image(
        &self,
        id: &str,
        image: &ImagePayload,
    ) -> Result<Option<Thread>> {
        let _slot = self.begin(id, Action::Extract)?;
        let epoch = self.epoch(id);
        self.load(id)?;

        let engine = self.engine.read().clone();
        let turns: Vec<Turn> = engine.extract(image).await?;

        if self.epoch(id) != epoch {
            log::warn!("Discarding extraction for detached thread {}", id);
            return Ok(None);
        }

        self.update(id, |t| {
            t.transcript.extend(turns);
            Ok(())
        })
        .map(Some)
    }

    /// Generate replies for the thread's current transcript and settings.
    ///
    /// Returns `None` when the thread was detached before the backend
    /// answered; no settings are written back in that case.
    pub async fn generate_replies(&self, id: &str) -> Result<Option<GenerationOutcome>> {
        let _slot = self.begin(id, Action::Generate)?;
        let epoch = self.epoch(id);
        let thread = self.load(id)?;

        let engine = self.engine.read().clone();
        let run = engine
            .generate(&thread.transcript, &thread.settings)
            .await?;

        if self.epoch(id) != epoch {
            log::warn!("Discarding generated replies for detached thread {}", id);
            return Ok(None);
        }

        let settings = if run.applied.settings_update.is_some() {
            // Only spicy mode is written back, onto whatever is stored now.
            let saved = self.update(id, |t| {
                t.settings.spicy_mode = false;
                Ok(())
            })?;
            log::info!("Spicy mode disabled for thread {} after closure verdict", id);
            saved.settings
        } else {
            self.load(id)?.settings
        };

        let result = run.result;
        Ok(Some(GenerationOutcome {
            suggestions: run.applied.suggestions,
            avoid: result.avoid.unwrap_or_default(),
            mode: result.mode,
            detected_language: result.detected_language,
            safety_flags: result.safety_flags.into_iter().collect(),
            settings,
            notice: run.applied.notice.map(str::to_string),
        }))
    }
}
