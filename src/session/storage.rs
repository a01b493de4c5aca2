use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chat::{GenerationSettings, Transcript};
use crate::error::{AppError, Result};

pub const EMPTY_PREVIEW: &str = "New Conversation";
pub const NEW_THREAD_PREVIEW: &str = "No messages yet";
pub const DEFAULT_CONTACT_NAME: &str = "New Chat";

/// One conversation: who it is with, the transcript so far, and its settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub contact_name: String,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
    pub transcript: Transcript,
    pub settings: GenerationSettings,
    pub preview_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: String,
    pub contact_name: String,
    pub updated_at: i64,
    pub preview_text: String,
    pub spicy_mode: bool,
}

pub fn preview_for(transcript: &Transcript) -> String {
    transcript
        .last()
        .map(|t| t.text.clone())
        .unwrap_or_else(|| EMPTY_PREVIEW.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| AppError::PersistenceFailed(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| AppError::PersistenceFailed(e.to_string()))
}

type ThreadRow = (String, String, i64, String, String, String);

fn thread_from_row(row: ThreadRow) -> Result<Thread> {
    let (id, contact_name, updated_at, preview_text, transcript_json, settings_json) = row;
    Ok(Thread {
        id,
        contact_name,
        updated_at,
        preview_text,
        transcript: from_json(&transcript_json)?,
        settings: from_json(&settings_json)?,
    })
}

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| AppError::PersistenceFailed(format!("Failed to open database: {}", e)))?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS threads (
                id TEXT PRIMARY KEY,
                contact_name TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                preview_text TEXT NOT NULL,
                transcript_json TEXT NOT NULL,
                settings_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_threads_updated_at ON threads (updated_at);
            ",
        )
        .map_err(|e| AppError::PersistenceFailed(format!("Failed to create tables: {}", e)))?;

        Ok(Self { conn })
    }

    pub fn create_thread(&self, contact_name: &str) -> Result<Thread> {
        let name = contact_name.trim();
        let thread = Thread {
            id: uuid::Uuid::new_v4().to_string(),
            contact_name: if name.is_empty() {
                DEFAULT_CONTACT_NAME.to_string()
            } else {
                name.to_string()
            },
            updated_at: chrono::Utc::now().timestamp_millis(),
            transcript: Transcript::new(),
            settings: GenerationSettings::default(),
            preview_text: NEW_THREAD_PREVIEW.to_string(),
        };
        self.write(&thread)?;
        Ok(thread)
    }

    /// Upsert a thread, refreshing its preview text and timestamp.
    pub fn save_thread(&self, thread: &Thread) -> Result<Thread> {
        let saved = Thread {
            updated_at: chrono::Utc::now().timestamp_millis(),
            preview_text: preview_for(&thread.transcript),
            ..thread.clone()
        };
        self.write(&saved)?;
        Ok(saved)
    }

    fn write(&self, thread: &Thread) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO threads (id, contact_name, updated_at, preview_text, transcript_json, settings_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                thread.id,
                thread.contact_name,
                thread.updated_at,
                thread.preview_text,
                to_json(&thread.transcript)?,
                to_json(&thread.settings)?,
            ],
        )?;
        Ok(())
    }

    pub fn get_thread(&self, id: &str) -> Result<Option<Thread>> {
        let row: Option<ThreadRow> = self
            .conn
            .query_row(
                "SELECT id, contact_name, updated_at, preview_text, transcript_json, settings_json FROM threads WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(thread_from_row).transpose()
    }

    /// All threads, most recently updated first.
    pub fn list_threads(&self) -> Result<Vec<ThreadSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, contact_name, updated_at, preview_text, settings_json FROM threads ORDER BY updated_at DESC, rowid DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, contact_name, updated_at, preview_text, settings_json)| {
                let settings: GenerationSettings = from_json(&settings_json)?;
                Ok(ThreadSummary {
                    id,
                    contact_name,
                    updated_at,
                    preview_text,
                    spicy_mode: settings.spicy_mode,
                })
            })
            .collect()
    }

    /// Deleting an unknown id is not an error.
    pub fn delete_thread(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM threads WHERE id = ?1", params![id])?;
        Ok(())
    }
}
