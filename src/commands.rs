//! Tauri commands for the desktop front-end. Errors cross the bridge as
//! plain user-facing strings.

use parking_lot::Mutex;
use std::sync::Arc;
use tauri::Manager;

use crate::capture::ImagePayload;
use crate::chat::GenerationSettings;
use crate::config::AppConfig;
use crate::session::{GenerationOutcome, Thread, ThreadManager, ThreadSummary};

type ConfigState = Arc<Mutex<AppConfig>>;
type ManagerState = Arc<ThreadManager>;

#[tauri::command]
pub fn get_config(config: tauri::State<'_, ConfigState>) -> AppConfig {
    config.lock().clone()
}

#[tauri::command]
pub fn update_config(
    app: tauri::AppHandle,
    config_state: tauri::State<'_, ConfigState>,
    manager: tauri::State<'_, ManagerState>,
    new_config: AppConfig,
) -> Result<(), String> {
    let app_data = app
        .path()
        .app_data_dir()
        .map_err(|e: tauri::Error| e.to_string())?;
    new_config.save(&app_data).map_err(|e| e.to_string())?;
    manager.replace_engine(crate::gemini_engine(&new_config));
    *config_state.lock() = new_config;
    Ok(())
}

#[tauri::command]
pub fn startup_notice(config: tauri::State<'_, ConfigState>) -> Option<String> {
    config.lock().startup_notice()
}

#[tauri::command]
pub fn list_threads(manager: tauri::State<'_, ManagerState>) -> Result<Vec<ThreadSummary>, String> {
    manager.list_threads().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_thread(manager: tauri::State<'_, ManagerState>, id: String) -> Result<Thread, String> {
    manager.get_thread(&id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn create_thread(
    manager: tauri::State<'_, ManagerState>,
    contact_name: String,
) -> Result<Thread, String> {
    manager.create_thread(&contact_name).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn rename_thread(
    manager: tauri::State<'_, ManagerState>,
    id: String,
    contact_name: String,
) -> Result<Thread, String> {
    manager
        .rename_thread(&id, &contact_name)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn delete_thread(manager: tauri::State<'_, ManagerState>, id: String) -> Result<(), String> {
    manager.delete_thread(&id).map_err(|e| e.to_string())
}

/// The thread view is being torn down; late results for it are dropped.
#[tauri::command]
pub fn close_thread(manager: tauri::State<'_, ManagerState>, id: String) {
    manager.detach(&id);
}

#[tauri::command]
pub fn add_manual_turn(manager: tauri::State<'_, ManagerState>, id: String) -> Result<Thread, String> {
    manager.add_manual_turn(&id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn edit_turn(
    manager: tauri::State<'_, ManagerState>,
    id: String,
    turn_id: String,
    text: String,
) -> Result<Thread, String> {
    manager
        .edit_turn(&id, &turn_id, &text)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn remove_turn(
    manager: tauri::State<'_, ManagerState>,
    id: String,
    turn_id: String,
) -> Result<Thread, String> {
    manager.remove_turn(&id, &turn_id).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn toggle_speaker(
    manager: tauri::State<'_, ManagerState>,
    id: String,
    turn_id: String,
) -> Result<Thread, String> {
    manager
        .toggle_speaker(&id, &turn_id)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn update_settings(
    manager: tauri::State<'_, ManagerState>,
    id: String,
    settings: GenerationSettings,
) -> Result<Thread, String> {
    manager
        .update_settings(&id, settings)
        .map_err(|e| e.to_string())
}

/// `image` is a data URL from the front-end file reader.
#[tauri::command]
pub async fn extract_from_image(
    manager: tauri::State<'_, ManagerState>,
    id: String,
    image: String,
) -> Result<Option<Thread>, String> {
    let manager = manager.inner().clone();
    let payload = ImagePayload::from_data_url(&image).map_err(|e| e.to_string())?;
    manager
        .extract_from_image(&id, &payload)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn generate_replies(
    manager: tauri::State<'_, ManagerState>,
    id: String,
) -> Result<Option<GenerationOutcome>, String> {
    let manager = manager.inner().clone();
    manager
        .generate_replies(&id)
        .await
        .map_err(|e| e.to_string())
}
