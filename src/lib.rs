pub mod ai;
pub mod capture;
pub mod chat;
pub mod config;
pub mod error;
pub mod session;

#[cfg(feature = "desktop")]
mod commands;

use std::path::Path;
use std::sync::Arc;

use ai::gemini::GeminiClient;
use ai::replies::ReplyEngine;
use config::AppConfig;
use session::{Storage, ThreadManager};

/// Log to stderr, `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Reply engine backed by Gemini with the configured credentials.
pub fn gemini_engine(config: &AppConfig) -> ReplyEngine {
    ReplyEngine::new(Arc::new(GeminiClient::from_config(config)))
}

/// Open the thread store under `app_data` and wire it to the reply engine.
pub fn open_manager(app_data: &Path, config: &AppConfig) -> error::Result<ThreadManager> {
    let storage = Storage::new(&config.database_path(app_data))?;
    Ok(ThreadManager::new(storage, gemini_engine(config)))
}

/// Same wiring outside the desktop shell, rooted at the platform data dir.
pub fn open_default_manager() -> error::Result<(AppConfig, ThreadManager)> {
    let app_data = config::default_data_dir();
    std::fs::create_dir_all(&app_data)
        .map_err(|e| error::AppError::PersistenceFailed(e.to_string()))?;
    let app_config = AppConfig::load(&app_data);
    let manager = open_manager(&app_data, &app_config)?;
    Ok((app_config, manager))
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use parking_lot::Mutex;
    use tauri::Manager;

    init_logging();

    tauri::Builder::default()
        .setup(|app| {
            let app_data = app.path().app_data_dir()?;
            std::fs::create_dir_all(&app_data)?;

            let app_config = AppConfig::load(&app_data);
            if let Some(notice) = app_config.startup_notice() {
                log::warn!("{}", notice);
            }

            let manager = open_manager(&app_data, &app_config)?;
            app.manage(Arc::new(Mutex::new(app_config)));
            app.manage(Arc::new(manager));

            log::info!("RizzReplier initialized. Data dir: {}", app_data.display());
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Config
            commands::get_config,
            commands::update_config,
            commands::startup_notice,
            // Threads
            commands::list_threads,
            commands::get_thread,
            commands::create_thread,
            commands::rename_thread,
            commands::delete_thread,
            commands::close_thread,
            // Transcript editing
            commands::add_manual_turn,
            commands::edit_turn,
            commands::remove_turn,
            commands::toggle_speaker,
            commands::update_settings,
            // AI
            commands::extract_from_image,
            commands::generate_replies,
        ])
        .run(tauri::generate_context!())
        .expect("error while running RizzReplier");
}
