use rizz_replier_lib::config::{self, AppConfig};
use rizz_replier_lib::error::AppError;
use rizz_replier_lib::{open_default_manager, open_manager};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn candidate(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        gemini_api_key: "test-key".into(),
        gemini_model: "gemini-test".into(),
        gemini_base_url: server.uri(),
        ..Default::default()
    }
}

#[tokio::test]
async fn refusal_then_closure_turns_spicy_off_for_good() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"{
                "mode": "closure",
                "detected_language": "en",
                "safety_flags": ["disinterest"],
                "suggestions": [{"label": "Safe", "text": "no worries, take care!"}],
                "avoid": [{"text": "come on", "reason": "pushy"}]
            }"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let manager = open_manager(dir.path(), &config_for(&server)).unwrap();

    let thread = manager.create_thread("Jeremy").unwrap();
    let thread = manager.add_manual_turn(&thread.id).unwrap();
    let turn_id = thread.transcript.turns[0].id.clone();
    manager
        .edit_turn(&thread.id, &turn_id, "please stop texting me")
        .unwrap();
    let mut settings = thread.settings.clone();
    settings.spicy_mode = true;
    manager.update_settings(&thread.id, settings).unwrap();

    let outcome = manager.generate_replies(&thread.id).await.unwrap().unwrap();
    assert_eq!(outcome.suggestions.len(), 1);
    assert_eq!(outcome.suggestions[0].text, "no worries, take care!");
    assert_eq!(outcome.avoid[0].reason, "pushy");
    assert!(outcome.notice.is_some());

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("- Intent: Close politely"));
    assert!(prompt.contains("Be friendly and helpful"));
    assert_eq!(body["generationConfig"]["temperature"], json!(0.75));

    let stored = manager.get_thread(&thread.id).unwrap();
    assert!(!stored.settings.spicy_mode);
    assert_eq!(stored.preview_text, "please stop texting me");

    let listed = manager.list_threads().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].spicy_mode);
}

#[tokio::test]
async fn schema_violation_withholds_suggestions_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"{"mode":"normal","detected_language":"en"}"#,
        )))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let manager = open_manager(dir.path(), &config_for(&server)).unwrap();
    let thread = manager.create_thread("Sam").unwrap();
    let thread = manager.add_manual_turn(&thread.id).unwrap();

    let err = manager.generate_replies(&thread.id).await.unwrap_err();
    assert!(matches!(err, AppError::GenerationFailed { .. }));
    assert_eq!(err.to_string(), "Failed to generate replies. Please try again.");
    assert_eq!(manager.get_thread(&thread.id).unwrap().transcript.len(), 1);
}

#[tokio::test]
async fn store_survives_reopen() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server);

    let id = {
        let manager = open_manager(dir.path(), &config).unwrap();
        let t = manager.create_thread("Kim").unwrap();
        manager.rename_thread(&t.id, "Kimberly").unwrap();
        t.id
    };

    let manager = open_manager(dir.path(), &config).unwrap();
    assert_eq!(manager.get_thread(&id).unwrap().contact_name, "Kimberly");
}

#[cfg(unix)]
#[test]
fn headless_manager_lives_under_platform_data_dir() {
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::set_var("XDG_DATA_HOME", home.path().join("share"));

    let (app_config, manager) = open_default_manager().unwrap();
    let data_dir = config::default_data_dir();
    assert!(data_dir.starts_with(home.path()));
    assert!(data_dir.join("config.json").exists());
    assert!(app_config.database_path(&data_dir).exists());

    let t = manager.create_thread("Robin").unwrap();
    assert_eq!(manager.list_threads().unwrap()[0].id, t.id);
}
