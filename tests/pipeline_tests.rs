mod common;

use common::{FOOTBALL_CSV, football_answer, sse_body, text_block};
use huskers_schedule::cli::Args;
use huskers_schedule::commands::{SportStatus, handle_fetch_command};
use huskers_schedule::config::{BasePaths, Config};
use huskers_schedule::constants::env_vars;
use huskers_schedule::error::AppError;
use serde_json::json;
use serial_test::serial;
use std::path::Path;
use tempfile::{TempDir, tempdir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn clear_env() {
    unsafe {
        std::env::remove_var(env_vars::API_KEY);
        std::env::remove_var(env_vars::OUTPUT_DIR);
        std::env::remove_var(env_vars::API_BASE_URL);
        std::env::remove_var(env_vars::LOG_FILE);
    }
}

/// Lays out a base directory talking to `api_base_url`.
fn base_dir(api_base_url: &str, sports: serde_json::Value) -> TempDir {
    let dir = tempdir().unwrap();
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        json!({
            "api_base_url": api_base_url,
            "delay_between_sports_seconds": 0,
            "http_timeout_seconds": 10
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(config_dir.join("sports.json"), sports.to_string()).unwrap();
    std::fs::write(
        dir.path().join("prompt-schedule-getter.txt"),
        "Find the 2025-26 Nebraska {{SPORT_NAME}} schedule. Return it as ```csv:{{FILENAME}}```.",
    )
    .unwrap();
    dir
}

fn sse(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

fn tmp_files(base: &Path) -> Vec<String> {
    std::fs::read_dir(base.join("tmp"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
#[serial]
async fn test_fetch_run_writes_csv_and_page() {
    clear_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(sse(sse_body(
            "msg_football",
            &[text_block(&football_answer())],
            "end_turn",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = base_dir(
        &server.uri(),
        json!({"sports": [{"name": "Football", "filename": "Football.csv"}]}),
    );
    let paths = BasePaths::new(dir.path());
    unsafe {
        std::env::set_var(env_vars::API_KEY, "sk-ant-test");
    }

    let config = Config::load(&paths).await.unwrap();
    let summary = handle_fetch_command(&Args::default(), &config, &paths)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert!(matches!(
        summary.reports[0].status,
        SportStatus::Saved { .. }
    ));

    let csv = std::fs::read_to_string(dir.path().join("output/Football.csv")).unwrap();
    assert_eq!(csv, FOOTBALL_CSV.trim());

    let html = std::fs::read_to_string(dir.path().join("output/index.html")).unwrap();
    assert!(html.contains("Cincinnati"));
    assert!(html.contains("<span class=\"result-win\">W 20-17</span>"));
    assert!(html.contains("<tr class=\"game-upcoming home-game\">"));

    let raw = tmp_files(dir.path());
    assert_eq!(raw.len(), 1);
    assert!(raw[0].starts_with("response_football_"));

    // The prompt went out with both placeholders filled in
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Nebraska Football schedule"));
    assert!(prompt.contains("```csv:Football.csv```"));

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_fetch_run_without_blocks_fails_but_keeps_raw_text() {
    clear_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse(sse_body(
            "msg_none",
            &[text_block("I could not find a published schedule.")],
            "end_turn",
        )))
        .mount(&server)
        .await;

    let dir = base_dir(
        &server.uri(),
        json!([{"name": "Volleyball", "filename": "Volleyball.csv"}]),
    );
    let paths = BasePaths::new(dir.path());
    unsafe {
        std::env::set_var(env_vars::API_KEY, "sk-ant-test");
    }

    let config = Config::load(&paths).await.unwrap();
    let summary = handle_fetch_command(&Args::default(), &config, &paths)
        .await
        .unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.reports[0].status, SportStatus::NoFiles);

    let raw = tmp_files(dir.path());
    assert_eq!(raw.len(), 1);
    let saved = std::fs::read_to_string(dir.path().join("tmp").join(&raw[0])).unwrap();
    assert_eq!(saved, "I could not find a published schedule.");

    // The page is still produced, with a placeholder
    let html = std::fs::read_to_string(dir.path().join("output/index.html")).unwrap();
    assert!(html.contains("Schedule not yet available"));

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_sport_filter_fetches_only_named_sport() {
    clear_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse(sse_body(
            "msg_football",
            &[text_block(&football_answer())],
            "end_turn",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = base_dir(
        &server.uri(),
        json!([
            {"name": "Football", "filename": "Football.csv"},
            {"name": "Baseball", "filename": "Baseball.csv"}
        ]),
    );
    let paths = BasePaths::new(dir.path());
    unsafe {
        std::env::set_var(env_vars::API_KEY, "sk-ant-test");
    }

    let args = Args {
        sports: vec!["football".to_string()],
        ..Args::default()
    };
    let config = Config::load(&paths).await.unwrap();
    let summary = handle_fetch_command(&args, &config, &paths).await.unwrap();

    assert_eq!(summary.reports.len(), 1);
    assert!(summary.is_success());

    // Both configured sports are on the page
    let html = std::fs::read_to_string(dir.path().join("output/index.html")).unwrap();
    assert!(html.contains("<!-- FOOTBALL -->"));
    assert!(html.contains("<!-- BASEBALL -->"));

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_missing_credential_stops_before_any_request() {
    clear_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = base_dir(
        &server.uri(),
        json!([{"name": "Football", "filename": "Football.csv"}]),
    );
    let paths = BasePaths::new(dir.path());

    let config = Config::load(&paths).await.unwrap();
    let error = handle_fetch_command(&Args::default(), &config, &paths)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::MissingCredential(_)));
    assert!(error.is_startup_fatal());
    assert!(!dir.path().join("output").exists());
}

#[tokio::test]
#[serial]
async fn test_missing_prompt_stops_before_any_request() {
    clear_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = base_dir(
        &server.uri(),
        json!([{"name": "Football", "filename": "Football.csv"}]),
    );
    std::fs::remove_file(dir.path().join("prompt-schedule-getter.txt")).unwrap();
    let paths = BasePaths::new(dir.path());
    unsafe {
        std::env::set_var(env_vars::API_KEY, "sk-ant-test");
    }

    let config = Config::load(&paths).await.unwrap();
    let error = handle_fetch_command(&Args::default(), &config, &paths)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::PromptTemplate(_)));

    clear_env();
}
