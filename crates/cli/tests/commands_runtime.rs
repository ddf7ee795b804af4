use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use registrar_cli::commands::register::RegisterArgs;
use registrar_cli::commands::{config, login, logout, profile, register, status, validate};
use registrar_core::config::AppConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_FORM: &str = r#"
terms_accepted = false

[company]
company_name = "Acme Corp"
industry = "technology"
company_size = "11-50"
tax_id = "12-3456789"
phone = "+1 555 0100"

[company.address]
street = "1 Main St"
city = "Springfield"
state = "IL"
zip_code = "62701"
country = "US"

[user]
first_name = "Ada"
last_name = "Lovelace"
email = "ada@acme.example"
password = "Abcdef1$"
confirm_password = "Abcdef1$"
role = "admin"
department = "it"
job_title = "CTO"
phone = "+1 555 0101"
"#;

fn write_form(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("company.toml");
    fs::write(&path, contents).expect("form file should be writable");
    path
}

fn config_for(base_url: &str, dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;
    config.session.store_path = dir.join("session.json");
    config
}

#[test]
fn validate_accepts_complete_form_with_terms() {
    let dir = TempDir::new().expect("tempdir");
    let form = write_form(&dir, &VALID_FORM.replace("terms_accepted = false", "terms_accepted = true"));

    let result = validate::run(&form, &[]);
    assert_eq!(result.exit_code, 0, "expected valid form");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "validate");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["details"]["company"]["industry"], "Technology");
    assert_eq!(payload["details"]["administrator"]["name"], "Ada Lovelace");
    assert_eq!(payload["details"]["administrator"]["department"], "Information Technology");
}

#[test]
fn validate_reports_field_errors_and_first_invalid_step() {
    let dir = TempDir::new().expect("tempdir");
    let form = write_form(
        &dir,
        &VALID_FORM.replace("company_name = \"Acme Corp\"", "").replace("Abcdef1$\"\nrole", "Abcdef1%\"\nrole"),
    );

    let result = validate::run(&form, &[]);
    assert_eq!(result.exit_code, 4, "expected validation failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "validation");
    assert_eq!(payload["details"]["errors"]["companyName"], "Company name is required");
    assert_eq!(payload["details"]["errors"]["confirmPassword"], "Passwords do not match");
    assert_eq!(
        payload["details"]["errors"]["terms"],
        "You must accept the terms and conditions"
    );
    assert_eq!(payload["details"]["first_invalid_step"], 1);
}

#[test]
fn validate_reports_unreadable_form_as_input_error() {
    let result = validate::run(Path::new("does/not/exist.toml"), &[]);
    assert_eq!(result.exit_code, 3);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "form_input");
}

#[tokio::test]
async fn register_submits_once_and_stores_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Company registered successfully",
            "token": "t",
            "user": { "id": 7, "first_name": "Ada", "last_name": "Lovelace" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let form = write_form(&dir, VALID_FORM);
    let document = dir.path().join("license.pdf");
    fs::write(&document, b"%PDF-1.4").expect("document should be writable");
    let config = config_for(&server.uri(), dir.path());

    let args = RegisterArgs { form, documents: vec![document], accept_terms: true };
    let result = register::run(&config, &args).await;
    assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["message"], "Company registered successfully");
    assert_eq!(payload["details"]["session_established"], true);

    let status = parse_payload(&status::run(&config).output);
    assert_eq!(status["details"]["view"], "dashboard");
    assert_eq!(status["details"]["user"]["id"], 7);
}

#[tokio::test]
async fn register_surfaces_server_rejection_as_submit_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "email taken" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let config = config_for(&server.uri(), dir.path());
    let args =
        RegisterArgs { form: write_form(&dir, VALID_FORM), documents: Vec::new(), accept_terms: true };

    let result = register::run(&config, &args).await;
    assert_eq!(result.exit_code, 5);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "remote");
    assert_eq!(payload["details"]["errors"], json!({ "submit": "email taken" }));

    let status = parse_payload(&status::run(&config).output);
    assert_eq!(status["details"]["view"], "registration");
}

#[tokio::test]
async fn register_stops_at_the_first_invalid_step_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let config = config_for(&server.uri(), dir.path());
    let form = write_form(&dir, &VALID_FORM.replace("email = \"ada@acme.example\"", "email = \"ada\""));
    let args = RegisterArgs { form, documents: Vec::new(), accept_terms: true };

    let result = register::run(&config, &args).await;
    assert_eq!(result.exit_code, 4);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["details"]["step"], 2);
    assert_eq!(payload["details"]["errors"]["email"], "Please enter a valid email address");
}

#[tokio::test]
async fn register_without_terms_fails_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(201)).expect(0).mount(&server).await;

    let dir = TempDir::new().expect("tempdir");
    let config = config_for(&server.uri(), dir.path());
    let args =
        RegisterArgs { form: write_form(&dir, VALID_FORM), documents: Vec::new(), accept_terms: false };

    let result = register::run(&config, &args).await;
    assert_eq!(result.exit_code, 4);

    let payload = parse_payload(&result.output);
    assert_eq!(
        payload["details"]["errors"],
        json!({ "terms": "You must accept the terms and conditions" })
    );
}

#[tokio::test]
async fn login_then_logout_round_trips_the_session_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt",
            "user": { "id": 7, "first_name": "Ada", "last_name": "Lovelace" }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let config = config_for(&server.uri(), dir.path());

    let result = login::run(&config, "ada@acme.example", Some("Abcdef1$")).await;
    assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);
    assert_eq!(parse_payload(&result.output)["message"], "logged in as Ada Lovelace");
    assert!(config.session.store_path.exists());

    let result = logout::run(&config);
    assert_eq!(result.exit_code, 0);
    let status = parse_payload(&status::run(&config).output);
    assert_eq!(status["details"]["authenticated"], false);
}

#[tokio::test]
async fn login_requires_a_password() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_for("http://127.0.0.1:1", dir.path());

    let result = login::run(&config, "ada@acme.example", None).await;
    assert_eq!(result.exit_code, 3);
    assert_eq!(parse_payload(&result.output)["error_class"], "form_input");
}

#[tokio::test]
async fn profile_without_session_is_auth_required() {
    let dir = TempDir::new().expect("tempdir");
    let config = config_for("http://127.0.0.1:1", dir.path());

    let result = profile::run(&config).await;
    assert_eq!(result.exit_code, 7);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "auth_required");
    assert_eq!(payload["message"], "No authentication token available");
}

#[test]
fn config_reports_env_source_attribution() {
    with_env(&[("REGISTRAR_API_BASE_URL", "http://from-env:8080")], || {
        let loaded = AppConfig::load(registrar_core::config::LoadOptions::default())
            .expect("config should load from env");
        let result = config::run(&loaded, None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains(
            "- api.base_url = http://from-env:8080 (source: env (REGISTRAR_API_BASE_URL))"
        ));
        assert_eq!(payload["details"][0]["key"], "api.base_url");
    });
}

#[test]
fn blank_env_value_is_not_reported_as_the_source() {
    with_env(&[("REGISTRAR_API_BASE_URL", "  ")], || {
        let loaded = AppConfig::load(registrar_core::config::LoadOptions::default())
            .expect("blank env value falls back to the default");
        let result = config::run(&loaded, None);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["details"][0]["key"], "api.base_url");
        assert_eq!(payload["details"][0]["value"], "http://localhost:8080");
        assert_eq!(payload["details"][0]["source"], "default");
    });
}

#[test]
fn invalid_env_config_is_rejected_before_commands_run() {
    with_env(&[("REGISTRAR_API_BASE_URL", "not a url")], || {
        let error = AppConfig::load(registrar_core::config::LoadOptions::default())
            .expect_err("config should fail validation");
        let result = registrar_cli::commands::CommandResult::from_error("status", &error.into());
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "REGISTRAR_API_BASE_URL",
        "REGISTRAR_API_TIMEOUT_SECS",
        "REGISTRAR_SESSION_STORE_PATH",
        "REGISTRAR_LOGGING_LEVEL",
        "REGISTRAR_LOGGING_FORMAT",
        "REGISTRAR_LOG_LEVEL",
        "REGISTRAR_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
