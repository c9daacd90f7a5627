//! Tests for the editor host probes.

use ocore::gate::{self, Environment, Verdict};
use oopilot_cli::EditorHost;
use oopilot_cli::host::{CONFLICTING_EXTENSION, FEATURE_ID};
use std::path::Path;

fn write_argv(dir: &Path, contents: &str) {
    std::fs::write(dir.join("argv.json"), contents).unwrap();
}

#[tokio::test]
async fn missing_argv_requires_restart() {
    let dir = tempfile::tempdir().unwrap();
    let host = EditorHost::new(dir.path());

    assert!(host.probe_capability().await.is_err());
    assert_eq!(gate::evaluate(&host).await, Verdict::RestartRequired);
}

#[tokio::test]
async fn listed_feature_passes_with_comments() {
    let dir = tempfile::tempdir().unwrap();
    write_argv(
        dir.path(),
        r#"// This configuration file allows you to pass permanent command line arguments.
{
    // Use software rendering instead of hardware accelerated rendering.
    "disable-hardware-acceleration": true,
    "enable-proposed-api": ["oopilot.oopilot"]
}"#,
    );
    let host = EditorHost::new(dir.path());

    host.probe_capability().await.unwrap();
    assert_eq!(gate::evaluate(&host).await, Verdict::Ok);
}

#[tokio::test]
async fn trailing_comments_and_commas_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    write_argv(
        dir.path(),
        "{\"enable-proposed-api\": [\"oopilot.oopilot\"], // enable oopilot\n \"locale\": \"en\",\n}",
    );
    let host = EditorHost::new(dir.path());

    host.probe_capability().await.unwrap();
    assert_eq!(gate::evaluate(&host).await, Verdict::Ok);
}

#[tokio::test]
async fn trailing_comma_in_feature_list_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    write_argv(
        dir.path(),
        r#"{
    /* block comments too */
    "enable-proposed-api": [
        "someone.else",
        "oopilot.oopilot",
    ],
}"#,
    );
    let host = EditorHost::new(dir.path());

    assert!(host.proposed_api_enabled().unwrap());
}

#[test]
fn argv_that_is_not_an_object_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_argv(dir.path(), r#"["oopilot.oopilot"]"#);

    assert!(EditorHost::new(dir.path()).proposed_api_enabled().is_err());
}

#[tokio::test]
async fn conflict_is_reported_after_capability() {
    let dir = tempfile::tempdir().unwrap();
    write_argv(dir.path(), r#"{"enable-proposed-api": ["oopilot.oopilot"]}"#);
    std::fs::create_dir_all(dir.path().join("extensions/github.copilot-1.250.0")).unwrap();
    std::fs::create_dir_all(dir.path().join("extensions/github.copilot-chat-0.24.0")).unwrap();
    let host = EditorHost::new(dir.path());

    assert_eq!(
        gate::evaluate(&host).await,
        Verdict::ConflictingFeatureActive {
            extension: CONFLICTING_EXTENSION.into()
        }
    );
    assert_eq!(host.conflicting_extension().as_deref(), Some(CONFLICTING_EXTENSION));
}

#[tokio::test]
async fn chat_extension_alone_is_not_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("extensions/github.copilot-chat-0.24.0")).unwrap();
    let host = EditorHost::new(dir.path());

    assert_eq!(host.conflicting_extension(), None);
}

#[test]
fn enabling_proposed_api_keeps_other_arguments() {
    let dir = tempfile::tempdir().unwrap();
    write_argv(
        dir.path(),
        r#"{"locale": "en", "enable-proposed-api": ["someone.else"]}"#,
    );
    let host = EditorHost::new(dir.path());

    assert!(host.enable_proposed_api().unwrap());
    assert!(!host.enable_proposed_api().unwrap());
    assert!(host.proposed_api_enabled().unwrap());

    let argv: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(host.argv_path()).unwrap()).unwrap();
    assert_eq!(argv["locale"], "en");
    assert_eq!(
        argv["enable-proposed-api"],
        serde_json::json!(["someone.else", FEATURE_ID])
    );
}

#[test]
fn enabling_proposed_api_creates_argv() {
    let dir = tempfile::tempdir().unwrap();
    let host = EditorHost::new(dir.path().join("editor"));

    assert!(host.enable_proposed_api().unwrap());
    assert!(host.proposed_api_enabled().unwrap());
    assert!(!host.backup_path().exists());
}

#[test]
fn enabling_proposed_api_backs_up_commented_argv() {
    let dir = tempfile::tempdir().unwrap();
    let original = "// user settings\n{\n    \"locale\": \"en\", // keep\n}\n";
    write_argv(dir.path(), original);
    let host = EditorHost::new(dir.path());

    assert!(host.enable_proposed_api().unwrap());
    assert!(host.proposed_api_enabled().unwrap());
    assert_eq!(std::fs::read_to_string(host.backup_path()).unwrap(), original);

    let argv: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(host.argv_path()).unwrap()).unwrap();
    assert_eq!(argv["locale"], "en");
    assert_eq!(argv["enable-proposed-api"], serde_json::json!([FEATURE_ID]));
}
