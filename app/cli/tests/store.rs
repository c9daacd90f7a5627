//! Tests for the TOML provider store.

use ocore::{BackendConfig, ConfigStore, DeepSeekConfig, OpenAIConfig, ProviderConfig};
use oopilot_cli::TomlStore;

fn deepseek(nickname: &str) -> ProviderConfig {
    ProviderConfig {
        nickname: nickname.into(),
        model: "modelA".into(),
        context_window: 64000,
        backend: BackendConfig::DeepSeek(DeepSeekConfig {
            api_key: "sk-test".into(),
            base_url: "https://api.example.com/v1".into(),
            beta_url: "https://api.example.com/beta".into(),
        }),
    }
}

fn openai(nickname: &str) -> ProviderConfig {
    ProviderConfig {
        nickname: nickname.into(),
        model: "gpt-3.5-turbo-instruct".into(),
        context_window: 4096,
        backend: BackendConfig::OpenAI(OpenAIConfig {
            api_key: "sk-oai".into(),
            base_url: "https://api.openai.com/v1".into(),
        }),
    }
}

#[test]
fn missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = TomlStore::new(dir.path().join("providers.toml"));

    assert!(store.get("my-deepseek").unwrap().is_none());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("providers.toml");
    let store = TomlStore::new(&path);

    store.set("my-deepseek", &deepseek("my-deepseek")).unwrap();
    store.set("oai", &openai("oai")).unwrap();

    let reopened = TomlStore::new(&path);
    assert_eq!(reopened.get("my-deepseek").unwrap(), Some(deepseek("my-deepseek")));
    assert_eq!(reopened.get("oai").unwrap(), Some(openai("oai")));
    assert_eq!(reopened.list().unwrap().len(), 2);
}

#[test]
fn file_holds_one_table_per_nickname() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.toml");
    TomlStore::new(&path)
        .set("my-deepseek", &deepseek("my-deepseek"))
        .unwrap();

    let table: toml::Table = std::fs::read_to_string(&path).unwrap().parse().unwrap();
    let record = table["my-deepseek"].as_table().unwrap();
    assert_eq!(record["providerId"].as_str(), Some("deepseek-completion"));
    assert_eq!(record["betaUrl"].as_str(), Some("https://api.example.com/beta"));
    assert_eq!(record["contextWindow"].as_integer(), Some(64000));
}

#[test]
fn overwrite_replaces_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = TomlStore::new(dir.path().join("providers.toml"));
    store.set("shared", &deepseek("shared")).unwrap();

    store.set("shared", &openai("shared")).unwrap();

    assert_eq!(store.get("shared").unwrap(), Some(openai("shared")));
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn rejects_record_under_other_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = TomlStore::new(dir.path().join("providers.toml"));

    assert!(store.set("b", &deepseek("a")).is_err());
    assert!(!store.path().exists());
}

#[test]
fn malformed_file_is_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.toml");
    std::fs::write(&path, "not = [valid").unwrap();

    let err = TomlStore::new(&path).get("x").unwrap_err();
    assert!(matches!(err, ocore::Error::Store(_)));
}

#[test]
fn concurrent_writers_keep_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("providers.toml");

    let writers: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|prefix| {
            let store = TomlStore::new(&path);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let nickname = format!("{prefix}-{i}");
                    store.set(&nickname, &deepseek(&nickname)).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let records = TomlStore::new(&path).list().unwrap();
    assert_eq!(records.len(), 100);
}
