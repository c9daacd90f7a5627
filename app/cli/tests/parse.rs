//! Tests for CLI argument parsing.

use clap::Parser;
use oopilot_cli::{Cli, Command};
use std::path::Path;

#[test]
fn cli_parse_configure() {
    let cli = Cli::parse_from(["oopilot", "configure", "deepseek-completion", "my-deepseek"]);
    match cli.command {
        Command::Configure { provider, nickname } => {
            assert_eq!(provider, "deepseek-completion");
            assert_eq!(nickname, "my-deepseek");
        }
        _ => panic!("expected Configure command"),
    }
}

#[test]
fn cli_parse_complete() {
    let cli = Cli::parse_from([
        "oopilot",
        "complete",
        "my-deepseek",
        "--prefix",
        "How",
        "--suffix",
        "are you?",
        "--max-tokens",
        "3",
        "--stop",
        "\n",
        "--stop",
        ";",
        "--temperature",
        "0.5",
    ]);
    let Command::Complete(cmd) = cli.command else {
        panic!("expected Complete command");
    };
    let request = cmd.request();
    assert_eq!(cmd.nickname, "my-deepseek");
    assert_eq!(request.prefix, "How");
    assert_eq!(request.suffix, "are you?");
    assert_eq!(request.max_tokens, 3);
    assert_eq!(request.stop, Some(vec!["\n".to_owned(), ";".to_owned()]));
    assert_eq!(request.temperature, Some(0.5));
}

#[test]
fn cli_parse_complete_defaults() {
    let cli = Cli::parse_from(["oopilot", "complete", "oai"]);
    let Command::Complete(cmd) = cli.command else {
        panic!("expected Complete command");
    };
    let request = cmd.request();
    assert_eq!(request.max_tokens, 128);
    assert!(request.stop.is_none());
    assert!(request.temperature.is_none());
    assert!(!request.cancel.is_cancelled());
}

#[test]
fn cli_parse_global_flags() {
    let cli = Cli::parse_from([
        "oopilot",
        "list",
        "--config",
        "/tmp/providers.toml",
        "--editor-dir",
        "/tmp/editor",
        "-vv",
    ]);
    assert!(matches!(cli.command, Command::List));
    assert_eq!(cli.config_path(), Path::new("/tmp/providers.toml"));
    assert_eq!(cli.editor_dir(), Path::new("/tmp/editor"));
    assert_eq!(cli.verbose, 2);
}

#[test]
fn cli_gate_skips_read_only_commands() {
    for (args, gated) in [
        (vec!["oopilot", "check"], true),
        (vec!["oopilot", "reload"], true),
        (vec!["oopilot", "complete", "x"], true),
        (vec!["oopilot", "list"], false),
        (vec!["oopilot", "providers"], false),
    ] {
        let cli = Cli::parse_from(args.clone());
        assert_eq!(cli.command.needs_gate(), gated, "{args:?}");
    }
}

#[test]
fn cli_rejects_missing_nickname() {
    assert!(Cli::try_parse_from(["oopilot", "configure", "deepseek-completion"]).is_err());
}
