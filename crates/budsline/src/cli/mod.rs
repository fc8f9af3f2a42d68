//! CLI subcommands — status line, watch loop, device controls, config.

mod config_cmd;
mod control;
mod status;
mod watch;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use budsline_lib::config::Config;
pub(super) use budsline_lib::control::{BudsController, EqualizerChange};
pub(super) use budsline_lib::error::Result;
pub(super) use budsline_lib::gateway::EarbudsCli;
pub(super) use budsline_lib::render::{DisplayResult, StatusRenderer};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {}", format_kv(key, value, w.saturating_sub(2)));
}

/// Load config from `--config` or the default location. Parse problems are
/// logged and fall back to defaults.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    config
}

/// Wire the process gateway and renderer from config.
pub(super) fn build_controller(config: &Config) -> Result<BudsController<EarbudsCli>> {
    let renderer = StatusRenderer::new(config.render_config()?);
    Ok(BudsController::new(EarbudsCli::from_config(config), renderer))
}

/// Render one status line: plain text, or a single-line JSON record.
pub(super) fn format_line(result: &DisplayResult, json: bool) -> Result<String> {
    if json {
        serde_json::to_string(result).map_err(|e| {
            budsline_lib::BudslineError::Config(format!("JSON serialization failed: {e}"))
        })
    } else {
        Ok(result.full_text.clone())
    }
}

pub(super) fn print_line(result: &DisplayResult, json: bool) -> Result<()> {
    println!("{}", format_line(result, json)?);
    Ok(())
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub problems: Vec<String>,
}

fn parse_touchpad(s: &str) -> std::result::Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "unlock" => Ok(true),
        "off" | "false" | "lock" => Ok(false),
        other => Err(format!("expected on/off, got \"{other}\"")),
    }
}

fn parse_equalizer(s: &str) -> std::result::Result<EqualizerChange, String> {
    s.parse().map_err(|e: budsline_lib::BudslineError| e.to_string())
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll the earbuds once and print the status line
    Status,

    /// Keep polling and print the status line whenever it changes
    Watch {
        /// Seconds between polls (default: interval_secs from config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Toggle ambient sound
    Ambient,

    /// Toggle active noise cancelling
    Anc,

    /// Set the equalizer preset (name, +1/next or -1/prev)
    Equalizer {
        #[arg(allow_hyphen_values = true, value_parser = parse_equalizer)]
        preset: EqualizerChange,
    },

    /// Unlock (on) or lock (off) the touchpad
    Touchpad {
        #[arg(value_parser = parse_touchpad, action = clap::ArgAction::Set)]
        state: bool,
    },

    /// Connect to the earbuds
    Connect,

    /// Disconnect from the earbuds
    Disconnect,

    /// Restart the earbuds background daemon
    RestartDaemon,

    /// Show current configuration and file paths
    Config,
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Status => status::cmd_status(json, config_path),
        Command::Watch { interval } => watch::cmd_watch(interval, json, config_path),
        Command::Ambient => control::cmd_control(control::Action::Ambient, json, config_path),
        Command::Anc => control::cmd_control(control::Action::Anc, json, config_path),
        Command::Equalizer { preset } => {
            control::cmd_control(control::Action::Equalizer(preset), json, config_path)
        }
        Command::Touchpad { state } => {
            control::cmd_control(control::Action::Touchpad(state), json, config_path)
        }
        Command::Connect => control::cmd_control(control::Action::Connect, json, config_path),
        Command::Disconnect => {
            control::cmd_control(control::Action::Disconnect, json, config_path)
        }
        Command::RestartDaemon => {
            control::cmd_control(control::Action::RestartDaemon, json, config_path)
        }
        Command::Config => config_cmd::cmd_config(json, config_path),
    }
}



#[cfg(test)]
mod arg_tests {
    use super::*;
    use budsline_lib::control::Step;
    use budsline_lib::snapshot::Equalizer;

    #[test]
    fn touchpad_values() {
        assert_eq!(parse_touchpad("on"), Ok(true));
        assert_eq!(parse_touchpad("TRUE"), Ok(true));
        assert_eq!(parse_touchpad("off"), Ok(false));
        assert_eq!(parse_touchpad("false"), Ok(false));
        assert!(parse_touchpad("maybe").is_err());
    }

    #[test]
    fn equalizer_values() {
        assert_eq!(
            parse_equalizer("-1"),
            Ok(EqualizerChange::Step(Step::Previous))
        );
        assert_eq!(parse_equalizer("next"), Ok(EqualizerChange::Step(Step::Next)));
        assert_eq!(
            parse_equalizer("bass"),
            Ok(EqualizerChange::Set(Equalizer::Bass))
        );
        assert!(parse_equalizer("loudness").is_err());
    }

    #[test]
    fn load_config_from_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "device_label = \"Buds Pro\"").unwrap();
        let config = load_config(Some(&path));
        assert_eq!(config.device_label, "Buds Pro");
    }

    #[test]
    fn build_controller_rejects_invalid_config() {
        let config = Config {
            start_color: "not-a-color".into(),
            ..Config::default()
        };
        assert!(build_controller(&config).is_err());
    }
}
