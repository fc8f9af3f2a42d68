//! `config` subcommand — show current configuration and file paths.

use std::path::Path;

use budsline_lib::color::parse_color;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width, load_config};

fn color_display(value: &str) -> String {
    match parse_color(value) {
        Ok(c) => format!("{value} -> {c}"),
        Err(_) => format!("{value} (invalid)"),
    }
}

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());
    let problems: Vec<String> = match config.validate() {
        Ok(()) => vec![],
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            problems,
        };
        let json_str = serde_json::to_string_pretty(&output).map_err(|e| {
            budsline_lib::BudslineError::Config(format!("JSON serialization failed: {e}"))
        })?;
        println!("{json_str}");
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "earbuds_binary:",
            "device_label:",
            "battery_limit:",
            "battery_drift_threshold:",
            "start_color:",
            "end_color:",
            "disconnected_color:",
            "command_timeout_ms:",
            "interval_secs:",
        ],
    );

    match &config_path {
        Some(p) if config_exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("earbuds_binary:", &config.earbuds_binary, w);
    kv_indent("device_label:", &config.device_label, w);
    kv_indent("battery_limit:", config.battery_limit, w);
    kv_indent("battery_drift_threshold:", config.battery_drift_threshold, w);
    kv_indent("start_color:", color_display(&config.start_color), w);
    kv_indent("end_color:", color_display(&config.end_color), w);
    kv_indent("disconnected_color:", color_display(&config.disconnected_color), w);
    kv_indent("command_timeout_ms:", config.command_timeout_ms, w);
    kv_indent("interval_secs:", config.interval_secs, w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}
