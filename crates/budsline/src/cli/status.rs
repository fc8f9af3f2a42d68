//! `status` subcommand — poll once and print the status line.

use std::path::Path;

use super::{Result, build_controller, load_config, print_line};

pub(super) fn cmd_status(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let controller = build_controller(&config)?;
    let result = controller.refresh()?;
    print_line(&result, json)
}
