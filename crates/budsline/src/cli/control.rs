//! Device control subcommands — toggles, equalizer, touchpad, connection.

use std::path::Path;

use super::{BudsController, EqualizerChange, Result, build_controller, load_config, print_line};
use budsline_lib::gateway::CommandGateway;

pub(super) enum Action {
    Ambient,
    Anc,
    Equalizer(EqualizerChange),
    Touchpad(bool),
    Connect,
    Disconnect,
    RestartDaemon,
}

/// Run one action. Setting changes print the refreshed status line;
/// connection commands print nothing on success.
fn apply<G: CommandGateway>(controller: &BudsController<G>, action: Action, json: bool) -> Result<()> {
    let refreshed = match action {
        Action::Ambient => controller.toggle_ambient_sound()?,
        Action::Anc => controller.toggle_noise_reduction()?,
        Action::Equalizer(change) => controller.set_equalizer(change)?,
        Action::Touchpad(enabled) => controller.set_touchpad(enabled)?,
        Action::Connect => return controller.connect(),
        Action::Disconnect => return controller.disconnect(),
        Action::RestartDaemon => return controller.restart_daemon(),
    };
    print_line(&refreshed, json)
}

pub(super) fn cmd_control(action: Action, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let controller = build_controller(&config)?;
    apply(&controller, action, json)
}
