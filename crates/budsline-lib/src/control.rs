//! Control actions — one `earbuds` command each, followed by a fresh poll.
//!
//! Nothing is cached between calls: toggles read the current value from the
//! device right before flipping it, and the returned [`DisplayResult`] comes
//! from a new poll rather than an assumed post-condition.

use std::fmt;
use std::str::FromStr;

use crate::error::{BudslineError, Result};
use crate::gateway::CommandGateway;
use crate::render::{DisplayResult, StatusRenderer};
use crate::snapshot::{DeviceSnapshot, Equalizer, PollReply, parse_reply};

/// Arguments for a status poll.
pub const STATUS_ARGS: [&str; 4] = ["status", "-o", "json", "-q"];

/// Requested equalizer change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualizerChange {
    /// Select a preset directly.
    Set(Equalizer),
    /// Move one preset forward (`+1`) or back (`-1`), wrapping around.
    Step(Step),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Previous,
}

impl EqualizerChange {
    /// The preset to select given the current one.
    pub fn resolve(self, current: Equalizer) -> Equalizer {
        match self {
            EqualizerChange::Set(eq) => eq,
            EqualizerChange::Step(Step::Next) => current.next(),
            EqualizerChange::Step(Step::Previous) => current.previous(),
        }
    }
}

impl FromStr for EqualizerChange {
    type Err = BudslineError;

    /// `"+1"`/`"next"`, `"-1"`/`"prev"`/`"previous"`, or a preset name.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+1" | "next" => Ok(EqualizerChange::Step(Step::Next)),
            "-1" | "prev" | "previous" => Ok(EqualizerChange::Step(Step::Previous)),
            name => name.parse().map(EqualizerChange::Set),
        }
    }
}

impl fmt::Display for EqualizerChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EqualizerChange::Set(eq) => write!(f, "{eq}"),
            EqualizerChange::Step(Step::Next) => write!(f, "+1"),
            EqualizerChange::Step(Step::Previous) => write!(f, "-1"),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}

/// Drives the earbuds through a [`CommandGateway`] and renders the result.
pub struct BudsController<G> {
    gateway: G,
    renderer: StatusRenderer,
}

impl<G: CommandGateway> BudsController<G> {
    pub fn new(gateway: G, renderer: StatusRenderer) -> Self {
        Self { gateway, renderer }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn renderer(&self) -> &StatusRenderer {
        &self.renderer
    }

    /// Run `earbuds status` and parse the reply.
    pub fn poll(&self) -> Result<PollReply> {
        let text = self.gateway.execute(&STATUS_ARGS)?;
        parse_reply(&text)
    }

    /// Poll and render.
    pub fn refresh(&self) -> Result<DisplayResult> {
        let reply = self.poll()?;
        self.renderer.render(&reply)
    }

    fn current(&self) -> Result<DeviceSnapshot> {
        self.poll()?.into_connected()
    }

    fn command(&self, args: &[&str]) -> Result<()> {
        if let Err(e) = self.gateway.execute(args) {
            log::warn!("earbuds {} failed: {e}", args.join(" "));
            return Err(e.into());
        }
        Ok(())
    }

    fn command_and_refresh(&self, args: &[&str]) -> Result<DisplayResult> {
        self.command(args)?;
        self.refresh()
    }

    /// Flip ambient sound (`set ambientsound 1|0`).
    pub fn toggle_ambient_sound(&self) -> Result<DisplayResult> {
        let enable = !self.current()?.ambient_sound_enabled;
        let value = if enable { "1" } else { "0" };
        self.command_and_refresh(&["set", "ambientsound", value])
    }

    /// Flip active noise cancelling (`set anc true|false`).
    pub fn toggle_noise_reduction(&self) -> Result<DisplayResult> {
        let enable = !self.current()?.noise_reduction_enabled;
        self.command_and_refresh(&["set", "anc", on_off(enable)])
    }

    /// Select an equalizer preset, directly or relative to the current one.
    pub fn set_equalizer(&self, change: EqualizerChange) -> Result<DisplayResult> {
        let target = match change {
            EqualizerChange::Set(eq) => eq,
            EqualizerChange::Step(_) => change.resolve(self.current()?.equalizer),
        };
        log::debug!("equalizer {change} -> {target}");
        self.command_and_refresh(&["set", "equalizer", target.name()])
    }

    /// Enable (`true`) or lock (`false`) the touchpad.
    pub fn set_touchpad(&self, enabled: bool) -> Result<DisplayResult> {
        self.command_and_refresh(&["set", "touchpad", on_off(enabled)])
    }

    pub fn connect(&self) -> Result<()> {
        self.command(&["connect"])
    }

    pub fn disconnect(&self) -> Result<()> {
        self.command(&["disconnect"])
    }

    /// Restart the `earbuds` background daemon.
    pub fn restart_daemon(&self) -> Result<()> {
        self.command(&["-kd"])
    }
}
