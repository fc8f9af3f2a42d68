//! Status rendering — turns a [`PollReply`] into the status bar text and color.
//!
//! Rendering is a pure function of the reply and the [`RenderConfig`]; no
//! state carries over between polls.

use serde::Serialize;

use crate::color::{Gradient, Rgb};
use crate::error::Result;
use crate::snapshot::{DeviceSnapshot, PollReply};

/// Text shown when no earbuds are connected.
pub const DISCONNECTED_TEXT: &str = "Disconnected";

/// The `{full_text, color}` record consumed by the status bar host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayResult {
    pub full_text: String,
    pub color: String,
}

/// Static rendering settings, built from [`Config`](crate::config::Config).
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub device_label: String,
    pub battery_limit: u8,
    pub battery_drift_threshold: u8,
    /// `battery_limit + 1` colors, empty battery at index 0.
    pub gradient: Gradient,
    pub disconnected_color: Rgb,
}

/// Reconciled battery reading for both buds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryReading {
    /// Rendered battery segment, including the case suffix.
    pub segment: String,
    /// Level used for the color lookup.
    pub effective_level: u8,
}

/// Reconcile the left/right readings into one segment.
///
/// Readings within `drift_threshold` of each other collapse into a single
/// level; a lone zero reading is treated as stale and the other side is used.
pub fn reconcile_battery(snap: &DeviceSnapshot, drift_threshold: u8) -> BatteryReading {
    let (l, r) = (snap.battery_left, snap.battery_right);
    let left = snap.placement_left.letter();
    let right = snap.placement_right.letter();

    let (mut segment, effective_level) = if l.abs_diff(r) <= drift_threshold {
        let level = match (l, r) {
            (0, r) if r != 0 => r,
            (l, 0) if l != 0 => l,
            _ => l.min(r),
        };
        (format!("L{left}{level}R{right}"), level)
    } else {
        (format!("L{left}{l} {r}R{right}"), l.min(r))
    };

    if snap.any_in_case()
        && let Some(case) = snap.battery_case
    {
        segment.push_str(&format!(" {case}C"));
    }

    BatteryReading {
        segment,
        effective_level,
    }
}

/// Feature suffixes in display order, without leading spaces.
pub fn feature_suffixes(snap: &DeviceSnapshot) -> Vec<&'static str> {
    let mut parts = Vec::with_capacity(4);
    if snap.ambient_sound_enabled {
        parts.push("AMB");
    }
    if snap.noise_reduction_enabled {
        parts.push("ANC");
    }
    if let Some(label) = snap.equalizer.label() {
        parts.push(label);
    }
    if snap.touchpad_locked() {
        parts.push("TL");
    }
    parts
}

/// Renders poll replies with a fixed configuration.
#[derive(Debug, Clone)]
pub struct StatusRenderer {
    config: RenderConfig,
}

impl StatusRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self, reply: &PollReply) -> Result<DisplayResult> {
        match reply {
            PollReply::Disconnected => Ok(self.disconnected()),
            PollReply::Connected(snap) => Ok(self.render_connected(snap)),
        }
    }

    pub fn disconnected(&self) -> DisplayResult {
        DisplayResult {
            full_text: DISCONNECTED_TEXT.to_string(),
            color: self.config.disconnected_color.to_string(),
        }
    }

    fn render_connected(&self, snap: &DeviceSnapshot) -> DisplayResult {
        let battery = reconcile_battery(snap, self.config.battery_drift_threshold);
        let level = battery.effective_level.min(self.config.battery_limit);

        let mut full_text = format!("{} {}", self.config.device_label, battery.segment);
        for suffix in feature_suffixes(snap) {
            full_text.push(' ');
            full_text.push_str(suffix);
        }

        DisplayResult {
            full_text,
            color: self.config.gradient.get(level as usize).to_string(),
        }
    }
}
