//! Status reply parsing — turns `earbuds status -o json -q` output into a
//! [`PollReply`].
//!
//! Placement and equalizer codes are closed sets. Codes without a mapping are
//! rejected here so the renderer never has to guess a label.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{BudslineError, Result};

// ── Placement ──

/// Physical state of one earbud as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Wearing,
    Idle,
    Case,
}

impl Placement {
    /// Map a device placement code.
    pub fn from_code(code: u64) -> Result<Self> {
        match code {
            1 => Ok(Placement::Wearing),
            2 => Ok(Placement::Idle),
            3 => Ok(Placement::Case),
            other => Err(BudslineError::Format(format!(
                "unknown placement code {other}"
            ))),
        }
    }

    /// One-letter status bar code.
    pub fn letter(self) -> char {
        match self {
            Placement::Wearing => 'W',
            Placement::Idle => 'I',
            Placement::Case => 'C',
        }
    }
}

// ── Equalizer ──

/// Equalizer preset. Declaration order is the cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equalizer {
    Off,
    Bass,
    Soft,
    Dynamic,
    Clear,
    Treble,
}

impl Equalizer {
    pub const ALL: [Equalizer; 6] = [
        Equalizer::Off,
        Equalizer::Bass,
        Equalizer::Soft,
        Equalizer::Dynamic,
        Equalizer::Clear,
        Equalizer::Treble,
    ];

    /// Map a device `equalizer_type` code.
    pub fn from_code(code: u64) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| BudslineError::Format(format!("unknown equalizer code {code}")))
    }

    pub fn code(self) -> u8 {
        self.position() as u8
    }

    fn position(self) -> usize {
        match self {
            Equalizer::Off => 0,
            Equalizer::Bass => 1,
            Equalizer::Soft => 2,
            Equalizer::Dynamic => 3,
            Equalizer::Clear => 4,
            Equalizer::Treble => 5,
        }
    }

    /// Name understood by `earbuds set equalizer`.
    pub fn name(self) -> &'static str {
        match self {
            Equalizer::Off => "off",
            Equalizer::Bass => "bass",
            Equalizer::Soft => "soft",
            Equalizer::Dynamic => "dynamic",
            Equalizer::Clear => "clear",
            Equalizer::Treble => "treble",
        }
    }

    /// Status bar label. `None` for `Off`, which is never shown.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Equalizer::Off => None,
            Equalizer::Bass => Some("Bass"),
            Equalizer::Soft => Some("Soft"),
            Equalizer::Dynamic => Some("Dynamic"),
            Equalizer::Clear => Some("Clear"),
            Equalizer::Treble => Some("Treble"),
        }
    }

    /// Next preset, wrapping from the last to the first.
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Previous preset, wrapping from the first to the last.
    pub fn previous(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Equalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Equalizer {
    type Err = BudslineError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|eq| eq.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                BudslineError::Config(format!(
                    "unknown equalizer preset \"{s}\" (expected one of: {})",
                    Self::ALL.map(Equalizer::name).join(", ")
                ))
            })
    }
}

// ── Snapshot ──

/// One poll's worth of device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub battery_left: u8,
    pub battery_right: u8,
    pub battery_case: Option<u8>,
    pub placement_left: Placement,
    pub placement_right: Placement,
    pub ambient_sound_enabled: bool,
    pub noise_reduction_enabled: bool,
    pub equalizer: Equalizer,
    pub touch_and_hold_on: bool,
    pub tap_on: bool,
}

impl DeviceSnapshot {
    /// The touchpad counts as locked when both touch actions are disabled.
    pub fn touchpad_locked(&self) -> bool {
        !self.touch_and_hold_on && !self.tap_on
    }

    /// Whether either bud sits in the case.
    pub fn any_in_case(&self) -> bool {
        self.placement_left == Placement::Case || self.placement_right == Placement::Case
    }
}

/// Outcome of one status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollReply {
    Connected(DeviceSnapshot),
    Disconnected,
}

impl PollReply {
    pub fn snapshot(&self) -> Option<&DeviceSnapshot> {
        match self {
            PollReply::Connected(s) => Some(s),
            PollReply::Disconnected => None,
        }
    }

    /// The snapshot, or [`BudslineError::NotConnected`].
    pub fn into_connected(self) -> Result<DeviceSnapshot> {
        match self {
            PollReply::Connected(s) => Ok(s),
            PollReply::Disconnected => Err(BudslineError::NotConnected),
        }
    }
}

// ── Wire format ──

#[derive(Deserialize)]
struct RawPayload {
    batt_left: u8,
    batt_right: u8,
    #[serde(default)]
    batt_case: Option<u8>,
    placement_left: u64,
    placement_right: u64,
    ambient_sound_enabled: bool,
    noise_reduction: bool,
    equalizer_type: u64,
    tab_lock_status: RawTabLock,
}

#[derive(Deserialize)]
struct RawTabLock {
    touch_an_hold_on: bool,
    tap_on: bool,
}

impl TryFrom<RawPayload> for DeviceSnapshot {
    type Error = BudslineError;

    fn try_from(raw: RawPayload) -> Result<Self> {
        Ok(DeviceSnapshot {
            battery_left: raw.batt_left,
            battery_right: raw.batt_right,
            battery_case: raw.batt_case,
            placement_left: Placement::from_code(raw.placement_left)?,
            placement_right: Placement::from_code(raw.placement_right)?,
            ambient_sound_enabled: raw.ambient_sound_enabled,
            noise_reduction_enabled: raw.noise_reduction,
            equalizer: Equalizer::from_code(raw.equalizer_type)?,
            touch_and_hold_on: raw.tab_lock_status.touch_an_hold_on,
            tap_on: raw.tab_lock_status.tap_on,
        })
    }
}

/// Whether a top-level reply object signals a disconnected device.
fn is_disconnected(obj: &serde_json::Map<String, Value>) -> bool {
    if obj.get("connected") == Some(&Value::Bool(false)) {
        return true;
    }
    if obj
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("error"))
    {
        return true;
    }
    matches!(obj.get("payload"), None | Some(Value::Null))
}

/// Parse the raw text of a status poll.
pub fn parse_reply(text: &str) -> Result<PollReply> {
    let value: Value = serde_json::from_str(text.trim())?;
    let Value::Object(mut obj) = value else {
        return Err(BudslineError::Parse(
            "status reply is not a JSON object".into(),
        ));
    };

    if is_disconnected(&obj) {
        log::debug!("status reply reports no connected device");
        return Ok(PollReply::Disconnected);
    }

    let payload = obj.remove("payload").unwrap_or(Value::Null);
    if !payload.is_object() {
        return Err(BudslineError::Parse(
            "status payload is not a JSON object".into(),
        ));
    }
    let raw: RawPayload = serde_json::from_value(payload)
        .map_err(|e| BudslineError::Parse(format!("status payload: {e}")))?;
    Ok(PollReply::Connected(DeviceSnapshot::try_from(raw)?))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    /// A connected reply: left 53 %, right 48 %, both worn, case 88 %,
    /// all features off, touchpad unlocked.
    pub fn connected() -> Value {
        json!({
            "status": "success",
            "device": "00:11:22:33:44:55",
            "payload": {
                "batt_left": 53,
                "batt_right": 48,
                "batt_case": 88,
                "placement_left": 1,
                "placement_right": 1,
                "ambient_sound_enabled": false,
                "noise_reduction": false,
                "equalizer_type": 0,
                "tab_lock_status": {
                    "touch_an_hold_on": true,
                    "tap_on": true
                }
            }
        })
    }

    pub fn disconnected() -> Value {
        json!({
            "status": "error",
            "msg": "No connected device found"
        })
    }

    /// Set `payload.<key>` on a reply.
    pub fn with(mut reply: Value, key: &str, value: Value) -> Value {
        reply["payload"][key] = value;
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    fn parse(v: &Value) -> Result<PollReply> {
        parse_reply(&v.to_string())
    }

    // ── Placement ──

    #[test]
    fn placement_letters() {
        assert_eq!(Placement::Wearing.letter(), 'W');
        assert_eq!(Placement::Idle.letter(), 'I');
        assert_eq!(Placement::Case.letter(), 'C');
    }

    #[test]
    fn placement_codes_map_back() {
        assert_eq!(Placement::from_code(1).unwrap(), Placement::Wearing);
        assert_eq!(Placement::from_code(2).unwrap(), Placement::Idle);
        assert_eq!(Placement::from_code(3).unwrap(), Placement::Case);
    }

    #[test]
    fn placement_unknown_code_is_format_error() {
        assert!(matches!(
            Placement::from_code(0),
            Err(BudslineError::Format(_))
        ));
        assert!(matches!(
            Placement::from_code(7),
            Err(BudslineError::Format(_))
        ));
    }

    // ── Equalizer ──

    #[test]
    fn equalizer_codes() {
        assert_eq!(Equalizer::from_code(0).unwrap(), Equalizer::Off);
        assert_eq!(Equalizer::from_code(1).unwrap(), Equalizer::Bass);
        assert_eq!(Equalizer::from_code(5).unwrap(), Equalizer::Treble);
        assert!(matches!(
            Equalizer::from_code(6),
            Err(BudslineError::Format(_))
        ));
    }

    #[test]
    fn equalizer_next_wraps_to_first() {
        assert_eq!(Equalizer::Off.next(), Equalizer::Bass);
        assert_eq!(Equalizer::Treble.next(), Equalizer::Off);
    }

    #[test]
    fn equalizer_previous_wraps_to_last() {
        assert_eq!(Equalizer::Off.previous(), Equalizer::Treble);
        assert_eq!(Equalizer::Bass.previous(), Equalizer::Off);
    }

    #[test]
    fn equalizer_full_cycle_returns_to_start() {
        for start in Equalizer::ALL {
            let mut eq = start;
            for _ in 0..Equalizer::ALL.len() {
                eq = eq.next();
            }
            assert_eq!(eq, start);
            assert_eq!(start.next().previous(), start);
        }
    }

    #[test]
    fn equalizer_label_capitalizes_name() {
        for eq in Equalizer::ALL {
            match eq.label() {
                None => assert_eq!(eq, Equalizer::Off),
                Some(label) => {
                    let mut chars = eq.name().chars();
                    let first = chars.next().unwrap().to_ascii_uppercase();
                    assert_eq!(label, format!("{first}{}", chars.as_str()));
                }
            }
        }
    }

    #[test]
    fn equalizer_from_str() {
        assert_eq!("bass".parse::<Equalizer>().unwrap(), Equalizer::Bass);
        assert_eq!(" Treble ".parse::<Equalizer>().unwrap(), Equalizer::Treble);
        assert!("loud".parse::<Equalizer>().is_err());
    }

    // ── parse_reply ──

    #[test]
    fn parse_connected_reply() {
        let reply = parse(&connected()).unwrap();
        let snap = reply.snapshot().unwrap();
        assert_eq!(snap.battery_left, 53);
        assert_eq!(snap.battery_right, 48);
        assert_eq!(snap.battery_case, Some(88));
        assert_eq!(snap.placement_left, Placement::Wearing);
        assert_eq!(snap.equalizer, Equalizer::Off);
        assert!(!snap.touchpad_locked());
    }

    #[test]
    fn parse_error_status_is_disconnected() {
        assert_eq!(parse(&disconnected()).unwrap(), PollReply::Disconnected);
    }

    #[test]
    fn parse_connected_false_is_disconnected() {
        // Disconnect indicator wins over any payload present
        let mut reply = connected();
        reply["connected"] = json!(false);
        assert_eq!(parse(&reply).unwrap(), PollReply::Disconnected);
    }

    #[test]
    fn parse_missing_payload_is_disconnected() {
        assert_eq!(parse(&json!({})).unwrap(), PollReply::Disconnected);
        assert_eq!(
            parse(&json!({"payload": null})).unwrap(),
            PollReply::Disconnected
        );
    }

    #[test]
    fn parse_missing_case_battery_is_none() {
        let mut reply = connected();
        reply["payload"]
            .as_object_mut()
            .unwrap()
            .remove("batt_case");
        let snap = parse(&reply).unwrap().into_connected().unwrap();
        assert_eq!(snap.battery_case, None);
    }

    #[test]
    fn parse_null_case_battery_is_none() {
        let reply = with(connected(), "batt_case", Value::Null);
        let snap = parse(&reply).unwrap().into_connected().unwrap();
        assert_eq!(snap.battery_case, None);
    }

    #[test]
    fn parse_missing_battery_is_parse_error() {
        let mut reply = connected();
        reply["payload"]
            .as_object_mut()
            .unwrap()
            .remove("batt_left");
        let err = parse(&reply).unwrap_err();
        assert!(matches!(err, BudslineError::Parse(ref m) if m.contains("batt_left")));
    }

    #[test]
    fn parse_missing_tab_lock_is_parse_error() {
        let mut reply = connected();
        reply["payload"]
            .as_object_mut()
            .unwrap()
            .remove("tab_lock_status");
        assert!(matches!(parse(&reply), Err(BudslineError::Parse(_))));
    }

    #[test]
    fn parse_wrong_type_is_parse_error() {
        let reply = with(connected(), "noise_reduction", json!("yes"));
        assert!(matches!(parse(&reply), Err(BudslineError::Parse(_))));
    }

    #[test]
    fn parse_battery_out_of_range_is_parse_error() {
        let reply = with(connected(), "batt_right", json!(300));
        assert!(matches!(parse(&reply), Err(BudslineError::Parse(_))));
    }

    #[test]
    fn parse_non_object_payload_is_parse_error() {
        let reply = json!({"status": "success", "payload": [1, 2, 3]});
        assert!(matches!(parse(&reply), Err(BudslineError::Parse(_))));
    }

    #[test]
    fn parse_unknown_placement_is_format_error() {
        let reply = with(connected(), "placement_right", json!(9));
        assert!(matches!(parse(&reply), Err(BudslineError::Format(_))));
    }

    #[test]
    fn parse_unknown_equalizer_is_format_error() {
        let reply = with(connected(), "equalizer_type", json!(42));
        assert!(matches!(parse(&reply), Err(BudslineError::Format(_))));
    }

    #[test]
    fn parse_invalid_json_is_parse_error() {
        assert!(matches!(
            parse_reply("not json at all"),
            Err(BudslineError::Parse(_))
        ));
        assert!(matches!(parse_reply(""), Err(BudslineError::Parse(_))));
    }

    #[test]
    fn parse_non_object_is_parse_error() {
        assert!(matches!(
            parse_reply("[1, 2]"),
            Err(BudslineError::Parse(_))
        ));
    }

    #[test]
    fn touchpad_locked_needs_both_flags_off() {
        let mut reply = connected();
        reply["payload"]["tab_lock_status"]["tap_on"] = json!(false);
        let snap = parse(&reply).unwrap().into_connected().unwrap();
        assert!(!snap.touchpad_locked());

        reply["payload"]["tab_lock_status"]["touch_an_hold_on"] = json!(false);
        let snap = parse(&reply).unwrap().into_connected().unwrap();
        assert!(snap.touchpad_locked());
    }

    #[test]
    fn disconnected_into_connected_errors() {
        assert!(matches!(
            PollReply::Disconnected.into_connected(),
            Err(BudslineError::NotConnected)
        ));
    }
}
