//! Wire-level encoding and classification for the VSX IP control protocol.
//!
//! Outbound commands are short ASCII strings; the connection layer appends
//! the single `CR` terminator. Inbound status lines arrive `CR LF`
//! terminated and are classified here into [`ParsedLine`] variants,
//! first-match-wins over an ordered rule set. A line that superficially
//! matches a prefix but fails the detailed field check (wrong digit count,
//! non-digit flag) falls through to [`ParsedLine::Unclassified`] rather than
//! producing an error: unrecognized traffic is never fatal.
//!
//! # Volume scaling
//!
//! The main zone speaks a raw unit in `[0, 185]` where 0 = mute floor,
//! 161 = 0 dB and 185 = +12 dB, sent as a three-digit field. Secondary
//! zones use `[0, 81]` where 0 is "unknown", 1 = -80 dB and 81 = 0 dB,
//! sent as a two-digit field. Out-of-range decibel arguments clamp; they
//! are not errors.

use crate::error::{Result, VsxError};
use crate::types::Zone;

/// Relative volume steps (main zone).
pub(crate) const VOLUME_UP: &str = "VU";
pub(crate) const VOLUME_DOWN: &str = "VD";
/// Relative volume steps (zone 2).
pub(crate) const ZONE_VOLUME_UP: &str = "ZU";
pub(crate) const ZONE_VOLUME_DOWN: &str = "ZD";

/// Query for the main zone's selected input, written as the follow-up to an
/// input change so callers get a confirmed state even if the device's own
/// confirmation is dropped.
pub(crate) const INPUT_QUERY: &str = "?F";

/// Query for the authoritative ("display") listening mode.
pub(crate) const DISPLAY_MODE_QUERY: &str = "?L";

/// The fixed portion of the status-query burst, in submission order:
/// power (4 zones), selected input (4 zones), volume (3 zones),
/// mute (3 zones), listening mode (set + display).
const STATUS_QUERIES: [&str; 16] = [
    "?P", "?AP", "?BP", "?ZEP", "?F", "?ZS", "?ZT", "?ZEA", "?V", "?ZV", "?YV", "?M", "?Z2M",
    "?Z3M", "?S", "?L",
];

/// An input-selection argument: a numeric id or its two-digit wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputId {
    /// Numeric id, 0..=99
    Number(u8),
    /// Wire string, 1-2 ASCII digits
    Code(String),
}

impl From<u8> for InputId {
    fn from(n: u8) -> Self {
        InputId::Number(n)
    }
}

impl From<&str> for InputId {
    fn from(s: &str) -> Self {
        InputId::Code(s.to_string())
    }
}

impl From<String> for InputId {
    fn from(s: String) -> Self {
        InputId::Code(s)
    }
}

impl InputId {
    /// Normalize to the two-digit zero-padded wire form.
    pub(crate) fn normalize(&self) -> Result<String> {
        match self {
            InputId::Number(n) if *n <= 99 => Ok(format!("{:02}", n)),
            InputId::Number(n) => Err(VsxError::InvalidInputId(n.to_string())),
            InputId::Code(s) => {
                if s.is_empty() || s.len() > 2 || !s.chars().all(|c| c.is_ascii_digit()) {
                    return Err(VsxError::InvalidInputId(s.clone()));
                }
                Ok(format!("{:0>2}", s))
            }
        }
    }
}

/// `<power prefix>P<O|F>` — defined for all four zones.
pub(crate) fn power_command(zone: Zone, on: bool) -> String {
    format!("{}P{}", zone.power_prefix(), if on { 'O' } else { 'F' })
}

/// `<mute prefix>P<O|F>` — zone 4 has no mute prefix.
pub(crate) fn mute_command(zone: Zone, on: bool) -> Result<String> {
    let prefix = zone.mute_prefix().ok_or(VsxError::UnsupportedZone {
        zone,
        operation: "mute",
    })?;
    Ok(format!("{}P{}", prefix, if on { 'O' } else { 'F' }))
}

/// Main-zone decibels to the raw `[0, 185]` unit. `None` selects raw 0.
pub(crate) fn main_volume_raw(db: Option<f64>) -> u16 {
    match db {
        None => 0,
        Some(db) if db < -80.0 => 0,
        Some(db) if db > 12.0 => 185,
        Some(db) => (db * 2.0 + 161.0).round() as u16,
    }
}

/// Secondary-zone decibels to the raw `[0, 81]` unit. `None` selects raw 0.
pub(crate) fn zone_volume_raw(db: Option<f64>) -> u16 {
    match db {
        None => 0,
        Some(db) if db < -80.0 => 0,
        Some(db) if db > 0.0 => 81,
        Some(db) => (db + 81.0).round() as u16,
    }
}

/// Main-zone raw unit back to decibels.
pub(crate) fn main_raw_to_db(raw: u16) -> f64 {
    (raw as f64 - 161.0) / 2.0
}

/// Secondary-zone raw unit back to decibels.
pub(crate) fn zone_raw_to_db(raw: u16) -> f64 {
    raw as f64 - 81.0
}

/// `<raw, 3 digits>VL`
pub(crate) fn volume_command(db: Option<f64>) -> String {
    format!("{:03}VL", main_volume_raw(db))
}

/// `<raw, 2 digits>ZV`
pub(crate) fn zone_volume_command(db: Option<f64>) -> String {
    format!("{:02}ZV", zone_volume_raw(db))
}

/// `<id>FN` — main-zone input selection (callers follow up with [`INPUT_QUERY`]).
pub(crate) fn select_input_command(id: &str) -> String {
    format!("{}FN", id)
}

/// `<id>ZS` — secondary-zone input selection.
pub(crate) fn select_zone_input_command(id: &str) -> String {
    format!("{}ZS", id)
}

/// `?RGB<id>` — ask the device for its name for an input.
pub(crate) fn input_name_query(id: &str) -> String {
    format!("?RGB{}", id)
}

/// `<mode, 4 digits>SR` — select a listening mode by its `SR` key.
pub(crate) fn listening_mode_command(mode: &str) -> Result<String> {
    if mode.is_empty() || mode.len() > 4 || !mode.chars().all(|c| c.is_ascii_digit()) {
        return Err(VsxError::InvalidListeningMode(mode.to_string()));
    }
    Ok(format!("{:0>4}SR", mode))
}

/// `<key>NW` — raw remote-control key code passthrough.
pub(crate) fn send_key_command(key: &str) -> String {
    format!("{}NW", key)
}

/// The full status-query burst: the fixed queries followed by one name
/// query per known input id, in the given order.
pub(crate) fn status_queries(input_ids: &[String]) -> Vec<String> {
    let mut commands: Vec<String> = STATUS_QUERIES.iter().map(|s| s.to_string()).collect();
    commands.extend(input_ids.iter().map(|id| input_name_query(id)));
    commands
}

/// Classification of one inbound status line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedLine {
    /// Power status; flag `0` means on
    Power { zone: Zone, on: bool },
    /// Volume status, already scaled to decibels for the reporting zone
    Volume { zone: Zone, db: f64 },
    /// Mute status; flag `0` means on
    Mute { zone: Zone, on: bool },
    /// Selected-input status
    Input { zone: Zone, id: String },
    /// `SR` report: the mode a set command selected. Not authoritative
    /// current state; the dispatcher follows up with `?L`.
    ListeningModeSet { mode: String },
    /// `LM` report: the authoritative playing mode
    ListeningModeDisplay { mode: String },
    /// `RGB` report: the device's name for an input id
    InputName { id: String, name: String },
    /// Recognized prefix with no interpretation; logged, no event
    Acknowledged { prefix: &'static str },
    /// Everything else; logged, no event, never fatal
    Unclassified,
}

/// Classify one line, first-match-wins.
pub(crate) fn parse_line(line: &str) -> ParsedLine {
    if let Some(parsed) = parse_power(line) {
        return parsed;
    }
    if let Some(parsed) = parse_volume(line) {
        return parsed;
    }
    if let Some(parsed) = parse_mute(line) {
        return parsed;
    }
    if let Some(parsed) = parse_input(line) {
        return parsed;
    }
    // Specific patterns above didn't claim the line; generic prefix checks
    // follow, in the same precedence the device documentation lists them.
    for prefix in ["SSA", "APR", "BPR"] {
        if line.starts_with(prefix) {
            return ParsedLine::Acknowledged { prefix };
        }
    }
    if let Some(mode) = line.strip_prefix("SR") {
        return ParsedLine::ListeningModeSet {
            mode: mode.to_string(),
        };
    }
    if let Some(mode) = line.strip_prefix("LM") {
        return ParsedLine::ListeningModeDisplay {
            mode: mode.to_string(),
        };
    }
    if line.starts_with("FL") {
        return ParsedLine::Acknowledged { prefix: "FL" };
    }
    if let Some(parsed) = parse_input_name(line) {
        return parsed;
    }
    for prefix in ["RGC", "RGF"] {
        if line.starts_with(prefix) {
            return ParsedLine::Acknowledged { prefix };
        }
    }
    ParsedLine::Unclassified
}

fn strip_zone_prefix<'a>(line: &'a str, table: &[(&str, Zone)]) -> Option<(Zone, &'a str)> {
    table
        .iter()
        .find_map(|&(prefix, zone)| line.strip_prefix(prefix).map(|rest| (zone, rest)))
}

/// `PWR|APR|BPR|ZEP` + 1-digit flag.
fn parse_power(line: &str) -> Option<ParsedLine> {
    let (zone, rest) = strip_zone_prefix(
        line,
        &[
            ("PWR", Zone::Main),
            ("APR", Zone::Zone2),
            ("BPR", Zone::Zone3),
            ("ZEP", Zone::Zone4),
        ],
    )?;
    let flag = rest.chars().next().filter(char::is_ascii_digit)?;
    Some(ParsedLine::Power {
        zone,
        on: flag == '0',
    })
}

/// `VOL|ZV|YV` + raw value (at least two digits; the main zone sends three).
fn parse_volume(line: &str) -> Option<ParsedLine> {
    let (zone, rest) = strip_zone_prefix(
        line,
        &[("VOL", Zone::Main), ("ZV", Zone::Zone2), ("YV", Zone::Zone3)],
    )?;
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.len() < 2 {
        return None;
    }
    let raw: u16 = digits.parse().ok()?;
    let db = match zone {
        Zone::Main => main_raw_to_db(raw),
        _ => zone_raw_to_db(raw),
    };
    Some(ParsedLine::Volume { zone, db })
}

/// `MUT|Z2MUT|Z3MUT` + 1-digit flag.
fn parse_mute(line: &str) -> Option<ParsedLine> {
    let (zone, rest) = strip_zone_prefix(
        line,
        &[
            ("MUT", Zone::Main),
            ("Z2MUT", Zone::Zone2),
            ("Z3MUT", Zone::Zone3),
        ],
    )?;
    let flag = rest.chars().next().filter(char::is_ascii_digit)?;
    Some(ParsedLine::Mute {
        zone,
        on: flag == '0',
    })
}

/// `FN|Z2F|Z3F|ZEA` + 2-digit input id.
fn parse_input(line: &str) -> Option<ParsedLine> {
    let (zone, rest) = strip_zone_prefix(
        line,
        &[
            ("FN", Zone::Main),
            ("Z2F", Zone::Zone2),
            ("Z3F", Zone::Zone3),
            ("ZEA", Zone::Zone4),
        ],
    )?;
    let id = two_digit_prefix(rest)?;
    Some(ParsedLine::Input {
        zone,
        id: id.to_string(),
    })
}

/// `RGB` + 2-digit input id + name (trimmed).
fn parse_input_name(line: &str) -> Option<ParsedLine> {
    let rest = line.strip_prefix("RGB")?;
    let id = two_digit_prefix(rest)?;
    let name = rest[2..].trim().to_string();
    Some(ParsedLine::InputName {
        id: id.to_string(),
        name,
    })
}

fn two_digit_prefix(rest: &str) -> Option<&str> {
    let bytes = rest.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit() {
        Some(&rest[..2])
    } else {
        None
    }
}
