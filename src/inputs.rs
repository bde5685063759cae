//! Input ids and the runtime input-name table.
//!
//! The receiver addresses input sources by two-digit ids. Factory names for
//! the ids are compiled in as [`DEFAULT_INPUT_NAMES`]; the device reports
//! renamed inputs at runtime through `RGB` status lines, which overwrite the
//! table entry for that id. Names live only as long as the client instance.

use std::collections::BTreeMap;

/// Factory input names, keyed by two-digit input id.
///
/// Matches the vocabulary of the VSX-2021/SC-1223 generation. The device may
/// report ids that are missing here; those simply resolve to `None` until an
/// `RGB` line names them.
pub const DEFAULT_INPUT_NAMES: &[(&str, &str)] = &[
    ("00", "PHONO"),
    ("01", "CD"),
    ("02", "TUNER"),
    ("04", "DVD"),
    ("05", "TV"),
    ("06", "SAT/CBL"),
    ("10", "VIDEO 1(VIDEO)"),
    ("12", "MULTI CH IN"),
    ("13", "USB-DAC"),
    ("15", "DVR/BDR"),
    ("17", "iPod/USB"),
    ("19", "HDMI 1"),
    ("20", "HDMI 2"),
    ("21", "HDMI 3"),
    ("22", "HDMI 4"),
    ("23", "HDMI 5"),
    ("24", "HDMI 6"),
    ("25", "BD"),
    ("26", "NETWORK (cyclic)"),
    ("31", "HDMI (cyclic)"),
    ("33", "ADAPTER PORT"),
    ("34", "HDMI 7"),
    ("38", "INTERNET RADIO"),
    ("40", "SiriusXM"),
    ("41", "PANDORA"),
    ("44", "MEDIA SERVER"),
    ("45", "FAVORITES"),
    ("48", "MHL"),
];

/// Numeric input ids by source, for use with
/// [`VsxClient::change_input`](crate::VsxClient::change_input).
pub mod codes {
    /// PHONO
    pub const PHONO: u8 = 0;
    /// CD
    pub const CD: u8 = 1;
    /// TUNER
    pub const TUNER: u8 = 2;
    /// CD-R/TAPE
    pub const CDR_TAPE: u8 = 3;
    /// DVD
    pub const DVD: u8 = 4;
    /// TV
    pub const TV: u8 = 5;
    /// SAT/CBL
    pub const SAT_CBL: u8 = 6;
    /// VIDEO 1
    pub const VIDEO_1: u8 = 10;
    /// MULTI CH IN
    pub const MULTI_CH: u8 = 12;
    /// USB-DAC
    pub const USB_DAC: u8 = 13;
    /// VIDEO 2
    pub const VIDEO_2: u8 = 14;
    /// DVR/BDR
    pub const DVR_BDR: u8 = 15;
    /// iPod/USB
    pub const IPOD_USB: u8 = 17;
    /// XM radio
    pub const XM_RADIO: u8 = 18;
    /// HDMI 1
    pub const HDMI_1: u8 = 19;
    /// HDMI 2
    pub const HDMI_2: u8 = 20;
    /// HDMI 3
    pub const HDMI_3: u8 = 21;
    /// HDMI 4
    pub const HDMI_4: u8 = 22;
    /// HDMI 5
    pub const HDMI_5: u8 = 23;
    /// HDMI 6
    pub const HDMI_6: u8 = 24;
    /// BD
    pub const BD: u8 = 25;
    /// NETWORK (cyclic)
    pub const NETWORK: u8 = 26;
    /// SIRIUS
    pub const SIRIUS: u8 = 27;
    /// HDMI (cyclic)
    pub const HDMI_CYCLIC: u8 = 31;
    /// ADAPTER PORT
    pub const ADAPTER_PORT: u8 = 33;
    /// HDMI 7
    pub const HDMI_7: u8 = 34;
    /// INTERNET RADIO
    pub const INTERNET_RADIO: u8 = 38;
    /// SiriusXM
    pub const SIRIUS_XM: u8 = 40;
    /// PANDORA
    pub const PANDORA: u8 = 41;
    /// MEDIA SERVER (also AirPlay)
    pub const MEDIA_SERVER: u8 = 44;
    /// FAVORITES
    pub const FAVORITES: u8 = 45;
    /// MHL
    pub const MHL: u8 = 48;
}

/// Mutable id -> name mapping, seeded from [`DEFAULT_INPUT_NAMES`].
///
/// Entries are overwritten when the device reports a differing name and are
/// never deleted. Not persisted: a fresh client re-seeds from the defaults.
#[derive(Debug, Clone)]
pub(crate) struct InputNames {
    names: BTreeMap<String, String>,
}

impl InputNames {
    pub(crate) fn new() -> Self {
        let names = DEFAULT_INPUT_NAMES
            .iter()
            .map(|&(id, name)| (id.to_string(), name.to_string()))
            .collect();
        Self { names }
    }

    /// Store a device-reported name. Returns whether the stored value changed.
    pub(crate) fn update(&mut self, id: &str, name: &str) -> bool {
        if self.names.get(id).map(String::as_str) == Some(name) {
            return false;
        }
        self.names.insert(id.to_string(), name.to_string());
        true
    }

    /// Current name for an id, if one is known.
    pub(crate) fn resolve(&self, id: &str) -> Option<String> {
        self.names.get(id).cloned()
    }

    /// Known input ids, ascending.
    pub(crate) fn ids(&self) -> Vec<String> {
        self.names.keys().cloned().collect()
    }

    /// Copy of the whole table.
    pub(crate) fn snapshot(&self) -> BTreeMap<String, String> {
        self.names.clone()
    }
}
