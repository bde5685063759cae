//! Listening-mode vocabularies.
//!
//! The receiver reports listening modes through two distinct vocabularies:
//! `SR` keys name the mode a *set* command selected (a remote-control
//! cyclic-shift report, not authoritative state) and `LM` keys name the mode
//! the DSP is *playing*, which is what a UI should display. The tables are
//! data, not behavior: swap them out for a different device generation.

/// Names for `SR` ("set") mode keys. Also the vocabulary accepted by
/// [`VsxClient::listening_mode`](crate::VsxClient::listening_mode).
pub const SET_MODE_NAMES: &[(&str, &str)] = &[
    ("0001", "STEREO (cyclic)"),
    ("0005", "AUTO SURR/STREAM DIRECT (cyclic)"),
    ("0006", "AUTO SURROUND"),
    ("0007", "DIRECT"),
    ("0008", "PURE DIRECT"),
    ("0009", "STEREO"),
    ("0010", "STANDARD (cyclic)"),
    ("0011", "2ch"),
    ("0013", "PRO LOGIC2 MOVIE"),
    ("0014", "PRO LOGIC2x MOVIE"),
    ("0015", "PRO LOGIC2 MUSIC"),
    ("0016", "PRO LOGIC2x MUSIC"),
    ("0017", "PRO LOGIC2 GAME"),
    ("0018", "PRO LOGIC2x GAME"),
    ("0019", "PRO LOGIC"),
    ("0020", "PRO LOGIC2z HEIGHT"),
    ("0021", "WIDE SURROUND MOVIE"),
    ("0022", "WIDE SURROUND MUSIC"),
    ("0025", "Neo:6 CINEMA"),
    ("0026", "Neo:6 MUSIC"),
    ("0100", "ADVANCED SURROUND (cyclic)"),
    ("0101", "ACTION"),
    ("0102", "SCI-FI"),
    ("0103", "DRAMA"),
    ("0104", "ENTERTAINMENT SHOW"),
    ("0105", "MONO FILM"),
    ("0106", "EXPANDED THEATER"),
    ("0107", "CLASSICAL"),
    ("0109", "UNPLUGGED"),
    ("0110", "ROCK/POP"),
    ("0112", "EXTENDED STEREO"),
    ("0113", "PHONES SURROUND"),
    ("0116", "TV SURROUND"),
    ("0117", "SPORTS"),
    ("0118", "ADVANCED GAME"),
    ("0151", "Auto Level Control"),
    ("0152", "OPTIMUM SURROUND"),
    ("0153", "RETRIEVER AIR"),
];

/// Names for `LM` ("display") mode keys, the authoritative playing mode.
pub const DISPLAY_MODE_NAMES: &[(&str, &str)] = &[
    ("0101", "PLIIx MOVIE"),
    ("0102", "PLII MOVIE"),
    ("0103", "PLIIx MUSIC"),
    ("0104", "PLII MUSIC"),
    ("0105", "PLIIx GAME"),
    ("0106", "PLII GAME"),
    ("0107", "PRO LOGIC"),
    ("0108", "Neo:6 CINEMA"),
    ("0109", "Neo:6 MUSIC"),
    ("010c", "2ch Straight Decode"),
    ("0201", "Neo:X CINEMA"),
    ("0202", "Neo:X MUSIC"),
    ("0401", "STEREO"),
    ("0402", "PLII MOVIE"),
    ("0403", "PLIIx MOVIE"),
    ("0501", "STEREO"),
    ("0601", "STEREO"),
    ("0901", "STEREO"),
    ("0e01", "HDMI THROUGH"),
    ("0f01", "MULTI CH IN"),
    ("1101", "PLIIx MOVIE"),
    ("1102", "PLIIx MUSIC"),
];

/// Name for an `SR` mode key, if known.
pub fn set_mode_name(key: &str) -> Option<&'static str> {
    lookup(SET_MODE_NAMES, key)
}

/// Name for an `LM` mode key, if known.
pub fn display_mode_name(key: &str) -> Option<&'static str> {
    lookup(DISPLAY_MODE_NAMES, key)
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|&&(k, _)| k == key)
        .map(|&(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert_eq!(set_mode_name("0101"), Some("ACTION"));
        assert_eq!(display_mode_name("0101"), Some("PLIIx MOVIE"));
    }

    #[test]
    fn unknown_keys_are_none() {
        assert_eq!(set_mode_name("9999"), None);
        assert_eq!(display_mode_name(""), None);
    }

    #[test]
    fn vocabularies_are_distinct() {
        // The same key means different things in the two tables.
        assert_ne!(set_mode_name("0101"), display_mode_name("0101"));
    }
}
