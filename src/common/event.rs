// src/common/event.rs

use alloc::string::{String, ToString};

/// Markers that introduce the sensor payload of an `OK`/`NG` line, matched case-insensitively.
const PAYLOAD_MARKERS: [&str; 2] = ["data=", "data:"];

/// A classified line received from the fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// `START...` - the fixture began testing a unit.
    Start,
    /// `WAITING...` - the fixture is idle, waiting for a unit.
    Waiting,
    /// `OK...` - the unit passed. Payload is the text after `data=`/`data:`, if any.
    Pass { payload: Option<String> },
    /// `NG...` - the unit failed. Payload carries the per-sensor states.
    Fail { payload: Option<String> },
    /// Anything else (debug output, acknowledgements). Only shown in the operator log.
    Unknown { raw: String },
}

impl ProtocolEvent {
    /// Payload of a Pass/Fail event.
    pub fn payload(&self) -> Option<&str> {
        match self {
            ProtocolEvent::Pass { payload } | ProtocolEvent::Fail { payload } => payload.as_deref(),
            _ => None,
        }
    }

    /// True for the two events that carry a test verdict.
    pub fn is_verdict(&self) -> bool {
        matches!(self, ProtocolEvent::Pass { .. } | ProtocolEvent::Fail { .. })
    }
}

/// Classifies one received line.
///
/// Prefixes are matched case-insensitively in the order `START`, `WAITING`, `OK`, `NG`;
/// the first match wins. Surrounding whitespace is ignored.
pub fn classify(line: &str) -> ProtocolEvent {
    let s = line.trim();
    if starts_with_ignore_case(s, "START") {
        ProtocolEvent::Start
    } else if starts_with_ignore_case(s, "WAITING") {
        ProtocolEvent::Waiting
    } else if starts_with_ignore_case(s, "OK") {
        ProtocolEvent::Pass { payload: extract_payload(s) }
    } else if starts_with_ignore_case(s, "NG") {
        ProtocolEvent::Fail { payload: extract_payload(s) }
    } else {
        ProtocolEvent::Unknown { raw: s.to_string() }
    }
}

/// Splits a payload into trimmed, non-empty tokens.
///
/// `"0, 1,,0"` yields `"0"`, `"1"`, `"0"` - empty tokens are dropped before indexing.
pub fn sensor_tokens(payload: &str) -> impl Iterator<Item = &str> {
    payload.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Text after the first payload marker, trimmed. `None` when no marker is present.
fn extract_payload(line: &str) -> Option<String> {
    // Markers are ASCII, so byte offsets found in the lowered copy are valid in `line`.
    let lowered = line.to_ascii_lowercase();
    PAYLOAD_MARKERS
        .iter()
        .filter_map(|marker| lowered.find(marker).map(|idx| idx + marker.len()))
        .min()
        .map(|start| line[start..].trim().to_string())
}

#[inline]
fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn pass(payload: Option<&str>) -> ProtocolEvent {
        ProtocolEvent::Pass { payload: payload.map(String::from) }
    }

    fn fail(payload: Option<&str>) -> ProtocolEvent {
        ProtocolEvent::Fail { payload: payload.map(String::from) }
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(classify("START"), ProtocolEvent::Start);
        assert_eq!(classify("start test"), ProtocolEvent::Start);
        assert_eq!(classify("Waiting for unit"), ProtocolEvent::Waiting);
        assert_eq!(classify("OK"), pass(None));
        assert_eq!(classify("ng"), fail(None));
        assert_eq!(classify("  OK  "), pass(None));
    }

    #[test]
    fn test_classify_payload_markers() {
        assert_eq!(classify("OK data=1,0,0,2048,1990"), pass(Some("1,0,0,2048,1990")));
        assert_eq!(classify("NG Data: 0,1,0,0,1"), fail(Some("0,1,0,0,1")));
        assert_eq!(classify("OK: DATA=  7 "), pass(Some("7")));
        assert_eq!(classify("NG data="), fail(Some("")));
    }

    #[test]
    fn test_first_marker_wins() {
        assert_eq!(classify("NG data:1 data=2"), fail(Some("1 data=2")));
        assert_eq!(classify("NG data=1 data:2"), fail(Some("1 data:2")));
    }

    #[test]
    fn test_unknown_lines() {
        assert_eq!(
            classify("DEBUG:boot"),
            ProtocolEvent::Unknown { raw: String::from("DEBUG:boot") }
        );
        assert!(matches!(classify("ACK MODEL=DJ9600267A"), ProtocolEvent::Unknown { .. }));
        assert!(matches!(classify("A1= 1000- A2= 2000-"), ProtocolEvent::Unknown { .. }));
        // Too short to carry the prefix
        assert!(matches!(classify("N"), ProtocolEvent::Unknown { .. }));
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert!(matches!(classify("Ökay"), ProtocolEvent::Unknown { .. }));
        assert_eq!(classify("OK dätä data=1"), pass(Some("1")));
    }

    #[test]
    fn test_sensor_tokens() {
        let tokens: Vec<&str> = sensor_tokens(" 0, 1,,0 , ").collect();
        assert_eq!(tokens, ["0", "1", "0"]);
        assert_eq!(sensor_tokens("").count(), 0);
    }

    #[test]
    fn test_event_helpers() {
        assert_eq!(classify("OK data=5").payload(), Some("5"));
        assert_eq!(classify("START").payload(), None);
        assert!(classify("NG").is_verdict());
        assert!(!classify("WAITING").is_verdict());
    }
}
