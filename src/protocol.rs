//! Wire protocol: command token and response-line tags
//!
//! The device speaks ASCII lines terminated by `\n`. The first three
//! characters of every response line are a tag classifying it; the rest of
//! the line, up to the terminator, is an opaque human-readable payload.

/// Line terminator byte
pub const TERMINATOR: u8 = b'\n';

/// Command token starting one acquisition exchange
pub const CMD_ACQUIRE: &[u8] = b"aq\n";

/// Number of ASCII characters in a response tag
pub const TAG_LEN: usize = 3;

/// Longest line accepted before the reader gives up
///
/// Bounds memory against a device that streams bytes without ever sending a
/// terminator.
pub const MAX_LINE_LEN: usize = 4096;

/// Classification tag carried in the first three characters of a response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Command acknowledged, more lines follow
    Ack,
    /// Device-side debug chatter
    Debug,
    /// Acquired data, terminal success
    Data,
    /// Device-reported fault, terminal failure
    Error,
    /// Free-form status message
    Message,
}

impl Tag {
    /// Classify a line by its first three characters
    ///
    /// Matching is exact and case-sensitive. Returns `None` for lines
    /// shorter than a tag or with a prefix outside the known set.
    pub fn of(line: &str) -> Option<Tag> {
        match line.get(..TAG_LEN)? {
            "ACK" => Some(Tag::Ack),
            "DBG" => Some(Tag::Debug),
            "DAT" => Some(Tag::Data),
            "ERR" => Some(Tag::Error),
            "MSG" => Some(Tag::Message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_tag() {
        assert_eq!(Tag::of("ACK command received"), Some(Tag::Ack));
        assert_eq!(Tag::of("DBG sampling channel 0"), Some(Tag::Debug));
        assert_eq!(Tag::of("DAT 1023"), Some(Tag::Data));
        assert_eq!(Tag::of("ERR adc overrun"), Some(Tag::Error));
        assert_eq!(Tag::of("MSG warming up"), Some(Tag::Message));
    }

    #[test]
    fn bare_tag_classifies() {
        assert_eq!(Tag::of("ACK"), Some(Tag::Ack));
    }

    #[test]
    fn unknown_prefix_is_none() {
        assert_eq!(Tag::of("XYZ unknown"), None);
    }

    #[test]
    fn short_or_empty_lines_are_none() {
        assert_eq!(Tag::of(""), None);
        assert_eq!(Tag::of("AC"), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(Tag::of("ack command received"), None);
        assert_eq!(Tag::of("Dat 1023"), None);
    }

    #[test]
    fn command_is_newline_terminated() {
        assert_eq!(CMD_ACQUIRE.last(), Some(&TERMINATOR));
    }
}
