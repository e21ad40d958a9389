use std::fmt::{Display, Formatter};

/// `Sequence` number newtype.
///
/// The 16-bit counter carried in the sequence field of outbound echo
/// requests and echoed unchanged in replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Sequence(pub u16);

impl Sequence {
    /// The successor of this sequence number and whether the counter rolled
    /// over the 16-bit boundary.
    #[must_use]
    pub const fn advance(self) -> (Self, bool) {
        let (next, rolled) = self.0.overflowing_add(1);
        (Self(next), rolled)
    }

    /// The wrapping distance from `other` up to `self`.
    #[must_use]
    pub const fn distance(self, other: Self) -> u16 {
        self.0.wrapping_sub(other.0)
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `PingIdentifier` newtype.
///
/// The 16-bit echo identifier used to demultiplex replies on a shared
/// socket; chosen at random when a session is created and never changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct PingIdentifier(pub u16);

impl Display for PingIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_advance() {
        assert_eq!((Sequence(1), false), Sequence(0).advance());
        assert_eq!((Sequence(0xffff), false), Sequence(0xfffe).advance());
        assert_eq!((Sequence(0), true), Sequence(0xffff).advance());
    }

    #[test]
    fn test_sequence_distance() {
        assert_eq!(0, Sequence(5).distance(Sequence(5)));
        assert_eq!(3, Sequence(5).distance(Sequence(2)));
        assert_eq!(6, Sequence(5).distance(Sequence(0xffff)));
    }

    #[test]
    fn test_display() {
        assert_eq!("42", format!("{}", Sequence(42)));
        assert_eq!("0x1234", format!("{}", PingIdentifier(0x1234)));
    }
}
