/// The maximum size of datagram we can receive.
pub const MAX_PACKET_SIZE: usize = 65535;

/// The filler payload used when the caller does not supply one.
///
/// 56 bytes of printable ASCII so the default echo message is 64 bytes in
/// total, the size conventionally sent by `ping`.
pub const DEFAULT_PAYLOAD: &[u8; 56] =
    b"abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyzabcd";

/// The width of the reply sequence acceptance window once the counter has
/// wrapped.
///
/// Approximates the two minute maximum packet lifetime at one echo per
/// second.
pub const SEQUENCE_WINDOW: u16 = 120;
