use arrayvec::ArrayVec;

use super::SYSEX_PAYLOAD_CAPACITY;

#[doc = r#"
A decoded system-exclusive message.

For `0xF0`-initiated messages the `0xF0` lead byte is included as the first
payload byte; `0xF7`-initiated messages (continuation packets and escape
sequences) are delivered as-is. The payload is bounded by
[`SYSEX_PAYLOAD_CAPACITY`]: a longer encoded message is skipped past in the
source and delivered truncated.
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexEvent {
    /// The track this event was decoded from.
    pub track: u8,
    pub(crate) data: ArrayVec<u8, SYSEX_PAYLOAD_CAPACITY>,
    pub(crate) truncated: bool,
}

impl SysexEvent {
    /// The payload bytes that fit in the buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True if the encoded message was longer than the buffer and the
    /// excess was dropped.
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }
}
