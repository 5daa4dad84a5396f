#[doc = r#"
A decoded MIDI channel message.

The status byte is split during decoding: the low nibble becomes
[`channel`](Self::channel) and the high nibble [`command`](Self::command),
so `command` is always one of `0x80`-`0xE0` with the channel bits cleared.
One or two data bytes follow depending on the command; only
`data[..data_len]` is meaningful.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelEvent {
    /// The track this event was decoded from.
    pub track: u8,
    /// The MIDI channel (0-15) from the status byte's low nibble.
    pub channel: u8,
    /// The command from the status byte's high nibble (`0x80`-`0xE0`).
    pub command: u8,
    /// The data bytes. Only `data_len` of them are valid.
    pub data: [u8; 2],
    /// Number of valid data bytes (1 or 2).
    pub data_len: u8,
}

impl ChannelEvent {
    /// The valid data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data[..usize::from(self.data_len)]
    }

    /// The status byte as it would appear on the wire: command | channel.
    pub const fn status(&self) -> u8 {
        self.command | self.channel
    }
}
