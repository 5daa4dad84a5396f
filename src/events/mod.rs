#![doc = r#"
The three decoded event variants playback dispatches to the sink.

# Hierarchy
```text
                 |---------------|
                 | Decoded Event |
                 |---------------|
                /       |        \
|--------------|  |------------|  |-----------|
| ChannelEvent |  | SysexEvent |  | MetaEvent |
|--------------|  |------------|  |-----------|
```

Channel events are the transmittable MIDI messages (status bytes
`0x80`-`0xEF`). SysEx events carry manufacturer-defined payloads. Meta
events are file annotations; the decoder interprets the timing-relevant
subset itself and forwards every one to the sink with the owning track id.
"#]

mod channel;
pub use channel::*;

mod sysex;
pub use sysex::*;

mod meta;
pub use meta::*;

/// Fixed capacity of a [`SysexEvent`] payload, in bytes.
///
/// Payloads longer than this are truncated: the excess is skipped in the
/// source and the event is delivered with the bytes that fit.
pub const SYSEX_PAYLOAD_CAPACITY: usize = 50;

/// Fixed capacity of a [`MetaEvent`] payload, in bytes.
///
/// Truncation works the same way as for SysEx payloads.
pub const META_PAYLOAD_CAPACITY: usize = 50;
