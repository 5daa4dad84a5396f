#![doc = r#"
Standard MIDI File decoding and tick-accurate real-time playback.

`smfplay` parses the SMF container lazily — header and track chunk bounds
up front, events on demand — and replays the decoded events against a
caller-driven monotonic clock. It is built for hosts that poll: one call
per control-loop iteration advances every track in lockstep with wall
time, honoring tempo changes, looping, and pausing.

The crate never touches a device or a clock itself. Bytes come in through
the [`MidiSource`](source::MidiSource) seam, decoded events go out through
the [`EventSink`](sink::EventSink) seam, and time is whatever the caller
samples. See [`MidiFile`](file::MidiFile) for the full lifecycle.
"#]

pub mod config;

pub mod error;
pub use error::{LoadError, TrackError};

pub mod events;

pub mod file;

mod micros;
pub use micros::Micros;

pub mod reader;

pub mod sink;

pub mod source;

/// Everything most users want in scope.
pub mod prelude {
    pub use crate::config::{EventOrdering, PlayerConfig};
    pub use crate::error::{LoadError, TrackError};
    pub use crate::events::{
        ChannelEvent, META_PAYLOAD_CAPACITY, MetaEvent, MetaType, SYSEX_PAYLOAD_CAPACITY,
        SysexEvent,
    };
    pub use crate::file::{Division, Format, MidiFile, PlaybackClock, SmpteFps, TrackCursor};
    pub use crate::micros::Micros;
    pub use crate::sink::{EventSink, NullSink};
    pub use crate::source::{FileSource, MidiSource, SliceSource};
}
