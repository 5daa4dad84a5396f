#![doc = r#"
Where decoded events go.

Playback pushes each decoded event into an [`EventSink`] supplied by the
caller — typically a serial MIDI interface or a synthesizer frontend. All
three hooks have no-op defaults, so a sink overrides only the variants it
cares about; the rest are silently dropped.
"#]

use crate::events::{ChannelEvent, MetaEvent, SysexEvent};

/// Consumer of decoded playback events.
///
/// Hooks are called synchronously from inside the scheduling step, one call
/// per decoded event, in the order the ordering policy produces them. A
/// sink should return quickly; the tick clock keeps running while it works.
pub trait EventSink {
    /// A channel message is due.
    fn channel_event(&mut self, event: &ChannelEvent) {
        let _ = event;
    }

    /// A system-exclusive message is due.
    fn sysex_event(&mut self, event: &SysexEvent) {
        let _ = event;
    }

    /// A meta event was decoded (after the library applied it internally).
    fn meta_event(&mut self, event: &MetaEvent) {
        let _ = event;
    }
}

/// A sink that drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {}
