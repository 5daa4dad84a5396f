#![doc = r#"
Construction-time playback configuration.

These knobs existed in early firmware-style SMF players as compile-time
defines; here they are plain values handed to
[`MidiFile::new`](crate::file::MidiFile::new).
"#]

/// How simultaneous due events across tracks are ordered within one
/// scheduling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventOrdering {
    /// Drain each track completely before moving to the next, in track
    /// index order.
    #[default]
    TrackPriority,
    /// Offer every track one decode per round, round-robin, until a full
    /// round yields nothing.
    EventPriority,
}

/// Playback configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Ordering policy for simultaneous events. Default: track priority.
    pub event_ordering: EventOrdering,
    /// Maximum number of tracks a file may declare. 16 is the most any
    /// MIDI device can address; raising it costs memory per track.
    pub max_tracks: usize,
    /// Forward meta events the decoder does not interpret. When false
    /// their bytes are still consumed, but the sink never sees them.
    pub emit_unrecognized_meta: bool,
    /// Ceiling on decode iterations per track (or per round-robin round)
    /// within one scheduling step. A liveness bound against pathological
    /// zero-delta event storms, not a correctness requirement.
    pub event_burst_limit: u16,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            event_ordering: EventOrdering::TrackPriority,
            max_tracks: 16,
            emit_unrecognized_meta: true,
            event_burst_limit: 100,
        }
    }
}
