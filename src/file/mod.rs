#![doc = r#"
The [`MidiFile`] player: container parsing and the playback coordinator.

A `MidiFile` is constructed empty, [`load`](MidiFile::load)ed from a
[`MidiSource`], then driven by repeatedly calling
[`next_event`](MidiFile::next_event) from the host's control loop with a
monotonic timestamp. Decoded events flow into the caller's
[`EventSink`](crate::sink::EventSink). [`close`](MidiFile::close) returns
the player to its pristine state, ready for the next file.

```no_run
use smfplay::prelude::*;
use std::time::Instant;

let mut player: MidiFile<FileSource> = MidiFile::new(PlayerConfig::default());
player.load(FileSource::open("song.mid")?)?;

let started = Instant::now();
let mut sink = NullSink;
while !player.is_finished() {
    let now = Micros::new(started.elapsed().as_micros() as u64);
    player.next_event(now, &mut sink);
}
# Ok::<(), smfplay::LoadError>(())
```
"#]

mod clock;
pub use clock::*;

mod timing;
pub use timing::*;

mod track;
pub use track::*;

use tracing::debug;

use crate::{
    config::{EventOrdering, PlayerConfig},
    error::LoadError,
    micros::Micros,
    reader::read_fixed,
    sink::EventSink,
    source::MidiSource,
};

const MTHD_MAGIC: &[u8; 4] = b"MThd";

/// The container formats playback supports.
///
/// Format 2 (sequentially independent tracks) is not a playback format and
/// is rejected at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Format 0: one track carrying all channels.
    #[default]
    SingleMultiChannel,
    /// Format 1: simultaneous tracks sharing one time base.
    Simultaneous,
}

#[doc = r#"
A Standard MIDI File and its real-time playback state.

Owns the byte source, one [`TrackCursor`] per track, and the
[`PlaybackClock`]. All scheduling is cooperative and poll-driven: nothing
here blocks, spawns, or reads a clock — the caller samples monotonic time
and hands it in.
"#]
#[derive(Debug)]
pub struct MidiFile<S> {
    source: Option<S>,
    format: Format,
    tracks: Vec<TrackCursor>,
    clock: PlaybackClock,
    config: PlayerConfig,
    paused: bool,
    looping: bool,
    synch_pending: bool,
}

impl<S> Default for MidiFile<S> {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl<S> MidiFile<S> {
    /// An empty player with the given configuration.
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            source: None,
            format: Format::default(),
            tracks: Vec::new(),
            clock: PlaybackClock::default(),
            config,
            paused: false,
            looping: false,
            synch_pending: false,
        }
    }

    /// True once a container has been loaded and not yet closed.
    pub const fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// The loaded container's format.
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Number of loaded tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The per-track cursors, for diagnostics.
    pub fn tracks(&self) -> &[TrackCursor] {
        &self.tracks
    }

    /// The playback clock (tempo, time signature, tick duration).
    pub const fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Mutable clock access, e.g. to apply a tempo adjustment.
    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    /// True while playback is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// True if playback restarts from the top once all tracks end.
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Enable or disable looping.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Pause (`true`) or resume (`false`) playback.
    ///
    /// Resuming forces a resynchronization, so the time spent paused is
    /// not credited as elapsed ticks.
    pub fn pause(&mut self, paused: bool) {
        self.paused = paused;
        if !paused {
            self.synch_pending = true;
        }
    }

    /// Rewind playback to the start of all tracks.
    ///
    /// When looping a multi-track file, track 0 is left alone: by
    /// convention it carries file-wide setup events that must not replay
    /// on every pass. A single-track file always rewinds its one track.
    pub fn restart(&mut self) {
        let first = if self.looping && self.tracks.len() > 1 {
            1
        } else {
            0
        };
        for track in &mut self.tracks[first..] {
            track.restart();
        }
        self.synch_pending = true;
    }

    /// Drop all per-file state: track cursors, clock overrides, the
    /// source. The player is afterwards indistinguishable from a freshly
    /// constructed one and ready for the next [`load`](Self::load).
    pub fn close(&mut self) {
        for track in &mut self.tracks {
            track.close();
        }
        self.tracks.clear();
        self.format = Format::default();
        self.clock.reset();
        self.paused = false;
        self.looping = false;
        self.synch_pending = false;
        if self.source.take().is_some() {
            debug!("player closed");
        }
    }

    /// True when every track has reached its end and nothing is left to
    /// play. With looping enabled this instead rewinds and reports false.
    pub fn is_finished(&mut self) -> bool {
        if !self.is_loaded() {
            return false;
        }

        let finished = self.tracks.iter().all(TrackCursor::end_of_track);

        if finished && self.looping {
            self.restart();
            return false;
        }
        finished
    }
}

impl<S: MidiSource> MidiFile<S> {
    /// Parse the container header and every track chunk out of `source`,
    /// leaving the player ready to play from the top.
    ///
    /// On any failure the source is dropped and the player is left in its
    /// closed state. Clock fields reflect the file defaults (120 BPM, 4/4)
    /// until track meta events override them during playback.
    pub fn load(&mut self, mut source: S) -> Result<(), LoadError> {
        self.close();

        for expected in MTHD_MAGIC {
            if source.read_byte() != Some(*expected) {
                return Err(LoadError::NotMidi);
            }
        }

        if read_fixed(&mut source, 4) != 6 {
            return Err(LoadError::Header);
        }

        let format = match read_fixed(&mut source, 2) {
            0 => Format::SingleMultiChannel,
            1 => Format::Simultaneous,
            _ => return Err(LoadError::Format),
        };

        let track_count = read_fixed(&mut source, 2) as usize;
        if format == Format::SingleMultiChannel && track_count != 1 {
            return Err(LoadError::Format0Tracks);
        }
        if track_count > self.config.max_tracks {
            return Err(LoadError::TooManyTracks);
        }

        let division = Division::from_raw(read_fixed(&mut source, 2) as u16)
            .ok_or(LoadError::TooManyTracks)?;
        self.clock
            .set_ticks_per_quarter_note(division.ticks_per_quarter_note());

        let mut tracks = Vec::with_capacity(track_count);
        for index in 0..track_count {
            let track = TrackCursor::load(index as u8, &mut source)
                .map_err(|kind| LoadError::track(index as u8, kind))?;
            tracks.push(track);
        }

        debug!(
            ?format,
            track_count,
            ticks_per_quarter_note = self.clock.ticks_per_quarter_note(),
            "container loaded"
        );

        self.format = format;
        self.tracks = tracks;
        self.source = Some(source);
        self.synch_pending = true;
        Ok(())
    }

    /// One scheduling step: decode and dispatch every event that has come
    /// due by `now`.
    ///
    /// `now` must come from a monotonic clock shared across calls. Returns
    /// true if at least one whole tick elapsed (whether or not any track
    /// had an event due), false when paused, unloaded, or mid-tick. Call
    /// this from a tight control loop; sub-tick calls cost almost nothing.
    pub fn next_event(&mut self, now: Micros, sink: &mut dyn EventSink) -> bool {
        if self.source.is_none() || self.paused {
            return false;
        }

        if self.synch_pending {
            for track in &mut self.tracks {
                track.sync();
            }
            self.clock.resync(now);
            self.synch_pending = false;
        }

        let ticks = self.clock.elapsed_ticks(now);
        if ticks == 0 {
            return false;
        }

        self.process_events(ticks, sink);
        true
    }

    // Distribute `ticks` to every track and drain whatever became due,
    // under the configured ordering policy. Only the first decode call
    // per track (or per round) is credited with the ticks; simultaneous
    // events share a timestamp. The burst limit bounds each inner loop
    // against zero-delta event storms.
    fn process_events(&mut self, ticks: u32, sink: &mut dyn EventSink) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let clock = &mut self.clock;
        let burst = self.config.event_burst_limit;

        match self.config.event_ordering {
            EventOrdering::TrackPriority => {
                // drain each track fully before moving on
                for track in &mut self.tracks {
                    for n in 0..burst {
                        let credit = if n == 0 { ticks } else { 0 };
                        if !track.next_event(source, clock, sink, &self.config, credit) {
                            break;
                        }
                    }
                }
            }
            EventOrdering::EventPriority => {
                // one decode per track per round, round-robin
                for round in 0..burst {
                    let mut decoded_any = false;
                    let credit = if round == 0 { ticks } else { 0 };
                    for track in &mut self.tracks {
                        decoded_any |=
                            track.next_event(source, clock, sink, &self.config, credit);
                    }
                    if !decoded_any {
                        break;
                    }
                }
            }
        }
    }
}
