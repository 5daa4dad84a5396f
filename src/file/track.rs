use arrayvec::ArrayVec;
use tracing::{trace, warn};

use crate::{
    config::PlayerConfig,
    error::TrackError,
    events::{
        ChannelEvent, META_PAYLOAD_CAPACITY, MetaEvent, MetaType, SYSEX_PAYLOAD_CAPACITY,
        SysexEvent, render_key_name,
    },
    file::clock::PlaybackClock,
    reader::{read_fixed, read_varlen},
    sink::EventSink,
    source::MidiSource,
};

const MTRK_MAGIC: &[u8; 4] = b"MTrk";

/// The last decoded channel-message header, kept across decode calls so a
/// running-status continuation can be reconstructed.
///
/// Meta and SysEx events never update this, which is how they implicitly
/// "clear" running status: a continuation byte after one of them reuses a
/// stale header, which the format calls data corruption and leaves
/// undefined. We decode it deterministically with whatever header is here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunningStatus {
    channel: u8,
    command: u8,
    data_len: u8,
}

impl Default for RunningStatus {
    fn default() -> Self {
        Self {
            channel: 0,
            command: 0,
            data_len: 1,
        }
    }
}

#[doc = r#"
Per-track playback cursor.

Owns everything one track needs to stream events lazily out of the
container: the chunk's byte bounds, the read position within it, the
accumulated-but-unspent tick count, and the running-status memory. Event
bytes are never buffered ahead; each scheduling step seeks back to the
cursor's position and decodes in place.
"#]
#[derive(Debug, Clone, Default)]
pub struct TrackCursor {
    track_id: u8,
    length: u32,
    start_offset: u64,
    curr_offset: u32,
    end_of_track: bool,
    elapsed_ticks: u32,
    running: RunningStatus,
}

impl TrackCursor {
    /// Declared length of the track chunk in bytes.
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// True once this track has nothing further to play.
    ///
    /// Set by an End-of-Track meta event, by the read position reaching
    /// the declared chunk length, or by an undecodable status byte. Only
    /// [`restart`](Self::restart) clears it.
    pub const fn end_of_track(&self) -> bool {
        self.end_of_track
    }

    /// Zero the accumulated tick counter ahead of a resynchronized start.
    pub(crate) fn sync(&mut self) {
        self.elapsed_ticks = 0;
    }

    /// Rewind to the start of the track data.
    pub(crate) fn restart(&mut self) {
        self.curr_offset = 0;
        self.end_of_track = false;
        self.elapsed_ticks = 0;
    }

    pub(crate) fn close(&mut self) {
        *self = Self::default();
    }

    /// Load the chunk header for track `track_id` at the source's current
    /// position and validate that the declared data fits the source.
    ///
    /// Leaves the source positioned at the next track's header. Event
    /// decoding is fully lazy; nothing past the length field is parsed
    /// here.
    pub(crate) fn load<S: MidiSource>(
        track_id: u8,
        source: &mut S,
    ) -> Result<Self, TrackError> {
        for expected in MTRK_MAGIC {
            if source.read_byte() != Some(*expected) {
                return Err(TrackError::BadHeader);
            }
        }

        let length = read_fixed(source, 4);
        let start_offset = source.position();

        // seeking past the chunk both validates the length and positions
        // for the next track header
        if !source.seek_to(start_offset + u64::from(length)) {
            return Err(TrackError::OutOfBounds);
        }

        trace!(track_id, length, start_offset, "track chunk loaded");

        Ok(Self {
            track_id,
            length,
            start_offset,
            ..Self::default()
        })
    }

    /// Credit `ticks` elapsed ticks to this track and decode the next
    /// event if its delta-time has come due.
    ///
    /// Returns true if an event was decoded (the caller should offer the
    /// track another zero-tick call, since simultaneous events share a
    /// timestamp), false if the track is ended or its next event is still
    /// in the future.
    pub(crate) fn next_event<S: MidiSource>(
        &mut self,
        source: &mut S,
        clock: &mut PlaybackClock,
        sink: &mut dyn EventSink,
        config: &PlayerConfig,
        ticks: u32,
    ) -> bool {
        if self.end_of_track {
            return false;
        }

        // move back to where this track left off
        source.seek_to(self.start_offset + u64::from(self.curr_offset));

        self.elapsed_ticks += ticks;

        let delta = read_varlen(source);

        // not due yet: leave curr_offset untouched so the delta-time is
        // re-read (against a larger accumulated count) next step
        if self.elapsed_ticks < delta {
            return false;
        }

        // consume exactly the delta, carrying any overshoot forward, so
        // truncation bias never accumulates across events
        self.elapsed_ticks -= delta;

        self.parse_event(source, clock, sink, config);

        self.curr_offset = (source.position() - self.start_offset) as u32;

        // catch end of track when there is no meta event
        self.end_of_track = self.end_of_track || self.curr_offset >= self.length;

        true
    }

    // Decode one event at the source position and dispatch it.
    fn parse_event<S: MidiSource>(
        &mut self,
        source: &mut S,
        clock: &mut PlaybackClock,
        sink: &mut dyn EventSink,
        config: &PlayerConfig,
    ) {
        let Some(status) = source.read_byte() else {
            // ran out of bytes mid-track
            self.end_of_track = true;
            return;
        };

        match status {
            // channel message with 2 data bytes
            0x80..=0xBF | 0xE0..=0xEF => {
                let event = ChannelEvent {
                    track: self.track_id,
                    channel: status & 0x0F,
                    command: status & 0xF0,
                    data: [
                        source.read_byte().unwrap_or(0),
                        source.read_byte().unwrap_or(0),
                    ],
                    data_len: 2,
                };
                self.running = RunningStatus {
                    channel: event.channel,
                    command: event.command,
                    data_len: 2,
                };
                trace!(track = self.track_id, status, "channel event");
                sink.channel_event(&event);
            }

            // channel message with 1 data byte
            0xC0..=0xDF => {
                let event = ChannelEvent {
                    track: self.track_id,
                    channel: status & 0x0F,
                    command: status & 0xF0,
                    data: [source.read_byte().unwrap_or(0), 0],
                    data_len: 1,
                };
                self.running = RunningStatus {
                    channel: event.channel,
                    command: event.command,
                    data_len: 1,
                };
                trace!(track = self.track_id, status, "channel event");
                sink.channel_event(&event);
            }

            // running status: the byte just read is the first data byte of
            // a message reusing the previous channel-message header
            0x00..=0x7F => {
                let mut data = [status, 0];
                for slot in data.iter_mut().take(usize::from(self.running.data_len)).skip(1) {
                    *slot = source.read_byte().unwrap_or(0);
                }
                let event = ChannelEvent {
                    track: self.track_id,
                    channel: self.running.channel,
                    command: self.running.command,
                    data,
                    data_len: self.running.data_len,
                };
                trace!(track = self.track_id, "running status event");
                sink.channel_event(&event);
            }

            0xF0 | 0xF7 => self.parse_sysex(source, sink, status),

            0xFF => self.parse_meta(source, clock, sink, config),

            // System Common/Real Time bytes are not valid in a file; we
            // cannot resynchronize the stream past one, so the track halts
            _ => {
                warn!(
                    track = self.track_id,
                    status, "undecodable status byte, halting track"
                );
                self.end_of_track = true;
            }
        }
    }

    // sysex_event = 0xF0 + <len:v> + <data> | 0xF7 + <len:v> + <data>
    //
    // The declared length covers the trailing 0xF7 but not the leading
    // status; an 0xF0-initiated message carries its lead byte as the first
    // payload byte.
    fn parse_sysex<S: MidiSource>(&mut self, source: &mut S, sink: &mut dyn EventSink, status: u8) {
        let declared = read_varlen(source);

        let mut data = ArrayVec::<u8, SYSEX_PAYLOAD_CAPACITY>::new();
        let mut total = u64::from(declared);
        if status == 0xF0 {
            data.push(0xF0);
            total += 1;
        }

        let keep = usize::try_from(total)
            .unwrap_or(usize::MAX)
            .min(SYSEX_PAYLOAD_CAPACITY);
        while data.len() < keep {
            let Some(b) = source.read_byte() else { break };
            data.push(b);
        }

        let truncated = total > keep as u64;
        if truncated {
            // excess is skipped in the source but never delivered
            source.skip(total - keep as u64);
            warn!(
                track = self.track_id,
                declared, "sysex payload truncated to capacity"
            );
        }

        let event = SysexEvent {
            track: self.track_id,
            data,
            truncated,
        };
        trace!(track = self.track_id, len = event.data.len(), "sysex event");
        sink.sysex_event(&event);
    }

    // meta_event = 0xFF + <type:1> + <len:v> + <data>
    //
    // The timing-relevant types are applied to the clock (and this
    // cursor) before the copy is forwarded to the sink.
    fn parse_meta<S: MidiSource>(
        &mut self,
        source: &mut S,
        clock: &mut PlaybackClock,
        sink: &mut dyn EventSink,
        config: &PlayerConfig,
    ) {
        let Some(meta_type) = source.read_byte() else {
            self.end_of_track = true;
            return;
        };
        let declared = read_varlen(source);

        let mut data = ArrayVec::<u8, META_PAYLOAD_CAPACITY>::new();
        let mut recognized = true;

        match MetaType::try_from(meta_type) {
            Ok(MetaType::EndOfTrack) => {
                trace!(track = self.track_id, "end of track");
                self.end_of_track = true;
            }

            Ok(MetaType::SetTempo) => {
                let value = read_fixed(source, 3);
                clock.set_micros_per_quarter_note(value);
                data.push((value >> 16) as u8);
                data.push((value >> 8) as u8);
                data.push(value as u8);
                trace!(
                    track = self.track_id,
                    micros_per_quarter = value,
                    tempo = clock.tempo(),
                    "set tempo"
                );
            }

            Ok(MetaType::TimeSignature) => {
                let numerator = source.read_byte().unwrap_or(0);
                let exponent = source.read_byte().unwrap_or(0);
                // denominator is 2^exponent
                let denominator = if exponent < 8 { 1u8 << exponent } else { 0 };
                clock.set_time_signature(numerator, denominator);
                source.skip(u64::from(declared.saturating_sub(2)));
                data.push(numerator);
                data.push(exponent);
                trace!(track = self.track_id, numerator, denominator, "time signature");
            }

            Ok(MetaType::KeySignature) => {
                let sharps_flats = source.read_byte().unwrap_or(0) as i8;
                let minor = source.read_byte().unwrap_or(0);
                render_key_name(sharps_flats, minor, &mut data);
            }

            Ok(MetaType::SequenceNumber) => {
                let value = read_fixed(source, 2);
                data.push((value >> 8) as u8);
                data.push(value as u8);
            }

            Ok(MetaType::ChannelPrefix) | Ok(MetaType::PortPrefix) => {
                data.push(read_fixed(source, 1) as u8);
            }

            // everything else is forwarded opaque, truncated to capacity
            _ => {
                recognized = false;
                let keep = (declared as usize).min(META_PAYLOAD_CAPACITY);
                while data.len() < keep {
                    let Some(b) = source.read_byte() else { break };
                    data.push(b);
                }
                if declared as usize > keep {
                    source.skip(u64::from(declared) - keep as u64);
                }
            }
        }

        if recognized || config.emit_unrecognized_meta {
            let event = MetaEvent {
                track: self.track_id,
                meta_type,
                data,
            };
            sink.meta_event(&event);
        }
    }
}
