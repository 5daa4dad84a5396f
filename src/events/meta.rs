use arrayvec::ArrayVec;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::META_PAYLOAD_CAPACITY;

/// The meta event types the decoder knows by name.
///
/// Types outside this set still decode — their payload is copied verbatim
/// (up to capacity) and forwarded opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum MetaType {
    /// FF 00 02 - sequence number
    SequenceNumber = 0x00,
    /// FF 01 - arbitrary text
    Text = 0x01,
    /// FF 02 - copyright notice
    Copyright = 0x02,
    /// FF 03 - sequence or track name
    TrackName = 0x03,
    /// FF 04 - instrument name
    InstrumentName = 0x04,
    /// FF 05 - lyric
    Lyric = 0x05,
    /// FF 06 - marker
    Marker = 0x06,
    /// FF 07 - cue point
    CuePoint = 0x07,
    /// FF 20 01 - MIDI channel prefix
    ChannelPrefix = 0x20,
    /// FF 21 01 - MIDI port prefix
    PortPrefix = 0x21,
    /// FF 2F 00 - end of track
    EndOfTrack = 0x2F,
    /// FF 51 03 - microseconds per quarter note
    SetTempo = 0x51,
    /// FF 54 05 - SMPTE offset
    SmpteOffset = 0x54,
    /// FF 58 04 - time signature
    TimeSignature = 0x58,
    /// FF 59 02 - key signature
    KeySignature = 0x59,
    /// FF 7F - sequencer-specific payload
    SequencerSpecific = 0x7F,
}

#[doc = r#"
A decoded meta event.

The decoder applies the timing-relevant types (end-of-track, tempo, time
signature) to its own state before forwarding; the event the sink receives
is a copy of what was read. Key signatures are special-cased: the payload
holds a rendered key name (e.g. `"EbM"`, `"F#m"`) rather than the raw
sharps/flats pair, see [`as_text`](Self::as_text).
"#]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEvent {
    /// The track this event was decoded from.
    pub track: u8,
    /// The raw meta type code.
    pub meta_type: u8,
    pub(crate) data: ArrayVec<u8, META_PAYLOAD_CAPACITY>,
}

impl MetaEvent {
    /// The payload bytes that fit in the buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The type, if it is one the decoder knows by name.
    pub fn kind(&self) -> Option<MetaType> {
        MetaType::try_from(self.meta_type).ok()
    }

    /// The payload as text, for the string-valued meta types.
    pub fn as_text(&self) -> Option<&str> {
        core::str::from_utf8(&self.data).ok()
    }
}

// Key names indexed by sharps/flats count offset by +7, so index 0 is
// seven flats and index 14 is seven sharps.
const MAJOR_KEYS: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_KEYS: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

/// Render a key signature's human-readable name into `out`.
///
/// `sharps_flats` is the signed count from the event (-7..=7), `minor` the
/// major/minor flag byte. Out-of-range values render as `"Err"`.
pub(crate) fn render_key_name(
    sharps_flats: i8,
    minor: u8,
    out: &mut ArrayVec<u8, META_PAYLOAD_CAPACITY>,
) {
    out.clear();

    let rendered = if (-7..=7).contains(&sharps_flats) {
        let idx = (sharps_flats + 7) as usize;
        match minor {
            0 => Some((MAJOR_KEYS[idx], b'M')),
            1 => Some((MINOR_KEYS[idx], b'm')),
            _ => None,
        }
    } else {
        None
    };

    match rendered {
        Some((name, suffix)) => {
            out.try_extend_from_slice(name.as_bytes()).ok();
            out.push(suffix);
        }
        None => {
            out.try_extend_from_slice(b"Err").ok();
        }
    }
}
