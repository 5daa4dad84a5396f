#![doc = r#"
Primitive decoders for the two integer encodings SMF uses.

Everything in an SMF container that is not raw event payload is either a
fixed-width big-endian integer (chunk lengths, the format word, the time
division) or a variable-length quantity (delta-times, SysEx and Meta
lengths). Both decoders pull bytes one at a time from a [`MidiSource`] and
leave the source positioned after the value.
"#]

use crate::source::MidiSource;

/// Read an `n_bytes` (1-4) big-endian unsigned integer.
///
/// Short reads are not an error here: chunk lengths are validated by the
/// container parser before event decoding starts, so the value is composed
/// from whatever bytes are available.
pub fn read_fixed<S: MidiSource>(source: &mut S, n_bytes: u8) -> u32 {
    let mut value = 0u32;

    for _ in 0..n_bytes {
        let Some(b) = source.read_byte() else { break };
        value = (value << 8) | u32::from(b);
    }
    value
}

/// Read a MIDI variable-length quantity.
///
/// Each byte contributes its low 7 bits, most significant group first; the
/// first byte with a clear top bit terminates the value. A malformed stream
/// with no terminating byte is read until the source runs dry — the format
/// itself puts no bound on the encoding, and neither do we.
pub fn read_varlen<S: MidiSource>(source: &mut S) -> u32 {
    let mut value = 0u32;

    while let Some(b) = source.read_byte() {
        value = (value << 7) | u32::from(b & 0x7F);
        if b & 0x80 == 0 {
            break;
        }
    }
    value
}
