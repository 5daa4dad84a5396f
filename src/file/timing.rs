#![doc = r#"
The header time-division word.

SMF expresses its time base one of two ways. With bit 15 clear, the word is
the number of ticks per quarter note directly. With bit 15 set, the high
byte encodes an SMPTE frame rate (as the two's complement of the rate, so
only four byte values are valid) and the low byte a per-frame resolution;
the effective tick rate is then frames x resolution per second, folded into
the same ticks-per-quarter-note field the clock divides by.
"#]

use num_enum::TryFromPrimitive;

/// The four SMPTE frame rates SMF can declare, keyed by the byte value
/// that appears in the header's time-division word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum SmpteFps {
    /// 24 frames per second - film
    TwentyFour = 232,
    /// 25 frames per second - PAL
    TwentyFive = 231,
    /// 29.97 drop-frame, treated as 29 for tick arithmetic
    TwentyNine = 227,
    /// 30 frames per second - NTSC
    Thirty = 226,
}

impl SmpteFps {
    /// The nominal frame count used in tick-rate arithmetic.
    pub const fn frames_per_second(&self) -> u16 {
        match self {
            Self::TwentyFour => 24,
            Self::TwentyFive => 25,
            Self::TwentyNine => 29,
            Self::Thirty => 30,
        }
    }
}

/// A decoded time-division header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    /// Delta-times count ticks of a quarter note.
    TicksPerQuarterNote(u16),
    /// Delta-times count subdivisions of an SMPTE frame.
    Smpte {
        /// The declared frame rate.
        fps: SmpteFps,
        /// Ticks per frame.
        resolution: u8,
    },
}

impl Division {
    /// Decode the raw 16-bit word from the header chunk.
    ///
    /// Returns `None` for an SMPTE encoding with a non-canonical frame
    /// rate byte.
    pub fn from_raw(word: u16) -> Option<Self> {
        if word & 0x8000 == 0 {
            return Some(Self::TicksPerQuarterNote(word));
        }
        let fps = SmpteFps::try_from((word >> 8) as u8).ok()?;
        Some(Self::Smpte {
            fps,
            resolution: (word & 0x00FF) as u8,
        })
    }

    /// The effective ticks-per-quarter-note value the clock divides by.
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        match self {
            Self::TicksPerQuarterNote(t) => *t,
            Self::Smpte { fps, resolution } => fps.frames_per_second() * (*resolution as u16),
        }
    }
}
