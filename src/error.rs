use thiserror::Error;

#[doc = r#"
A reason [`load`](crate::file::MidiFile::load) rejected a container.

All load failures are structural and fatal to the whole load: the source is
released and the player returns to its unloaded state. Each variant maps to
a small integer wire code (see [`code`](Self::code)) for callers that
report results numerically, e.g. on a display with no room for text.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    /// No file was named.
    #[error("no file name given")]
    NoFile,
    /// The underlying store could not open the file.
    #[error("cannot open file")]
    Open,
    /// The file does not start with the `MThd` magic.
    #[error("not an SMF container")]
    NotMidi,
    /// The declared header length is not 6.
    #[error("bad header chunk size")]
    Header,
    /// The format word is neither 0 nor 1.
    #[error("unsupported SMF format")]
    Format,
    /// A format 0 file declared more than one track.
    #[error("format 0 file with multiple tracks")]
    Format0Tracks,
    /// More tracks than the configured maximum, or an SMPTE time division
    /// with a non-canonical frame rate.
    #[error("too many tracks or unsupported time division")]
    TooManyTracks,
    /// Track `index` failed to load.
    #[error("track {index}: {kind}")]
    Track {
        /// Zero-based index of the failing track.
        index: u8,
        /// What went wrong inside the track chunk.
        kind: TrackError,
    },
}

/// A reason a single track chunk failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackError {
    /// The chunk does not start with the `MTrk` magic.
    #[error("track chunk not found")]
    BadHeader,
    /// The declared chunk length runs past the end of the source.
    #[error("chunk size past end of file")]
    OutOfBounds,
}

impl TrackError {
    const fn code(&self) -> i16 {
        match self {
            Self::BadHeader => 0,
            Self::OutOfBounds => 1,
        }
    }
}

impl LoadError {
    /// The numeric wire code for this failure.
    ///
    /// Success is conventionally reported as -1 in this scheme; the error
    /// codes are 0, 2-7, and `10*(track+1) + track_code` for per-track
    /// failures.
    pub const fn code(&self) -> i16 {
        match self {
            Self::NoFile => 0,
            Self::Open => 2,
            Self::NotMidi => 3,
            Self::Header => 4,
            Self::Format => 5,
            Self::Format0Tracks => 6,
            Self::TooManyTracks => 7,
            Self::Track { index, kind } => 10 * (*index as i16 + 1) + kind.code(),
        }
    }

    pub(crate) const fn track(index: u8, kind: TrackError) -> Self {
        Self::Track { index, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_match_the_documented_table() {
        assert_eq!(LoadError::NoFile.code(), 0);
        assert_eq!(LoadError::Open.code(), 2);
        assert_eq!(LoadError::NotMidi.code(), 3);
        assert_eq!(LoadError::Header.code(), 4);
        assert_eq!(LoadError::Format.code(), 5);
        assert_eq!(LoadError::Format0Tracks.code(), 6);
        assert_eq!(LoadError::TooManyTracks.code(), 7);
        assert_eq!(LoadError::track(0, TrackError::BadHeader).code(), 10);
        assert_eq!(LoadError::track(0, TrackError::OutOfBounds).code(), 11);
        assert_eq!(LoadError::track(2, TrackError::BadHeader).code(), 30);
        assert_eq!(LoadError::track(3, TrackError::OutOfBounds).code(), 41);
    }
}
