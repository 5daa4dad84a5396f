use crate::micros::Micros;

const MICROS_PER_MINUTE: u32 = 60_000_000;

#[doc = r#"
Converts wall-clock time into whole elapsed ticks.

The clock owns the file's time base: tempo in beats per minute, a signed
tempo adjustment layered on top, ticks per quarter note, and the time
signature. From those it derives the duration of one tick in microseconds,
and from caller-supplied monotonic timestamps it reports how many whole
ticks have passed since the last sample.

Integer division truncates, so each sample leaves a sub-tick remainder;
that remainder is carried into the next sample. Over a long run the
reported tick total therefore tracks wall time exactly instead of drifting
behind by up to one tick per sample.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    tempo: u16,
    tempo_delta: i16,
    ticks_per_quarter_note: u16,
    time_signature: [u8; 2],
    tick_time: Micros,
    last_check: Micros,
    tick_error: Micros,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        let mut clock = Self {
            tempo: 0,
            tempo_delta: 0,
            ticks_per_quarter_note: 0,
            time_signature: [0, 0],
            tick_time: Micros::ZERO,
            last_check: Micros::ZERO,
            tick_error: Micros::ZERO,
        };
        clock.reset();
        clock
    }
}

impl PlaybackClock {
    /// Restore the MIDI-specified defaults: 48 ticks per quarter note,
    /// 120 beats per minute, no adjustment, 4/4 time.
    pub fn reset(&mut self) {
        self.tempo = 120;
        self.tempo_delta = 0;
        self.ticks_per_quarter_note = 48;
        self.time_signature = [4, 4];
        self.tick_error = Micros::ZERO;
        self.last_check = Micros::ZERO;
        self.recalc_tick_time();
    }

    /// Tempo in beats per minute.
    pub const fn tempo(&self) -> u16 {
        self.tempo
    }

    /// The signed adjustment applied on top of the tempo.
    pub const fn tempo_adjust(&self) -> i16 {
        self.tempo_delta
    }

    /// Ticks per quarter note from the file header.
    pub const fn ticks_per_quarter_note(&self) -> u16 {
        self.ticks_per_quarter_note
    }

    /// Time signature as (numerator, denominator).
    pub const fn time_signature(&self) -> (u8, u8) {
        (self.time_signature[0], self.time_signature[1])
    }

    /// The derived duration of one tick.
    pub const fn tick_time(&self) -> Micros {
        self.tick_time
    }

    /// Set the tempo in beats per minute.
    ///
    /// Ignored if the new tempo plus the current adjustment would not be
    /// positive; the last valid setting wins.
    pub fn set_tempo(&mut self, bpm: u16) {
        if i32::from(self.tempo_delta) + i32::from(bpm) > 0 {
            self.tempo = bpm;
            self.recalc_tick_time();
        }
    }

    /// Set the signed tempo adjustment.
    ///
    /// Ignored if the current tempo plus the new adjustment would not be
    /// positive; the last valid setting wins.
    pub fn set_tempo_adjust(&mut self, delta: i16) {
        if i32::from(self.tempo) + i32::from(delta) > 0 {
            self.tempo_delta = delta;
            self.recalc_tick_time();
        }
    }

    /// Set the time base from the header's time-division value.
    pub fn set_ticks_per_quarter_note(&mut self, ticks: u16) {
        self.ticks_per_quarter_note = ticks;
        self.recalc_tick_time();
    }

    /// Set the time signature. The denominator is the actual note value
    /// (4 for x/4, 8 for x/8), not the power-of-two exponent from the
    /// meta event.
    pub fn set_time_signature(&mut self, numerator: u8, denominator: u8) {
        self.time_signature = [numerator, denominator];
        self.recalc_tick_time();
    }

    /// Apply a Set-Tempo meta value: microseconds per quarter note.
    pub fn set_micros_per_quarter_note(&mut self, micros: u32) {
        if micros == 0 {
            return;
        }
        self.tempo = (MICROS_PER_MINUTE / micros) as u16;
        self.recalc_tick_time();
    }

    // tick = ((us per beat) * 4) / (denominator * ticks per quarter note).
    // Skipped entirely when any divisor would be zero or the adjusted
    // tempo non-positive; the previous value stays in force.
    fn recalc_tick_time(&mut self) {
        let adjusted = i32::from(self.tempo) + i32::from(self.tempo_delta);
        if adjusted <= 0 || self.ticks_per_quarter_note == 0 || self.time_signature[1] == 0 {
            return;
        }
        let micros_per_beat = MICROS_PER_MINUTE / adjusted as u32;
        let divisor = u32::from(self.time_signature[1]) * u32::from(self.ticks_per_quarter_note);
        self.tick_time = Micros::new(u64::from(micros_per_beat * 4 / divisor));
    }

    /// Forget any partially elapsed tick and re-reference the wall clock
    /// at `now`. Used when playback (re)starts so time spent paused or
    /// loading is not credited as elapsed ticks.
    pub fn resync(&mut self, now: Micros) {
        self.tick_error = Micros::ZERO;
        self.last_check = now;
    }

    /// How many whole ticks have passed since the last sample.
    ///
    /// Returns 0 without touching any state when less than one tick has
    /// accumulated, so calling this in a tight poll loop is free.
    pub fn elapsed_ticks(&mut self, now: Micros) -> u32 {
        if self.tick_time == Micros::ZERO {
            return 0;
        }

        let elapsed = self.tick_error + now.saturating_sub(self.last_check);
        if elapsed < self.tick_time {
            return 0;
        }

        let ticks = elapsed.as_u64() / self.tick_time.as_u64();
        self.tick_error = elapsed - self.tick_time * ticks;
        self.last_check = now;
        ticks as u32
    }
}
