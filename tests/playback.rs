use pretty_assertions::assert_eq;
use smfplay::prelude::*;

/// Sink that records everything it is handed.
#[derive(Default)]
struct Collect {
    channel: Vec<ChannelEvent>,
    sysex: Vec<SysexEvent>,
    meta: Vec<MetaEvent>,
}

impl EventSink for Collect {
    fn channel_event(&mut self, event: &ChannelEvent) {
        self.channel.push(*event);
    }
    fn sysex_event(&mut self, event: &SysexEvent) {
        self.sysex.push(event.clone());
    }
    fn meta_event(&mut self, event: &MetaEvent) {
        self.meta.push(event.clone());
    }
}

fn header(format: u16, tracks: u16, division: u16) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&tracks.to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    bytes
}

fn track_chunk(body: &[u8]) -> Vec<u8> {
    let mut bytes = b"MTrk".to_vec();
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

const END_OF_TRACK: [u8; 4] = [0x00, 0xFF, 0x2F, 0x00];

/// A format 0 file with TPQN 48: Set-Tempo 500000, note-on at delta 0,
/// note-off at delta 48, end of track. The end-to-end scenario fixture.
fn simple_song() -> Vec<u8> {
    let mut body = vec![
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo: 500000 us/qn
        0x00, 0x90, 0x3C, 0x7F, // note on, C4
        0x30, 0x80, 0x3C, 0x00, // note off after 48 ticks
    ];
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));
    bytes
}

/// Steps a player one whole tick at a time with a synthetic wall clock.
struct Driver {
    now: u64,
}

impl Driver {
    /// Issue the initial synchronizing call at t=0.
    fn start<S: MidiSource>(player: &mut MidiFile<S>, sink: &mut Collect) -> Self {
        let driver = Driver { now: 0 };
        assert!(!player.next_event(Micros::ZERO, sink));
        driver
    }

    /// Advance wall time by exactly one current tick and run a step.
    fn step<S: MidiSource>(&mut self, player: &mut MidiFile<S>, sink: &mut Collect) -> bool {
        self.now += player.clock().tick_time().as_u64();
        player.next_event(Micros::new(self.now), sink)
    }
}

fn loaded(bytes: &[u8]) -> MidiFile<SliceSource<'_>> {
    let mut player = MidiFile::new(PlayerConfig::default());
    player.load(SliceSource::new(bytes)).unwrap();
    player
}

#[test]
fn format_0_file_plays_note_pair_at_correct_ticks() {
    let bytes = simple_song();
    let mut player = loaded(&bytes);
    assert_eq!(player.format(), Format::SingleMultiChannel);
    assert_eq!(player.track_count(), 1);
    assert_eq!(player.clock().ticks_per_quarter_note(), 48);

    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);

    let mut arrivals = vec![];
    for step in 1..=60u32 {
        driver.step(&mut player, &mut sink);
        while arrivals.len() < sink.channel.len() {
            arrivals.push(step);
        }
    }

    assert_eq!(sink.channel.len(), 2);
    assert_eq!(arrivals, vec![1, 48]);

    let on = &sink.channel[0];
    assert_eq!((on.command, on.channel, on.data()), (0x90, 0, &[0x3C, 0x7F][..]));
    let off = &sink.channel[1];
    assert_eq!((off.command, off.channel, off.data()), (0x80, 0, &[0x3C, 0x00][..]));

    // the tempo meta was interpreted and forwarded
    assert_eq!(sink.meta[0].kind(), Some(MetaType::SetTempo));
    assert_eq!(sink.meta[0].data(), &[0x07, 0xA1, 0x20]);
    assert_eq!(player.clock().tempo(), 120);

    assert!(player.is_finished());
}

#[test]
fn looping_replays_and_never_finishes() {
    let bytes = simple_song();
    let mut player = loaded(&bytes);
    player.set_looping(true);

    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);

    for _ in 0..48 {
        driver.step(&mut player, &mut sink);
    }
    assert_eq!(sink.channel.len(), 2);
    assert!(!player.is_finished());

    // second pass replays the pair
    for _ in 0..60 {
        driver.step(&mut player, &mut sink);
        player.is_finished();
    }
    assert!(sink.channel.len() >= 4);
}

#[test]
fn looping_two_track_file_does_not_replay_setup_track() {
    let mut t0 = vec![0x00, 0xC0, 0x05]; // program change: one-time setup
    t0.extend_from_slice(&END_OF_TRACK);

    let mut t1 = vec![
        0x00, 0x90, 0x3C, 0x40, //
        0x30, 0x80, 0x3C, 0x00,
    ];
    t1.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(1, 2, 48);
    bytes.extend_from_slice(&track_chunk(&t0));
    bytes.extend_from_slice(&track_chunk(&t1));

    let mut player = loaded(&bytes);
    player.set_looping(true);

    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);

    // two full passes; the extra step absorbs the resynchronizing call
    // that starts each looped pass
    for _ in 0..2 {
        for _ in 0..49 {
            driver.step(&mut player, &mut sink);
        }
        assert!(!player.is_finished());
    }

    let from_setup = sink.channel.iter().filter(|e| e.track == 0).count();
    let from_notes = sink.channel.iter().filter(|e| e.track == 1).count();
    assert_eq!(from_setup, 1);
    assert_eq!(from_notes, 4);
}

#[test]
fn running_status_reconstructs_shared_header() {
    let mut body = vec![
        0x00, 0x90, 0x3C, 0x40, // full message
        0x00, 0x3E, 0x41, // running status continuation
        0x00, 0x40, 0x42, // and another
    ];
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));

    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    assert_eq!(sink.channel.len(), 3);
    for event in &sink.channel {
        assert_eq!(event.command, 0x90);
        assert_eq!(event.channel, 0);
        assert_eq!(event.data_len, 2);
    }
    // the "status-looking" bytes became the continuations' first data byte
    assert_eq!(sink.channel[1].data(), &[0x3E, 0x41]);
    assert_eq!(sink.channel[2].data(), &[0x40, 0x42]);
}

#[test]
fn oversized_sysex_is_truncated_to_capacity() {
    let mut body = vec![0x00, 0xF0, 0x3C]; // declared length 60
    body.extend(core::iter::repeat(0x11).take(59));
    body.push(0xF7);
    body.extend_from_slice(&[0x00, 0x90, 0x3C, 0x40]); // stream continues cleanly
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));

    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    assert_eq!(sink.sysex.len(), 1);
    let sysex = &sink.sysex[0];
    assert_eq!(sysex.data().len(), SYSEX_PAYLOAD_CAPACITY);
    assert_eq!(sysex.data()[0], 0xF0);
    assert!(sysex.is_truncated());

    // the note after the oversized payload still decoded
    assert_eq!(sink.channel.len(), 1);
}

#[test]
fn oversized_meta_is_truncated_and_suppressible() {
    let mut body = vec![0x00, 0xFF, 0x01, 0x3C]; // text meta, 60 bytes
    body.extend(core::iter::repeat(b'x').take(60));
    body.extend_from_slice(&[0x00, 0x90, 0x3C, 0x40]);
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));

    // default config forwards the opaque copy, truncated
    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    let text = sink.meta.iter().find(|m| m.meta_type == 0x01).unwrap();
    assert_eq!(text.data().len(), META_PAYLOAD_CAPACITY);
    assert_eq!(sink.channel.len(), 1);

    // with emission off the bytes are still consumed but nothing arrives
    let mut player = MidiFile::new(PlayerConfig {
        emit_unrecognized_meta: false,
        ..PlayerConfig::default()
    });
    player.load(SliceSource::new(&bytes)).unwrap();
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    assert!(sink.meta.iter().all(|m| m.meta_type != 0x01));
    assert_eq!(sink.channel.len(), 1);
}

#[test]
fn key_signature_renders_readable_name() {
    let mut body = vec![
        0x00, 0xFF, 0x59, 0x02, 0xFD, 0x00, // 3 flats, major
        0x00, 0xFF, 0x59, 0x02, 0x02, 0x01, // 2 sharps, minor
    ];
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));

    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    let keys: Vec<_> = sink
        .meta
        .iter()
        .filter(|m| m.kind() == Some(MetaType::KeySignature))
        .map(|m| m.as_text().unwrap().to_owned())
        .collect();
    assert_eq!(keys, vec!["EbM".to_owned(), "Bm".to_owned()]);
}

#[test]
fn time_signature_updates_clock_and_skips_remainder() {
    let mut body = vec![
        0x00, 0xFF, 0x58, 0x04, 0x06, 0x03, 0x18, 0x08, // 6/8 time
        0x00, 0x90, 0x3C, 0x40,
    ];
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));

    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    assert_eq!(player.clock().time_signature(), (6, 8));
    // the two clock bytes after the signature were skipped over
    assert_eq!(sink.channel.len(), 1);

    let ts = sink
        .meta
        .iter()
        .find(|m| m.kind() == Some(MetaType::TimeSignature))
        .unwrap();
    assert_eq!(ts.data(), &[0x06, 0x03]);
}

#[test]
fn undecodable_status_byte_halts_only_that_track() {
    let mut t0 = vec![0x00, 0xF5, 0x00, 0x00]; // invalid in a file
    t0.extend_from_slice(&END_OF_TRACK);

    let mut t1 = vec![0x00, 0x90, 0x3C, 0x40];
    t1.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(1, 2, 48);
    bytes.extend_from_slice(&track_chunk(&t0));
    bytes.extend_from_slice(&track_chunk(&t1));

    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    // the bad track emitted nothing, the healthy one played
    assert!(sink.channel.iter().all(|e| e.track == 1));
    assert_eq!(sink.channel.len(), 1);
    assert!(player.tracks()[0].end_of_track());
    assert!(player.is_finished());
}

#[test]
fn pause_freezes_playback_and_resume_discards_the_gap() {
    let bytes = simple_song();
    let mut player = loaded(&bytes);
    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);

    driver.step(&mut player, &mut sink);
    assert_eq!(sink.channel.len(), 1);

    player.pause(true);
    // a long paused stretch produces nothing
    driver.now += 10_000_000;
    assert!(!player.next_event(Micros::new(driver.now), &mut sink));
    assert_eq!(sink.channel.len(), 1);

    player.pause(false);
    // resume resyncs: the paused 10 seconds are not credited as ticks,
    // and the track's accumulated tick count starts over
    assert!(!player.next_event(Micros::new(driver.now), &mut sink));
    assert_eq!(sink.channel.len(), 1);

    // the note-off needs its full 48 ticks of real time again
    for _ in 0..47 {
        driver.step(&mut player, &mut sink);
    }
    assert_eq!(sink.channel.len(), 1);
    driver.step(&mut player, &mut sink);
    assert_eq!(sink.channel.len(), 2);
}

#[test]
fn ordering_policies_interleave_differently() {
    fn two_track_burst() -> Vec<u8> {
        let mut t = vec![
            0x00, 0x90, 0x3C, 0x40, //
            0x00, 0x80, 0x3C, 0x00,
        ];
        t.extend_from_slice(&END_OF_TRACK);

        let mut bytes = header(1, 2, 48);
        bytes.extend_from_slice(&track_chunk(&t));
        bytes.extend_from_slice(&track_chunk(&t));
        bytes
    }

    let bytes = two_track_burst();

    let order_with = |ordering: EventOrdering| {
        let mut player = MidiFile::new(PlayerConfig {
            event_ordering: ordering,
            ..PlayerConfig::default()
        });
        player.load(SliceSource::new(&bytes)).unwrap();
        let mut sink = Collect::default();
        let mut driver = Driver::start(&mut player, &mut sink);
        driver.step(&mut player, &mut sink);
        sink.channel.iter().map(|e| e.track).collect::<Vec<_>>()
    };

    assert_eq!(order_with(EventOrdering::TrackPriority), vec![0, 0, 1, 1]);
    assert_eq!(order_with(EventOrdering::EventPriority), vec![0, 1, 0, 1]);
}

#[test]
fn load_then_close_is_an_idempotent_reset() {
    let bytes = simple_song();
    let mut player: MidiFile<SliceSource> = MidiFile::new(PlayerConfig::default());
    let fresh_tick_time = player.clock().tick_time();

    player.load(SliceSource::new(&bytes)).unwrap();
    assert!(player.is_loaded());
    player.close();

    assert!(!player.is_loaded());
    assert_eq!(player.track_count(), 0);
    assert_eq!(player.format(), Format::SingleMultiChannel);
    assert_eq!(player.clock().tempo(), 120);
    assert_eq!(player.clock().ticks_per_quarter_note(), 48);
    assert_eq!(player.clock().time_signature(), (4, 4));
    assert_eq!(player.clock().tick_time(), fresh_tick_time);

    // and the player is ready for the next load
    player.load(SliceSource::new(&bytes)).unwrap();
    assert!(player.is_loaded());
}

#[test]
fn load_rejects_malformed_containers_with_documented_codes() {
    let check = |bytes: &[u8], expected: LoadError| {
        let mut player: MidiFile<SliceSource> = MidiFile::new(PlayerConfig::default());
        let err = player.load(SliceSource::new(bytes)).unwrap_err();
        assert_eq!(err, expected);
        assert!(!player.is_loaded());
    };

    check(b"RIFF", LoadError::NotMidi);
    assert_eq!(LoadError::NotMidi.code(), 3);

    let mut bad_len = b"MThd".to_vec();
    bad_len.extend_from_slice(&7u32.to_be_bytes());
    bad_len.extend_from_slice(&[0, 0, 0, 1, 0, 48]);
    check(&bad_len, LoadError::Header);

    check(&header(2, 1, 48), LoadError::Format);
    check(&header(0, 2, 48), LoadError::Format0Tracks);
    check(&header(1, 17, 48), LoadError::TooManyTracks);

    // SMPTE division with a non-canonical frame rate byte
    check(&header(0, 1, 0x9C28), LoadError::TooManyTracks);

    // track chunk with the wrong magic
    let mut bad_track = header(0, 1, 48);
    bad_track.extend_from_slice(b"Mtrk");
    bad_track.extend_from_slice(&0u32.to_be_bytes());
    check(
        &bad_track,
        LoadError::Track {
            index: 0,
            kind: TrackError::BadHeader,
        },
    );

    // declared track length running past the end of the source
    let mut overrun = header(0, 1, 48);
    overrun.extend_from_slice(b"MTrk");
    overrun.extend_from_slice(&100u32.to_be_bytes());
    overrun.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);
    let err = {
        let mut player: MidiFile<SliceSource> = MidiFile::new(PlayerConfig::default());
        player.load(SliceSource::new(&overrun)).unwrap_err()
    };
    assert_eq!(err.code(), 11);
}

#[test]
fn smpte_division_sets_effective_tick_rate() {
    // 24 fps, 40 ticks per frame
    let mut bytes = header(0, 1, 0xE828);
    bytes.extend_from_slice(&track_chunk(&END_OF_TRACK));

    let player = loaded(&bytes);
    assert_eq!(player.clock().ticks_per_quarter_note(), 960);
}

#[test]
fn tempo_meta_slows_the_tick_clock() {
    let mut body = vec![
        0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40, // 1_000_000 us/qn
        0x00, 0x90, 0x3C, 0x40,
    ];
    body.extend_from_slice(&END_OF_TRACK);

    let mut bytes = header(0, 1, 48);
    bytes.extend_from_slice(&track_chunk(&body));

    let mut player = loaded(&bytes);
    let before = player.clock().tick_time();

    let mut sink = Collect::default();
    let mut driver = Driver::start(&mut player, &mut sink);
    driver.step(&mut player, &mut sink);

    assert_eq!(player.clock().tempo(), 60);
    assert!(player.clock().tick_time() > before);
}
