use std::path::Path;
use std::time::Duration;

use super::deck::{Deck, build_chain};
use super::decode::{FfmpegDecoder, PcmStream};
use super::eq::{EQ_BANDS, Equalizer, MAX_EQ_DB, MIN_EQ_DB, find_preset};
use super::frames::{Frame, FrameSource};
use super::tap::SampleTap;
use super::volume::{MAX_VOLUME_DB, MIN_VOLUME_DB, Volume};
use crate::error::DecodeError;

fn pcm(frames: &[(i16, i16)]) -> PcmStream {
    let mut bytes = Vec::with_capacity(frames.len() * 4);
    for (l, r) in frames {
        bytes.extend_from_slice(&l.to_le_bytes());
        bytes.extend_from_slice(&r.to_le_bytes());
    }
    PcmStream::from_bytes(bytes)
}

fn to_bytes(frames: &[Frame]) -> Vec<u8> {
    let mut out = Vec::with_capacity(frames.len() * 4);
    for f in frames {
        for sample in f {
            out.extend_from_slice(&((sample * 32768.0).round() as i16).to_le_bytes());
        }
    }
    out
}

fn drain<S: FrameSource>(source: &mut S) -> Vec<Frame> {
    let mut out = Vec::new();
    let mut buf = [[0.0; 2]; 3];
    loop {
        let (n, more) = source.stream(&mut buf);
        out.extend_from_slice(&buf[..n]);
        if !more {
            return out;
        }
    }
}

#[test]
fn pcm_stream_reads_back_the_same_samples() {
    let input = [(0, 0), (1, -1), (i16::MAX, i16::MIN), (1234, -4321), (-2, 7)];
    let mut stream = pcm(&input);
    assert_eq!(stream.len(), 5);

    let frames = drain(&mut stream);
    let back: Vec<(i16, i16)> = frames
        .iter()
        .map(|f| ((f[0] * 32768.0).round() as i16, (f[1] * 32768.0).round() as i16))
        .collect();
    assert_eq!(back, input);

    stream.seek(0).unwrap();
    assert_eq!(drain(&mut stream), frames);
}

#[test]
fn pcm_stream_drops_trailing_partial_frame() {
    let stream = PcmStream::from_bytes(vec![0, 0, 0, 0, 1, 2]);
    assert_eq!(stream.len(), 1);
}

#[test]
fn pcm_stream_end_of_stream_reports_no_more() {
    let mut stream = pcm(&[(1, 1), (2, 2)]);
    let mut buf = [[0.0; 2]; 8];
    assert_eq!(stream.stream(&mut buf), (2, true));
    assert_eq!(stream.stream(&mut buf), (0, false));
}

#[test]
fn pcm_stream_seek_bounds() {
    let mut stream = pcm(&[(0, 0); 10]);
    stream.seek(10).unwrap();
    assert_eq!(stream.position(), 10);
    assert!(matches!(
        stream.seek(11),
        Err(DecodeError::OutOfRange { pos: 11, len: 10 })
    ));
    assert_eq!(stream.position(), 10);
}

#[test]
fn pcm_stream_close_yields_nothing() {
    let mut stream = pcm(&[(5, 5); 4]);
    stream.close();
    let mut buf = [[0.0; 2]; 4];
    assert_eq!(stream.stream(&mut buf), (0, false));
    assert!(stream.is_empty());
}

#[test]
fn decoder_missing_program_is_dependency_error() {
    let decoder = FfmpegDecoder::new("specamp-no-such-decoder-binary");
    let err = decoder.decode(Path::new("song.flac"), 44_100).unwrap_err();
    match err {
        DecodeError::DependencyMissing { program, ext } => {
            assert_eq!(program, "specamp-no-such-decoder-binary");
            assert_eq!(ext, ".flac");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn decoder_failing_program_is_decode_error() {
    let decoder = FfmpegDecoder::new("false");
    let err = decoder.decode(Path::new("song.mp3"), 44_100).unwrap_err();
    assert!(matches!(err, DecodeError::DecodeFailed(_)), "{err:?}");
}

#[cfg(unix)]
#[test]
fn decoder_empty_output_is_decode_error() {
    let decoder = FfmpegDecoder::new("true");
    let err = decoder.decode(Path::new("song.mp3"), 44_100).unwrap_err();
    assert!(matches!(err, DecodeError::DecodeFailed(_)), "{err:?}");
}

#[cfg(unix)]
#[test]
fn decoder_reads_pcm_from_program_stdout() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let raw: Vec<u8> = [(1i16, -1i16), (i16::MAX, i16::MIN), (10_000, -10_000)]
        .iter()
        .flat_map(|(l, r)| [l.to_le_bytes(), r.to_le_bytes()].concat())
        .collect();
    fs::write(dir.path().join("pcm.raw"), &raw).unwrap();

    // Records its arguments and emits the prepared PCM on stdout.
    let script = dir.path().join("fake-ffmpeg");
    fs::write(
        &script,
        "#!/bin/sh\ndir=$(dirname \"$0\")\nprintf '%s\\n' \"$@\" > \"$dir/args.txt\"\ncat \"$dir/pcm.raw\"\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let decoder = FfmpegDecoder::new(script.to_str().unwrap());
    let mut stream = decoder.decode(Path::new("/music/song.ogg"), 48_000).unwrap();

    let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        [
            "-i", "/music/song.ogg", "-f", "s16le", "-acodec", "pcm_s16le", "-ar", "48000", "-ac",
            "2", "-loglevel", "error", "pipe:1",
        ]
    );

    assert_eq!(stream.len(), 3);
    assert_eq!(to_bytes(&drain(&mut stream)), raw);
    stream.seek(0).unwrap();
    assert_eq!(stream.position(), 0);
    assert_eq!(to_bytes(&drain(&mut stream)), raw);
}

#[test]
fn tap_mixdown_averages_channels() {
    let tap = SampleTap::new(4);
    let mut tapped = tap.wrap(pcm(&[(16384, -16384), (16384, 16384)]));
    let frames = drain(&mut tapped);

    // Output to the device is untouched.
    assert_eq!(frames[0], [0.5, -0.5]);

    let samples = tap.samples(2);
    assert_eq!(samples, vec![0.0, 0.5]);
}

#[test]
fn tap_keeps_the_most_recent_samples_in_order() {
    let tap = SampleTap::new(4);
    let input: Vec<(i16, i16)> = (1..=6).map(|v| (v * 1000, v * 1000)).collect();
    let mut tapped = tap.wrap(pcm(&input));
    drain(&mut tapped);

    let expected: Vec<f64> = (3..=6).map(|v| f64::from(v * 1000) / 32768.0).collect();
    assert_eq!(tap.samples(4), expected);
    assert_eq!(tap.samples(100).len(), 4);
    assert_eq!(tap.samples(2), expected[2..].to_vec());
}

#[test]
fn tap_clear_zeroes_the_ring() {
    let tap = SampleTap::new(3);
    let mut tapped = tap.wrap(pcm(&[(1000, 1000); 3]));
    drain(&mut tapped);
    tap.clear();
    assert_eq!(tap.samples(3), vec![0.0; 3]);
}

#[test]
fn volume_scales_by_decibels() {
    let half_db = 20.0 * 0.5f64.log10();
    let mut vol = Volume::new(pcm(&[(16384, -16384)]), half_db);
    let frames = drain(&mut vol);
    assert!((frames[0][0] - 0.25).abs() < 1e-9);
    assert!((frames[0][1] + 0.25).abs() < 1e-9);

    vol.set_db(100.0);
    assert_eq!(vol.db(), MAX_VOLUME_DB);
    vol.set_db(-100.0);
    assert_eq!(vol.db(), MIN_VOLUME_DB);
}

#[test]
fn flat_equalizer_passes_audio_through() {
    let input = [(100, -100), (2000, 3000), (-32768, 32767)];
    let expected = drain(&mut pcm(&input));
    let mut eq = Equalizer::new(pcm(&input), 44_100, [0.0; EQ_BANDS]);
    assert_eq!(drain(&mut eq), expected);
}

#[test]
fn equalizer_clamps_gains_and_ignores_bad_bands() {
    let mut eq = Equalizer::new(pcm(&[]), 44_100, [0.0; EQ_BANDS]);
    eq.set_gain(0, 50.0);
    eq.set_gain(1, -50.0);
    eq.set_gain(EQ_BANDS, 3.0);
    let gains = eq.gains();
    assert_eq!(gains[0], MAX_EQ_DB);
    assert_eq!(gains[1], MIN_EQ_DB);
    assert!(gains[2..].iter().all(|g| *g == 0.0));
}

#[test]
fn equalizer_band_above_nyquist_is_bypassed() {
    let input = [(1000, 1000), (-1000, 2000), (500, 0)];
    let expected = drain(&mut pcm(&input));
    let mut gains = [0.0; EQ_BANDS];
    gains[EQ_BANDS - 1] = 6.0;
    // 16 kHz band at 8 kHz sample rate.
    let mut eq = Equalizer::new(pcm(&input), 8_000, gains);
    assert_eq!(eq.gains()[EQ_BANDS - 1], 6.0);
    assert_eq!(drain(&mut eq), expected);
}

#[test]
fn boosted_band_changes_the_signal() {
    let input: Vec<(i16, i16)> = (0..256)
        .map(|i| {
            let s = ((i as f64) * 2.0 * std::f64::consts::PI * 70.0 / 44_100.0).sin();
            let v = (s * 8000.0) as i16;
            (v, v)
        })
        .collect();
    let flat = drain(&mut pcm(&input));
    let mut gains = [0.0; EQ_BANDS];
    gains[0] = 12.0;
    let boosted = drain(&mut Equalizer::new(pcm(&input), 44_100, gains));
    assert_ne!(flat, boosted);
}

#[test]
fn presets_are_found_by_name_ignoring_case() {
    let (idx, preset) = find_preset("bass boost").unwrap();
    assert_eq!(preset.name, "Bass Boost");
    assert_eq!(idx, 5);
    assert!(find_preset("nope").is_none());
}

#[test]
fn deck_source_drains_and_marks_done() {
    let tap = SampleTap::new(8);
    let chain = build_chain(pcm(&[(16384, 16384); 5]), &tap, 44_100, 0.0, [0.0; EQ_BANDS]);
    let deck = Deck::new(chain, 44_100);

    let mut source = deck.source();
    assert!(!deck.is_done());
    let samples: Vec<f32> = source.by_ref().collect();
    assert_eq!(samples.len(), 10);
    assert!(samples.iter().all(|s| (*s - 0.5).abs() < 1e-6));
    assert!(deck.is_done());
    assert_eq!(tap.samples(5), vec![0.5; 5]);
}

#[test]
fn closed_deck_source_ends_without_finishing() {
    let tap = SampleTap::new(8);
    let chain = build_chain(pcm(&[(1, 1); 5]), &tap, 44_100, 0.0, [0.0; EQ_BANDS]);
    let deck = Deck::new(chain, 44_100);
    deck.close();

    let mut source = deck.source();
    assert_eq!(source.next(), None);
    assert!(!deck.is_done());
    assert_eq!(deck.duration(), Duration::ZERO);
    deck.seek_by(1.0).unwrap();
}

#[test]
fn deck_seek_is_clamped_to_track() {
    let tap = SampleTap::new(8);
    // Two seconds at 100 Hz.
    let chain = build_chain(pcm(&[(0, 0); 200]), &tap, 100, 0.0, [0.0; EQ_BANDS]);
    let deck = Deck::new(chain, 100);
    assert_eq!(deck.duration(), Duration::from_secs(2));

    deck.seek_by(1.5).unwrap();
    assert_eq!(deck.position(), Duration::from_millis(1500));
    deck.seek_by(-10.0).unwrap();
    assert_eq!(deck.position(), Duration::ZERO);
    deck.seek_by(10.0).unwrap();
    assert_eq!(deck.position(), Duration::from_secs(2));
    deck.seek_to(Duration::from_millis(500)).unwrap();
    assert_eq!(deck.position(), Duration::from_millis(500));
    deck.seek_to(Duration::from_secs(60)).unwrap();
    assert_eq!(deck.position(), deck.duration());
}

#[test]
fn deck_volume_and_eq_apply_to_live_chain() {
    let tap = SampleTap::new(8);
    let chain = build_chain(pcm(&[(16384, 16384); 4]), &tap, 44_100, 0.0, [0.0; EQ_BANDS]);
    let deck = Deck::new(chain, 44_100);
    deck.set_volume(-100.0);
    deck.set_eq_band(3, 4.0);

    let db = deck.with_chain(|c| c.inner_mut().inner_mut().db()).unwrap();
    assert_eq!(db, MIN_VOLUME_DB);
    let gains = deck.with_chain(|c| c.inner_mut().gains()).unwrap();
    assert_eq!(gains[3], 4.0);
}
