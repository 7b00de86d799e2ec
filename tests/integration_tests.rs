//! End to end tests: pcm through the encoder, the wire format and the decoder.

use libsbc_audio::{
    info, probe, validate, AllocationMethod, ChannelMode, Config, Decoder, Encoder, Frequency,
};

// ============================================================================
// Helpers
// ============================================================================

/// two tones per channel, different per channel
fn music(config: &Config, frames: usize) -> Vec<i16> {
    let channels = config.channels();
    let len = config.frame_samples() * frames;
    let mut pcm = Vec::with_capacity(len * channels);
    for i in 0..len {
        let n = i as f64;
        let two_pi = 2.0 * std::f64::consts::PI;
        let left = 8000.0 * (two_pi * n * 440.0 / 44_100.0).sin()
            + 2666.0 * (two_pi * n * 1234.0 / 44_100.0).sin();
        let right = 6400.0 * (two_pi * n * 440.0 / 44_100.0 + 0.3).sin()
            + 2000.0 * (two_pi * n * 3000.0 / 44_100.0).sin();
        pcm.push(left as i16);
        if channels == 2 {
            pcm.push(right as i16);
        }
    }
    pcm
}

fn round_trip(config: Config, frames: usize) -> (Vec<i16>, Vec<i16>) {
    let input = music(&config, frames);
    let mut encoder = Encoder::new(config).unwrap();
    let mut decoder = Decoder::new(config).unwrap();

    let mut stream = Vec::new();
    for block in input.chunks_exact(config.pcm_block_len()) {
        encoder.encode_into(block, &mut stream).unwrap();
    }
    assert_eq!(stream.len(), frames * config.frame_size());

    let mut output = Vec::with_capacity(input.len());
    for frame in stream.chunks_exact(config.frame_size()) {
        output.extend(decoder.decode(frame).unwrap());
    }
    (input, output)
}

/// worst channel snr in dB after the filter bank delay
fn snr_db(config: &Config, input: &[i16], output: &[i16]) -> f64 {
    let channels = config.channels();
    let delay = 9 * config.subbands + 1;
    let settle = 4 * config.frame_samples();

    let mut worst = f64::INFINITY;
    for ch in 0..channels {
        let x: Vec<f64> = input.iter().skip(ch).step_by(channels).map(|&s| s as f64).collect();
        let y: Vec<f64> = output.iter().skip(ch).step_by(channels).map(|&s| s as f64).collect();

        let mut signal = 0.0;
        let mut noise = 0.0;
        for (o, i) in y[delay..].iter().zip(x.iter()).skip(settle) {
            signal += i * i;
            noise += (o - i) * (o - i);
        }
        worst = worst.min(10.0 * (signal / noise.max(1e-9)).log10());
    }
    worst
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_mono_round_trip() {
    let config = Config::new(8, 16, Frequency::Freq44k1);
    let (input, output) = round_trip(config, 20);
    assert_eq!(input.len(), output.len());
    let snr = snr_db(&config, &input, &output);
    assert!(snr > 40.0, "snr {snr:.1} dB");
}

#[test]
fn test_four_subband_round_trip() {
    let config = Config::new(4, 8, Frequency::Freq44k1);
    let (input, output) = round_trip(config, 40);
    let snr = snr_db(&config, &input, &output);
    assert!(snr > 40.0, "snr {snr:.1} dB");
}

#[test]
fn test_snr_allocation_round_trip() {
    let config =
        Config::new(8, 16, Frequency::Freq44k1).with_allocation(AllocationMethod::Snr);
    let (input, output) = round_trip(config, 20);
    let snr = snr_db(&config, &input, &output);
    assert!(snr > 40.0, "snr {snr:.1} dB");
}

#[test]
fn test_stereo_modes_round_trip() {
    for (mode, bitpool) in [
        (ChannelMode::DualChannel, 32),
        (ChannelMode::Stereo, 53),
        (ChannelMode::JointStereo, 53),
    ] {
        let config = Config::new(8, 16, Frequency::Freq44k1)
            .with_mode(mode)
            .with_bitpool(bitpool);
        let (input, output) = round_trip(config, 20);
        let snr = snr_db(&config, &input, &output);
        assert!(snr > 35.0, "{mode:?}: snr {snr:.1} dB");
    }
}

#[test]
fn test_joint_stereo_identical_channels() {
    let config = Config::new(8, 16, Frequency::Freq44k1)
        .with_mode(ChannelMode::JointStereo)
        .with_bitpool(35);
    let mono = music(&config.with_mode(ChannelMode::Mono), 10);
    let input: Vec<i16> = mono.iter().flat_map(|&s| [s, s]).collect();

    let mut encoder = Encoder::new(config).unwrap();
    let mut decoder = Decoder::new(config).unwrap();
    let mut output = Vec::new();
    let mut joined = 0;
    for block in input.chunks_exact(config.pcm_block_len()) {
        let frame = encoder.encode(block).unwrap();
        joined += frame[4].count_ones();
        output.extend(decoder.decode(&frame).unwrap());
    }

    assert!(joined > 0, "identical channels should use mid/side");
    let snr = snr_db(&config, &input, &output);
    assert!(snr > 35.0, "snr {snr:.1} dB");
}

#[test]
fn test_msbc_round_trip() {
    let config = Config::msbc();
    let (input, output) = round_trip(config, 30);
    let snr = snr_db(&config, &input, &output);
    assert!(snr > 35.0, "snr {snr:.1} dB");
}

#[test]
fn test_silence_round_trip() {
    for config in [
        Config::msbc(),
        Config::new(4, 4, Frequency::Freq16k).with_mode(ChannelMode::JointStereo),
    ] {
        let mut encoder = Encoder::new(config).unwrap();
        let mut decoder = Decoder::new(config).unwrap();
        let silence = vec![0i16; config.pcm_block_len()];
        for _ in 0..3 {
            let frame = encoder.encode(&silence).unwrap();
            assert_eq!(decoder.decode(&frame).unwrap(), silence);
        }
    }
}

#[test]
fn test_stereo_silence_frame() {
    let config = Config::new(8, 16, Frequency::Freq44k1)
        .with_mode(ChannelMode::Stereo)
        .with_allocation(AllocationMethod::Loudness)
        .with_bitpool(32);
    let mut encoder = Encoder::new(config).unwrap();
    let mut decoder = Decoder::new(config).unwrap();

    let silence = vec![0i16; 256];
    let frame = encoder.encode(&silence).unwrap();
    assert_eq!(frame.len(), 76);
    assert_eq!(frame[0], 0x9c);
    assert!(validate(&frame));

    let pcm = decoder.decode(&frame).unwrap();
    assert_eq!(pcm.len(), 256);
    assert!(pcm.iter().all(|&s| s == 0));
}

// ============================================================================
// Frame inspection
// ============================================================================

#[test]
fn test_probe_and_info() {
    let config = Config::new(8, 12, Frequency::Freq48k)
        .with_mode(ChannelMode::JointStereo)
        .with_allocation(AllocationMethod::Snr)
        .with_bitpool(40);
    let pcm = music(&config, 1);
    let frame = Encoder::new(config).unwrap().encode(&pcm).unwrap();

    assert_eq!(probe(&frame), Ok(config));
    assert!(validate(&frame));

    let frame_info = info(&frame).unwrap();
    assert_eq!(frame_info.config, config);
    assert_eq!(frame_info.sample_rate, 48_000);
    assert_eq!(frame_info.channels, 2);
    assert_eq!(frame_info.frame_size, config.frame_size());
    assert_eq!(frame_info.bitrate, config.frame_bitrate());
    assert_eq!(frame_info.samples_per_frame, 96);
    assert!((frame_info.duration_secs - 0.002).abs() < 1e-9);
    assert!(!frame_info.msbc);
    assert!(frame_info.crc_valid);
}

#[test]
fn test_info_reports_bad_crc() {
    let pcm = vec![0i16; 120];
    let mut frame = Encoder::new(Config::msbc()).unwrap().encode(&pcm).unwrap();
    assert!(info(&frame).unwrap().msbc);

    frame[5] ^= 0x80;
    let frame_info = info(&frame).unwrap();
    assert!(!frame_info.crc_valid);
    assert!(!validate(&frame));

    // header only: too short to check
    assert!(!info(&frame[..4]).unwrap().crc_valid);
}

#[test]
fn test_probe_rejects_garbage() {
    assert!(probe(&[]).is_err());
    assert!(probe(&[0x12, 0x34, 0x56, 0x78]).is_err());
    assert!(!validate(&[0x9c]));
}
