mod encoder_tests {
    use libsbc_audio::{
        AllocationMethod, ChannelMode, Config, ConfigError, Encoder, Frequency, SbcError,
        MSBC_SYNCWORD, SYNCWORD,
    };
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const MSBC_SILENCE: [u8; 57] = [
        0xad, 0x00, 0x00, 0xc5, 0x00, 0x00, 0x00, 0x00, 0x77, 0x6d, 0xb6, 0xdd, 0xdb, 0x6d, 0xb7,
        0x76, 0xdb, 0x6d, 0xdd, 0xb6, 0xdb, 0x77, 0x6d, 0xb6, 0xdd, 0xdb, 0x6d, 0xb7, 0x76, 0xdb,
        0x6d, 0xdd, 0xb6, 0xdb, 0x77, 0x6d, 0xb6, 0xdd, 0xdb, 0x6d, 0xb7, 0x76, 0xdb, 0x6d, 0xdd,
        0xb6, 0xdb, 0x77, 0x6d, 0xb6, 0xdd, 0xdb, 0x6d, 0xb7, 0x76, 0xdb, 0x6c,
    ];

    fn tone(config: &Config, frames: usize) -> Vec<i16> {
        let channels = config.channels();
        let len = config.frame_samples() * frames;
        let mut pcm = Vec::with_capacity(len * channels);
        for i in 0..len {
            let t = i as f64 / config.sample_rate_hz() as f64;
            for ch in 0..channels {
                let freq = 440.0 * (ch + 1) as f64;
                pcm.push((9000.0 * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16);
            }
        }
        pcm
    }

    // ============================================================================
    // Construction
    // ============================================================================

    #[test]
    fn test_rejects_invalid_config() {
        let err = Encoder::new(Config::new(5, 16, Frequency::Freq44k1)).unwrap_err();
        assert_eq!(err, SbcError::Config(ConfigError::Subbands(5)));

        let err = Encoder::new(Config::new(8, 16, Frequency::Freq44k1).with_bitpool(0));
        assert!(matches!(
            err,
            Err(SbcError::Config(ConfigError::Bitpool { .. }))
        ));

        let err = Encoder::new(Config::msbc().with_mode(ChannelMode::Stereo));
        assert_eq!(err.unwrap_err(), SbcError::Config(ConfigError::Msbc));
    }

    #[test]
    fn test_properties() {
        let encoder =
            Encoder::new(Config::new(8, 16, Frequency::Freq44k1).with_mode(ChannelMode::Stereo))
                .unwrap();
        assert_eq!(encoder.frame_size(), 76);
        assert_eq!(encoder.frame_bitrate(), 209_475);
        assert_eq!(encoder.sample_rate_hz(), 44_100);
        assert_eq!(encoder.frame_samples(), 128);
        assert_eq!(encoder.pcm_block_len(), 256);
    }

    // ============================================================================
    // Encoding
    // ============================================================================

    #[test]
    fn test_msbc_silence_frame() {
        let mut encoder = Encoder::new(Config::msbc()).unwrap();
        let frame = encoder.encode(&[0i16; 120]).unwrap();
        assert_eq!(frame, MSBC_SILENCE.to_vec());

        // still silence, still the same frame
        let frame = encoder.encode(&[0i16; 120]).unwrap();
        assert_eq!(frame, MSBC_SILENCE.to_vec());
    }

    #[test]
    fn test_wrong_block_length() {
        let mut encoder = Encoder::new(Config::msbc()).unwrap();
        assert_eq!(
            encoder.encode(&[0i16; 128]),
            Err(SbcError::InputLength {
                expected: 120,
                actual: 128
            })
        );
        assert!(encoder.encode(&[]).is_err());
    }

    #[test]
    fn test_header_bytes() {
        let config = Config::new(8, 16, Frequency::Freq44k1)
            .with_mode(ChannelMode::JointStereo)
            .with_bitpool(35);
        let mut encoder = Encoder::new(config).unwrap();
        let frame = encoder.encode(&tone(&config, 1)).unwrap();

        assert_eq!(frame[0], SYNCWORD);
        // 44.1k, 16 blocks, joint stereo, loudness, 8 subbands
        assert_eq!(frame[1], 0b10_11_11_0_1);
        assert_eq!(frame[2], 35);

        let config = Config::new(4, 4, Frequency::Freq16k)
            .with_mode(ChannelMode::DualChannel)
            .with_allocation(AllocationMethod::Snr)
            .with_bitpool(10);
        let mut encoder = Encoder::new(config).unwrap();
        let frame = encoder.encode(&tone(&config, 1)).unwrap();
        assert_eq!(frame[1], 0b00_00_01_1_0);

        let mut encoder = Encoder::new(Config::msbc()).unwrap();
        let frame = encoder.encode(&tone(&Config::msbc(), 1)).unwrap();
        assert_eq!(&frame[..3], &[MSBC_SYNCWORD, 0, 0]);
    }

    #[test]
    fn test_frame_size_is_deterministic() {
        let modes = [
            ChannelMode::Mono,
            ChannelMode::DualChannel,
            ChannelMode::Stereo,
            ChannelMode::JointStereo,
        ];
        for mode in modes {
            for subbands in [4, 8] {
                for blocks in [4, 8, 12, 16] {
                    let base = Config::new(subbands, blocks, Frequency::Freq48k).with_mode(mode);
                    for bitpool in [2, 17, base.max_bitpool()] {
                        let config = base.with_bitpool(bitpool);
                        let mut encoder = Encoder::new(config).unwrap();
                        let pcm = tone(&config, 3);
                        for block in pcm.chunks_exact(config.pcm_block_len()) {
                            let frame = encoder.encode(block).unwrap();
                            assert_eq!(frame.len(), config.frame_size(), "{config:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_full_scale_noise() {
        let mut rng = SmallRng::seed_from_u64(99);
        for mode in [ChannelMode::Mono, ChannelMode::JointStereo] {
            let base = Config::new(8, 16, Frequency::Freq48k).with_mode(mode);
            for bitpool in [2, base.max_bitpool()] {
                let config = base.with_bitpool(bitpool);
                let mut encoder = Encoder::new(config).unwrap();
                for _ in 0..4 {
                    let pcm: Vec<i16> = (0..config.pcm_block_len())
                        .map(|_| rng.random_range(i16::MIN..=i16::MAX))
                        .collect();
                    let frame = encoder.encode(&pcm).unwrap();
                    assert_eq!(frame.len(), config.frame_size());
                }
            }
        }
    }

    #[test]
    fn test_encode_into_appends() {
        let config = Config::new(4, 8, Frequency::Freq32k);
        let mut encoder = Encoder::new(config).unwrap();
        let pcm = tone(&config, 2);

        let mut stream = vec![0xee];
        let first = encoder.encode_into(&pcm[..32], &mut stream).unwrap();
        let second = encoder.encode_into(&pcm[32..], &mut stream).unwrap();
        assert_eq!(first, config.frame_size());
        assert_eq!(second, config.frame_size());
        assert_eq!(stream.len(), 1 + 2 * config.frame_size());
        assert_eq!(stream[0], 0xee);
        assert_eq!(stream[1], SYNCWORD);
    }

    // ============================================================================
    // State
    // ============================================================================

    #[test]
    fn test_reset_restarts_stream() {
        let config = Config::new(8, 16, Frequency::Freq44k1).with_mode(ChannelMode::Stereo);
        let mut encoder = Encoder::new(config).unwrap();
        let pcm = tone(&config, 2);
        let block = config.pcm_block_len();

        let a1 = encoder.encode(&pcm[..block]).unwrap();
        let a2 = encoder.encode(&pcm[block..]).unwrap();

        encoder.reset();
        let b1 = encoder.encode(&pcm[..block]).unwrap();
        let b2 = encoder.encode(&pcm[block..]).unwrap();

        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
    }

    #[test]
    fn test_filter_snapshot() {
        let config = Config::new(8, 16, Frequency::Freq44k1);
        let mut encoder = Encoder::new(config).unwrap();
        let pcm = tone(&config, 3);
        let block = config.pcm_block_len();

        encoder.encode(&pcm[..block]).unwrap();
        let snapshot = encoder.filter_state();
        let first = encoder.encode(&pcm[block..2 * block]).unwrap();
        encoder.encode(&pcm[2 * block..]).unwrap();

        encoder.restore_filter_state(&snapshot).unwrap();
        assert_eq!(encoder.encode(&pcm[block..2 * block]).unwrap(), first);

        let mut other = Encoder::new(Config::new(4, 16, Frequency::Freq44k1)).unwrap();
        assert_eq!(
            other.restore_filter_state(&snapshot),
            Err(SbcError::ConfigMismatch)
        );
    }

    #[test]
    fn test_independent_instances() {
        let config = Config::new(8, 12, Frequency::Freq32k).with_mode(ChannelMode::JointStereo);
        let pcm = tone(&config, 2);
        let block = config.pcm_block_len();

        let mut a = Encoder::new(config).unwrap();
        let mut b = Encoder::new(config).unwrap();
        a.encode(&pcm[..block]).unwrap();

        // b has not seen the first block, so it starts from a different history
        let from_a = a.encode(&pcm[block..]).unwrap();
        let from_b = b.encode(&pcm[block..]).unwrap();
        assert_eq!(from_a.len(), from_b.len());
        assert_ne!(from_a, from_b);
    }
}
