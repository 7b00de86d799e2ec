use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libsbc_audio::{AllocationMethod, ChannelMode};
use resbc::EncodeOptions;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resbc")]
#[command(version = "0.1.0")]
#[command(about = "SBC / mSBC audio converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode audio file to an sbc stream
    Encode {
        /// Input audio file (mp3, wav, flac, ogg, etc.)
        input: PathBuf,
        /// Output sbc file
        output: PathBuf,
        /// Subbands per block (4 or 8)
        #[arg(long, default_value = "8")]
        subbands: usize,
        /// Blocks per frame (4, 8, 12 or 16)
        #[arg(long, default_value = "16")]
        blocks: usize,
        /// Bitpool, higher is better quality
        #[arg(short, long, default_value = "32")]
        bitpool: u8,
        /// Channel mode (mono, dual, stereo, joint); picked from the input when unset
        #[arg(long)]
        mode: Option<String>,
        /// Use SNR bit allocation instead of loudness
        #[arg(long)]
        snr: bool,
        /// Produce mSBC (needs 16 kHz input, downmixed to mono)
        #[arg(long)]
        msbc: bool,
    },
    /// Decode sbc stream to WAV
    Decode {
        /// Input sbc file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
    },
    /// Show information about an sbc stream
    Info {
        /// Input sbc file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate every frame of an sbc stream
    Validate {
        /// Input sbc file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            subbands,
            blocks,
            bitpool,
            mode,
            snr,
            msbc,
        } => {
            encode(EncodeArgs {
                input,
                output,
                subbands,
                blocks,
                bitpool,
                mode,
                snr,
                msbc,
            })?;
        }
        Commands::Decode { input, output } => {
            decode(&input, &output)?;
        }
        Commands::Info { input, json } => {
            info(&input, json)?;
        }
        Commands::Validate { input } => {
            validate(&input)?;
        }
    }

    Ok(())
}

struct EncodeArgs {
    input: PathBuf,
    output: PathBuf,
    subbands: usize,
    blocks: usize,
    bitpool: u8,
    mode: Option<String>,
    snr: bool,
    msbc: bool,
}

fn parse_mode(name: &str) -> Result<ChannelMode> {
    Ok(match name.to_lowercase().as_str() {
        "mono" => ChannelMode::Mono,
        "dual" | "dual-channel" => ChannelMode::DualChannel,
        "stereo" => ChannelMode::Stereo,
        "joint" | "joint-stereo" => ChannelMode::JointStereo,
        _ => bail!("Invalid channel mode: {}. Use: mono, dual, stereo, joint", name),
    })
}

fn encode(args: EncodeArgs) -> Result<()> {
    println!("Reading {}...", args.input.display());

    let audio_bytes = fs::read(&args.input).context("Failed to read input file")?;

    let info = resbc::get_audio_info(&audio_bytes).context("Failed to read audio file")?;

    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Channels: {}", info.channels);
    println!("  Duration: {:.2}s", info.duration_secs);

    let options = if args.msbc {
        println!("Encoding to mSBC...");
        EncodeOptions::msbc()
    } else {
        let mut options = EncodeOptions::sbc()
            .with_shape(args.subbands, args.blocks)
            .with_bitpool(args.bitpool);
        if let Some(ref name) = args.mode {
            options = options.with_mode(parse_mode(name)?);
        }
        if args.snr {
            options = options.with_allocation(AllocationMethod::Snr);
        }
        println!(
            "Encoding to sbc ({} subbands, {} blocks, bitpool {})...",
            args.subbands, args.blocks, args.bitpool
        );
        options
    };

    let sbc_data =
        resbc::encode_from_audio(&audio_bytes, options).context("Failed to encode audio")?;

    fs::write(&args.output, &sbc_data).context("Failed to write output file")?;

    let stream = resbc::get_sbc_info(&sbc_data)?;

    println!("Done!");
    println!("  Output: {}", args.output.display());
    println!(
        "  Size: {} bytes, {} frames, {:.1} kbps",
        sbc_data.len(),
        stream.frames,
        stream.bitrate as f64 / 1000.0
    );

    Ok(())
}

fn decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());

    let sbc_data = fs::read(input).context("Failed to read sbc file")?;

    let stream = resbc::get_sbc_info(&sbc_data).context("Invalid sbc stream")?;

    println!("  Sample rate: {} Hz", stream.sample_rate);
    println!("  Channels: {}", stream.channels);
    println!("  Duration: {:.2}s", stream.duration_secs);

    println!("Decoding...");

    let wav_bytes = resbc::decode_to_wav(&sbc_data).context("Failed to decode sbc stream")?;

    println!("Writing WAV...");

    fs::write(output, wav_bytes).context("Failed to write WAV file")?;

    println!("Done!");
    println!("  Output: {}", output.display());

    Ok(())
}

fn info(input: &PathBuf, json: bool) -> Result<()> {
    let sbc_data = fs::read(input).context("Failed to read sbc file")?;

    let stream = resbc::get_sbc_info(&sbc_data).context("Invalid sbc stream")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stream)?);
        return Ok(());
    }

    let config = &stream.config;
    println!("{} Stream", if config.msbc { "mSBC" } else { "SBC" });
    println!("───────────────────────────────");
    println!("  Sample rate: {} Hz", stream.sample_rate);
    println!("  Channels:    {} ({:?})", stream.channels, config.mode);
    println!("  Subbands:    {}", config.subbands);
    println!("  Blocks:      {}", config.blocks);
    println!("  Allocation:  {:?}", config.allocation);
    println!("  Bitpool:     {}", config.bitpool);
    println!("  Frame size:  {} bytes", config.frame_size());
    println!("  Bitrate:     {:.1} kbps", stream.bitrate as f64 / 1000.0);
    println!("  Frames:      {}", stream.frames);
    println!("  Duration:    {:.2}s", stream.duration_secs);
    println!("  File size:   {} bytes", stream.file_size);
    println!(
        "  CRC valid:   {}",
        if stream.crc_valid { "yes" } else { "no" }
    );

    Ok(())
}

fn validate(input: &PathBuf) -> Result<()> {
    let sbc_data = fs::read(input).context("Failed to read sbc file")?;

    let is_valid = resbc::validate_sbc(&sbc_data).context("Validation failed")?;

    if is_valid {
        println!("✓ {} is a valid sbc stream", input.display());
        Ok(())
    } else {
        bail!("✗ {} failed the CRC check", input.display())
    }
}
