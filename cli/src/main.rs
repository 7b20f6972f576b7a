use clap::{Parser, Subcommand, ValueEnum};
use hopwave_core::whitening::DEFAULT_WHITENING_SEED;
use hopwave_core::{Encoder, ModemConfig};
use hound::WavSpec;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("modem error: {0}")]
    Modem(#[from] hopwave_core::AudioModemError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("sample rate {0} Hz is not a whole number")]
    SampleRate(f64),
}

#[derive(Parser)]
#[command(name = "hopwave")]
#[command(about = "LDPC-coded hopped-FSK acoustic transmitter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scheme {
    /// 4-bin binary FSK around 19 kHz, hop period 2
    Minimal,
    /// 126-tone binary FSK over 17-20 kHz, hop factor 63
    Extended,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// Waveform preset
    #[arg(short, long, value_enum, default_value = "minimal")]
    scheme: Scheme,

    /// JSON modem configuration (overrides --scheme)
    #[arg(short, long, value_name = "FILE.JSON")]
    config: Option<PathBuf>,

    /// Whiten payload bits with the default PRBS seed
    #[arg(short, long)]
    whiten: bool,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Number of frames to write
    #[arg(short, long, default_value = "1")]
    repeat: usize,

    /// Silence inserted before and after each frame, in milliseconds
    #[arg(short, long, default_value = "0")]
    gap_ms: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file (up to one frame of payload) to a WAV audio file
    Encode {
        /// Input binary file
        #[arg(value_name = "INPUT.BIN")]
        input: PathBuf,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Skip LDPC coding and modulate the framed payload directly
        #[arg(long)]
        uncoded: bool,

        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Write the LDPC-coded all-zero frame to a WAV audio file
    Zeros {
        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Print the resolved configuration and frame dimensions
    Info {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            uncoded,
            config,
            out,
        } => encode_command(&input, &output, uncoded, &config, &out)?,
        Commands::Zeros {
            output,
            config,
            out,
        } => zeros_command(&output, &config, &out)?,
        Commands::Info { config } => info_command(&config)?,
    }

    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<ModemConfig, CliError> {
    let config = read_config(args)?;
    if args.whiten && config.whitening_seed.is_none() {
        return Ok(config.with_whitening(DEFAULT_WHITENING_SEED));
    }
    Ok(config)
}

fn read_config(args: &ConfigArgs) -> Result<ModemConfig, CliError> {
    match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let config = serde_json::from_str(&text).map_err(|source| CliError::Config {
                path: path.clone(),
                source,
            })?;
            log::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(match args.scheme {
            Scheme::Minimal => ModemConfig::minimal(),
            Scheme::Extended => ModemConfig::extended(),
        }),
    }
}

fn encode_command(
    input_path: &Path,
    output_path: &Path,
    uncoded: bool,
    config_args: &ConfigArgs,
    out: &OutputArgs,
) -> Result<(), CliError> {
    let data = std::fs::read(input_path)?;
    log::info!("Read {} bytes from {}", data.len(), input_path.display());

    let encoder = Encoder::new(&load_config(config_args)?)?;
    let frame = if uncoded {
        encoder.encode_uncoded(&data)?
    } else {
        encoder.encode_payload(&data)?
    };
    log::info!(
        "Encoded {} frame to {} audio samples",
        if uncoded { "uncoded" } else { "LDPC" },
        frame.len()
    );

    write_frames(output_path, &frame, encoder.sample_rate(), out)
}

fn zeros_command(
    output_path: &Path,
    config_args: &ConfigArgs,
    out: &OutputArgs,
) -> Result<(), CliError> {
    let encoder = Encoder::new(&load_config(config_args)?)?;
    let frame = encoder.encode_zero_frame()?;
    log::info!("Encoded zero frame to {} audio samples", frame.len());

    write_frames(output_path, &frame, encoder.sample_rate(), out)
}

fn info_command(config_args: &ConfigArgs) -> Result<(), CliError> {
    let config = load_config(config_args)?;
    let encoder = Encoder::new(&config)?;
    let fsk = encoder.modulator();

    let json = serde_json::to_string_pretty(&config).map_err(|source| CliError::Config {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    println!("codeword bits:     {}", encoder.ldpc().codeword_len());
    println!("info bits:         {}", encoder.info_bits());
    println!(
        "whitening:         {}",
        match config.whitening_seed {
            Some(seed) => format!("PRBS15 seed {:#06x}", seed),
            None => "off".to_string(),
        }
    );
    println!("samples per pulse: {}", fsk.samples_per_pulse());
    println!("pulses in bank:    {}", fsk.pulse_bank().len());
    println!("frame samples:     {}", encoder.frame_samples());
    println!(
        "frame duration:    {:.3} s",
        encoder.frame_samples() as f64 / encoder.sample_rate()
    );
    Ok(())
}

/// Write `repeat` copies of `frame`, each padded with `gap_ms` of silence on both sides.
fn write_frames(
    output_path: &Path,
    frame: &[f32],
    sample_rate: f64,
    out: &OutputArgs,
) -> Result<(), CliError> {
    if sample_rate.fract() != 0.0 || sample_rate <= 0.0 {
        return Err(CliError::SampleRate(sample_rate));
    }
    let sample_rate = sample_rate as u32;
    let gap = (sample_rate as u64 * out.gap_ms as u64).div_ceil(1000) as usize;

    // Write WAV file (16-bit PCM)
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let file = File::create(output_path)?;
    let mut writer = hound::WavWriter::new(file, spec)?;

    for _ in 0..out.repeat {
        for _ in 0..gap {
            writer.write_sample(0i16)?;
        }
        for &sample in frame {
            // Clamp to [-1.0, 1.0] range to avoid overflow, then scale to i16
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * 32767.0) as i16)?;
        }
        for _ in 0..gap {
            writer.write_sample(0i16)?;
        }
    }
    writer.finalize()?;

    log::info!(
        "Wrote {} frame(s) at {} Hz to {}",
        out.repeat,
        sample_rate,
        output_path.display()
    );
    Ok(())
}
