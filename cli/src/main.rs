mod audio;
mod error;
mod wav;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{error, info};

use tonelink_core::{
    run_capture, spawn_capture, CancellationToken, Classification, Frame, LinkConfig,
    MemorySource, SymbolDecoder, Transmitter, MAX_PAYLOAD_SIZE,
};

use crate::error::{CliError, Result};
use crate::wav::WavSink;

#[derive(Parser)]
#[command(name = "tonelink")]
#[command(about = "Send framed bytes as audible FSK tones and classify what the microphone hears")]
struct Cli {
    #[command(flatten)]
    link: LinkArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LinkArgs {
    /// Seconds per tone
    #[arg(long, global = true, default_value_t = tonelink_core::SYMBOL_DURATION_SECS)]
    symbol_duration: f32,

    /// Samples per classified block
    #[arg(long, global = true, default_value_t = tonelink_core::CAPTURE_BLOCK_SIZE)]
    block_size: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Frame a message and play it on the default output device
    Send {
        /// Payload text
        message: String,
    },

    /// Classify blocks from the default input device
    Listen {
        /// Stop after this many seconds (default: run until killed)
        #[arg(long)]
        seconds: Option<u64>,

        /// Also rebuild frames from the classified symbols
        #[arg(long)]
        reassemble: bool,
    },

    /// Listen in the background while sending a message, then stop listening
    Node {
        /// Payload text
        message: String,
    },

    /// Write the tones of a framed message to an 8-bit WAV file
    Encode {
        /// Payload text
        message: String,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Classify a WAV file block by block
    Classify {
        /// Input WAV file (8 kHz mono)
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Also rebuild frames from the classified symbols
        #[arg(long)]
        reassemble: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = LinkConfig {
        symbol_duration: cli.link.symbol_duration,
        block_size: cli.link.block_size,
        ..LinkConfig::default()
    };

    let result = config
        .validate()
        .map_err(CliError::from)
        .and_then(|_| run(cli.command, &config));

    if let Err(err) = result {
        error!("{}", err);
        std::process::exit(err.exit_code());
    }
}

fn run(command: Commands, config: &LinkConfig) -> Result<()> {
    match command {
        Commands::Send { message } => send_command(&message, config),
        Commands::Listen {
            seconds,
            reassemble,
        } => listen_command(seconds, reassemble, config),
        Commands::Node { message } => node_command(&message, config),
        Commands::Encode { message, output } => encode_command(&message, &output, config),
        Commands::Classify { input, reassemble } => classify_command(&input, reassemble, config),
    }
}

/// The framer truncates the length octet silently, so bound it here
fn payload(message: &str) -> Result<&[u8]> {
    let data = message.as_bytes();
    if data.len() > MAX_PAYLOAD_SIZE {
        return Err(CliError::MessageTooLong(data.len()));
    }
    Ok(data)
}

/// Per-block console output, optionally feeding the frame reassembler
fn block_printer(reassemble: bool) -> impl FnMut(Classification) {
    let mut decoder = reassemble.then(SymbolDecoder::new);
    move |result| {
        println!("{}", result);
        println!("---------------");
        if let Some(frame) = decoder.as_mut().and_then(|d| d.push(result)) {
            print_frame(&frame);
        }
    }
}

fn print_frame(frame: &Frame) {
    println!(
        "FRAME: {} octets {:?}",
        frame.payload().len(),
        String::from_utf8_lossy(frame.payload())
    );
}

fn send_command(message: &str, config: &LinkConfig) -> Result<()> {
    let data = payload(message)?;
    let sink = audio::open_output()?;

    let mut transmitter = Transmitter::with_config(sink, config)?;
    transmitter.send_frame(data, data.len())?;
    info!("sent {} octets", data.len());
    Ok(())
}

fn listen_command(seconds: Option<u64>, reassemble: bool, config: &LinkConfig) -> Result<()> {
    let (_line, source) = audio::open_input()?;
    let token = CancellationToken::new();
    let handle = spawn_capture(source, config.block_size, token.clone(), block_printer(reassemble));

    if let Some(seconds) = seconds {
        thread::sleep(Duration::from_secs(seconds));
        info!("stopping capture");
        token.cancel();
    }

    let blocks = join_capture(handle)?;
    info!("classified {} blocks", blocks);
    Ok(())
}

fn node_command(message: &str, config: &LinkConfig) -> Result<()> {
    let data = payload(message)?;

    let (_line, source) = audio::open_input()?;
    let token = CancellationToken::new();
    let handle = spawn_capture(source, config.block_size, token.clone(), block_printer(false));

    let send_result = audio::open_output()
        .and_then(|sink| Transmitter::with_config(sink, config))
        .and_then(|mut transmitter| transmitter.send_frame(data, data.len()));

    token.cancel();
    let capture_result = join_capture(handle);
    send_result?;
    capture_result?;
    Ok(())
}

fn join_capture(handle: thread::JoinHandle<tonelink_core::Result<usize>>) -> Result<usize> {
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(tonelink_core::LinkError::InputIo("capture thread panicked".into()).into()),
    }
}

fn encode_command(message: &str, output: &Path, config: &LinkConfig) -> Result<()> {
    let data = payload(message)?;
    let sink = WavSink::create(output)?;

    let mut transmitter = Transmitter::with_config(sink, config)?;
    transmitter.send_frame(data, data.len())?;
    let written = transmitter.into_sink().finalize()?;

    println!("Encoded {} octets to {} samples", data.len(), written);
    println!("Wrote {}", output.display());
    Ok(())
}

fn classify_command(input: &Path, reassemble: bool, config: &LinkConfig) -> Result<()> {
    let samples = wav::read_samples(input)?;
    info!("extracted {} samples", samples.len());

    let token = CancellationToken::new();
    let blocks = run_capture(
        MemorySource::new(samples),
        config.block_size,
        &token,
        block_printer(reassemble),
    )?;
    println!("Classified {} blocks", blocks);
    Ok(())
}
