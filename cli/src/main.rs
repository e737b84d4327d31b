use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cfbcrypt_core::config::{samples_from_env, ConfigError, Mode, RunConfig};
use cfbcrypt_core::crypto::CipherSuite;
use cfbcrypt_core::stream::{self, NoopProgress, ProgressSink};
use cfbcrypt_core::telemetry::TelemetrySnapshot;
use cfbcrypt_core::types::StreamError;

const EXIT_USAGE: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "cfbcrypt")]
#[command(version, disable_version_flag = true)]
#[command(about = "Encrypt or decrypt a file with a block cipher in CFB mode")]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Block cipher to run in CFB mode
    #[arg(long, global = true, value_name = "CIPHER", default_value = "aes256")]
    cipher: CipherSuite,

    /// Do not draw a progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the run's telemetry as JSON on stderr
    #[arg(long, global = true)]
    telemetry: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt <input> into [output] (default: <input>.cfb)
    #[command(short_flag = 'e', long_flag = "encrypt")]
    Encrypt(FileArgs),

    /// Decrypt <input> into [output] (default: <input>.cfb)
    #[command(short_flag = 'd', long_flag = "decrypt")]
    Decrypt(FileArgs),
}

#[derive(Args, Debug, Clone)]
struct FileArgs {
    /// File to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Passphrase file; the key is its SHA3-256 digest
    #[arg(value_name = "KEYFILE")]
    key_file: PathBuf,

    /// File to write
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

impl Command {
    fn mode(&self) -> Mode {
        match self {
            Command::Encrypt(_) => Mode::Encrypt,
            Command::Decrypt(_) => Mode::Decrypt,
        }
    }

    fn files(&self) -> &FileArgs {
        match self {
            Command::Encrypt(files) | Command::Decrypt(files) => files,
        }
    }
}

/// Terminal progress bar on stderr.
struct BarProgress {
    pb: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template(
            "{spinner} {bytes}/{total_bytes} [{bar:40}] {elapsed}/{eta} {msg}",
        )
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        let pb = ProgressBar::new(0);
        pb.set_style(style);
        Self { pb }
    }
}

impl ProgressSink for BarProgress {
    fn start(&mut self, total: u64) {
        self.pb.set_length(total);
    }

    fn update(&mut self, offset: u64) {
        self.pb.set_position(offset);
    }

    fn finish(&mut self) {
        self.pb.finish_with_message("done");
    }

    fn abandon(&mut self) {
        self.pb.abandon_with_message("aborted");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_config(cli: &Cli) -> Result<RunConfig> {
    let files = cli.command.files();
    let samples = samples_from_env().map_err(StreamError::from)?;

    let config = RunConfig::new(
        cli.command.mode(),
        &files.input,
        &files.key_file,
        files.output.clone(),
    )
    .with_cipher(cli.cipher)
    .with_samples(samples);

    // Missing files are a usage error, reported before any stage starts.
    config.validate().map_err(StreamError::from)?;
    Ok(config)
}

fn run_cli(cli: &Cli) -> Result<TelemetrySnapshot> {
    let config = build_config(cli)?;

    let mut sink: Box<dyn ProgressSink> = if cli.quiet {
        Box::new(NoopProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let snapshot = stream::run(&config, &mut sink).with_context(|| {
        format!(
            "failed to {} {} into {}",
            config.mode,
            config.input.display(),
            config.output.display()
        )
    })?;

    if cli.telemetry {
        eprintln!("{}", snapshot.to_json()?);
    }
    Ok(snapshot)
}

/// 1 for anything the user can fix on the command line, 2 otherwise.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StreamError>() {
        Some(StreamError::Config(ConfigError::MissingInput(_)))
        | Some(StreamError::Config(ConfigError::InvalidSamples(_))) => EXIT_USAGE,
        _ => EXIT_FATAL,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here too, on stdout.
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing();

    match run_cli(&cli) {
        Ok(snapshot) => {
            tracing::info!("done, {} bytes written", snapshot.output_bytes());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
