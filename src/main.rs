use anyhow::Result;
use clap::{CommandFactory, Parser};
use offscribe::app::{TranscribeOptions, check_backend, format_error, run_transcribe};
use offscribe::audio::wav::probe_wav;
use offscribe::cli::{Cli, Commands, ConfigAction};
use offscribe::config::Config;
use std::io::IsTerminal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let color = std::io::stderr().is_terminal();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<offscribe::OffscribeError>() {
                Some(error) => eprintln!("{}", format_error(error, color)),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    offscribe::telemetry::init(&config.log.level, cli.quiet, cli.verbose);

    match cli.command {
        Commands::Transcribe {
            files,
            model,
            backend,
            timeout,
            with_path,
        } => {
            let options = TranscribeOptions {
                files,
                model,
                backend,
                timeout,
                with_path,
                color: std::io::stderr().is_terminal(),
            };
            let summary = run_transcribe(
                &config,
                &options,
                &mut std::io::stdout().lock(),
                &mut std::io::stderr(),
            )?;
            if summary.failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Check { backend } => {
            let backend = backend.unwrap_or(config.engine.backend);
            println!("offscribe {}", offscribe::version_string());
            if check_backend(&config, backend) {
                println!("{backend}: available");
            } else {
                println!("{backend}: not available");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Probe { file } => match probe_wav(&file)? {
            Some(info) => {
                println!("{}", file.display());
                println!("  sample rate: {} Hz", info.sample_rate);
                println!("  channels:    {}", info.channels);
                let format = if info.float { "float" } else { "int" };
                println!("  samples:     {}-bit {}", info.bits_per_sample, format);
                println!("  duration:    {:.2}s", info.duration_secs());
                for problem in info.mismatches() {
                    println!("  warning:     {problem}");
                }
            }
            None => {
                println!(
                    "{}: no WAV header (fed to the engine as raw bytes)",
                    file.display()
                );
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => print!("{}", config.to_toml_string()?),
            ConfigAction::Path => match cli.config.or_else(Config::default_path) {
                Some(path) => println!("{}", path.display()),
                None => anyhow::bail!("Could not determine config directory"),
            },
        },
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "offscribe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/offscribe/config.toml)
/// 3. Built-in defaults
///
/// Environment variable overrides apply on top of all three.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(default_path) => Config::load_or_default(&default_path)?,
            None => Config::default(),
        },
    };

    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}
