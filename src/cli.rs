use crate::config::loader::{BenchboxConfig, CONFIG_FILE_NAME};
use crate::config::types::StreamSelection;
use crate::core::backend::SandboxBackend;
use crate::core::docker::DockerBackend;
use crate::exec::benchmarker::Benchmarker;
use crate::extract::source::{strip_line_comments, SourceUnit};
use crate::harness::render_suite;
use crate::judge::adapter_for;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./benchbox.json, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark a snippet in a fresh sandbox and print the result as JSON
    Run {
        /// Source file holding the snippet
        #[arg(long)]
        file: PathBuf,
        /// Result key (defaults to the file path)
        #[arg(long)]
        name: Option<String>,
        /// Base image override
        #[arg(long)]
        image: Option<String>,
        /// Container engine socket override
        #[arg(long)]
        socket: Option<PathBuf>,
        /// nanobench epoch count override
        #[arg(long)]
        epochs: Option<u32>,
        /// Drop `//` comments before extraction
        #[arg(long)]
        strip_comments: bool,
        /// Capture the snippet's stdout as well as stderr
        #[arg(long)]
        capture_stdout: bool,
    },
    /// Print the timing harness generated for a snippet
    Render {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        strip_comments: bool,
    },
    /// Print the extracted includes, definitions and body as JSON
    Extract {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        strip_comments: bool,
    },
    /// Combine several snippets into one standalone program
    Suite {
        /// Snippet files, one task each
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Check the container engine and base image are available
    CheckDeps {
        /// Verbose output showing the resolved configuration
        #[arg(long)]
        verbose: bool,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            file,
            name,
            image,
            socket,
            epochs,
            strip_comments,
            capture_stdout,
        } => {
            // CLI flags override file values
            if let Some(image) = image {
                config.sandbox.image = image;
            }
            if let Some(socket) = socket {
                config.sandbox.docker_socket = socket;
            }
            if let Some(epochs) = epochs {
                config.measurement.epochs = epochs;
            }
            if capture_stdout {
                config.capture = StreamSelection::all();
            }

            let code = read_source(&file)?;
            let filename = name.unwrap_or_else(|| file.display().to_string());

            let benchmarker =
                Benchmarker::from_config(&config)?.with_comment_stripping(strip_comments);
            let result = benchmarker.benchmark(&filename, &code)?;
            log::info!("{}: {}", filename, result.verdict());

            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.executed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Render {
            file,
            strip_comments,
        } => {
            let (_, harness) = prepare_file(&config, &file, strip_comments)?;
            print!("{}", harness);
            Ok(())
        }
        Commands::Extract {
            file,
            strip_comments,
        } => {
            let (unit, _) = prepare_file(&config, &file, strip_comments)?;
            println!("{}", serde_json::to_string_pretty(&unit)?);
            Ok(())
        }
        Commands::Suite { files } => {
            let extractor = adapter_for(&config.language)?.extractor()?;
            let units = files
                .iter()
                .map(|file| {
                    let code = strip_line_comments(&read_source(file)?);
                    extractor
                        .extract(&code)
                        .with_context(|| format!("Failed to extract {}", file.display()))
                })
                .collect::<Result<Vec<SourceUnit>>>()?;
            print!("{}", render_suite(&units));
            Ok(())
        }
        Commands::CheckDeps { verbose } => check_dependencies(&config, verbose),
    }
}

fn load_config(path: Option<&Path>) -> Result<BenchboxConfig> {
    if let Some(path) = path {
        return BenchboxConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    if Path::new(CONFIG_FILE_NAME).exists() {
        return Ok(BenchboxConfig::load_default()?);
    }

    log::warn!("{} not found, using built-in defaults", CONFIG_FILE_NAME);
    Ok(BenchboxConfig::default())
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn prepare_file(
    config: &BenchboxConfig,
    file: &Path,
    strip_comments: bool,
) -> Result<(SourceUnit, String)> {
    let code = read_source(file)?;
    let benchmarker = Benchmarker::from_config(config)?.with_comment_stripping(strip_comments);
    Ok(benchmarker.prepare(&code)?)
}

fn check_dependencies(config: &BenchboxConfig, verbose: bool) -> Result<()> {
    let backend = DockerBackend::from_config(&config.sandbox)?;
    let mut all_ok = true;

    eprintln!("Checking sandbox dependencies...");
    if verbose {
        eprintln!("{}", serde_json::to_string_pretty(config)?);
    }

    match backend.ping() {
        Ok(()) => eprintln!("✅ container engine reachable at {}", backend.socket().display()),
        Err(e) => {
            eprintln!("❌ container engine: {}", e);
            all_ok = false;
        }
    }

    if all_ok {
        match backend.image_exists(&config.sandbox.image) {
            Ok(true) => eprintln!("✅ base image {} present", config.sandbox.image),
            Ok(false) => {
                eprintln!("❌ base image {} not found", config.sandbox.image);
                all_ok = false;
            }
            Err(e) => {
                eprintln!("❌ base image {}: {}", config.sandbox.image, e);
                all_ok = false;
            }
        }
    }

    match adapter_for(&config.language) {
        Ok(adapter) => {
            eprintln!("✅ language adapter: {}", adapter.language());
            if verbose {
                let command = adapter.staged_command(&config.sandbox, &config.markers);
                eprintln!("   entry command: {}", command.script());
            }
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            all_ok = false;
        }
    }

    if !all_ok {
        std::process::exit(1);
    }
    Ok(())
}
