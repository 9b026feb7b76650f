use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use livepen::logging::{init_logging, LogConfig, LogFormat};
use livepen::{Project, RenderMode};

#[derive(Parser)]
#[command(name = "livepen", version)]
#[command(about = "livepen — sandboxed live preview for HTML/CSS/JS playgrounds")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the playground dev server for a project directory
    Serve {
        /// Project directory containing index.html, style.css and script.js
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Server port (overrides livepen.json)
        #[arg(long)]
        port: Option<u16>,

        /// Only refresh the preview on explicit Run
        #[arg(long)]
        no_auto_run: bool,

        /// Auto-run debounce in milliseconds (overrides livepen.json)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// Assemble a project into a single self-contained preview document
    Build {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short)]
        o: Option<PathBuf>,

        /// Assemble a passive thumbnail document instead
        #[arg(long)]
        thumbnail: bool,
    },

    /// Strip local resource references from an HTML file
    Sanitize {
        /// Input HTML file
        file: PathBuf,
    },

    /// Scaffold a starter project
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve {
            dir,
            port,
            no_auto_run,
            debounce_ms,
        } => {
            let mut project = Project::open(&dir)
                .with_context(|| format!("cannot open project '{}'", dir.display()))?;
            let config = project.config_mut();
            if let Some(port) = port {
                config.port = port;
            }
            if no_auto_run {
                config.auto_run = false;
            }
            if let Some(ms) = debounce_ms {
                config.debounce_ms = ms;
            }

            let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
            rt.block_on(livepen::server::run_dev_server(project))
                .context("dev server failed")
        }

        Commands::Build { dir, o, thumbnail } => {
            let project = Project::open(&dir)
                .with_context(|| format!("cannot open project '{}'", dir.display()))?;
            let snapshot = project.load_buffers()?.snapshot();
            let mode = if thumbnail {
                RenderMode::Passive
            } else {
                RenderMode::Interactive
            };
            let document = livepen::assemble_with(&snapshot, mode);

            match o {
                Some(out_path) => {
                    fs::write(&out_path, document.as_str())
                        .with_context(|| format!("cannot write '{}'", out_path.display()))?;
                    eprintln!(
                        "wrote {mode} document to {} ({} bytes)",
                        out_path.display(),
                        document.len()
                    );
                }
                None => print!("{}", document.as_str()),
            }
            Ok(())
        }

        Commands::Sanitize { file } => {
            let markup = fs::read_to_string(&file)
                .with_context(|| format!("cannot read '{}'", file.display()))?;
            print!("{}", livepen::sanitize(&markup));
            Ok(())
        }

        Commands::Init { dir } => {
            let created = livepen::project::init(&dir)?;
            if created.is_empty() {
                eprintln!("nothing to do: {} already has source files", dir.display());
            }
            for path in &created {
                eprintln!("created {}", path.display());
            }
            Ok(())
        }
    }
}
