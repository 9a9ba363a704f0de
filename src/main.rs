//! CLI entry point for `mailsift`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use mailsift::config;
use mailsift::pipeline;
use mailsift::report;

#[derive(Parser)]
#[command(
    name = "mailsift",
    version,
    about = "Extract bodies, attachments and embedded documents from .eml/.msg messages into a markdown report"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Message file to analyze (.eml or .msg)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output directory for materialized files
    /// (default: `<input stem>_files` next to the input)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print a JSON summary instead of the markdown report
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> ExitCode {
    // Usage errors exit 1 (clap's default of 2 is reserved elsewhere);
    // --help/--version keep their normal behavior.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let cfg = config::load_config();

    let log_level = match cli.verbose {
        0 => cfg.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    setup_logging(&log_level, &cfg);

    match run(cli, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, cfg: &config::Config) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mailsift", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Manpage) => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buf = Vec::new();
            man.render(&mut buf)?;
            std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
            Ok(())
        }
        None => {
            let Some(file) = cli.file else {
                return Err(mailsift::error::SiftError::Usage(
                    "missing input file (expected a .eml or .msg path)".to_string(),
                )
                .into());
            };
            analyze(&file, cli.output_dir.as_deref(), cli.json, cfg)
        }
    }
}

/// Decode one message, materialize its files, and print the report.
fn analyze(
    file: &std::path::Path,
    output_dir: Option<&std::path::Path>,
    json: bool,
    cfg: &config::Config,
) -> anyhow::Result<()> {
    let outcome = pipeline::process_file(file, output_dir, cfg)?;

    let source_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("message");

    if json {
        let summary =
            report::build_summary(&outcome.message, source_name, &outcome.datauri_images);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let markdown = report::build_report(
            &outcome.message,
            source_name,
            &outcome.datauri_images,
            &outcome.contents,
        );
        println!("{markdown}");
    }
    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, cfg: &config::Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(cfg);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailsift.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}
