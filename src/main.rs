use anyhow::Result;
use clap::{Parser, Subcommand};

use taskdeck::cli;
use taskdeck::config::ClientConfig;
use taskdeck::AppContext;

#[derive(Parser)]
#[command(
    name = "taskdeck",
    about = "TaskDeck — command-line client for the TaskDeck task service",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the task API
    #[arg(long, env = "TASKDECK_API_URL", global = true)]
    api_url: Option<String>,

    /// Data directory for the session token and config.toml
    #[arg(long, env = "TASKDECK_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKDECK_LOG", global = true)]
    log: Option<String>,

    /// Write logs to this file path (rotated daily) instead of stderr
    #[arg(long, env = "TASKDECK_LOG_FILE", global = true)]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token.
    ///
    /// Examples:
    ///   taskdeck login --email me@example.com --password secret
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account (then sign in with `taskdeck login`).
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Must match --password; checked before anything is sent
        #[arg(long)]
        confirm: String,
    },
    /// Discard the stored session token.
    Logout,
    /// Fetch the task list and print one page of it (5 tasks per page).
    List {
        /// Page to show, clamped to the valid range (default: 1)
        #[arg(long)]
        page: Option<usize>,
    },
    /// Create a task.
    ///
    /// Examples:
    ///   taskdeck add --name "Pay rent" --desc "March invoice" --due 2025-03-01T09:30
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        desc: String,
        /// Due date — RFC 3339 or YYYY-MM-DDTHH:MM (taken as UTC)
        #[arg(long)]
        due: String,
    },
    /// Update an existing task by id.
    Edit {
        /// Server-assigned task id (shown by `taskdeck list`)
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        desc: String,
        #[arg(long)]
        due: String,
    },
    /// Delete a task by id.
    Rm {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Show session state and effective configuration.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ClientConfig::new(args.api_url, args.data_dir, args.log);

    // ── Logging setup ────────────────────────────────────────────────────────
    // Init once — must happen before any tracing calls.
    let _file_guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    let mut ctx = AppContext::new(config)?;

    match args.command {
        Command::Login { email, password } => cli::cmd_login(&ctx, email, password).await,
        Command::Register {
            email,
            password,
            confirm,
        } => cli::cmd_register(&ctx, email, password, confirm).await,
        Command::Logout => cli::cmd_logout(&ctx),
        Command::List { page } => cli::cmd_list(&mut ctx, page).await,
        Command::Add { name, desc, due } => cli::cmd_add(&mut ctx, name, desc, due).await,
        Command::Edit {
            id,
            name,
            desc,
            due,
        } => cli::cmd_edit(&mut ctx, id, name, desc, due).await,
        Command::Rm { id, yes } => cli::cmd_rm(&mut ctx, id, yes).await,
        Command::Status => cli::cmd_status(&ctx),
    }
}

/// Initialize the tracing subscriber.
///
/// Pretty (default) or JSON output, to stderr or to a daily-rotated file when
/// `--log-file` is given.  Returns the appender guard that must stay alive for
/// the life of the process.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let file = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "taskdeck.log".to_string());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
            if log_format == "json" {
                tracing_subscriber::registry()
                    .with(EnvFilter::new(log_level))
                    .with(fmt::layer().json().with_writer(writer).with_ansi(false))
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(EnvFilter::new(log_level))
                    .with(fmt::layer().with_writer(writer).with_ansi(false))
                    .init();
            }
            Some(guard)
        }
        None => {
            // Logs go to stderr so they never interleave with command output.
            if log_format == "json" {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(log_level)
                    .with_writer(std::io::stderr)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(log_level)
                    .with_writer(std::io::stderr)
                    .compact()
                    .init();
            }
            None
        }
    }
}
