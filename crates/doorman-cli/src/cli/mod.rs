//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use doorman_core::config::Config;

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "doorman")]
#[command(version)]
#[command(about = "Log in to a doorman authentication service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Authentication service base URL (overrides config and DOORMAN_API_ENDPOINT)
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in (opens the login form unless credentials are piped in)
    Login {
        #[command(flatten)]
        args: LoginArgs,
    },

    /// Log out (remove the stored session)
    Logout,

    /// Show the stored session
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Non-interactive login arguments.
#[derive(clap::Args, Debug, Clone, Default)]
struct LoginArgs {
    /// Username to log in with (requires --password-stdin)
    #[arg(long, requires = "password_stdin")]
    username: Option<String>,

    /// Read the password from stdin instead of opening the login form
    #[arg(long = "password-stdin", requires = "username")]
    password_stdin: bool,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print the effective configuration
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: file logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, endpoint } = cli;

    // Only login and `config show` read config.toml, so a broken file never
    // blocks logout, status or the commands that repair it.
    let mode: commands::auth::LoginMode = match command {
        None => LoginArgs::default().into(),
        Some(Commands::Login { args }) => args.into(),
        Some(Commands::Logout) => return commands::auth::logout(),
        Some(Commands::Status) => return commands::auth::status(),
        Some(Commands::Config { command }) => {
            return match command {
                ConfigCommands::Path => {
                    commands::config::path();
                    Ok(())
                }
                ConfigCommands::Init => commands::config::init(),
                ConfigCommands::Show => {
                    commands::config::show(&load_config(endpoint.as_deref())?)
                }
            };
        }
    };

    commands::auth::login(&load_config(endpoint.as_deref())?, mode).await
}

fn load_config(endpoint: Option<&str>) -> Result<Config> {
    Ok(Config::load().context("load config")?.with_endpoint(endpoint))
}

impl From<LoginArgs> for commands::auth::LoginMode {
    fn from(args: LoginArgs) -> Self {
        match args.username {
            Some(username) if args.password_stdin => Self::PasswordStdin { username },
            _ => Self::Interactive,
        }
    }
}
