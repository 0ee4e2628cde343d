//! timeclock: command-line shell for the work-hours tracking service.
//!
//! The shell stands in for the browser screens: it assembles the session
//! context, restores any persisted session before the first access
//! decision, and maps each command onto the session core's operations.

mod config;
mod context;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use timeclock_session::{Role, RouteDecision};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;
use crate::context::{AppContext, ShellNavigator};

#[derive(Parser)]
#[command(name = "timeclock")]
#[command(about = "Client for the work-hours tracking service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session token
    Login {
        /// Account username
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// End the session and discard the stored token
    Logout,

    /// Show the currently authenticated user
    Whoami,

    /// Evaluate access to a navigation target
    Open {
        /// Target path, e.g. /employees
        path: String,

        /// Role the target requires (admin, manager, or employee)
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },

    /// Fetch a resource through the authenticated client
    Get {
        /// Resource path, e.g. /api/employees
        path: String,
    },

    /// Change the account password
    ChangePassword {
        /// Current password
        #[arg(long)]
        current: String,

        /// New password
        #[arg(long)]
        new: String,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse::<Role>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()
        .expect("failed to load configuration (is TIMECLOCK_API_URL set?)");
    tracing::debug!(api_url = %config.api_url, "loaded configuration");
    let context = AppContext::build(&config, Arc::new(ShellNavigator))
        .expect("failed to construct API client");

    // Resolve any persisted session before the first access decision.
    context.manager.restore().await;

    run(&context, cli.command).await
}

async fn run(context: &AppContext, command: Commands) -> ExitCode {
    match command {
        Commands::Login { username, password } => {
            match context.manager.login(&username, &password).await {
                Ok(user) => {
                    println!("signed in as {} ({})", user.username(), user.role());
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    eprintln!("{error}");
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Logout => {
            context.manager.logout().await;
            println!("signed out");
            ExitCode::SUCCESS
        }

        Commands::Whoami => match context.manager.current_user() {
            Some(user) => {
                println!("{} ({})", user.username(), user.role());
                if let Some(employee_id) = user.employee_id() {
                    println!("linked employee: #{employee_id}");
                }
                ExitCode::SUCCESS
            }
            None => {
                println!("not signed in");
                ExitCode::FAILURE
            }
        },

        Commands::Open { path, role } => {
            let decision = context.guard.evaluate(&context.manager.session(), &path, role);
            match decision {
                RouteDecision::Allow => {
                    println!("allowed: {path}");
                    ExitCode::SUCCESS
                }
                RouteDecision::Loading => {
                    println!("session is still resolving, try again");
                    ExitCode::FAILURE
                }
                RouteDecision::RedirectToLogin => {
                    println!(
                        "sign in to continue; {path} is remembered for after login"
                    );
                    println!("navigating to {}", context.guard.paths().login);
                    ExitCode::FAILURE
                }
                RouteDecision::Denied { required } => {
                    println!("access denied: {path} requires the {required} role");
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Get { path } => match context.client.get::<serde_json::Value>(&path).await {
            Ok(value) => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value).expect("serialize response")
                );
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("{error}");
                ExitCode::FAILURE
            }
        },

        Commands::ChangePassword { current, new } => {
            match context.manager.change_password(&current, &new).await {
                Ok(()) => {
                    println!("password changed");
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    eprintln!("{error}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
