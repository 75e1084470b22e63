//! AOS CLI - Main entry point

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AOS - task audit logging for a code-assistant host
#[derive(Parser, Debug)]
#[command(name = "aos")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write env, host and workspace snapshots into a directory
    Snapshot {
        /// Output directory
        dir: PathBuf,
    },
    /// Search upward for a folder by name
    Locate {
        /// Folder name to look for
        name: String,
        /// Start directory (defaults to the workspace)
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Copy a directory
    Copy {
        src: PathBuf,
        dst: PathBuf,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Export or import host settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Archive a task as if it had just completed
    LogTask {
        /// Task ID
        task_id: String,
    },
    /// Print the system prompt for the current session
    Prompt,
    /// Maintain the allowed command list
    AllowedCommands {
        #[command(subcommand)]
        action: AllowedCommandsAction,
    },
    /// Export a conversation history file as Markdown
    ExportMd {
        /// api_conversation_history.json
        history: PathBuf,
        /// Output directory (defaults to Downloads)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Activate and watch until Ctrl-C
    Run,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Write { providerProfiles, globalSettings } to a file
    Export { file: PathBuf },
    /// Apply a settings bundle
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum AllowedCommandsAction {
    /// Remove one exact command
    Remove { command: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let workspace = match args.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    tracing::debug!(workspace = %workspace.display(), command = ?args.command, "Starting");

    match args.command {
        Command::Snapshot { dir } => cli::snapshot(&workspace, &dir).await,
        Command::Locate { name, from } => {
            cli::locate(from.as_deref().unwrap_or(&workspace), &name).await
        }
        Command::Copy {
            src,
            dst,
            recursive,
        } => cli::copy(&src, &dst, recursive).await,
        Command::Settings { action } => match action {
            SettingsAction::Export { file } => cli::export_settings(&workspace, &file).await,
            SettingsAction::Import { file } => cli::import_settings(&workspace, &file).await,
        },
        Command::LogTask { task_id } => cli::log_task(&workspace, &task_id).await,
        Command::Prompt => cli::prompt(&workspace).await,
        Command::AllowedCommands { action } => match action {
            AllowedCommandsAction::Remove { command } => {
                cli::remove_allowed_command(&workspace, &command).await
            }
        },
        Command::ExportMd { history, out } => cli::export_md(&history, out.as_deref()).await,
        Command::Run => cli::run(&workspace).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_commands() {
        let args = Args::try_parse_from([
            "aos",
            "--workspace",
            "/work",
            "allowed-commands",
            "remove",
            "npm test",
        ])
        .unwrap();
        assert_eq!(args.workspace, Some(PathBuf::from("/work")));
        assert!(matches!(
            args.command,
            Command::AllowedCommands {
                action: AllowedCommandsAction::Remove { ref command }
            } if command == "npm test"
        ));
    }

    #[test]
    fn test_parse_copy_flags() {
        let args = Args::try_parse_from(["aos", "copy", "a", "b", "--recursive", "--debug"]).unwrap();
        assert!(args.debug);
        assert!(matches!(args.command, Command::Copy { recursive: true, .. }));
    }

    #[test]
    fn test_command_required() {
        assert!(Args::try_parse_from(["aos"]).is_err());
    }
}
