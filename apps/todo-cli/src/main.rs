//! `todo`: a terminal client for the task API.
//!
//! The session survives between runs in the configured data directory.
//! Commands that need a session go through the same navigation guard as the
//! dashboard and settings pages.

mod commands;
mod config;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use todo_core::{FileStorage, TaskId};
use todo_gateway::ApiConfig;
use todo_store::{Route, Store, TaskFilter, TaskSort};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::ui::Ui;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List your tasks
    List {
        /// all, active or completed
        #[arg(short, long)]
        filter: Option<TaskFilter>,
        /// created_asc, created_desc, due_asc or due_desc
        #[arg(short, long)]
        sort: Option<TaskSort>,
        /// Rearrange the list by hand before printing it (not saved)
        #[arg(long)]
        arrange: bool,
    },
    /// Add a task
    Add {
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Change a task
    Edit {
        id: TaskId,
        #[arg(short, long)]
        title: Option<String>,
        /// An empty value removes the description
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        #[arg(long)]
        clear_due: bool,
    },
    /// Toggle a task between done and not done
    Done { id: TaskId },
    /// Delete a task
    Rm {
        id: TaskId,
        #[arg(short, long)]
        yes: bool,
    },
    /// Update your first and last name
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Change your password
    Password,
    /// Switch between the light and dark theme
    Theme,
}

impl Commands {
    /// The page this command stands in for, if any.
    fn route(&self) -> Option<Route> {
        match self {
            Self::Register { .. } => Some(Route::Register),
            Self::Login { .. } => Some(Route::Login),
            Self::Logout | Self::Theme => None,
            Self::Profile { .. } | Self::Password => Some(Route::Settings),
            Self::Whoami
            | Self::List { .. }
            | Self::Add { .. }
            | Self::Edit { .. }
            | Self::Done { .. }
            | Self::Rm { .. } => Some(Route::Dashboard),
        }
    }
}

fn init_tracing(config: &Config) -> Result<()> {
    let level = config.logging.level.to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            filter
                .add_directive(format!("todo_cli={level}").parse()?)
                .add_directive(format!("todo_store={level}").parse()?)
                .add_directive(format!("todo_gateway={level}").parse()?)
                .add_directive(format!("todo_core={level}").parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing(&config)?;

    let storage = Arc::new(FileStorage::new(&config.storage.data_dir));
    let api = ApiConfig::default().with_timeout(config.http.timeout());
    let store = Store::new(api, storage).context("Failed to create API client")?;
    let ui = Ui::new(store.theme());

    if let Some(route) = cli.command.route() {
        if !commands::enter(&store, &ui, route).await? {
            std::process::exit(1);
        }
    }

    let ok = match cli.command {
        Commands::Register { username, email } => {
            commands::register(&store, &ui, username, email).await?
        }
        Commands::Login { username } => commands::login(&store, &ui, username, None).await?,
        Commands::Logout => commands::logout(&store, &ui)?,
        Commands::Whoami => commands::whoami(&store, &ui)?,
        Commands::List {
            filter,
            sort,
            arrange,
        } => {
            let mut view = config.view;
            if let Some(filter) = filter {
                view.filter = filter;
            }
            if let Some(sort) = sort {
                view.sort = sort;
            }
            commands::list(&store, &ui, view, arrange).await?
        }
        Commands::Add {
            title,
            description,
            due,
        } => commands::add(&store, &ui, title, description, due).await?,
        Commands::Edit {
            id,
            title,
            description,
            due,
            clear_due,
        } => {
            let due = match (due, clear_due) {
                (_, true) => Some(None),
                (Some(date), false) => Some(Some(date)),
                (None, false) => None,
            };
            commands::edit(&store, &ui, id, title, description, due).await?
        }
        Commands::Done { id } => commands::toggle(&store, &ui, id).await?,
        Commands::Rm { id, yes } => commands::remove(&store, &ui, id, yes).await?,
        Commands::Profile {
            first_name,
            last_name,
        } => commands::profile(&store, &ui, first_name, last_name).await?,
        Commands::Password => commands::password(&store, &ui).await?,
        Commands::Theme => commands::theme(&store)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
