//! CLI entry and dispatch.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use megablog_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "megablog")]
#[command(version)]
#[command(about = "Write and read MegaBlog posts from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup {
        /// Full name (letters and spaces)
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEGABLOG_PASSWORD", hide_env_values = true)]
        password: String,
        /// Accept the terms and conditions
        #[arg(long)]
        accept_terms: bool,
    },

    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEGABLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Read and manage posts
    Posts {
        #[command(subcommand)]
        command: PostCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PostCommands {
    /// List active posts (or every post with --all)
    List {
        /// Include inactive posts
        #[arg(long)]
        all: bool,
        /// Print the raw documents as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one post
    Show {
        #[arg(value_name = "POST_ID")]
        id: String,
        /// Print the raw document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a post (requires login)
    Create {
        #[arg(long)]
        title: String,
        /// Post id; derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,
        #[command(flatten)]
        body: BodyArgs,
        /// active or inactive (default from config)
        #[arg(long)]
        status: Option<String>,
        /// Featured image (png, jpg, jpeg or gif)
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
    },
    /// Edit a post you wrote
    Edit {
        #[arg(value_name = "POST_ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        body: BodyArgs,
        #[arg(long)]
        status: Option<String>,
        /// Replace the featured image
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Delete a post you wrote, and its image
    Delete {
        #[arg(value_name = "POST_ID")]
        id: String,
    },
}

/// Post body, inline or read from a file.
#[derive(clap::Args, Debug, Clone, Default)]
struct BodyArgs {
    /// Post text; blank lines separate paragraphs
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,
    /// Read the post text from a file
    #[arg(long, value_name = "PATH")]
    content_file: Option<PathBuf>,
}

impl BodyArgs {
    fn read(&self) -> Result<Option<String>> {
        match (&self.content, &self.content_file) {
            (Some(text), _) => Ok(Some(text.clone())),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("read content from {}", path.display()))
                .map(Some),
            (None, None) => Ok(None),
        }
    }
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set a value, e.g. `backend.project_id my-project`
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the config file is broken.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Set { key, value } => commands::config::set(key, value),
        };
    }

    let config = config::Config::load().context("load config")?;
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "megablog started");

    // default to the interactive client
    let Some(command) = cli.command else {
        return commands::tui::run(&config).await;
    };

    match command {
        Commands::Signup {
            name,
            email,
            password,
            accept_terms,
        } => {
            commands::auth::signup(
                &config,
                commands::auth::SignupArgs {
                    name,
                    email,
                    password,
                    accept_terms,
                },
            )
            .await
        }
        Commands::Login { email, password } => {
            commands::auth::login(&config, &email, &password).await
        }
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Whoami => commands::auth::whoami(&config).await,

        Commands::Posts { command } => match command {
            PostCommands::List { all, json } => commands::posts::list(&config, all, json).await,
            PostCommands::Show { id, json } => commands::posts::show(&config, &id, json).await,
            PostCommands::Create {
                title,
                slug,
                body,
                status,
                image,
            } => {
                let content = body.read()?.unwrap_or_default();
                commands::posts::create(
                    &config,
                    commands::posts::CreateArgs {
                        title,
                        slug,
                        content,
                        status,
                        image,
                    },
                )
                .await
            }
            PostCommands::Edit {
                id,
                title,
                body,
                status,
                image,
            } => {
                let content = body.read()?;
                commands::posts::edit(
                    &config,
                    &id,
                    commands::posts::EditArgs {
                        title,
                        content,
                        status,
                        image,
                    },
                )
                .await
            }
            PostCommands::Delete { id } => commands::posts::delete(&config, &id).await,
        },

        Commands::Config { .. } => unreachable!("handled before config load"),
    }
}
