//! `calctree`: terminal client for the calculation tree.
//!
//! # Usage
//!
//! ```text
//! calctree register alice secret1
//! calctree start 10
//! calctree apply 1 add 5
//! calctree list
//! ```

mod client;
mod render;
mod session;

use std::{path::PathBuf, str::FromStr as _};

use anyhow::{Context, Result, anyhow};
use calctree_core::calculation::Operation;
use clap::{Parser, Subcommand};
use client::ApiClient;
use session::Session;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "calctree", about = "Terminal client for the calculation tree")]
struct Args {
  /// Base URL of the calctree server (default: the saved session's, else
  /// http://localhost:3000).
  #[arg(long, env = "CALCTREE_URL")]
  url: Option<String>,

  /// Where the login session is stored.
  #[arg(long, value_name = "FILE", env = "CALCTREE_SESSION")]
  session: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account and log in.
  Register { username: String, password: String },
  /// Log in to an existing account.
  Login { username: String, password: String },
  /// Forget the saved session.
  Logout,
  /// Print every calculation as a tree.
  List,
  /// Start a new tree at NUMBER.
  Start {
    #[arg(allow_negative_numbers = true)]
    number: f64,
  },
  /// Append OPERATION NUMBER beneath calculation PARENT.
  Apply {
    parent: i64,
    /// add | subtract | multiply | divide
    operation: String,
    #[arg(allow_negative_numbers = true)]
    number: f64,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let session_path = args.session.clone().unwrap_or_else(session::default_path);
  let saved = Session::load(&session_path)?;

  // Flag / env override the saved session, which overrides the default.
  let url = args
    .url
    .clone()
    .or_else(|| saved.as_ref().map(|s| s.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let token = saved.as_ref().map(|s| s.token.clone());
  tracing::debug!(%url, logged_in = token.is_some(), "client configured");

  match args.command {
    Command::Register { username, password } => {
      let client = ApiClient::new(&url, None)?;
      let auth = client.register(&username, &password).await?;
      save_session(&session_path, &url, auth)?;
    }
    Command::Login { username, password } => {
      let client = ApiClient::new(&url, None)?;
      let auth = client.login(&username, &password).await?;
      save_session(&session_path, &url, auth)?;
    }
    Command::Logout => {
      if Session::clear(&session_path)? {
        println!("Logged out.");
      } else {
        println!("No saved session.");
      }
    }
    Command::List => {
      let forest = ApiClient::new(&url, token)?.forest().await?;
      if forest.is_empty() {
        println!("No calculations yet.");
      } else {
        print!("{}", render::render_forest(&forest));
      }
    }
    Command::Start { number } => {
      let node = ApiClient::new(&url, token)?.start(number).await?;
      println!("{}", render::describe(&node.calculation));
    }
    Command::Apply { parent, operation, number } => {
      let operation = Operation::from_str(&operation).map_err(|_| {
        anyhow!("unknown operation {operation:?}; expected add, subtract, multiply or divide")
      })?;
      let node = ApiClient::new(&url, token)?
        .apply(parent, operation, number)
        .await?;
      println!("{}", render::describe(&node.calculation));
    }
  }

  Ok(())
}

fn save_session(path: &std::path::Path, url: &str, auth: client::AuthResponse) -> Result<()> {
  let session = Session {
    url:      url.to_string(),
    token:    auth.token,
    username: auth.user.username.clone(),
  };
  session
    .save(path)
    .with_context(|| format!("saving session to {}", path.display()))?;
  println!("Logged in as {} (id {}).", auth.user.username, auth.user.id);
  Ok(())
}
