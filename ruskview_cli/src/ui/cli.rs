use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use ruskview_core::{
    Application, AuthConfig, AuthKind, ClusterOp, ConnectionProfile, IndexOp, Params, ProxyError,
    RequestBody, SecretStorage, Settings,
};
use serde_json::Value;

use super::console::ConsoleNotifier;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "ruskview", version, subcommand_required = true)]
pub struct Args {
    /// Request timeout in seconds (at least 1)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
    /// Directory holding profiles.json
    #[arg(long, global = true)]
    pub profile_dir: Option<PathBuf>,
    /// Keep profile secrets in the OS keyring
    #[arg(long, global = true)]
    pub keyring: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage saved connection profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Check that a saved profile reaches its cluster
    Test { id: String },
    /// Connect with a saved profile and print what the cluster reports
    Connect { id: String },
    /// Send an arbitrary request through a profile
    Request {
        id: String,
        /// HTTP method, e.g. GET or post
        method: String,
        /// Server-relative path starting with '/'
        path: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
    /// Cluster-level shortcut: health, state, stats, nodes or info
    Cluster { id: String, op: ClusterOp },
    /// Index-level shortcut: search, mapping, settings, stats, create or delete
    Index {
        id: String,
        op: IndexOp,
        index: String,
        /// JSON body for search and create
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// List saved profiles
    List {
        /// Only show profiles using this auth type (basic or iam)
        #[arg(long)]
        auth: Option<AuthKind>,
    },
    /// Save a new profile
    Add {
        #[arg(long)]
        name: String,
        /// Base URL, e.g. https://localhost:9200
        #[arg(long)]
        url: String,
        #[arg(long, conflicts_with_all = ["region", "access_key", "secret_key"])]
        username: Option<String>,
        #[arg(long, requires = "username")]
        password: Option<String>,
        /// AWS region of the domain
        #[arg(long, requires_all = ["access_key", "secret_key"])]
        region: Option<String>,
        #[arg(long)]
        access_key: Option<String>,
        #[arg(long)]
        secret_key: Option<String>,
    },
    /// Delete a saved profile
    Remove { id: String },
}

impl Args {
    fn settings(&self) -> Settings {
        let mut settings = Settings::from_env();
        if let Some(secs) = self.timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &self.profile_dir {
            settings.profile_dir = Some(dir.clone());
        }
        if self.keyring {
            settings.secret_storage = SecretStorage::Keyring;
        }
        settings
    }
}

pub async fn run_cli(args: Args) -> anyhow::Result<()> {
    let settings = args.settings();
    let app = Application::with_notifier(&settings, Arc::new(ConsoleNotifier))
        .map_err(|e| anyhow!(e))
        .context("failed to start")?;

    match args.command {
        Command::Profiles { action } => run_profile_action(&app, action),
        Command::Test { id } => {
            let profile = load_profile(&app, &id)?;
            app.test_connection(&profile).await?;
            Ok(())
        }
        Command::Connect { id } => {
            connect(&app, &id).await?;
            let session = app.current();
            let cluster = session.cluster.unwrap_or_default();
            println!(
                "cluster: {}\nversion: {}",
                cluster.name.as_deref().unwrap_or("unknown"),
                cluster.version.as_deref().unwrap_or("unknown")
            );
            app.disconnect();
            Ok(())
        }
        Command::Request {
            id,
            method,
            path,
            body,
        } => {
            connect(&app, &id).await?;
            let result = app.proxy(&method, &path, body.map(RequestBody::Raw)).await;
            print_result(result)
        }
        Command::Cluster { id, op } => {
            connect(&app, &id).await?;
            print_result(app.cluster_op(op, &Params::new()).await)
        }
        Command::Index {
            id,
            op,
            index,
            body,
        } => {
            let body = body
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--body is not valid JSON")?;
            connect(&app, &id).await?;
            print_result(app.index_op(op, &index, &Params::new(), body).await)
        }
    }
}

fn run_profile_action(app: &Application, action: ProfileAction) -> anyhow::Result<()> {
    match action {
        ProfileAction::List { auth } => {
            let profiles = match auth {
                Some(kind) => app.profiles_by_auth(kind)?,
                None => app.list_profiles()?,
            };
            for p in profiles {
                println!("{}\t{}\t{}\t{}", p.id, p.name, p.url, p.auth_kind());
            }
            Ok(())
        }
        ProfileAction::Add {
            name,
            url,
            username,
            password,
            region,
            access_key,
            secret_key,
        } => {
            let auth = match (username, region) {
                (Some(username), None) => AuthConfig::basic(username, password.unwrap_or_default()),
                (None, Some(region)) => AuthConfig::iam(
                    region,
                    access_key.unwrap_or_default(),
                    secret_key.unwrap_or_default(),
                ),
                _ => bail!("pass either --username/--password or --region/--access-key/--secret-key"),
            };
            let saved = app.save_profile(&ConnectionProfile::new(name, url, auth))?;
            println!("{}", saved.id);
            Ok(())
        }
        ProfileAction::Remove { id } => {
            if !app.delete_profile(&id)? {
                bail!("no profile with id '{}'", id);
            }
            Ok(())
        }
    }
}

fn load_profile(app: &Application, id: &str) -> anyhow::Result<ConnectionProfile> {
    app.find_profile(id)?
        .ok_or_else(|| anyhow!("no profile with id '{}'", id))
}

async fn connect(app: &Application, id: &str) -> anyhow::Result<()> {
    let profile = load_profile(app, id)?;
    info!("Using profile '{}'", profile.name);
    app.connect(profile).await?;
    Ok(())
}

/// Pretty-print the cluster's JSON; on an HTTP error the cluster's body is
/// still printed so the caller can read it.
fn print_result(result: Result<Value, ProxyError>) -> anyhow::Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            if let Some(body) = e.body_json() {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Err(e.into())
        }
    }
}
