//! Causas server binary: HTTP pages, migrations and account commands

mod config;
mod logging;

use anyhow::{bail, Context, Result};
use axum::Router;
use causas_service::api::rest::auth::AuthSettings;
use causas_service::{CausasServiceModule, Principal};
use clap::{Parser, Subcommand};
use config::AppConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Causas - judicial case management for a collections law office
#[derive(Parser)]
#[command(name = "causas-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Causas case-management server", long_about = None)]
struct Cli {
    /// YAML configuration file; `CAUSAS__*` environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP until interrupted
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Manage application users
    User {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Print a signed session token for an existing user
    Token {
        #[arg(long)]
        user_id: i32,
        #[arg(long)]
        username: String,
        /// Validity, e.g. `12h` or `30m`
        #[arg(long, default_value = "12h", value_parser = parse_ttl)]
        ttl: Duration,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// Create a user
    Add {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        nombre: String,
    },
}

fn parse_ttl(raw: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(raw).map_err(|e| e.to_string())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;
    logging::init(&cfg.logging)?;

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Migrate => {
            let db = connect(&cfg).await?;
            CausasServiceModule::migrate(&db).await
        }
        Command::User {
            action: UserCommand::Add { username, nombre },
        } => {
            let module = init_module(&cfg).await?;
            let usuario = module
                .service()?
                .create_usuario(&username, &nombre)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create user: {}", e))?;
            println!("created user {} (id {})", usuario.username, usuario.id);
            Ok(())
        }
        Command::Token {
            user_id,
            username,
            ttl,
        } => {
            let module = init_module(&cfg).await?;
            let known = module
                .service()?
                .list_usuarios()
                .await
                .map_err(|e| anyhow::anyhow!("cannot list users: {}", e))?
                .into_iter()
                .any(|u| u.id == user_id && u.username == username);
            if !known {
                bail!("no user with id {} and username '{}'", user_id, username);
            }

            let auth = AuthSettings::new(&cfg.causas.jwt_secret, &cfg.causas.login_url)?;
            let token = auth.issue_token(
                &Principal {
                    usuario_id: user_id,
                    username,
                },
                ttl,
            )?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn connect(cfg: &AppConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.database.url.clone());
    options
        .max_connections(cfg.database.max_connections)
        .sqlx_logging(false);
    Database::connect(options)
        .await
        .with_context(|| format!("connecting to {}", cfg.database.url))
}

async fn init_module(cfg: &AppConfig) -> Result<CausasServiceModule> {
    let db = Arc::new(connect(cfg).await?);
    let module = CausasServiceModule::default();
    module.init(cfg.causas.clone(), db).await?;
    Ok(module)
}

async fn serve(cfg: AppConfig) -> Result<()> {
    let db = Arc::new(connect(&cfg).await?);
    CausasServiceModule::migrate(&db).await?;

    let module = CausasServiceModule::default();
    module.init(cfg.causas.clone(), db).await?;

    let app = module
        .register_rest(Router::new())?
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let listener = TcpListener::bind(&cfg.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.server.bind_addr))?;
    tracing::info!(addr = %cfg.server.bind_addr, "causas-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("causas-server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received");
}
