//! Process bootstrap: logging, store, image directory, HTTP listener.

use crate::config::Config;
use crate::routes::routes;
use crate::state::AppState;
use log::{info, warn};
use roster_core::db::{open_db, DbError};
use roster_core::{
    init_logging, init_stderr_logging, LocalImageStore, RepoError, SqliteRecordRepository,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// Failure before the server starts accepting requests.
#[derive(Debug)]
pub enum StartupError {
    Logging(String),
    Db(DbError),
    Repo(RepoError),
    Bind(warp::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "database open failed: {err}"),
            Self::Repo(err) => write!(f, "record store init failed: {err}"),
            Self::Bind(err) => write!(f, "listener bind failed: {err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Bind(err) => Some(err),
        }
    }
}

impl From<DbError> for StartupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for StartupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Builds application state from `config` and serves until SIGINT/SIGTERM.
pub async fn run(config: Config) -> Result<(), StartupError> {
    match config.log_dir.as_deref() {
        Some(dir) => init_logging(&config.log_level, dir),
        None => init_stderr_logging(&config.log_level),
    }
    .map_err(StartupError::Logging)?;

    let conn = open_db(&config.db_path)?;
    let repo = SqliteRecordRepository::try_new(conn)?;
    let images = LocalImageStore::new(config.upload_dir.clone(), config.public_url.clone());
    let state = AppState::new(Arc::new(repo), Arc::new(images))
        .with_upload_dir(config.upload_dir.clone());

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let (bound, server) = warp::serve(routes(Arc::new(state)))
        .try_bind_with_graceful_shutdown(address, shutdown_signal())
        .map_err(StartupError::Bind)?;

    info!(
        "event=server_start module=web status=ok address={bound} db_path={} upload_dir={}",
        config.db_path.display(),
        config.upload_dir.display()
    );
    server.await;
    info!("event=server_stop module=web status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("event=signal_install module=web status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown module=web status=ok signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=web status=ok signal=terminate");
            }
            Err(err) => {
                warn!("event=signal_install module=web status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::StartupError;
    use roster_core::RepoError;
    use std::error::Error;

    #[test]
    fn startup_errors_describe_the_failed_step_and_chain_sources() {
        let logging = StartupError::Logging("already initialized".to_string());
        assert_eq!(
            logging.to_string(),
            "logging init failed: already initialized"
        );
        assert!(logging.source().is_none());

        let repo = StartupError::from(RepoError::LockPoisoned);
        assert!(repo.to_string().starts_with("record store init failed:"));
        assert!(repo.source().is_some());
    }
}
