use thiserror::Error;

/// Failure classes of a synchronization run.
///
/// Only `MailSource` is recovered by the orchestrator. Everything else ends
/// the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("mail source error: {0:#}")]
    MailSource(anyhow::Error),

    #[error("destination store error: {0:#}")]
    Store(anyhow::Error),

    #[error("authorization error: {0:#}")]
    Auth(anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
