//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, engine calls, and configuration
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use aura_core::{AuraError, EngineError, ErrorSeverity, UnitId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a spell catalog before building")]
    MissingCatalog,

    #[error("{0} is not part of this shard")]
    UnknownUnit(UnitId),

    #[error("{0} is already part of this shard")]
    DuplicateUnit(UnitId),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("failed to open aura log")]
    AuraLog(#[source] std::io::Error),
}

impl AuraError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
            Self::MissingCatalog | Self::InvalidEnv { .. } | Self::AuraLog(_) => {
                ErrorSeverity::Fatal
            }
            Self::UnknownUnit(_) | Self::DuplicateUnit(_) => ErrorSeverity::Validation,
            Self::Engine(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingCatalog => "RUNTIME_MISSING_CATALOG",
            Self::UnknownUnit(_) => "RUNTIME_UNKNOWN_UNIT",
            Self::DuplicateUnit(_) => "RUNTIME_DUPLICATE_UNIT",
            Self::Engine(error) => error.error_code(),
            Self::InvalidEnv { .. } => "RUNTIME_INVALID_ENV",
            Self::AuraLog(_) => "RUNTIME_AURA_LOG",
        }
    }
}
