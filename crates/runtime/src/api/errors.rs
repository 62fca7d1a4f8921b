//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and the rules engine so clients
//! can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use arena_core::{CastError, ConfigError, ErrorSeverity, GameError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires content to be configured before building")]
    MissingContent,

    #[error("content failed startup validation")]
    InvalidContent(#[from] ConfigError),

    #[error(transparent)]
    Cast(#[from] CastError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cast(err) => err.severity(),
            Self::MissingContent | Self::InvalidContent(_) => ErrorSeverity::Fatal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingContent => "RUNTIME_MISSING_CONTENT",
            Self::InvalidContent(_) => "RUNTIME_INVALID_CONTENT",
            Self::Cast(err) => err.error_code(),
        }
    }
}
