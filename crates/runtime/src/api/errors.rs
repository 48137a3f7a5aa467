//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the registry, instance workers and channel plumbing so
//! the session layer can decide between rejecting one request and dropping
//! the session.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{ErrorSeverity, GameError, InstanceError, InstanceId, PlayerId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("player {0} is not connected")]
    UnknownPlayer(PlayerId),

    #[error("instance {0} does not exist")]
    UnknownInstance(InstanceId),

    #[error("player {player} referenced {requested} but is bound to {}", describe_binding(.bound))]
    StaleInstance {
        player: PlayerId,
        requested: InstanceId,
        bound: Option<InstanceId>,
    },

    #[error("player {0} is not in a dungeon")]
    NotInDungeon(PlayerId),

    #[error("dungeon generation failed after {attempts} attempts")]
    GenerationFailed {
        attempts: u32,
        #[source]
        source: InstanceError,
    },

    #[error("instance {0} has a full command queue")]
    InstanceBusy(InstanceId),

    #[error("instance worker command channel closed")]
    CommandChannelClosed,

    #[error("instance worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("runtime worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Instance(#[from] InstanceError),
}

fn describe_binding(bound: &Option<InstanceId>) -> String {
    bound.map_or_else(|| "the hub".to_owned(), |id| id.to_string())
}

impl RuntimeError {
    /// True when only the offending request is lost and the session can
    /// continue.
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::StaleInstance { .. } | Self::InstanceBusy(_) => ErrorSeverity::Recoverable,
            Self::UnknownPlayer(_) | Self::UnknownInstance(_) | Self::NotInDungeon(_) => {
                ErrorSeverity::Validation
            }
            Self::Instance(err) => err.severity(),
            Self::GenerationFailed { .. } => ErrorSeverity::Fatal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPlayer(_) => "RUNTIME_UNKNOWN_PLAYER",
            Self::UnknownInstance(_) => "RUNTIME_UNKNOWN_INSTANCE",
            Self::StaleInstance { .. } => "RUNTIME_STALE_INSTANCE",
            Self::NotInDungeon(_) => "RUNTIME_NOT_IN_DUNGEON",
            Self::GenerationFailed { .. } => "RUNTIME_GENERATION_FAILED",
            Self::InstanceBusy(_) => "RUNTIME_INSTANCE_BUSY",
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Instance(err) => err.error_code(),
        }
    }
}
