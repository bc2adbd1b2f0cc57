use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Failure reported by the remote archive server or the transport under it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport failure: {message}")]
    Transport { message: String, transient: bool },
}

impl RemoteError {
    /// HTTP status the server uses when an archive record is write-locked.
    pub const LOCKED: u16 = 423;

    pub fn is_locked(&self) -> bool {
        matches!(self, RemoteError::Status { status, .. } if *status == Self::LOCKED)
    }

    pub fn is_transient_transport(&self) -> bool {
        matches!(self, RemoteError::Transport { transient: true, .. })
    }

    pub fn message(&self) -> &str {
        match self {
            RemoteError::Status { message, .. } | RemoteError::Transport { message, .. } => message,
        }
    }
}

/// Anything that stops a reconciliation run.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("[{arcid}] filename has no pixiv image id: {filename}")]
    BadFilename { arcid: String, filename: String },

    #[error("[{arcid}] pixiv artwork {image_id} has no member record (member_id={member_id})")]
    MissingMember {
        arcid: String,
        image_id: i64,
        member_id: i64,
    },

    #[error("[{arcid}] persistent lock while updating metadata: {message}")]
    PersistentLock { arcid: String, message: String },

    #[error("[{arcid}] persistent network failure while updating metadata: {message}")]
    PersistentNetwork { arcid: String, message: String },

    #[error("[{arcid}] metadata update rejected ({status}): {message}")]
    RemoteRejected {
        arcid: String,
        status: u16,
        message: String,
    },

    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
