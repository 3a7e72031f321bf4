use crate::dap::RequestError;
use crate::debugger::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- session lifecycle -----------------------------------------
    #[error("no active debug session")]
    NoActiveSession,
    #[error("`{operation}` is not allowed while the session is {state}")]
    StateViolation {
        state: SessionState,
        operation: &'static str,
    },
    #[error("failed to debug target: {0}")]
    FatalSession(String),

    // --------------------------------- debugger entity not found ---------------------------------
    #[error("breakpoint {0} not found")]
    NoSuchBreakpoint(u32),
    #[error("frame {0} not found")]
    NoSuchFrame(u32),
    #[error("scope `{0}` not found")]
    NoSuchScope(String),
    #[error("thread {0} not found")]
    NoSuchThread(i64),
    #[error("no thread in focus")]
    NoFocusThread,

    // --------------------------------- adapter errors --------------------------------------------
    #[error("adapter does not support {0}")]
    CapabilityNotSupported(&'static str),
    #[error("adapter request failed: {0}")]
    AdapterFailure(String),
    #[error("adapter connection closed")]
    AdapterExited,
    #[error("malformed adapter message: {0}")]
    Protocol(#[from] serde_json::Error),

    // --------------------------------- generic errors --------------------------------------------
    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl Error {
    /// Return a hint to an interface - continue debugging after error or stop whole process.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::NoActiveSession => false,
            Error::StateViolation { .. } => false,
            Error::NoSuchBreakpoint(_) => false,
            Error::NoSuchFrame(_) => false,
            Error::NoSuchScope(_) => false,
            Error::NoSuchThread(_) => false,
            Error::NoFocusThread => false,
            Error::CapabilityNotSupported(_) => false,
            Error::AdapterFailure(_) => false,
            Error::AdapterExited => false,
            Error::Protocol(_) => false,
            Error::IO(_) => false,

            // currently fatal errors
            Error::FatalSession(_) => true,
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::Rejected(message) => Error::AdapterFailure(message),
            RequestError::Disconnected => Error::AdapterExited,
            RequestError::Decode(e) => Error::Protocol(e),
            RequestError::Transport(message) => Error::AdapterFailure(message),
        }
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "debugger", "{:#}", e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
}
