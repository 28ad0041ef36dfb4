use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SpawnError {
    Panic(String),
    Expired,
    Dropped,
    Timeout,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::Panic(msg) => write!(f, "task panicked: {}", msg),
            SpawnError::Expired => write!(f, "task expired before a worker picked it up"),
            SpawnError::Dropped => write!(f, "task was dropped without being executed"),
            SpawnError::Timeout => write!(f, "timed out waiting for the task result"),
        }
    }
}

impl std::error::Error for SpawnError {}
