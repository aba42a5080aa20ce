use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Failed to start the reactor thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Failed to build the reactor runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("Recording I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Recording line {line} is not a valid event: {source}")]
    Replay {
        line: usize,
        #[source]
        source: ron::error::SpannedError,
    },
}
