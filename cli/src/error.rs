use thiserror::Error;
use tonelink_core::LinkError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported WAV format: {0}")]
    UnsupportedWav(String),

    #[error("Message too long: {0} octets (max {max})", max = tonelink_core::MAX_PAYLOAD_SIZE)]
    MessageTooLong(usize),
}

impl CliError {
    /// Exit status reported to the shell
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Link(err) => err.exit_code(),
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
