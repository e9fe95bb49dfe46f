use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Input line unavailable: {0}")]
    InputDeviceUnavailable(String),

    #[error("Output line unavailable: {0}")]
    OutputDeviceUnavailable(String),

    #[error("I/O problems on input line: {0}")]
    InputIo(String),

    #[error("I/O problems on output line: {0}")]
    OutputIo(String),

    #[error("Invalid input size")]
    InvalidInputSize,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LinkError {
    /// Process exit status for this failure
    ///
    /// Device and line I/O failures are fatal and each site has its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            LinkError::InputIo(_) => -1,
            LinkError::InputDeviceUnavailable(_) => -2,
            LinkError::OutputIo(_) => -3,
            LinkError::OutputDeviceUnavailable(_) => -4,
            LinkError::InvalidInputSize | LinkError::InvalidConfig(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_failure_site() {
        let codes = [
            LinkError::InputIo("x".into()).exit_code(),
            LinkError::InputDeviceUnavailable("x".into()).exit_code(),
            LinkError::OutputIo("x".into()).exit_code(),
            LinkError::OutputDeviceUnavailable("x".into()).exit_code(),
        ];
        assert_eq!(codes, [-1, -2, -3, -4]);
    }

    #[test]
    fn test_usage_errors_are_not_device_codes() {
        assert_eq!(LinkError::InvalidInputSize.exit_code(), 1);
        assert_eq!(LinkError::InvalidConfig("bad".into()).exit_code(), 1);
    }
}
