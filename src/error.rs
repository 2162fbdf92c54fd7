//! Single application error type.
//!
//! Every fallible operation returns `Result<_, AppError>`. The exit code is
//! chosen at the failure site:
//!
//! - `2`: usage or I/O problem (bad flag, unreadable file, failed write)
//! - `3`: no usable data after cleaning/filtering
//! - `4`: numerical failure (fit did not converge, singular covariance, ...)

pub const EXIT_USAGE: u8 = 2;
pub const EXIT_NO_DATA: u8 = 3;
pub const EXIT_NUMERIC: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(EXIT_NUMERIC, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_pick_exit_codes() {
        assert_eq!(AppError::usage("x").exit_code(), EXIT_USAGE);
        assert_eq!(AppError::numeric("x").exit_code(), EXIT_NUMERIC);
        assert_eq!(AppError::new(EXIT_NO_DATA, "empty").to_string(), "empty");
    }
}
