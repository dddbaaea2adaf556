//! Application error type.
//!
//! One error type for the whole tool, carrying the process exit code so that
//! `main` can stay a thin shell. Exit codes:
//!
//! - `2` — input problems (missing files, bad schema, unreadable workbook)
//! - `3` — the dataset produced no usable rows
//! - `4` — validation failures (e.g. out-of-range indices)

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

    /// Input/schema/file error (exit code 2).
    pub fn input(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// "Nothing left to work with" error (exit code 3).
    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Validation failure (exit code 4).
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(4, message)
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
