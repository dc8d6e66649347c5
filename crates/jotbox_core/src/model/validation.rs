//! Input validation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection reasons for user-supplied input.
///
/// `Display` output is safe to show to end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email does not match the `local@domain.tld` shape.
    InvalidEmail,
    /// Password is shorter than the minimum length.
    PasswordTooShort { min_chars: usize },
    /// Note title is empty after trimming.
    EmptyTitle,
    /// Request carried no usable body at all.
    MissingInput,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "Password must be at least {min_chars} characters long")
            }
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::MissingInput => write!(f, "No data provided"),
        }
    }
}

impl Error for ValidationError {}
