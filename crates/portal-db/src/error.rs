//! Database error types

use std::fmt;
use thiserror::Error;

/// Column carrying a uniqueness constraint on the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::Username => "username",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("{field} is duplicated")]
    Conflict { field: UniqueField },
}
