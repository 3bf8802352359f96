use sea_orm::DbErr;
use thiserror::Error;

use crate::token::TokenRejection;

/// Everything an attendance operation can refuse or fail with. None of it is fatal.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    AuthorizationDenied(String),

    /// Also covers a lesson that expired between reads.
    #[error("No active lesson for class {class}")]
    NoActiveLesson { class: String },

    #[error("{trainee} is already marked for this lesson")]
    AlreadyMarked { trainee: String },

    #[error("This device has already been used to mark attendance for this lesson")]
    DeviceAlreadyUsed,

    #[error("{0}")]
    TokenRejected(TokenRejection),

    #[error("Unknown trainee {0}")]
    UnknownTrainee(String),

    #[error("{0}")]
    DuplicateAccount(String),

    #[error("{0}")]
    InvalidAccount(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account directory failure: {0}")]
    Directory(#[from] DbErr),
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;
