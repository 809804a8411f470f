use thiserror::Error;
use vetpro_core::AppError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Sign up rejected: {0}")]
    SignUpRejected(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Auth service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth configuration error: {0}")]
    Config(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err.to_string())
    }
}
