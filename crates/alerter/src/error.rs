use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid e-mail address `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build e-mail message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Invalid SMTP port `{0}`.")]
    InvalidPort(String),
}
