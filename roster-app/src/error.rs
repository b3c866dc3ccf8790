use thiserror::Error;

/// Reasons the creation form is rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Name is required")]
    EmptyName,

    #[error("Age is required")]
    EmptyAge,

    #[error("Age must be a whole number, got \"{0}\"")]
    InvalidAge(String),

    #[error("Users can only be created once the list has loaded")]
    NotReady
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid API url \"{url}\": {message}")]
    InvalidUrl { url: String, message: String },

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String)
}
