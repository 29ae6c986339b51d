#[derive(Debug, thiserror::Error)]
pub enum ResultViewError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ResultViewError>;
