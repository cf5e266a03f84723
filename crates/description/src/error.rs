use thiserror::Error;

pub type Result<T> = std::result::Result<T, DescriptionError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("Unknown lexicalization model: {0}")]
    UnknownModel(String),
}
