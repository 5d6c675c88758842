use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("species definition already registered: {0}")]
    DuplicateSpecies(String),
}
