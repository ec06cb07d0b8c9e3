use thiserror::Error;

use crate::config::ConfigError;
use crate::hash::HashError;
use crate::ofx::OfxError;

/// Fatal import failures. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Format(#[from] OfxError),
    #[error(transparent)]
    Encoding(#[from] HashError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}
