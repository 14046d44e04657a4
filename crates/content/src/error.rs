use thiserror::Error;

use crate::id::ContentId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("content {0} is already registered")]
    AlreadyRegistered(ContentId),
}
