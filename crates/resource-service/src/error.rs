use thiserror::Error;

/// Exposes backend status code, if failure carries one
pub trait StatusError: std::error::Error {
    fn status(&self) -> Option<u16>;

    fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Operation which produced an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Retrieve,
    Create,
    Update,
    Delete,
}

/// Operation-shaped failure, wrapping static message and original cause
#[derive(Error, Debug)]
pub enum Error<E> {
    #[error("{message}")]
    Retrieval {
        message: &'static str,
        #[source]
        source: E,
    },
    #[error("{message}")]
    Creation {
        message: &'static str,
        #[source]
        source: E,
    },
    #[error("{message}")]
    Update {
        message: &'static str,
        #[source]
        source: E,
    },
    #[error("{message}")]
    Deletion {
        message: &'static str,
        #[source]
        source: E,
    },
}

impl<E> Error<E> {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Retrieval { .. } => Operation::Retrieve,
            Self::Creation { .. } => Operation::Create,
            Self::Update { .. } => Operation::Update,
            Self::Deletion { .. } => Operation::Delete,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Retrieval { message, .. }
            | Self::Creation { message, .. }
            | Self::Update { message, .. }
            | Self::Deletion { message, .. } => *message,
        }
    }

    pub fn cause(&self) -> &E {
        match self {
            Self::Retrieval { source, .. }
            | Self::Creation { source, .. }
            | Self::Update { source, .. }
            | Self::Deletion { source, .. } => source,
        }
    }

    pub fn into_cause(self) -> E {
        match self {
            Self::Retrieval { source, .. }
            | Self::Creation { source, .. }
            | Self::Update { source, .. }
            | Self::Deletion { source, .. } => source,
        }
    }
}
pub type Result<T, E> = std::result::Result<T, Error<E>>;
