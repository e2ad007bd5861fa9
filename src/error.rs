use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::prompt::PromptError;
use crate::purge::EmptyError;
use crate::storage::StoreError;

/// Steps of the cleanup flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    List,
    Select,
    Confirm,
    ResolveRegion,
    Empty,
    Delete,
}

impl Display for Phase {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        let str = match self {
            Self::List => "list",
            Self::Select => "select",
            Self::Confirm => "confirm",
            Self::ResolveRegion => "resolve-region",
            Self::Empty => "empty",
            Self::Delete => "delete",
        };
        write!(f, "{str}")
    }
}

/// Anything that ends a cleanup run early. None of these are retried.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Error in listing buckets")]
    List(#[source] StoreError),

    #[error("Prompt failed during {phase}")]
    Prompt {
        phase: Phase,
        #[source]
        source: PromptError,
    },

    #[error("Unable to get location of bucket `{bucket}`")]
    Location {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("Error in emptying bucket `{bucket}`")]
    Empty {
        bucket: String,
        #[source]
        source: EmptyError,
    },

    #[error("Error in deleting bucket `{bucket}`")]
    DeleteBucket {
        bucket: String,
        #[source]
        source: StoreError,
    },
}

impl CleanupError {
    pub const fn phase(&self) -> Phase {
        match self {
            Self::List(_) => Phase::List,
            Self::Prompt { phase, .. } => *phase,
            Self::Location { .. } => Phase::ResolveRegion,
            Self::Empty { .. } => Phase::Empty,
            Self::DeleteBucket { .. } => Phase::Delete,
        }
    }
}
