//! Error type of the dispatch core: a small hand-written enum, no derive crate.
use std::{error::Error as StdError, fmt, io};

use crate::category::ListenerCategory;

#[derive(Debug)]
pub enum DispatchError {
    NoComponentDirectory,    // lookup or delivery before a directory was attached
    NoSuchComponent(String), // typed API called with a name the directory does not know
    Registration {
        component: String,
        category: ListenerCategory,
        source: anyhow::Error,
    },
    Config(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::NoComponentDirectory => write!(f, "no component directory attached"),
            DispatchError::NoSuchComponent(name) => write!(f, "no component with the name {name}"),
            DispatchError::Registration { component, category, source } => write!(
                f,
                "native registration of {} listener for component {component} failed: {source}",
                category.name()
            ),
            DispatchError::Config(e) => write!(f, "invalid configuration: {e}"),
            DispatchError::Io(e) => write!(f, "cannot read configuration: {e}"),
        }
    }
}

impl StdError for DispatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DispatchError::Registration { source, .. } => Some(&**source),
            DispatchError::Config(e) => Some(e),
            DispatchError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(e: serde_json::Error) -> Self {
        DispatchError::Config(e)
    }
}

impl From<io::Error> for DispatchError {
    fn from(e: io::Error) -> Self {
        DispatchError::Io(e)
    }
}

pub type Result<T = ()> = std::result::Result<T, DispatchError>;
