//! Step types for job bodies
//!
//! Steps are the opaque work a job delegates to an executor: the core
//! only observes exit codes and declared outputs.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single step inside a job body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    /// Shell command execution
    Shell {
        /// Command to execute; may reference env vars as `${VAR}`
        command: String,
    },

    /// Echo message
    Echo {
        /// Message to output
        message: String,
    },
}

impl Step {
    /// Creates a shell command step
    pub fn shell(command: impl Into<String>) -> Self {
        Self::Shell {
            command: command.into(),
        }
    }

    /// Creates an echo step
    pub fn echo(message: impl Into<String>) -> Self {
        Self::Echo {
            message: message.into(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell { command } => write!(f, "sh({command})"),
            Self::Echo { message } => write!(f, "echo({message})"),
        }
    }
}

/// A named output a job declares it will produce
///
/// The executor resolves the location after the steps succeed and the
/// scheduler publishes it into the artifact relay under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDecl {
    /// Relay name for the output; may reference env vars as `${VAR}`
    pub name: String,

    /// Location the job writes the output to; may reference env vars
    pub path: String,
}

impl OutputDecl {
    /// Creates an output declaration
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}
