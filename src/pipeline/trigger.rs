//! Trigger context resolution
//!
//! Normalizes the raw triggering event into a canonical, immutable record
//! shared by every job in the run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// Kind of event that started a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A code submission opened or updated for review
    PullRequest,
    /// A manual invocation, optionally carrying a version tag
    ManualDispatch,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullRequest => write!(f, "pull_request"),
            Self::ManualDispatch => write!(f, "manual_dispatch"),
        }
    }
}

/// Canonical trigger record, created exactly once at pipeline start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerContext {
    /// Kind of event that started the run
    pub event: EventKind,

    /// Branch or ref name as supplied by the event source
    pub ref_name: String,

    /// Full commit hash under build
    pub commit_hash: String,

    /// Version tag explicitly supplied by the user, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_tag: Option<String>,
}

impl TriggerContext {
    /// Resolves raw event data into a validated trigger context.
    ///
    /// An empty `user_tag` counts as absent. Malformed input is a fatal
    /// configuration error; nothing runs after it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRef`] for an empty ref name and
    /// [`ValidationError::InvalidCommitHash`] for a commit hash shorter
    /// than 7 characters or containing non-hex characters.
    pub fn resolve(
        event: EventKind,
        ref_name: impl Into<String>,
        commit_hash: impl Into<String>,
        user_tag: Option<String>,
    ) -> Result<Self, ValidationError> {
        let ref_name = ref_name.into();
        if ref_name.is_empty() {
            return Err(ValidationError::EmptyRef);
        }

        let commit_hash = commit_hash.into();
        if commit_hash.len() < 7 || !commit_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidCommitHash { hash: commit_hash });
        }

        let user_tag = user_tag.filter(|t| !t.is_empty());

        Ok(Self {
            event,
            ref_name,
            commit_hash,
            user_tag,
        })
    }

    /// Returns true when a version tag was explicitly supplied
    #[must_use]
    pub fn has_tag(&self) -> bool {
        self.user_tag.is_some()
    }

    /// Returns the first 7 characters of the commit hash.
    ///
    /// [`resolve`][Self::resolve] guarantees at least 7 hex characters; a
    /// context assembled from raw fields with a shorter hash yields the
    /// whole hash instead of panicking.
    #[must_use]
    pub fn commit_short(&self) -> &str {
        self.commit_hash.get(..7).unwrap_or(&self.commit_hash)
    }
}

impl fmt::Display for TriggerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} @ {}",
            self.event,
            self.ref_name,
            self.commit_short()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_manual_dispatch() {
        let ctx = TriggerContext::resolve(
            EventKind::ManualDispatch,
            "master",
            "abcdef0123",
            Some("v1.2.3".to_string()),
        )
        .unwrap();

        assert_eq!(ctx.event, EventKind::ManualDispatch);
        assert_eq!(ctx.ref_name, "master");
        assert_eq!(ctx.commit_short(), "abcdef0");
        assert!(ctx.has_tag());
    }

    #[test]
    fn test_resolve_empty_tag_is_absent() {
        let ctx = TriggerContext::resolve(
            EventKind::ManualDispatch,
            "master",
            "abcdef0123",
            Some(String::new()),
        )
        .unwrap();

        assert_eq!(ctx.user_tag, None);
        assert!(!ctx.has_tag());
    }

    #[test]
    fn test_resolve_empty_ref() {
        let result = TriggerContext::resolve(EventKind::PullRequest, "", "abcdef0123", None);
        assert_eq!(result, Err(ValidationError::EmptyRef));
    }

    #[test]
    fn test_resolve_short_commit() {
        let result = TriggerContext::resolve(EventKind::PullRequest, "master", "abc123", None);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidCommitHash { .. })
        ));
    }

    #[test]
    fn test_resolve_non_hex_commit() {
        let result = TriggerContext::resolve(EventKind::PullRequest, "master", "zzzzzzz", None);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidCommitHash { .. })
        ));
    }

    #[test]
    fn test_commit_short_tolerates_raw_short_hash() {
        let ctx = TriggerContext {
            event: EventKind::ManualDispatch,
            ref_name: "master".to_string(),
            commit_hash: "abc".to_string(),
            user_tag: None,
        };
        assert_eq!(ctx.commit_short(), "abc");
    }

    #[test]
    fn test_display() {
        let ctx = TriggerContext::resolve(
            EventKind::PullRequest,
            "feature/x",
            "0123456789abcdef",
            None,
        )
        .unwrap();

        assert_eq!(ctx.to_string(), "pull_request on feature/x @ 0123456");
    }
}
