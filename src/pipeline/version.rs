//! Version and tag resolution
//!
//! Derives the artifact version string and its legacy variant from the
//! trigger context. The two-tag scheme exists because each run publishes
//! a primary and a legacy image variant, and both need human-readable
//! tags even when no explicit tag was supplied.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::trigger::TriggerContext;

/// Default protected branch whose pushes receive the "latest" style tag
pub const PROTECTED_BRANCH: &str = "master";

/// Leading ref-namespace segment, e.g. `refs/heads/` or `refs/tags/`
static REF_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^refs/[^/]+/").expect("valid ref prefix pattern"));

/// Resolved version tags for a single pipeline run
///
/// Computed once per run and shared by reference across all job instances
/// that stamp artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    /// Tag applied to the primary artifact variant
    pub primary_tag: String,

    /// Tag applied to the secondary (legacy base) variant
    pub legacy_tag: String,
}

impl ResolvedVersion {
    /// Derives both tags from a trigger context.
    ///
    /// The primary tag is the user-supplied tag when present, otherwise
    /// the short commit hash. The legacy tag follows the sanitized branch
    /// name, with the protected branch mapping to `latest-legacy`.
    #[must_use]
    pub fn derive(ctx: &TriggerContext, protected_branch: &str) -> Self {
        let primary_tag = match &ctx.user_tag {
            Some(tag) => tag.clone(),
            None => ctx.commit_short().to_string(),
        };

        let legacy_tag = match &ctx.user_tag {
            Some(tag) => format!("{tag}-legacy"),
            None => {
                let sanitized = sanitize_ref(&ctx.ref_name);
                if sanitized == protected_branch {
                    "latest-legacy".to_string()
                } else {
                    format!("{sanitized}-legacy")
                }
            }
        };

        Self {
            primary_tag,
            legacy_tag,
        }
    }
}

/// Sanitizes a ref name for use in an artifact tag.
///
/// Strips a leading ref-namespace segment (`refs/heads/`, `refs/tags/`,
/// ...) and replaces the remaining `/` separators with `-`.
#[must_use]
pub fn sanitize_ref(ref_name: &str) -> String {
    REF_PREFIX.replace(ref_name, "").replace('/', "-")
}
