//! Publish side effects and the publish gate
//!
//! Publishing jobs run their body unconditionally; the gate only decides
//! whether the external push/release call executes. A gated-off instance
//! records a soft skip, observable separately from a scheduler skip.

use serde::{Deserialize, Serialize};

use super::trigger::{EventKind, TriggerContext};
use super::version::ResolvedVersion;

/// Decides whether push/release side effects execute for this run.
///
/// Publishing happens when a tag was explicitly supplied, or when the run
/// was not review-triggered and targets a branch other than the protected
/// one. A tagless push to the protected branch therefore builds but does
/// not publish.
#[must_use]
pub fn should_publish(ctx: &TriggerContext, protected_branch: &str) -> bool {
    ctx.has_tag()
        || (super::version::sanitize_ref(&ctx.ref_name) != protected_branch
            && ctx.event != EventKind::PullRequest)
}

/// An image tag slot, resolved against the run's [`ResolvedVersion`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageTag {
    /// The primary tag (user tag or short commit)
    Primary,
    /// The legacy-variant tag
    Legacy,
    /// A fixed literal tag
    Literal(String),
}

impl ImageTag {
    /// Resolves the slot into a concrete tag string
    #[must_use]
    pub fn resolve(&self, version: &ResolvedVersion) -> String {
        match self {
            Self::Primary => version.primary_tag.clone(),
            Self::Legacy => version.legacy_tag.clone(),
            Self::Literal(tag) => tag.clone(),
        }
    }
}

/// An asset a release job uploads after creating the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Relay name of the artifact to upload
    pub artifact: String,

    /// Asset name presented on the release
    pub asset_name: String,

    /// MIME type of the asset
    pub content_type: String,
}

impl ReleaseAsset {
    /// Creates a release asset referencing a relay artifact
    #[must_use]
    pub fn new(
        artifact: impl Into<String>,
        asset_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            artifact: artifact.into(),
            asset_name: asset_name.into(),
            content_type: content_type.into(),
        }
    }
}

/// The effectful sub-action of a publishing job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PublishSpec {
    /// Push a container image under the given tags
    PushImage {
        /// Image reference without tag
        image: String,
        /// Tags to push, in order
        tags: Vec<ImageTag>,
        /// OCI labels attached to the push
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        labels: Vec<(String, String)>,
    },

    /// Create a release and upload the listed assets
    CreateRelease {
        /// Human-readable release name; the tag comes from the run version
        name: String,
        /// Create as draft
        #[serde(default)]
        draft: bool,
        /// Mark as prerelease
        #[serde(default)]
        prerelease: bool,
        /// Assets to upload from the artifact relay
        assets: Vec<ReleaseAsset>,
    },
}
