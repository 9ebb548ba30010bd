//! Stock build-and-release graph
//!
//! The standard job set for a node-software release run: format check,
//! two test suites with coverage, a dist matrix across the supported
//! platforms, two publishing image jobs (primary and legacy base), a
//! best-effort coverage upload, and a tag-gated release.

use super::errors::ValidationError;
use super::graph::{JobGraph, JobNode, WhenCondition};
use super::matrix::PlatformAxis;
use super::publish::{ImageTag, PublishSpec, ReleaseAsset};
use super::steps::Step;
use super::Environment;

/// Platforms the dist matrix fans out over
pub const DIST_PLATFORMS: &[&str] = &[
    "linux-x64",
    "linux-musl-x64",
    "linux-armv7",
    "linux-arm64",
    "windows-x64",
    "macos-x64",
];

/// Builds the standard release graph for the given image repository.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the assembled graph is invalid; with
/// the fixed job set this only happens if the definitions here regress.
pub fn release_graph(image: &str) -> Result<JobGraph, ValidationError> {
    let mut graph = JobGraph::new();

    graph.add_node(
        JobNode::builder("format-check")
            .step(Step::shell("cargo fmt --all -- --check"))
            .build()?,
    )?;

    graph.add_node(
        JobNode::builder("unit-tests")
            .step(Step::shell("cargo test --workspace --release"))
            .env(Environment::new().set("RUST_BACKTRACE", "full"))
            .output("unit-coverage", "target/coverage/unit.lcov")
            .build()?,
    )?;

    graph.add_node(
        JobNode::builder("full-genesis-tests")
            .step(Step::shell("cargo test --features large-genesis -- --ignored"))
            .env(Environment::new().set("BLOCKSTACK_DB_RECONSTRUCT", "1"))
            .output("genesis-coverage", "target/coverage/genesis.lcov")
            .build()?,
    )?;

    graph.add_node(
        JobNode::builder("coverage-report")
            .depends_on("unit-tests")
            .depends_on("full-genesis-tests")
            .step(Step::echo("uploading coverage"))
            .consumes("unit-coverage")
            .consumes("genesis-coverage")
            .report_coverage("unit-coverage")
            .report_coverage("genesis-coverage")
            .best_effort()
            .build()?,
    )?;

    graph.add_node(
        JobNode::builder("dist")
            .platform_axis(PlatformAxis::of(DIST_PLATFORMS))
            .step(Step::shell("make dist TARGET=${PLATFORM}"))
            .output("dist-${PLATFORM}", "dist/${PLATFORM}.tar.gz")
            .build()?,
    )?;

    graph.add_node(
        JobNode::builder("build-publish")
            .depends_on("format-check")
            .depends_on("unit-tests")
            .depends_on("full-genesis-tests")
            .step(Step::shell(format!("docker build -t {image} .")))
            .publish(PublishSpec::PushImage {
                image: image.to_string(),
                tags: vec![ImageTag::Primary],
                labels: Vec::new(),
            })
            .build()?,
    )?;

    graph.add_node(
        JobNode::builder("build-publish-legacy")
            .depends_on("format-check")
            .depends_on("unit-tests")
            .depends_on("full-genesis-tests")
            .step(Step::shell(format!(
                "docker build -f Dockerfile.legacy -t {image} ."
            )))
            .publish(PublishSpec::PushImage {
                image: image.to_string(),
                tags: vec![ImageTag::Legacy],
                labels: Vec::new(),
            })
            .build()?,
    )?;

    let mut release = JobNode::builder("create-release")
        .depends_on("dist")
        .when(WhenCondition::TagPresent)
        .step(Step::echo("assembling release"));
    for platform in DIST_PLATFORMS {
        release = release.consumes(format!("dist-{platform}"));
    }
    graph.add_node(
        release
            .publish(PublishSpec::CreateRelease {
                name: "Release".to_string(),
                draft: false,
                prerelease: true,
                assets: DIST_PLATFORMS
                    .iter()
                    .map(|platform| {
                        ReleaseAsset::new(
                            format!("dist-{platform}"),
                            format!("{platform}.tar.gz"),
                            "application/gzip",
                        )
                    })
                    .collect(),
            })
            .build()?,
    )?;

    Ok(graph)
}
