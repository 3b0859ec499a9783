//! Audit Diff CLI
//!
//! File-driven front end for [`audit_engine::RevisionDiffEngine`]: loads a
//! revision history, an optional fixture of collaborator data and an
//! optional TOML configuration, then renders the diff as JSON.

#![warn(unreachable_pub)]

use anyhow::Context;
use audit_context::{
    DiffContext, InMemoryObjectResolver, InMemoryPersonSource, StaticAttributeRegistry,
    StaticRoleRegistry,
};
use audit_engine::{BackfillOutcome, EngineConfig, RevisionDiffEngine, RevisionHistory};
use audit_model::{AttrDef, ObjectRef, Person, Role};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collaborator data normally served by the backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContextFixture {
    /// People the person source can return
    pub people: Vec<Person>,
    /// Assignable roles per model type, highest priority first
    pub roles: HashMap<String, Vec<Role>>,
    /// Field aliases per model type
    pub attributes: HashMap<String, Vec<AttrDef>>,
    /// Fully resolved objects the stub resolver can return
    pub objects: Vec<ObjectRef>,
}

impl ContextFixture {
    /// Read a fixture file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading context {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("decoding context {}", path.display()))
    }

    /// Wire the fixture into a diff context
    #[must_use]
    pub fn into_context(self) -> DiffContext {
        let roles = self
            .roles
            .into_iter()
            .fold(StaticRoleRegistry::new(), |registry, (kind, roles)| {
                registry.with(kind, roles)
            });
        let attributes = self
            .attributes
            .into_iter()
            .fold(StaticAttributeRegistry::new(), |registry, (kind, defs)| {
                registry.with(kind, defs)
            });

        DiffContext::new(
            Arc::new(InMemoryPersonSource::with_people(self.people)),
            Arc::new(InMemoryObjectResolver::with_objects(self.objects)),
        )
        .with_attributes(Arc::new(attributes))
        .with_roles(Arc::new(roles))
    }
}

/// Options of the `diff` command
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Revision history JSON
    pub history: PathBuf,
    /// Fixture context JSON
    pub context: Option<PathBuf>,
    /// Engine configuration TOML
    pub config: Option<PathBuf>,
    /// Fill role diffs before printing
    pub wait_acl: bool,
}

/// Configuration from `path`, or the default
///
/// # Errors
/// Returns error if the file cannot be loaded
pub async fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_toml_file(path)
            .await
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Run the engine and render its rows as pretty JSON
///
/// # Errors
/// Returns error if any input cannot be loaded
pub async fn run_diff(options: &DiffOptions) -> anyhow::Result<String> {
    let config = load_config(options.config.as_deref()).await?;
    let history = RevisionHistory::load(&options.history)
        .await
        .with_context(|| format!("loading history {}", options.history.display()))?;
    let fixture = match &options.context {
        Some(path) => ContextFixture::load(path).await?,
        None => ContextFixture::default(),
    };

    let engine = RevisionDiffEngine::new(fixture.into_context(), config);
    let report = engine.compute(&history).await;
    tracing::info!("{} rows for {}", report.len(), history.subject);

    if options.wait_acl {
        match report.backfill.run().await {
            BackfillOutcome::Applied { rows } => tracing::debug!("Filled {} role diffs", rows),
            outcome => tracing::warn!("Role diffs not filled: {:?}", outcome),
        }
    }

    Ok(serde_json::to_string_pretty(&report.entries)?)
}

/// Effective configuration as TOML
///
/// # Errors
/// Returns error if the file cannot be loaded
pub async fn render_config(path: Option<&Path>) -> anyhow::Result<String> {
    Ok(load_config(path).await?.to_toml()?)
}
