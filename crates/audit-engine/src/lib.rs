//! Audit Diff Engine
//!
//! Orchestrates the differs over a whole revision history:
//! - Spawns the person prefetch before diffing starts
//! - Diffs adjacent object snapshots, dropping pairs with no visible change
//! - Describes every relationship revision against its own chain
//! - Merges both row kinds newest first
//! - Fills role diffs through a generation-tagged [`AclBackfill`]
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_engine::prelude::*;
//!
//! let engine = RevisionDiffEngine::new(ctx, EngineConfig::new());
//! let history = RevisionHistory::load("history.json").await?;
//!
//! let report = engine.compute(&history).await;
//! render(&report.entries);
//! if report.backfill.run().await.is_applied() {
//!     render(&report.entries);
//! }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod backfill;
pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use backfill::{AclBackfill, BackfillOutcome};
pub use config::EngineConfig;
pub use engine::RevisionDiffEngine;
pub use error::{EngineError, EngineResult};
pub use types::{RevisionDiffReport, RevisionHistory};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the engine
    pub use crate::{
        AclBackfill, BackfillOutcome, EngineConfig, EngineError, EngineResult, RevisionDiffEngine,
        RevisionDiffReport, RevisionHistory,
    };
    pub use audit_context::DiffContext;
    pub use audit_model::{Change, DiffEntry, HistoryEntry, MappingChange};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
