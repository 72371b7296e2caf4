// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # findmydoc-server-seed
//!
//! Idempotent seeding of reference (`baseline`) and sample (`demo`) data.
//!
//! Records are addressed by their `stableId`, never by storage ids, so the
//! same embedded datasets converge on any environment. Runs are driven by
//! [`SeedRunner`]:
//!
//! 1. production guard (no demo, no reset)
//! 2. optional ordered reset via [`ResetOrchestrator`]
//! 3. the program's [`SeedUnit`]s, in order, sharing one [`StableIdResolver`]
//! 4. status classification and a [`SeedRunSummary`] saved to a [`RunStore`]

pub mod dataset;
pub mod environment;
pub mod error;
pub mod import;
pub mod plan;
pub mod reset;
pub mod resolver;
pub mod run_store;
pub mod runner;
pub mod summary;
pub mod upsert;

pub use environment::{EnvironmentClassifier, FixedEnvironment};
pub use error::{Result, SeedError};
pub use import::{CollectionImport, SeedUnit};
pub use plan::{PlanStep, RelationMapping, SeedPlan};
pub use reset::{ResetCount, ResetOrchestrator, ResetReport};
pub use resolver::{ResolvedIds, ResolvedStableIds, StableIdResolver};
pub use run_store::{InMemoryRunStore, RunStore, SqliteRunStore};
pub use runner::{SeedRequest, SeedRunner};
pub use summary::{RunStatus, SeedFailure, SeedRunSummary, SeedType, SeedUnitResult, Totals};
pub use upsert::{upsert_by_stable_id, UpsertOutcome};
