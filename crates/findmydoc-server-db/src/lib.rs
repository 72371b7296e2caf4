// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # findmydoc-server-db
//!
//! Persistence layer for the findmydoc server using SQLite via sqlx.
//!
//! Content records of every collection live as JSON documents behind the
//! [`RecordStore`] trait. Seeding, reset and the identity lifecycle only
//! ever talk to that trait, so decorators (see `findmydoc-server-identity`)
//! can attach per-row behaviour without the callers noticing.
//!
//! ## Error Handling
//!
//! | Variant | When to use |
//! |---------|-------------|
//! | `NotFound` | Update of a record that must exist |
//! | `Conflict` | Duplicate `stableId` within a collection |
//! | `Sqlx` | Unexpected database errors, propagated via `?` |
//! | `Internal` | Invalid stored data or an unsupported query |
//!
//! Lookups where absence is normal return `Result<Option<T>>`; delete
//! returns `Result<bool>`.

pub mod collection;
pub mod context;
pub mod document;
pub mod error;
pub mod listener;
pub mod pool;
pub mod query;
pub mod seed_run;
pub mod store;
pub mod testing;

pub use collection::Collection;
pub use context::{CascadeContext, OperationContext};
pub use document::{stable_id_of, Document, Fields, RecordId, STABLE_ID_FIELD};
pub use error::{DbError, Result};
pub use listener::{ChangeEvent, ChangeKind, ChangeListener, RevalidationLogger};
pub use pool::{create_pool, run_migrations};
pub use query::{FieldFilter, FindQuery, Page};
pub use seed_run::SeedRunRepository;
pub use store::{RecordStore, SqliteRecordStore};
