// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Change notifications for consumer-facing side effects.

use async_trait::async_trait;

use crate::collection::Collection;
use crate::document::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
	Created,
	Updated,
	Deleted,
}

impl ChangeKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChangeKind::Created => "created",
			ChangeKind::Updated => "updated",
			ChangeKind::Deleted => "deleted",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
	pub collection: Collection,
	pub id: RecordId,
	pub kind: ChangeKind,
}

/// Receives committed changes from human-initiated writes.
///
/// Not called for writes whose context suppresses side effects.
#[async_trait]
pub trait ChangeListener: Send + Sync {
	async fn on_change(&self, event: &ChangeEvent);
}

/// Emits a revalidation log line per change for the public site cache.
pub struct RevalidationLogger;

#[async_trait]
impl ChangeListener for RevalidationLogger {
	async fn on_change(&self, event: &ChangeEvent) {
		tracing::info!(
			collection = %event.collection,
			id = %event.id,
			change = event.kind.as_str(),
			"revalidating cached pages"
		);
	}
}
