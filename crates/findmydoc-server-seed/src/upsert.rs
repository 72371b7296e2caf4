// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use findmydoc_server_db::{
	stable_id_of, Collection, Fields, FindQuery, OperationContext, RecordId, RecordStore,
	STABLE_ID_FIELD,
};
use tracing::{debug, instrument};

use crate::error::{Result, SeedError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
	pub id: RecordId,
	pub created: bool,
	pub updated: bool,
}

/// Creates or fully overwrites the record carrying `stableId`.
///
/// Writes run as trusted automation with side effects suppressed.
#[instrument(skip(store, record), fields(%collection, stable_id = stable_id_of(&record).unwrap_or_default()))]
pub async fn upsert_by_stable_id(
	store: &dyn RecordStore,
	collection: Collection,
	record: Fields,
) -> Result<UpsertOutcome> {
	let stable_id = stable_id_of(&record)
		.ok_or(SeedError::MissingStableId(collection))?
		.to_string();
	let ctx = OperationContext::seeding();

	let existing = store
		.find(
			collection,
			&FindQuery::where_equals(STABLE_ID_FIELD, stable_id.as_str()).limit(1),
		)
		.await?
		.first();

	match existing {
		Some(doc) => {
			let updated = store.update(collection, &doc.id, record, &ctx).await?;
			debug!(id = %updated.id, "seed record updated");
			Ok(UpsertOutcome {
				id: updated.id,
				created: false,
				updated: true,
			})
		}
		None => {
			let created = store.create(collection, record, &ctx).await?;
			debug!(id = %created.id, "seed record created");
			Ok(UpsertOutcome {
				id: created.id,
				created: true,
				updated: false,
			})
		}
	}
}
