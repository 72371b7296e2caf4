// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The primary record store.
//!
//! [`RecordStore`] is the seam every seeding and lifecycle component talks
//! to. [`SqliteRecordStore`] keeps each record as a JSON document in the
//! `documents` table, keyed by collection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqlitePool};
use sqlx::Sqlite;

use crate::collection::Collection;
use crate::context::OperationContext;
use crate::document::{stable_id_of, Document, Fields, RecordId};
use crate::error::{DbError, Result};
use crate::listener::{ChangeEvent, ChangeKind, ChangeListener};
use crate::query::{FindQuery, Page};

#[async_trait]
pub trait RecordStore: Send + Sync {
	async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Page>;

	async fn find_by_id(&self, collection: Collection, id: &RecordId) -> Result<Option<Document>>;

	async fn create(
		&self,
		collection: Collection,
		data: Fields,
		ctx: &OperationContext,
	) -> Result<Document>;

	/// Replaces every field of the record. Returns `NotFound` if absent.
	async fn update(
		&self,
		collection: Collection,
		id: &RecordId,
		data: Fields,
		ctx: &OperationContext,
	) -> Result<Document>;

	/// Returns `false` if the record did not exist.
	async fn delete(
		&self,
		collection: Collection,
		id: &RecordId,
		ctx: &OperationContext,
	) -> Result<bool>;

	async fn count(&self, collection: Collection) -> Result<u64>;

	async fn find_one(
		&self,
		collection: Collection,
		field: &str,
		equals: Value,
	) -> Result<Option<Document>> {
		let page = self
			.find(collection, &FindQuery::where_equals(field, equals).limit(1))
			.await?;
		Ok(page.first())
	}
}

#[derive(Clone)]
pub struct SqliteRecordStore {
	pool: SqlitePool,
	listeners: Vec<Arc<dyn ChangeListener>>,
}

impl SqliteRecordStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			pool,
			listeners: Vec::new(),
		}
	}

	pub fn with_listener(mut self, listener: Arc<dyn ChangeListener>) -> Self {
		self.listeners.push(listener);
		self
	}

	async fn notify(
		&self,
		ctx: &OperationContext,
		collection: Collection,
		id: &RecordId,
		kind: ChangeKind,
	) {
		if ctx.suppress_side_effects {
			tracing::trace!(%collection, %id, change = kind.as_str(), "side effects suppressed");
			return;
		}
		let event = ChangeEvent {
			collection,
			id: id.clone(),
			kind,
		};
		for listener in &self.listeners {
			listener.on_change(&event).await;
		}
	}
}

enum FilterValue {
	Text(String),
	Integer(i64),
	Real(f64),
	Null,
}

struct SqlFilter {
	/// JSON path, or `None` when matching the indexed `stable_id` column.
	path: Option<String>,
	value: FilterValue,
}

impl SqlFilter {
	fn from_query(query: &FindQuery) -> Result<Option<Self>> {
		let Some(filter) = &query.filter else {
			return Ok(None);
		};

		let value = match &filter.equals {
			Value::String(s) => FilterValue::Text(s.clone()),
			Value::Bool(b) => FilterValue::Integer(i64::from(*b)),
			Value::Number(n) => match n.as_i64() {
				Some(i) => FilterValue::Integer(i),
				None => FilterValue::Real(n.as_f64().unwrap_or_default()),
			},
			Value::Null => FilterValue::Null,
			other => {
				return Err(DbError::Internal(format!(
					"unsupported filter value for {}: {other}",
					filter.field
				)))
			}
		};

		let path = if filter.field == crate::document::STABLE_ID_FIELD {
			None
		} else {
			Some(json_path(&filter.field)?)
		};

		Ok(Some(Self { path, value }))
	}

	fn clause(&self) -> &'static str {
		match (&self.path, &self.value) {
			(None, FilterValue::Null) => " AND stable_id IS NULL",
			(None, _) => " AND stable_id = ?",
			(Some(_), FilterValue::Null) => " AND json_extract(data, ?) IS NULL",
			(Some(_), _) => " AND json_extract(data, ?) = ?",
		}
	}

	fn bind<'q, O>(
		&self,
		mut q: sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
	) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
		if let Some(path) = &self.path {
			q = q.bind(path.clone());
		}
		match &self.value {
			FilterValue::Text(s) => q.bind(s.clone()),
			FilterValue::Integer(i) => q.bind(*i),
			FilterValue::Real(r) => q.bind(*r),
			FilterValue::Null => q,
		}
	}
}

fn json_path(field: &str) -> Result<String> {
	let valid = !field.is_empty()
		&& field.split('.').all(|segment| {
			!segment.is_empty()
				&& segment
					.chars()
					.all(|c| c.is_ascii_alphanumeric() || c == '_')
		});
	if !valid {
		return Err(DbError::Internal(format!("invalid filter field: {field}")));
	}
	Ok(format!("$.{field}"))
}

fn now_string() -> String {
	Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid stored timestamp '{value}': {e}")))
}

fn row_to_document(
	(id, data, created_at, updated_at): (String, String, String, String),
) -> Result<Document> {
	let data: Fields = serde_json::from_str(&data)?;
	Ok(Document {
		id: RecordId::new(id),
		data,
		created_at: parse_timestamp(&created_at)?,
		updated_at: parse_timestamp(&updated_at)?,
	})
}

fn map_write_error(e: sqlx::Error, collection: Collection, stable_id: Option<&str>) -> DbError {
	if let sqlx::Error::Database(db_err) = &e {
		if db_err.is_unique_violation() {
			return DbError::Conflict(format!(
				"{collection} already has a record with stableId {}",
				stable_id.unwrap_or("<none>")
			));
		}
	}
	DbError::Sqlx(e)
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
	#[tracing::instrument(skip(self, query), fields(%collection, page = query.page, limit = query.limit))]
	async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Page> {
		let filter = SqlFilter::from_query(query)?;
		let clause = filter.as_ref().map(SqlFilter::clause).unwrap_or("");

		let count_sql = format!("SELECT COUNT(*) FROM documents WHERE collection = ?{clause}");
		let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(collection.as_str());
		if let Some(f) = &filter {
			count_query = f.bind(count_query);
		}
		let (total,) = count_query.fetch_one(&self.pool).await?;

		let select_sql = format!(
			"SELECT id, data, created_at, updated_at FROM documents WHERE collection = ?{clause} \
			 ORDER BY created_at, id LIMIT ? OFFSET ?"
		);
		let mut select =
			sqlx::query_as::<_, (String, String, String, String)>(&select_sql).bind(collection.as_str());
		if let Some(f) = &filter {
			select = f.bind(select);
		}
		let rows = select
			.bind(i64::from(query.limit))
			.bind(query.offset())
			.fetch_all(&self.pool)
			.await?;

		let docs = rows
			.into_iter()
			.map(row_to_document)
			.collect::<Result<Vec<_>>>()?;
		let total_docs = u64::try_from(total).unwrap_or_default();
		let seen = u64::try_from(query.offset()).unwrap_or_default() + docs.len() as u64;

		Ok(Page {
			docs,
			total_docs,
			page: query.page,
			has_next_page: seen < total_docs,
		})
	}

	#[tracing::instrument(skip(self), fields(%collection, %id))]
	async fn find_by_id(&self, collection: Collection, id: &RecordId) -> Result<Option<Document>> {
		let row = sqlx::query_as::<_, (String, String, String, String)>(
			"SELECT id, data, created_at, updated_at FROM documents WHERE collection = ? AND id = ?",
		)
		.bind(collection.as_str())
		.bind(id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(row_to_document).transpose()
	}

	#[tracing::instrument(skip(self, data, ctx), fields(%collection))]
	async fn create(
		&self,
		collection: Collection,
		data: Fields,
		ctx: &OperationContext,
	) -> Result<Document> {
		let id = RecordId::generate();
		let now = now_string();
		let stable_id = stable_id_of(&data).map(str::to_string);
		let body = serde_json::to_string(&data)?;

		sqlx::query(
			r#"
			INSERT INTO documents (id, collection, stable_id, data, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(id.as_str())
		.bind(collection.as_str())
		.bind(stable_id.as_deref())
		.bind(&body)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await
		.map_err(|e| map_write_error(e, collection, stable_id.as_deref()))?;

		tracing::debug!(%collection, %id, stable_id = ?stable_id, "record created");
		self.notify(ctx, collection, &id, ChangeKind::Created).await;

		let timestamp = parse_timestamp(&now)?;
		Ok(Document {
			id,
			data,
			created_at: timestamp,
			updated_at: timestamp,
		})
	}

	#[tracing::instrument(skip(self, data, ctx), fields(%collection, %id))]
	async fn update(
		&self,
		collection: Collection,
		id: &RecordId,
		data: Fields,
		ctx: &OperationContext,
	) -> Result<Document> {
		let now = now_string();
		let stable_id = stable_id_of(&data).map(str::to_string);
		let body = serde_json::to_string(&data)?;

		let result = sqlx::query(
			r#"
			UPDATE documents SET stable_id = ?, data = ?, updated_at = ?
			WHERE collection = ? AND id = ?
			"#,
		)
		.bind(stable_id.as_deref())
		.bind(&body)
		.bind(&now)
		.bind(collection.as_str())
		.bind(id.as_str())
		.execute(&self.pool)
		.await
		.map_err(|e| map_write_error(e, collection, stable_id.as_deref()))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("{collection}/{id}")));
		}

		self.notify(ctx, collection, id, ChangeKind::Updated).await;

		self.find_by_id(collection, id)
			.await?
			.ok_or_else(|| DbError::NotFound(format!("{collection}/{id}")))
	}

	#[tracing::instrument(skip(self, ctx), fields(%collection, %id, cascade = ctx.cascade.as_str()))]
	async fn delete(
		&self,
		collection: Collection,
		id: &RecordId,
		ctx: &OperationContext,
	) -> Result<bool> {
		let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
			.bind(collection.as_str())
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			self.notify(ctx, collection, id, ChangeKind::Deleted).await;
		}
		Ok(deleted)
	}

	#[tracing::instrument(skip(self), fields(%collection))]
	async fn count(&self, collection: Collection) -> Result<u64> {
		let (count,): (i64,) =
			sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
				.bind(collection.as_str())
				.fetch_one(&self.pool)
				.await?;
		Ok(u64::try_from(count).unwrap_or_default())
	}
}
