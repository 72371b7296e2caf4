// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::Value;

use crate::document::Document;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Equality match on a (possibly dotted) field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
	pub field: String,
	pub equals: Value,
}

/// A paginated find. Pages are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
	pub filter: Option<FieldFilter>,
	pub limit: u32,
	pub page: u32,
}

impl Default for FindQuery {
	fn default() -> Self {
		Self {
			filter: None,
			limit: DEFAULT_PAGE_LIMIT,
			page: 1,
		}
	}
}

impl FindQuery {
	pub fn all() -> Self {
		Self::default()
	}

	pub fn where_equals(field: impl Into<String>, equals: impl Into<Value>) -> Self {
		Self {
			filter: Some(FieldFilter {
				field: field.into(),
				equals: equals.into(),
			}),
			..Self::default()
		}
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = limit.max(1);
		self
	}

	pub fn page(mut self, page: u32) -> Self {
		self.page = page.max(1);
		self
	}

	pub(crate) fn offset(&self) -> i64 {
		i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
	pub docs: Vec<Document>,
	pub total_docs: u64,
	pub page: u32,
	pub has_next_page: bool,
}

impl Page {
	pub fn first(self) -> Option<Document> {
		self.docs.into_iter().next()
	}
}
