// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-call context threaded through every store write.

/// Marks a deletion that is already part of a linked-record cascade.
///
/// Lifecycle handlers exit early on anything other than `None`, so the
/// identity/profile/provider triangle cannot re-trigger itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadeContext {
	#[default]
	None,
	CascadingFromProfile,
	CascadingFromIdentity,
}

impl CascadeContext {
	pub fn as_str(&self) -> &'static str {
		match self {
			CascadeContext::None => "none",
			CascadeContext::CascadingFromProfile => "cascading_from_profile",
			CascadeContext::CascadingFromIdentity => "cascading_from_identity",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationContext {
	pub cascade: CascadeContext,
	/// Skip consumer-facing side effects such as cache revalidation.
	pub suppress_side_effects: bool,
	/// Create an identity without its default role profile. Set when the
	/// profile row itself is driving the creation.
	pub skip_profile_provisioning: bool,
}

impl OperationContext {
	/// A regular, human-initiated write.
	pub fn interactive() -> Self {
		Self::default()
	}

	/// A trusted automation write that must not notify consumers.
	pub fn seeding() -> Self {
		Self {
			suppress_side_effects: true,
			..Self::default()
		}
	}

	pub fn with_cascade(mut self, cascade: CascadeContext) -> Self {
		self.cascade = cascade;
		self
	}

	pub fn without_profile_provisioning(mut self) -> Self {
		self.skip_profile_provisioning = true;
		self
	}

	pub fn is_cascading(&self) -> bool {
		self.cascade != CascadeContext::None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_interactive_defaults() {
		let ctx = OperationContext::interactive();
		assert!(!ctx.is_cascading());
		assert!(!ctx.suppress_side_effects);
		assert!(!ctx.skip_profile_provisioning);
	}

	#[test]
	fn test_cascade_keeps_side_effect_flag() {
		let ctx = OperationContext::seeding().with_cascade(CascadeContext::CascadingFromProfile);
		assert!(ctx.is_cascading());
		assert!(ctx.suppress_side_effects);
		assert_eq!(ctx.cascade.as_str(), "cascading_from_profile");
	}
}
