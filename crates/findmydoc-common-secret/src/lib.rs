// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret values for findmydoc configuration.
//!
//! [`Secret<T>`] holds service keys and operator tokens. Its Debug and
//! Display output is always `[REDACTED]`, the wrapped value is zeroized on
//! drop, and reading it requires an explicit [`Secret::expose`] call.
//!
//! ```
//! use findmydoc_common_secret::Secret;
//!
//! let key = Secret::new("service-role-key".to_string());
//! assert_eq!(format!("{key}"), "[REDACTED]");
//! assert_eq!(key.expose(), "service-role-key");
//! ```

pub mod env;

use std::fmt;

use zeroize::Zeroize;

pub use env::{load_secret_env, load_secret_list_env, SecretEnvError};

/// Placeholder printed instead of any secret value.
pub const REDACTED: &str = "[REDACTED]";

#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value. Call sites opt in to seeing the secret.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_are_redacted() {
		let secret = SecretString::from("sb-service-key");
		assert_eq!(format!("{secret:?}"), "Secret(\"[REDACTED]\")");
		assert_eq!(format!("{secret}"), "[REDACTED]");
	}

	#[test]
	fn expose_returns_inner_value() {
		let secret = SecretString::from("operator-token");
		assert_eq!(secret.expose(), "operator-token");
		assert_eq!(secret.clone(), secret);
	}

	proptest! {
		#[test]
		fn formatting_never_leaks(value in "[a-zA-Z0-9]{8,64}") {
			prop_assume!(value != "REDACTED");
			let secret = SecretString::from(value.clone());
			let debug = format!("{:?}", secret);
			let display = format!("{}", secret);
			prop_assert!(!debug.contains(&value));
			prop_assert!(!display.contains(&value));
		}
	}
}
