// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loading secrets from the environment with the `VAR` / `VAR_FILE`
//! convention used by Docker and Kubernetes secret mounts.

use std::path::PathBuf;
use std::{env, fs};

use thiserror::Error;

use crate::Secret;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load a secret from `{var}_FILE` (preferred) or `{var}`.
///
/// A single trailing newline is stripped from file contents. Empty values
/// are treated as unset.
pub fn load_secret_env(var: &str) -> Result<Option<Secret<String>>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| SecretEnvError::Io {
			path: path.clone(),
			source: e,
		})?;
		let value = content.strip_suffix('\n').unwrap_or(&content);
		if value.is_empty() {
			return Ok(None);
		}
		return Ok(Some(Secret::new(value.to_string())));
	}

	match env::var(var) {
		Ok(value) if !value.is_empty() => Ok(Some(Secret::new(value))),
		_ => Ok(None),
	}
}

/// Load a comma- or newline-separated list of secrets, e.g. operator tokens.
///
/// Blank entries are dropped. Returns an empty list when unset.
pub fn load_secret_list_env(var: &str) -> Result<Vec<Secret<String>>, SecretEnvError> {
	let Some(raw) = load_secret_env(var)? else {
		return Ok(Vec::new());
	};

	Ok(raw
		.expose()
		.split([',', '\n'])
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(|s| Secret::new(s.to_string()))
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn unset_var_yields_none() {
		let loaded = load_secret_env("FINDMYDOC_TEST_SECRET_UNSET").unwrap();
		assert!(loaded.is_none());
	}

	#[test]
	fn direct_value_is_loaded() {
		env::set_var("FINDMYDOC_TEST_SECRET_DIRECT", "direct-value");
		let loaded = load_secret_env("FINDMYDOC_TEST_SECRET_DIRECT").unwrap();
		assert_eq!(loaded.unwrap().expose(), "direct-value");
		env::remove_var("FINDMYDOC_TEST_SECRET_DIRECT");
	}

	#[test]
	fn file_takes_precedence_and_strips_newline() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		env::set_var("FINDMYDOC_TEST_SECRET_BOTH", "from-env");
		env::set_var("FINDMYDOC_TEST_SECRET_BOTH_FILE", file.path());
		let loaded = load_secret_env("FINDMYDOC_TEST_SECRET_BOTH").unwrap();
		assert_eq!(loaded.unwrap().expose(), "from-file");
		env::remove_var("FINDMYDOC_TEST_SECRET_BOTH");
		env::remove_var("FINDMYDOC_TEST_SECRET_BOTH_FILE");
	}

	#[test]
	fn empty_file_path_is_an_error() {
		env::set_var("FINDMYDOC_TEST_SECRET_EMPTY_FILE", "");
		let result = load_secret_env("FINDMYDOC_TEST_SECRET_EMPTY");
		assert!(matches!(result, Err(SecretEnvError::EmptyPath { .. })));
		env::remove_var("FINDMYDOC_TEST_SECRET_EMPTY_FILE");
	}

	#[test]
	fn missing_file_is_an_io_error() {
		env::set_var(
			"FINDMYDOC_TEST_SECRET_MISSING_FILE",
			"/nonexistent/findmydoc/secret",
		);
		let result = load_secret_env("FINDMYDOC_TEST_SECRET_MISSING");
		assert!(matches!(result, Err(SecretEnvError::Io { .. })));
		env::remove_var("FINDMYDOC_TEST_SECRET_MISSING_FILE");
	}

	#[test]
	fn list_splits_and_drops_blanks() {
		env::set_var("FINDMYDOC_TEST_SECRET_LIST", "alpha, beta,,\ngamma ");
		let tokens = load_secret_list_env("FINDMYDOC_TEST_SECRET_LIST").unwrap();
		let exposed: Vec<&str> = tokens.iter().map(|t| t.expose().as_str()).collect();
		assert_eq!(exposed, vec!["alpha", "beta", "gamma"]);
		env::remove_var("FINDMYDOC_TEST_SECRET_LIST");
	}

	#[test]
	fn unset_list_is_empty() {
		let tokens = load_secret_list_env("FINDMYDOC_TEST_SECRET_LIST_UNSET").unwrap();
		assert!(tokens.is_empty());
	}
}
