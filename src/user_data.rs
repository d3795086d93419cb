//! User-data resolution for new instances.
//!
//! User data can be provided inline or via a file path. The file wins when
//! both are set, matching how build templates override inline defaults.
//! Non-empty payloads are base64 encoded because the API only accepts the
//! encoded form.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Errors raised while resolving user data.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum UserDataError {
    /// Raised when reading the file source fails.
    #[error("failed to read user data file `{path}`: {message}")]
    FileRead {
        /// Path that failed to read.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

/// Resolves user data from either an inline value or a file and encodes it.
///
/// Returns `None` when the resolved payload is empty, so no user data field
/// is sent.
///
/// # Errors
///
/// Returns [`UserDataError::FileRead`] when the file cannot be read.
pub fn resolve_user_data(
    inline: Option<&str>,
    file: Option<&Utf8Path>,
) -> Result<Option<String>, UserDataError> {
    let payload = match file.filter(|path| !path.as_str().is_empty()) {
        Some(path) => read_to_string_ambient(path).map_err(|message| UserDataError::FileRead {
            path: path.to_string(),
            message,
        })?,
        None => inline.unwrap_or_default().to_owned(),
    };

    if payload.is_empty() {
        return Ok(None);
    }
    Ok(Some(STANDARD.encode(payload.as_bytes())))
}

fn read_to_string_ambient(path: &Utf8Path) -> Result<String, String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("path has no file name: {path}"))?;
    let dir_path = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };

    let dir =
        Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(|err| err.to_string())?;
    dir.read_to_string(file_name).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    fn write_temp(content: &str) -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("user-data.sh"))
            .expect("tempdir path should be utf-8");
        std::fs::write(&path, content).expect("write user data");
        (dir, path)
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn empty_inline_yields_none(#[case] inline: Option<&str>) {
        assert_eq!(resolve_user_data(inline, None), Ok(None));
    }

    #[rstest]
    fn inline_payload_is_base64_encoded() {
        let encoded = resolve_user_data(Some("#!/bin/sh\necho hi\n"), None)
            .expect("inline should resolve");
        assert_eq!(encoded.as_deref(), Some("IyEvYmluL3NoCmVjaG8gaGkK"));
    }

    #[rstest]
    fn file_takes_precedence_over_inline() {
        let (_dir, path) = write_temp("from-file");
        let encoded =
            resolve_user_data(Some("inline"), Some(path.as_path())).expect("file should resolve");
        assert_eq!(encoded, Some(STANDARD.encode("from-file")));
    }

    #[rstest]
    fn empty_file_yields_none_even_with_inline() {
        let (_dir, path) = write_temp("");
        assert_eq!(resolve_user_data(Some("inline"), Some(path.as_path())), Ok(None));
    }

    #[rstest]
    fn empty_path_falls_back_to_inline() {
        let encoded = resolve_user_data(Some("inline"), Some(Utf8Path::new("")))
            .expect("inline should resolve");
        assert_eq!(encoded, Some(STANDARD.encode("inline")));
    }

    #[rstest]
    fn missing_file_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent"))
            .expect("tempdir path should be utf-8");
        let err = resolve_user_data(None, Some(path.as_path())).expect_err("read should fail");
        let UserDataError::FileRead { path: reported, .. } = err;
        assert_eq!(reported, path.as_str());
    }
}
