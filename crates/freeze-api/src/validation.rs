//! Request validation

use std::path::{Component, Path};
use thiserror::Error;

use crate::{Source, Version};

/// Malformed or invalid request envelope
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Unable to decode request: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("source.{0} must not be empty")]
    MissingField(&'static str),

    #[error("source.path '{0}' must be a relative file path inside the repository")]
    InvalidPath(String),

    #[error("source.branch '{0}' is not a valid branch name")]
    InvalidBranch(String),

    #[error("version.sha '{0}' is not a valid revision")]
    InvalidRevision(String),

    #[error("{value:?} is not a valid mode, valid ones are {valid}")]
    InvalidMode { value: String, valid: String },
}

pub type RequestResult<T> = Result<T, RequestError>;

impl Source {
    /// Check the required fields and reject values that could be mistaken
    /// for command-line options by the source transport
    pub fn validate(&self) -> RequestResult<()> {
        if self.uri.trim().is_empty() {
            return Err(RequestError::MissingField("uri"));
        }

        if self.path.trim().is_empty() {
            return Err(RequestError::MissingField("path"));
        }
        validate_path(&self.path)?;

        if let Some(branch) = &self.branch {
            validate_branch(branch)?;
        }

        Ok(())
    }
}

impl Version {
    pub fn validate(&self) -> RequestResult<()> {
        let sha = self.sha.as_str();
        if sha.is_empty() || sha.starts_with('-') || sha.contains(char::is_whitespace) {
            return Err(RequestError::InvalidRevision(sha.to_string()));
        }
        Ok(())
    }
}

fn validate_path(path: &str) -> RequestResult<()> {
    let invalid = || RequestError::InvalidPath(path.to_string());

    if path.ends_with('/') {
        return Err(invalid());
    }

    let mut has_file = false;
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => {
                return Err(invalid());
            }
        }
    }

    if has_file { Ok(()) } else { Err(invalid()) }
}

fn validate_branch(branch: &str) -> RequestResult<()> {
    let invalid = || RequestError::InvalidBranch(branch.to_string());

    if branch.is_empty()
        || branch.starts_with('-')
        || branch.contains("..")
        || branch.contains(|c: char| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
    {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(uri: &str, path: &str) -> Source {
        Source {
            uri: uri.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_source_fails() {
        let err = Source::default().validate().unwrap_err();
        assert!(matches!(err, RequestError::MissingField("uri")));
    }

    #[test]
    fn missing_path_fails() {
        let err = source("git@github.com:example/calendar", "").validate().unwrap_err();
        assert!(matches!(err, RequestError::MissingField("path")));
        assert_eq!(err.to_string(), "source.path must not be empty");
    }

    #[test]
    fn minimal_source_is_valid() {
        let src = source("git@github.com:example/calendar", "foo/bar/something.else");
        assert!(src.validate().is_ok());

        let src = source("https://example.org/calendar.git", "./calendar.yaml");
        assert!(src.validate().is_ok());
    }

    #[test]
    fn paths_escaping_the_repository_are_rejected() {
        for path in ["/etc/passwd", "../calendar.yaml", "a/../../b.yaml", "dir/", "."] {
            let err = source("https://example.org/c.git", path).validate().unwrap_err();
            assert!(matches!(err, RequestError::InvalidPath(_)), "{}", path);
        }
    }

    #[test]
    fn option_like_branches_are_rejected() {
        for branch in ["", "--upload-pack=evil", "a..b", "with space", "tip^"] {
            let src = Source {
                branch: Some(branch.into()),
                ..source("https://example.org/c.git", "calendar.yaml")
            };
            assert!(
                matches!(src.validate(), Err(RequestError::InvalidBranch(_))),
                "{}",
                branch
            );
        }

        let src = Source {
            branch: Some("release/2023-q4".into()),
            ..source("https://example.org/c.git", "calendar.yaml")
        };
        assert!(src.validate().is_ok());
    }

    #[test]
    fn version_validation() {
        assert!(Version::new("3f1c2ab9").validate().is_ok());
        assert!(Version::new("").validate().is_err());
        assert!(Version::new("--all").validate().is_err());
        assert!(Version::new("abc def").validate().is_err());
    }
}
