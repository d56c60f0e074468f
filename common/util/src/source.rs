use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

// FUTURE maybe this should be a url?
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash
)]
pub enum Source {
    File(PathBuf),
    Directory(PathBuf),
    Url(String),
}

impl FromStr for Source {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Source::File(PathBuf::from(s)))
    }
}

impl Source {
    pub fn try_from_file_path(path: PathBuf) -> Result<Source, SourceError> {
        if !path.exists() {
            return Err(SourceError::PathDoesNotExist(path));
        }
        if !path.is_file() {
            return Err(SourceError::PathIsNotAFile(path));
        }
        Ok(Source::File(path))
    }

    pub fn try_from_directory_path(path: PathBuf) -> Result<Source, SourceError> {
        if !path.exists() {
            return Err(SourceError::PathDoesNotExist(path));
        }
        if !path.is_dir() {
            return Err(SourceError::PathIsNotADirectory(path));
        }
        Ok(Source::Directory(path))
    }

    pub fn path(&self) -> Result<PathBuf, SourceError> {
        match self {
            Source::File(path) => Ok(path.clone()),
            Source::Directory(path) => Ok(path.clone()),
            Source::Url(_) => Err(SourceError::NotAPath),
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) | Source::Directory(path) => f.write_str(path.display().to_string().as_str()),
            Source::Url(url) => f.write_str(url.as_str()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Path does not exist. path: {0}")]
    PathDoesNotExist(PathBuf),
    #[error("Path is not a file. path: {0}")]
    PathIsNotAFile(PathBuf),
    #[error("Path is not a directory. path: {0}")]
    PathIsNotADirectory(PathBuf),
    #[error("Source is not a path.")]
    NotAPath,
}
