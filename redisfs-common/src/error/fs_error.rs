// Copyright 2025 OPPO.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use thiserror::Error;

// Uniformly defined file system errors.
#[derive(Debug, Error)]
pub enum FsError {
    // io error.
    #[error("{0}")]
    IO(#[from] io::Error),

    // The file does not exist.
    #[error("{0}")]
    FileNotFound(String),

    // The file already exists.
    #[error("{0}")]
    FileAlreadyExists(String),

    // The directory is not empty.
    #[error("{0}")]
    DirNotEmpty(String),

    // The upper file is not a directory.
    #[error("{0}")]
    ParentNotDir(String),

    // The filesystem was mounted read-only.
    #[error("filesystem is read-only")]
    ReadOnly,

    // The path is incorrect.
    #[error("{0}")]
    InvalidPath(String),

    // The backing store rejected or failed a command.
    #[error("{0}")]
    Store(String),

    // The store returned a reply of an unexpected shape.
    #[error("{0}")]
    BadReply(String),

    #[error("{0}")]
    Unsupported(String),

    // Other errors that are not defined.
    #[error("{0}")]
    Common(String),
}

impl FsError {
    pub fn common<T: AsRef<str>>(error: T) -> Self {
        Self::Common(error.as_ref().to_string())
    }

    pub fn file_not_found(path: impl AsRef<str>) -> Self {
        let msg = format!("File {} not found", path.as_ref());
        Self::FileNotFound(msg)
    }

    pub fn file_exists(path: impl AsRef<str>) -> Self {
        let msg = format!("File {} already exists", path.as_ref());
        Self::FileAlreadyExists(msg)
    }

    pub fn dir_not_empty(path: impl AsRef<str>) -> Self {
        let msg = format!("Directory {} is not empty", path.as_ref());
        Self::DirNotEmpty(msg)
    }

    pub fn parent_not_dir(path: impl AsRef<str>) -> Self {
        let msg = format!("Parent of {} is not a directory", path.as_ref());
        Self::ParentNotDir(msg)
    }

    pub fn invalid_path(path: impl AsRef<str>, ext_msg: impl AsRef<str>) -> Self {
        let msg = format!("Path {} is invalid, {}", path.as_ref(), ext_msg.as_ref());
        Self::InvalidPath(msg)
    }

    pub fn store(error: impl ToString) -> Self {
        Self::Store(error.to_string())
    }

    pub fn bad_reply(error: impl ToString) -> Self {
        Self::BadReply(error.to_string())
    }

    pub fn unsupported<T: Into<String>>(feature: T) -> Self {
        let msg = format!("{} is not supported", feature.into());
        Self::Unsupported(msg)
    }
}

impl From<String> for FsError {
    fn from(value: String) -> Self {
        FsError::Common(value)
    }
}

impl From<&str> for FsError {
    fn from(value: &str) -> Self {
        FsError::Common(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::FsError;

    #[test]
    fn error_kinds() {
        let error = FsError::file_not_found("/a/b");
        assert!(matches!(error, FsError::FileNotFound(_)));
        assert_eq!(error.to_string(), "File /a/b not found");

        let error = FsError::ReadOnly;
        assert_eq!(error.to_string(), "filesystem is read-only");
    }
}
