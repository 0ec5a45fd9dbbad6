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

use redisfs_common::FsError;
use std::fmt;

// An error carrying the POSIX status returned to the kernel bridge.
#[derive(Debug)]
pub struct FuseError {
    pub(crate) errno: i32,
    pub(crate) error: FsError,
}

impl FuseError {
    pub fn new(errno: i32, error: FsError) -> Self {
        Self { errno, error }
    }

    pub fn errno(&self) -> i32 {
        self.errno
    }
}

impl std::error::Error for FuseError {}

impl fmt::Display for FuseError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "errno {}: {}", self.errno, self.error)
    }
}

impl From<String> for FuseError {
    fn from(value: String) -> Self {
        Self::new(libc::EIO, value.into())
    }
}

impl From<&str> for FuseError {
    fn from(value: &str) -> Self {
        Self::new(libc::EIO, value.into())
    }
}

impl From<FsError> for FuseError {
    fn from(value: FsError) -> Self {
        // Map well-known error kinds directly to POSIX errno
        let errno = match &value {
            FsError::FileNotFound(_) => libc::ENOENT,
            FsError::FileAlreadyExists(_) => libc::EEXIST,
            FsError::DirNotEmpty(_) => libc::ENOTEMPTY,
            FsError::ParentNotDir(_) => libc::ENOTDIR,
            FsError::ReadOnly => libc::EPERM,
            FsError::InvalidPath(_) => libc::EINVAL,
            FsError::Unsupported(_) => libc::ENOSYS,

            // Store failures and everything undefined surface as an IO error.
            _ => libc::EIO,
        };

        Self::new(errno, value)
    }
}
