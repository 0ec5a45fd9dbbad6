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

use crate::FsError;
use crate::FsResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Mount point and filesystem behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConf {
    // The directory the filesystem is mounted under.
    pub mnt_path: String,

    // Refuse every mutating operation.
    pub read_only: bool,

    // Skip atime updates and the mtime update on appending writes.
    pub fast: bool,

    pub pid_file: String,

    // Mount options passed to the kernel, e.g. "allow_other".
    pub fuse_opts: Vec<String>,
}

impl MountConf {
    pub const DEFAULT_MNT_PATH: &'static str = "/mnt/redis";

    pub const DEFAULT_PID_FILE: &'static str = "/var/run/redisfs.pid";

    // The mount point must already exist and be a directory.
    pub fn check_mnt(&self) -> FsResult<PathBuf> {
        let path = PathBuf::from(&self.mnt_path);
        if !path.is_dir() {
            let msg = format!("{} doesn't exist or isn't a directory", self.mnt_path);
            return Err(FsError::invalid_path(&self.mnt_path, msg));
        }

        let path = path.canonicalize()?;
        Ok(path)
    }
}

impl Default for MountConf {
    fn default() -> Self {
        Self {
            mnt_path: Self::DEFAULT_MNT_PATH.to_string(),
            read_only: false,
            fast: false,
            pid_file: Self::DEFAULT_PID_FILE.to_string(),
            fuse_opts: vec!["allow_other".to_string()],
        }
    }
}
