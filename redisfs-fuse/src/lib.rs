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

pub mod fs;
pub mod macros;
pub mod session;

mod fuse_error;
pub use self::fuse_error::FuseError;

pub type FuseResult<T> = Result<T, FuseError>;

pub const FS_NAME: &str = "redisfs";

// The root directory is a sentinel inode, never materialized in the store.
pub const ROOT_INODE: i64 = -99;

pub const FS_CURRENT_DIR: &str = ".";

pub const FS_PARENT_DIR: &str = "..";

pub const FS_BLOCK_SIZE: u64 = 512;
