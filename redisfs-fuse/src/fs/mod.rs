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

mod attr;
pub use self::attr::{DirEntry, FileKind, InodeAttr};

mod redis_file_system;
pub use self::redis_file_system::RedisFileSystem;

// The credential of the calling process, as delivered by the kernel
// bridge with each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsContext {
    pub uid: u32,
    pub gid: u32,
}
