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

use crate::fs::FsContext;
use crate::ROOT_INODE;

// The object kind, immutable after creation.
// The strings are the persisted TYPE attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Link,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::File => "FILE",
            FileKind::Dir => "DIR",
            FileKind::Link => "LINK",
        }
    }

    pub fn from_bytes(value: &[u8]) -> Option<FileKind> {
        match value {
            b"FILE" => Some(FileKind::File),
            b"DIR" => Some(FileKind::Dir),
            b"LINK" => Some(FileKind::Link),
            _ => None,
        }
    }
}

// The stat-shaped view of one inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeAttr {
    pub inode: i64,
    pub kind: FileKind,
    // Permission bits; the file type bits are synthesized from `kind`.
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: i64,
    pub ctime: i64,
    pub mtime: i64,
    pub nlink: u32,
}

impl InodeAttr {
    pub fn new(inode: i64, kind: FileKind) -> Self {
        Self {
            inode,
            kind,
            mode: 0,
            uid: 0,
            gid: 0,
            size: 0,
            atime: 0,
            ctime: 0,
            mtime: 0,
            nlink: 1,
        }
    }

    // The root is never materialized; its attributes are synthesized
    // with the caller's credential.
    pub fn root(ctx: &FsContext, now: i64) -> Self {
        Self {
            inode: ROOT_INODE,
            kind: FileKind::Dir,
            mode: 0o755,
            uid: ctx.uid,
            gid: ctx.gid,
            size: 0,
            atime: now,
            ctime: now,
            mtime: now,
            nlink: 1,
        }
    }
}

// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: i64,
    pub name: String,
    pub kind: FileKind,
}

impl DirEntry {
    // "." and ".." carry no resolved inode.
    pub fn dot(name: &str) -> Self {
        Self {
            inode: 0,
            name: name.to_string(),
            kind: FileKind::Dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::attr::FileKind;

    #[test]
    fn kind_strings() {
        assert_eq!(FileKind::File.as_str(), "FILE");
        assert_eq!(FileKind::from_bytes(b"DIR"), Some(FileKind::Dir));
        assert_eq!(FileKind::from_bytes(b"dir"), None);
    }
}
