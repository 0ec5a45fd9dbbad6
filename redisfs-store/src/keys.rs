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

//! The persisted key layout. The textual form is part of the external
//! interface: the snapshot tool and operator tooling rely on it.
//!
//! For a file "/etc/passwd" with inode 6 and prefix "skx":
//!
//! skx:INODE:6:NAME  => "passwd"
//! skx:INODE:6:TYPE  => "FILE"
//! skx:DIRENT:5      => set of child inode numbers of directory 5
//! skx:GLOBAL:INODE  => the inode allocation counter

// Per-inode attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attr {
    Name,
    Type,
    Mode,
    Uid,
    Gid,
    Size,
    Atime,
    Ctime,
    Mtime,
    Link,
    Target,
    Data,
}

impl Attr {
    pub const ALL: [Attr; 12] = [
        Attr::Name,
        Attr::Type,
        Attr::Mode,
        Attr::Uid,
        Attr::Gid,
        Attr::Size,
        Attr::Atime,
        Attr::Ctime,
        Attr::Mtime,
        Attr::Link,
        Attr::Target,
        Attr::Data,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attr::Name => "NAME",
            Attr::Type => "TYPE",
            Attr::Mode => "MODE",
            Attr::Uid => "UID",
            Attr::Gid => "GID",
            Attr::Size => "SIZE",
            Attr::Atime => "ATIME",
            Attr::Ctime => "CTIME",
            Attr::Mtime => "MTIME",
            Attr::Link => "LINK",
            Attr::Target => "TARGET",
            Attr::Data => "DATA",
        }
    }
}

// Maps (prefix, inode, attribute) to key names.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    pub fn new<T: Into<String>>(prefix: T) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // Attribute key for one inode.
    pub fn attr(&self, inode: i64, attr: Attr) -> String {
        format!("{}:INODE:{}:{}", self.prefix, inode, attr.as_str())
    }

    // The directory entry set of a directory inode.
    pub fn dirent(&self, inode: i64) -> String {
        format!("{}:DIRENT:{}", self.prefix, inode)
    }

    // The global inode allocation counter.
    pub fn counter(&self) -> String {
        format!("{}:GLOBAL:INODE", self.prefix)
    }

    // Wildcard matching every key of this filesystem.
    pub fn match_pattern(&self) -> String {
        format!("{}*", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Attr, KeyCodec};

    #[test]
    fn key_layout() {
        let keys = KeyCodec::new("skx");
        assert_eq!(keys.attr(6, Attr::Name), "skx:INODE:6:NAME");
        assert_eq!(keys.attr(6, Attr::Target), "skx:INODE:6:TARGET");
        assert_eq!(keys.attr(-99, Attr::Type), "skx:INODE:-99:TYPE");
        assert_eq!(keys.dirent(43), "skx:DIRENT:43");
        assert_eq!(keys.dirent(-99), "skx:DIRENT:-99");
        assert_eq!(keys.counter(), "skx:GLOBAL:INODE");
        assert_eq!(keys.match_pattern(), "skx*");
    }

    #[test]
    fn all_attrs_distinct() {
        let keys = KeyCodec::new("p");
        let mut names: Vec<_> = Attr::ALL.iter().map(|a| keys.attr(1, *a)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 12);
    }
}
