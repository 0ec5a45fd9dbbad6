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

//! Path helpers operating on the literal bytes of a path.
//! `.` and `..` components are not collapsed.

pub const SEPARATOR: char = '/';

// Find the parent of a directory entry.
// parent("/etc/passwd") => "/etc", parent("/a") => "/".
// A path with no separator has no parent.
pub fn parent(path: &str) -> Option<&str> {
    let idx = path.rfind(SEPARATOR)?;
    if idx == 0 {
        Some("/")
    } else {
        Some(&path[..idx])
    }
}

// Find the basename of a directory entry.
// basename("/etc/passwd") => "passwd"; a path with no separator is its
// own basename.
pub fn basename(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        None => path,
        Some(idx) => &path[idx + 1..],
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::path::{basename, parent};

    #[test]
    fn parent_of_root() {
        assert_eq!(parent("/"), Some("/"));
    }

    #[test]
    fn parent_strips_last_component() {
        assert_eq!(parent("/etc/passwd"), Some("/etc"));
        assert_eq!(parent("/a/b/c"), Some("/a/b"));
        assert_eq!(parent("/a"), Some("/"));
    }

    #[test]
    fn parent_without_separator() {
        assert_eq!(parent("steve"), None);
        assert_eq!(parent(""), None);
    }

    #[test]
    fn basename_cases() {
        assert_eq!(basename("/etc/passwd"), "passwd");
        assert_eq!(basename("./steve"), "steve");
        assert_eq!(basename("/a////steve"), "steve");
        assert_eq!(basename("steve"), "steve");
    }
}
