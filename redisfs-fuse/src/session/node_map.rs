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

use crate::{err_fuse, FuseResult};
use fuser::FUSE_ROOT_ID;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
struct Node {
    id: u64,
    parent: u64,
    name: String,
}

// Records where each fuse inode sits in the tree, so that request
// handlers can rebuild the absolute path the semantic layer works on.
pub struct NodeMap {
    nodes: HashMap<u64, Node>,
    names: HashMap<String, u64>,
}

impl NodeMap {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            FUSE_ROOT_ID,
            Node {
                id: FUSE_ROOT_ID,
                parent: FUSE_ROOT_ID,
                name: String::new(),
            },
        );
        Self {
            nodes,
            names: HashMap::new(),
        }
    }

    fn name_key(parent: u64, name: &str) -> String {
        format!("{}{}", parent, name)
    }

    fn get_check(&self, id: u64) -> FuseResult<&Node> {
        match self.nodes.get(&id) {
            None => err_fuse!(libc::ENOENT, "inode {} not exists", id),
            Some(v) => Ok(v),
        }
    }

    // Rebuild the absolute path of an inode by walking its parents.
    pub fn get_path(&self, id: u64) -> FuseResult<String> {
        self.path_common(id, None)
    }

    // The absolute path of a named entry beneath a parent inode.
    pub fn get_path_name(&self, parent: u64, name: &str) -> FuseResult<String> {
        self.path_common(parent, Some(name))
    }

    fn path_common(&self, parent: u64, name: Option<&str>) -> FuseResult<String> {
        let mut parts = VecDeque::new();
        if let Some(v) = name {
            parts.push_front(v);
        }

        let mut node = self.get_check(parent)?;
        while node.id != FUSE_ROOT_ID {
            parts.push_front(node.name.as_str());
            node = self.get_check(node.parent)?;
        }

        Ok(Self::join_path(&parts))
    }

    fn join_path(parts: &VecDeque<&str>) -> String {
        let total_len = parts.iter().map(|x| x.len()).sum::<usize>() + parts.len();
        let mut s = String::with_capacity(total_len.max(1));

        s.push('/');
        for (index, item) in parts.iter().enumerate() {
            if index != 0 {
                s.push('/');
            }
            s.push_str(item)
        }
        s
    }

    pub fn insert(&mut self, id: u64, parent: u64, name: &str) {
        // Drop any stale placement of this inode first.
        if let Some(old) = self.nodes.remove(&id) {
            self.names.remove(&Self::name_key(old.parent, &old.name));
        }

        self.names.insert(Self::name_key(parent, name), id);
        self.nodes.insert(
            id,
            Node {
                id,
                parent,
                name: name.to_string(),
            },
        );
    }

    pub fn remove(&mut self, parent: u64, name: &str) {
        if let Some(id) = self.names.remove(&Self::name_key(parent, name)) {
            self.nodes.remove(&id);
        }
    }

    // Move an entry, dropping any node it replaces.
    pub fn rename(&mut self, parent: u64, name: &str, new_parent: u64, new_name: &str) {
        self.remove(new_parent, new_name);

        if let Some(id) = self.names.remove(&Self::name_key(parent, name)) {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = new_parent;
                node.name = new_name.to_string();
            }
            self.names.insert(Self::name_key(new_parent, new_name), id);
        }
    }
}

impl Default for NodeMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::session::NodeMap;
    use fuser::FUSE_ROOT_ID;

    #[test]
    fn path_reconstruction() {
        let mut nodes = NodeMap::new();
        nodes.insert(10, FUSE_ROOT_ID, "etc");
        nodes.insert(11, 10, "passwd");

        assert_eq!(nodes.get_path(FUSE_ROOT_ID).unwrap(), "/");
        assert_eq!(nodes.get_path(10).unwrap(), "/etc");
        assert_eq!(nodes.get_path(11).unwrap(), "/etc/passwd");
        assert_eq!(nodes.get_path_name(10, "group").unwrap(), "/etc/group");
    }

    #[test]
    fn rename_moves_children() {
        let mut nodes = NodeMap::new();
        nodes.insert(10, FUSE_ROOT_ID, "foo");
        nodes.insert(11, 10, "bar");
        nodes.insert(12, 11, "baz");

        nodes.rename(10, "bar", FUSE_ROOT_ID, "steve");
        assert_eq!(nodes.get_path(11).unwrap(), "/steve");
        assert_eq!(nodes.get_path(12).unwrap(), "/steve/baz");
    }

    #[test]
    fn remove_forgets_entry() {
        let mut nodes = NodeMap::new();
        nodes.insert(10, FUSE_ROOT_ID, "a");
        nodes.remove(FUSE_ROOT_ID, "a");
        assert!(nodes.get_path(10).is_err());
    }
}
