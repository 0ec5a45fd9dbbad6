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

use crate::fs::{DirEntry, FileKind, FsContext, InodeAttr};
use crate::{err_fuse, FuseResult, FS_CURRENT_DIR, FS_PARENT_DIR, ROOT_INODE};
use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use redisfs_common::common::LocalTime;
use redisfs_common::conf::FsConf;
use redisfs_common::fs::path;
use redisfs_common::FsError;
use redisfs_store::{Attr, Command, KeyCodec, Reply, Store};

// The filesystem semantic layer.
//
// Every inode attribute is one store key and every directory is a set
// of child inode numbers; path lookup is a recursive membership join
// from the root sentinel. The store mutex is the process-wide
// serialization lock: each handler holds it from entry to return, so
// operations are sequentially consistent with each other and the guard
// scope releases it on every exit path.
//
// There is no multi-key atomicity. A crash mid-handler leaves whatever
// partial state the store accepted; snapshots are the durability tool.
pub struct RedisFileSystem<S: Store> {
    store: Mutex<S>,
    keys: KeyCodec,
    read_only: bool,
    fast: bool,
}

impl<S: Store> RedisFileSystem<S> {
    // The batched attribute fetches; each reply slot is mapped back to
    // the attribute it was asked for, by name.
    const TIME_ATTRS: [Attr; 6] = [
        Attr::Ctime,
        Attr::Atime,
        Attr::Mtime,
        Attr::Gid,
        Attr::Uid,
        Attr::Link,
    ];

    const STAT_ATTRS: [Attr; 3] = [Attr::Type, Attr::Mode, Attr::Size];

    pub fn new(store: S, conf: &FsConf) -> Self {
        Self {
            store: Mutex::new(store),
            keys: KeyCodec::new(conf.store.prefix.clone()),
            read_only: conf.mount.read_only,
            fast: conf.mount.fast,
        }
    }

    // Direct access to the underlying store, taking the global lock.
    pub fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock()
    }

    fn lock_alive(&self) -> FuseResult<MutexGuard<'_, S>> {
        let mut store = self.store.lock();
        store.ensure_alive()?;
        Ok(store)
    }

    fn check_writable(&self) -> FuseResult<()> {
        if self.read_only {
            Err(FsError::ReadOnly.into())
        } else {
            Ok(())
        }
    }

    // Split a path into its parent and entry name.
    fn split(p: &str) -> FuseResult<(&str, &str)> {
        let name = path::basename(p);
        match path::parent(p) {
            Some(parent) if !name.is_empty() => Ok((parent, name)),
            _ => Err(FsError::invalid_path(p, "missing parent component").into()),
        }
    }

    // The members of a directory entry set, as inode numbers.
    fn dir_children(store: &mut S, keys: &KeyCodec, inode: i64) -> FuseResult<Vec<i64>> {
        let reply = store.run(Command::SMembers(keys.dirent(inode)))?;
        let members = reply.into_array().unwrap_or_default();
        Ok(members.iter().filter_map(Reply::as_i64).collect())
    }

    // One batched fetch of the NAME attribute of every child.
    fn child_names(
        store: &mut S,
        keys: &KeyCodec,
        children: &[i64],
    ) -> FuseResult<Vec<Option<Vec<u8>>>> {
        if children.is_empty() {
            return Ok(Vec::new());
        }

        let name_keys = children
            .iter()
            .map(|c| keys.attr(*c, Attr::Name))
            .collect();
        let reply = store.run(Command::MGet(name_keys))?;

        let mut names: Vec<Option<Vec<u8>>> = reply
            .into_array()
            .unwrap_or_default()
            .into_iter()
            .map(Reply::into_bytes)
            .collect();
        names.resize_with(children.len(), || None);
        Ok(names)
    }

    // Find the inode of the entry with this name in a directory.
    // Names within a directory are unique, the first match wins.
    fn lookup_child(
        store: &mut S,
        keys: &KeyCodec,
        parent: i64,
        name: &str,
    ) -> FuseResult<Option<i64>> {
        let children = Self::dir_children(store, keys, parent)?;
        let names = Self::child_names(store, keys, &children)?;

        for (child, child_name) in children.iter().zip(names.iter()) {
            if child_name.as_deref() == Some(name.as_bytes()) {
                return Ok(Some(*child));
            }
        }
        Ok(None)
    }

    // Find the inode for a filesystem entry, by recursive descent from
    // the root. Each level costs one set fetch plus one batched name
    // fetch over the siblings.
    fn resolve(store: &mut S, keys: &KeyCodec, p: &str) -> FuseResult<Option<i64>> {
        if p == "/" {
            return Ok(Some(ROOT_INODE));
        }

        let parent = match path::parent(p) {
            Some(v) => v,
            None => return Err(FsError::invalid_path(p, "not an absolute path").into()),
        };

        let parent_inode = match Self::resolve(store, keys, parent)? {
            Some(v) => v,
            None => return Ok(None),
        };

        Self::lookup_child(store, keys, parent_inode, path::basename(p))
    }

    fn resolve_check(store: &mut S, keys: &KeyCodec, p: &str) -> FuseResult<i64> {
        match Self::resolve(store, keys, p)? {
            Some(v) => Ok(v),
            None => Err(FsError::file_not_found(p).into()),
        }
    }

    // Allocate the next inode number from the global counter.
    // Numbers are monotone and never reused.
    fn next_inode(store: &mut S, keys: &KeyCodec) -> FuseResult<i64> {
        let reply = store.run(Command::Incr(keys.counter()))?;
        match reply.as_i64() {
            Some(v) => Ok(v),
            None => {
                Err(FsError::bad_reply(format!("inode counter returned {:?}", reply)).into())
            }
        }
    }

    fn read_kind(store: &mut S, keys: &KeyCodec, inode: i64) -> FuseResult<Option<FileKind>> {
        if inode == ROOT_INODE {
            return Ok(Some(FileKind::Dir));
        }
        let reply = store.run(Command::Get(keys.attr(inode, Attr::Type)))?;
        Ok(reply.as_bytes().and_then(FileKind::from_bytes))
    }

    fn read_size(store: &mut S, keys: &KeyCodec, inode: i64) -> FuseResult<u64> {
        let reply = store.run(Command::Get(keys.attr(inode, Attr::Size)))?;
        Ok(reply.as_i64().unwrap_or(0).max(0) as u64)
    }

    // Read the attribute block of one inode. A malformed or missing
    // value reads as absent so that a partially written inode stays
    // visible for recovery.
    fn read_attr(store: &mut S, keys: &KeyCodec, inode: i64) -> FuseResult<InodeAttr> {
        let times = Self::TIME_ATTRS
            .iter()
            .map(|a| keys.attr(inode, *a))
            .collect();
        let stats = Self::STAT_ATTRS
            .iter()
            .map(|a| keys.attr(inode, *a))
            .collect();

        let mut replies = store.run_batch(vec![Command::MGet(times), Command::MGet(stats)])?;
        let stat_replies = replies.pop().and_then(Reply::into_array).unwrap_or_default();
        let time_replies = replies.pop().and_then(Reply::into_array).unwrap_or_default();

        let slot = |replies: &[Reply], attrs: &[Attr], attr: Attr| -> Option<i64> {
            let idx = attrs.iter().position(|a| *a == attr)?;
            replies.get(idx)?.as_i64()
        };

        let mut attr = InodeAttr::new(inode, FileKind::File);
        attr.ctime = slot(&time_replies, &Self::TIME_ATTRS, Attr::Ctime).unwrap_or(0);
        attr.atime = slot(&time_replies, &Self::TIME_ATTRS, Attr::Atime).unwrap_or(0);
        attr.mtime = slot(&time_replies, &Self::TIME_ATTRS, Attr::Mtime).unwrap_or(0);
        attr.gid = slot(&time_replies, &Self::TIME_ATTRS, Attr::Gid).unwrap_or(0) as u32;
        attr.uid = slot(&time_replies, &Self::TIME_ATTRS, Attr::Uid).unwrap_or(0) as u32;
        attr.nlink = slot(&time_replies, &Self::TIME_ATTRS, Attr::Link).unwrap_or(1) as u32;
        attr.mode = slot(&stat_replies, &Self::STAT_ATTRS, Attr::Mode).unwrap_or(0) as u32;
        attr.size = slot(&stat_replies, &Self::STAT_ATTRS, Attr::Size).unwrap_or(0) as u64;

        let kind = Self::STAT_ATTRS
            .iter()
            .position(|a| *a == Attr::Type)
            .and_then(|idx| stat_replies.get(idx))
            .and_then(Reply::as_bytes)
            .and_then(FileKind::from_bytes);

        match kind {
            Some(FileKind::Dir) => {
                attr.kind = FileKind::Dir;
                attr.size = 0;
            }
            Some(FileKind::Link) => {
                attr.kind = FileKind::Link;
                attr.nlink = 1;
                attr.size = 0;
            }
            Some(FileKind::File) => attr.kind = FileKind::File,
            None => {
                warn!("inode {} has an unknown type, treating it as a file", inode);
            }
        }

        Ok(attr)
    }

    // Add the new entry to the parent directory and populate the
    // attribute block, pipelined as one batch.
    fn write_new_inode(
        store: &mut S,
        keys: &KeyCodec,
        parent: i64,
        name: &str,
        attr: &InodeAttr,
        target: Option<&[u8]>,
    ) -> FuseResult<()> {
        let inode = attr.inode;
        let mut pairs = vec![
            (keys.attr(inode, Attr::Name), name.as_bytes().to_vec()),
            (
                keys.attr(inode, Attr::Type),
                attr.kind.as_str().as_bytes().to_vec(),
            ),
            (
                keys.attr(inode, Attr::Mode),
                attr.mode.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Uid),
                attr.uid.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Gid),
                attr.gid.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Size),
                attr.size.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Ctime),
                attr.ctime.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Mtime),
                attr.mtime.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Atime),
                attr.atime.to_string().into_bytes(),
            ),
            (
                keys.attr(inode, Attr::Link),
                attr.nlink.to_string().into_bytes(),
            ),
        ];
        if let Some(target) = target {
            pairs.push((keys.attr(inode, Attr::Target), target.to_vec()));
        }

        store.run_batch(vec![
            Command::SAdd(keys.dirent(parent), inode.to_string()),
            Command::MSet(pairs),
        ])?;
        Ok(())
    }

    // Shared creation path of create, mkdir and symlink.
    fn create_node(
        &self,
        store: &mut S,
        p: &str,
        kind: FileKind,
        mode: u32,
        ctx: &FsContext,
        target: Option<&[u8]>,
    ) -> FuseResult<InodeAttr> {
        let (parent, name) = Self::split(p)?;

        let parent_inode = match Self::resolve(store, &self.keys, parent)? {
            Some(v) => v,
            None => return Err(FsError::file_not_found(parent).into()),
        };
        match Self::read_kind(store, &self.keys, parent_inode)? {
            Some(FileKind::Dir) => (),
            _ => return Err(FsError::parent_not_dir(p).into()),
        }

        // Names within a directory are unique.
        if Self::lookup_child(store, &self.keys, parent_inode, name)?.is_some() {
            return Err(FsError::file_exists(p).into());
        }

        let inode = Self::next_inode(store, &self.keys)?;
        let now = LocalTime::unix_secs();

        let mut attr = InodeAttr::new(inode, kind);
        attr.mode = mode;
        attr.uid = ctx.uid;
        attr.gid = ctx.gid;
        attr.atime = now;
        attr.ctime = now;
        attr.mtime = now;

        Self::write_new_inode(store, &self.keys, parent_inode, name, &attr, target)?;
        Ok(attr)
    }

    // Remove the directory membership and erase every attribute key,
    // pipelined as one batch.
    fn remove_entry(store: &mut S, keys: &KeyCodec, parent: i64, inode: i64) -> FuseResult<()> {
        let mut cmds = Vec::with_capacity(1 + Attr::ALL.len());
        cmds.push(Command::SRem(keys.dirent(parent), inode.to_string()));
        for attr in Attr::ALL {
            cmds.push(Command::Del(vec![keys.attr(inode, attr)]));
        }
        store.run_batch(cmds)?;
        Ok(())
    }

    // Get the attributes of a filesystem entry.
    pub fn getattr(&self, p: &str, ctx: &FsContext) -> FuseResult<InodeAttr> {
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("getattr({})", p);

        // The root is a special case, it has no stored attributes.
        if p == "/" {
            return Ok(InodeAttr::root(ctx, LocalTime::unix_secs()));
        }

        let inode = Self::resolve_check(store, &self.keys, p)?;
        Self::read_attr(store, &self.keys, inode)
    }

    // List a directory. "." and ".." always exist, even when the path
    // itself does not resolve.
    pub fn readdir(&self, p: &str) -> FuseResult<Vec<DirEntry>> {
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("readdir({})", p);

        let mut entries = vec![DirEntry::dot(FS_CURRENT_DIR), DirEntry::dot(FS_PARENT_DIR)];
        let inode = match Self::resolve(store, &self.keys, p)? {
            Some(v) => v,
            None => return Ok(entries),
        };

        let children = Self::dir_children(store, &self.keys, inode)?;
        if children.is_empty() {
            return Ok(entries);
        }

        let name_keys = children
            .iter()
            .map(|c| self.keys.attr(*c, Attr::Name))
            .collect();
        let type_keys = children
            .iter()
            .map(|c| self.keys.attr(*c, Attr::Type))
            .collect();
        let mut replies =
            store.run_batch(vec![Command::MGet(name_keys), Command::MGet(type_keys)])?;
        let types = replies.pop().and_then(Reply::into_array).unwrap_or_default();
        let names = replies.pop().and_then(Reply::into_array).unwrap_or_default();

        for (i, child) in children.iter().enumerate() {
            let name = match names.get(i).and_then(|r| r.as_bytes()) {
                Some(v) => String::from_utf8_lossy(v).into_owned(),
                // A member without a NAME key is a torn creation; skip it.
                None => continue,
            };
            let kind = types
                .get(i)
                .and_then(|r| r.as_bytes())
                .and_then(FileKind::from_bytes)
                .unwrap_or(FileKind::File);

            entries.push(DirEntry {
                inode: *child,
                name,
                kind,
            });
        }

        Ok(entries)
    }

    // Create a new file with the specified mode.
    pub fn create(&self, p: &str, mode: u32, ctx: &FsContext) -> FuseResult<InodeAttr> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("create({})", p);

        self.create_node(store, p, FileKind::File, mode, ctx, None)
    }

    // Make a directory.
    pub fn mkdir(&self, p: &str, mode: u32, ctx: &FsContext) -> FuseResult<InodeAttr> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("mkdir({})", p);

        self.create_node(store, p, FileKind::Dir, mode, ctx, None)
    }

    // Create a symlink at `p` resolving to `target`.
    pub fn symlink(&self, target: &str, p: &str, ctx: &FsContext) -> FuseResult<InodeAttr> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("symlink({} -> {})", target, p);

        self.create_node(
            store,
            p,
            FileKind::Link,
            0o444,
            ctx,
            Some(target.as_bytes()),
        )
    }

    // Read the target of a symlink.
    pub fn readlink(&self, p: &str) -> FuseResult<Vec<u8>> {
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("readlink({})", p);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        let reply = store.run(Command::Get(self.keys.attr(inode, Attr::Target)))?;
        match reply.into_bytes() {
            Some(v) => Ok(v),
            None => Err(FsError::FileNotFound(format!("File {} has no link target", p)).into()),
        }
    }

    // Remove a file or symlink. Directories are routed through rmdir
    // by the kernel bridge, this does not distinguish.
    pub fn unlink(&self, p: &str) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("unlink({})", p);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        let (parent, _) = Self::split(p)?;
        let parent_inode = Self::resolve_check(store, &self.keys, parent)?;

        Self::remove_entry(store, &self.keys, parent_inode, inode)
    }

    // Remove an empty directory.
    pub fn rmdir(&self, p: &str) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("rmdir({})", p);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        match Self::read_kind(store, &self.keys, inode)? {
            Some(FileKind::Dir) => (),
            // Reported as a missing entry, not ENOTDIR.
            _ => return err_fuse!(libc::ENOENT, "{} is not a directory", p),
        }
        if !Self::dir_children(store, &self.keys, inode)?.is_empty() {
            return Err(FsError::dir_not_empty(p).into());
        }

        let (parent, _) = Self::split(p)?;
        let parent_inode = Self::resolve_check(store, &self.keys, parent)?;

        Self::remove_entry(store, &self.keys, parent_inode, inode)
    }

    // Rename a directory entry, replacing any existing destination the
    // way rename(2) does. Only the entry's NAME and the two parent
    // sets change; descendant paths keep resolving through their
    // unchanged directory sets.
    pub fn rename(&self, old: &str, new: &str) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("rename({} -> {})", old, new);

        let inode = Self::resolve_check(store, &self.keys, old)?;
        let (old_parent, _) = Self::split(old)?;
        let (new_parent, new_name) = Self::split(new)?;

        let old_parent_inode = Self::resolve_check(store, &self.keys, old_parent)?;
        let new_parent_inode = match Self::resolve(store, &self.keys, new_parent)? {
            Some(v) => v,
            None => return Err(FsError::file_not_found(new_parent).into()),
        };
        match Self::read_kind(store, &self.keys, new_parent_inode)? {
            Some(FileKind::Dir) => (),
            _ => return Err(FsError::parent_not_dir(new).into()),
        }

        if let Some(dst) = Self::lookup_child(store, &self.keys, new_parent_inode, new_name)? {
            if dst == inode {
                return Ok(());
            }
            if Self::read_kind(store, &self.keys, dst)? == Some(FileKind::Dir)
                && !Self::dir_children(store, &self.keys, dst)?.is_empty()
            {
                return Err(FsError::dir_not_empty(new).into());
            }
            Self::remove_entry(store, &self.keys, new_parent_inode, dst)?;
        }

        store.run_batch(vec![
            Command::Set(
                self.keys.attr(inode, Attr::Name),
                new_name.as_bytes().to_vec(),
            ),
            Command::SRem(self.keys.dirent(old_parent_inode), inode.to_string()),
            Command::SAdd(self.keys.dirent(new_parent_inode), inode.to_string()),
        ])?;
        Ok(())
    }

    // Change the permission(s) of a file/directory.
    pub fn chmod(&self, p: &str, mode: u32) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("chmod({})", p);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        let now = LocalTime::unix_secs();
        store.run(Command::MSet(vec![
            (self.keys.attr(inode, Attr::Mode), mode.to_string().into_bytes()),
            (self.keys.attr(inode, Attr::Mtime), now.to_string().into_bytes()),
        ]))?;
        Ok(())
    }

    // Change the owner of a file/directory.
    pub fn chown(&self, p: &str, uid: u32, gid: u32) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("chown({})", p);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        let now = LocalTime::unix_secs();
        store.run(Command::MSet(vec![
            (self.keys.attr(inode, Attr::Uid), uid.to_string().into_bytes()),
            (self.keys.attr(inode, Attr::Gid), gid.to_string().into_bytes()),
            (self.keys.attr(inode, Attr::Mtime), now.to_string().into_bytes()),
        ]))?;
        Ok(())
    }

    // Set the access and modification times, in seconds.
    pub fn utimens(&self, p: &str, atime: i64, mtime: i64) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("utimens({})", p);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        store.run(Command::MSet(vec![
            (
                self.keys.attr(inode, Attr::Atime),
                atime.to_string().into_bytes(),
            ),
            (
                self.keys.attr(inode, Attr::Mtime),
                mtime.to_string().into_bytes(),
            ),
        ]))?;
        Ok(())
    }

    // Open only refreshes the access time; permission enforcement is
    // the kernel's job. A missing path is not an error here.
    pub fn open(&self, p: &str) -> FuseResult<()> {
        if self.fast {
            return Ok(());
        }

        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("open({})", p);

        // The root carries no attribute keys.
        if p == "/" {
            return Ok(());
        }
        let inode = match Self::resolve(store, &self.keys, p)? {
            Some(v) => v,
            None => return Ok(()),
        };

        let now = LocalTime::unix_secs();
        store.run(Command::Set(
            self.keys.attr(inode, Attr::Atime),
            now.to_string().into_bytes(),
        ))?;
        Ok(())
    }

    pub fn access(&self, p: &str) -> FuseResult<()> {
        self.open(p)
    }

    // Read from a file. The request is clamped against the stored size
    // and the byte range is fetched with a range read.
    pub fn read(&self, p: &str, offset: u64, size: u32) -> FuseResult<Vec<u8>> {
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("read({}, offset={}, size={})", p, offset, size);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        let file_size = Self::read_size(store, &self.keys, inode)?;

        if offset >= file_size {
            return Ok(Vec::new());
        }
        let mut size = size as u64;
        if size > file_size {
            size = file_size;
        }
        if offset + size > file_size {
            size = file_size - offset;
        }
        if size == 0 {
            return Ok(Vec::new());
        }

        let reply = store.run(Command::GetRange(
            self.keys.attr(inode, Attr::Data),
            offset,
            offset + size - 1,
        ))?;
        let mut data = reply.into_bytes().unwrap_or_default();
        data.truncate(size as usize);
        Ok(data)
    }

    // Write to a file at an offset. An append grows the size counter
    // atomically; anything else overwrites in place, zero padding any
    // gap past the current end.
    pub fn write(&self, p: &str, offset: u64, data: &[u8]) -> FuseResult<u32> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("write({}, offset={}, len={})", p, offset, data.len());

        let inode = Self::resolve_check(store, &self.keys, p)?;
        if data.is_empty() {
            return Ok(0);
        }

        let old_size = Self::read_size(store, &self.keys, inode)?;
        let now = LocalTime::unix_secs();
        // --fast skips the mtime update on appending writes.
        let stamp_mtime = !(self.fast && offset > 0);

        let mut cmds = if offset == old_size {
            vec![
                Command::IncrBy(self.keys.attr(inode, Attr::Size), data.len() as i64),
                Command::Append(self.keys.attr(inode, Attr::Data), data.to_vec()),
            ]
        } else {
            let new_size = old_size.max(offset + data.len() as u64);
            vec![
                Command::SetRange(self.keys.attr(inode, Attr::Data), offset, data.to_vec()),
                Command::Set(
                    self.keys.attr(inode, Attr::Size),
                    new_size.to_string().into_bytes(),
                ),
            ]
        };
        if stamp_mtime {
            cmds.push(Command::Set(
                self.keys.attr(inode, Attr::Mtime),
                now.to_string().into_bytes(),
            ));
        }

        store.run_batch(cmds)?;
        Ok(data.len() as u32)
    }

    // Truncate a file to the requested size.
    pub fn truncate(&self, p: &str, new_size: u64) -> FuseResult<()> {
        self.check_writable()?;
        let mut store = self.lock_alive()?;
        let store = &mut *store;
        debug!("truncate({}, {})", p, new_size);

        let inode = Self::resolve_check(store, &self.keys, p)?;
        if Self::read_kind(store, &self.keys, inode)? == Some(FileKind::Dir) {
            // Reported as a missing entry, not EISDIR.
            return err_fuse!(libc::ENOENT, "{} is a directory", p);
        }

        let old_size = Self::read_size(store, &self.keys, inode)?;
        let now = LocalTime::unix_secs();
        let data_key = self.keys.attr(inode, Attr::Data);

        let mut cmds = Vec::new();
        if new_size == 0 {
            cmds.push(Command::Del(vec![data_key]));
        } else if new_size < old_size {
            let reply = store.run(Command::GetRange(data_key.clone(), 0, new_size - 1))?;
            let kept = reply.into_bytes().unwrap_or_default();
            cmds.push(Command::Set(data_key, kept));
        } else if new_size > old_size {
            // Writing one byte at the last position zero fills the gap.
            cmds.push(Command::SetRange(data_key, new_size - 1, vec![0]));
        }
        cmds.push(Command::MSet(vec![
            (
                self.keys.attr(inode, Attr::Size),
                new_size.to_string().into_bytes(),
            ),
            (
                self.keys.attr(inode, Attr::Mtime),
                now.to_string().into_bytes(),
            ),
        ]));

        store.run_batch(cmds)?;
        Ok(())
    }
}
