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

use crate::fs::{FileKind, FsContext, InodeAttr, RedisFileSystem};
use crate::session::NodeMap;
use crate::{err_fuse, FuseResult, FS_BLOCK_SIZE, ROOT_INODE};
use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, ReplyWrite, Request, TimeOrNow,
    FUSE_ROOT_ID,
};
use redisfs_common::common::LocalTime;
use redisfs_store::Store;
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const TTL: Duration = Duration::from_secs(1);

// Bridges kernel callbacks onto the path-based semantic layer.
// The kernel speaks in inode ids; the node map turns them back into
// the absolute paths every handler resolves from scratch.
pub struct RedisFuse<S: Store> {
    fs: RedisFileSystem<S>,
    nodes: NodeMap,
}

impl<S: Store> RedisFuse<S> {
    pub fn new(fs: RedisFileSystem<S>) -> Self {
        Self {
            fs,
            nodes: NodeMap::new(),
        }
    }

    fn ctx(req: &Request<'_>) -> FsContext {
        FsContext {
            uid: req.uid(),
            gid: req.gid(),
        }
    }

    // Store inode numbers start at 1, which is the kernel's root id;
    // shift them by one to keep the two spaces apart.
    fn fuse_ino(inode: i64) -> u64 {
        if inode == ROOT_INODE {
            FUSE_ROOT_ID
        } else {
            inode as u64 + 1
        }
    }

    fn to_time(secs: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
    }

    fn to_file_attr(attr: &InodeAttr) -> FileAttr {
        let kind = match attr.kind {
            FileKind::File => FileType::RegularFile,
            FileKind::Dir => FileType::Directory,
            FileKind::Link => FileType::Symlink,
        };

        FileAttr {
            ino: Self::fuse_ino(attr.inode),
            size: attr.size,
            blocks: attr.size.div_ceil(FS_BLOCK_SIZE),
            atime: Self::to_time(attr.atime),
            mtime: Self::to_time(attr.mtime),
            ctime: Self::to_time(attr.ctime),
            crtime: Self::to_time(attr.ctime),
            kind,
            perm: (attr.mode & 0o7777) as u16,
            nlink: attr.nlink,
            uid: attr.uid,
            gid: attr.gid,
            rdev: 0,
            blksize: FS_BLOCK_SIZE as u32,
            flags: 0,
        }
    }

    fn name_str(name: &OsStr) -> FuseResult<&str> {
        match name.to_str() {
            Some(v) => Ok(v),
            None => err_fuse!(libc::EINVAL, "name is not valid utf-8"),
        }
    }

    fn time_secs(time: Option<TimeOrNow>, current: i64, now: i64) -> i64 {
        match time {
            None => current,
            Some(TimeOrNow::Now) => now,
            Some(TimeOrNow::SpecificTime(v)) => v
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0),
        }
    }

    // Resolve a named child and remember its place in the tree.
    fn lookup_entry(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
    ) -> FuseResult<FileAttr> {
        let name = Self::name_str(name)?;
        let path = self.nodes.get_path_name(parent, name)?;
        let attr = self.fs.getattr(&path, &Self::ctx(req))?;

        let ino = Self::fuse_ino(attr.inode);
        self.nodes.insert(ino, parent, name);
        Ok(Self::to_file_attr(&attr))
    }
}

impl<S: Store> Filesystem for RedisFuse<S> {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), libc::c_int> {
        Ok(())
    }

    fn lookup(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self.lookup_entry(req, parent, name) {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn getattr(&mut self, req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        let res = (|| {
            let path = self.nodes.get_path(ino)?;
            self.fs.getattr(&path, &Self::ctx(req))
        })();

        match res {
            Ok(attr) => reply.attr(&TTL, &Self::to_file_attr(&attr)),
            Err(e) => reply.error(e.errno()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn setattr(
        &mut self,
        req: &Request<'_>,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let res = (|| {
            let path = self.nodes.get_path(ino)?;
            let ctx = Self::ctx(req);

            if let Some(mode) = mode {
                self.fs.chmod(&path, mode)?;
            }
            if uid.is_some() || gid.is_some() {
                let cur = self.fs.getattr(&path, &ctx)?;
                self.fs
                    .chown(&path, uid.unwrap_or(cur.uid), gid.unwrap_or(cur.gid))?;
            }
            if let Some(size) = size {
                self.fs.truncate(&path, size)?;
            }
            if atime.is_some() || mtime.is_some() {
                let cur = self.fs.getattr(&path, &ctx)?;
                let now = LocalTime::unix_secs();
                let atime = Self::time_secs(atime, cur.atime, now);
                let mtime = Self::time_secs(mtime, cur.mtime, now);
                self.fs.utimens(&path, atime, mtime)?;
            }

            self.fs.getattr(&path, &ctx)
        })();

        match res {
            Ok(attr) => reply.attr(&TTL, &Self::to_file_attr(&attr)),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        let res = (|| {
            let path = self.nodes.get_path(ino)?;
            self.fs.readlink(&path)
        })();

        match res {
            Ok(target) => reply.data(&target),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn mkdir(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let res: FuseResult<_> = (|| {
            let name = Self::name_str(name)?;
            let path = self.nodes.get_path_name(parent, name)?;
            let attr = self.fs.mkdir(&path, mode, &Self::ctx(req))?;

            let ino = Self::fuse_ino(attr.inode);
            self.nodes.insert(ino, parent, name);
            Ok(Self::to_file_attr(&attr))
        })();

        match res {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn create(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        let res: FuseResult<_> = (|| {
            let name = Self::name_str(name)?;
            let path = self.nodes.get_path_name(parent, name)?;
            let attr = self.fs.create(&path, mode, &Self::ctx(req))?;

            let ino = Self::fuse_ino(attr.inode);
            self.nodes.insert(ino, parent, name);
            Ok(Self::to_file_attr(&attr))
        })();

        match res {
            Ok(attr) => reply.created(&TTL, &attr, 0, 0, 0),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn symlink(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        link_name: &OsStr,
        target: &Path,
        reply: ReplyEntry,
    ) {
        let res = (|| {
            let name = Self::name_str(link_name)?;
            let target = match target.to_str() {
                Some(v) => v,
                None => return err_fuse!(libc::EINVAL, "link target is not valid utf-8"),
            };
            let path = self.nodes.get_path_name(parent, name)?;
            let attr = self.fs.symlink(target, &path, &Self::ctx(req))?;

            let ino = Self::fuse_ino(attr.inode);
            self.nodes.insert(ino, parent, name);
            Ok(Self::to_file_attr(&attr))
        })();

        match res {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let res: FuseResult<_> = (|| {
            let name = Self::name_str(name)?;
            let path = self.nodes.get_path_name(parent, name)?;
            self.fs.unlink(&path)?;
            self.nodes.remove(parent, name);
            Ok(())
        })();

        match res {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let res: FuseResult<_> = (|| {
            let name = Self::name_str(name)?;
            let path = self.nodes.get_path_name(parent, name)?;
            self.fs.rmdir(&path)?;
            self.nodes.remove(parent, name);
            Ok(())
        })();

        match res {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        let res: FuseResult<_> = (|| {
            let name = Self::name_str(name)?;
            let newname = Self::name_str(newname)?;
            let old = self.nodes.get_path_name(parent, name)?;
            let new = self.nodes.get_path_name(newparent, newname)?;

            self.fs.rename(&old, &new)?;
            self.nodes.rename(parent, name, newparent, newname);
            Ok(())
        })();

        match res {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        let res = (|| {
            let path = self.nodes.get_path(ino)?;
            self.fs.open(&path)
        })();

        match res {
            Ok(()) => reply.opened(0, 0),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let res = (|| {
            if offset < 0 {
                return err_fuse!(libc::EINVAL, "negative read offset {}", offset);
            }
            let path = self.nodes.get_path(ino)?;
            self.fs.read(&path, offset as u64, size)
        })();

        match res {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(e.errno()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let res = (|| {
            if offset < 0 {
                return err_fuse!(libc::EINVAL, "negative write offset {}", offset);
            }
            let path = self.nodes.get_path(ino)?;
            self.fs.write(&path, offset as u64, data)
        })();

        match res {
            Ok(written) => reply.written(written),
            Err(e) => reply.error(e.errno()),
        }
    }

    fn flush(&mut self, _req: &Request<'_>, _ino: u64, _fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        // Writes reach the store before the handler returns.
        reply.ok();
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let res = (|| {
            let path = self.nodes.get_path(ino)?;
            self.fs.readdir(&path)
        })();

        let entries = match res {
            Ok(v) => v,
            Err(e) => return reply.error(e.errno()),
        };

        for (i, entry) in entries.iter().enumerate().skip(offset.max(0) as usize) {
            let entry_ino = if entry.inode == 0 {
                ino
            } else {
                Self::fuse_ino(entry.inode)
            };
            let kind = match entry.kind {
                FileKind::File => FileType::RegularFile,
                FileKind::Dir => FileType::Directory,
                FileKind::Link => FileType::Symlink,
            };

            if reply.add(entry_ino, (i + 1) as i64, kind, &entry.name) {
                break;
            }
        }
        reply.ok();
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, _mask: i32, reply: ReplyEmpty) {
        let res = (|| {
            let path = self.nodes.get_path(ino)?;
            self.fs.access(&path)
        })();

        match res {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.errno()),
        }
    }
}
