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

use redisfs_common::conf::FsConf;
use redisfs_fuse::fs::{FileKind, FsContext, RedisFileSystem};
use redisfs_fuse::FuseResult;
use redisfs_store::{Command, MemStore, Store};

fn new_fs() -> RedisFileSystem<MemStore> {
    RedisFileSystem::new(MemStore::new(), &FsConf::default())
}

fn read_only_fs() -> RedisFileSystem<MemStore> {
    let mut conf = FsConf::default();
    conf.mount.read_only = true;
    RedisFileSystem::new(MemStore::new(), &conf)
}

fn ctx() -> FsContext {
    FsContext {
        uid: 1000,
        gid: 1000,
    }
}

// Every key of the filesystem namespace, via the store itself.
fn key_count(fs: &RedisFileSystem<MemStore>) -> usize {
    let mut store = fs.store();
    let reply = store.run(Command::Keys("skx*".to_string())).unwrap();
    reply.into_array().map(|v| v.len()).unwrap_or(0)
}

#[test]
fn getattr_root() -> FuseResult<()> {
    let fs = new_fs();
    let attr = fs.getattr("/", &ctx())?;

    assert_eq!(attr.kind, FileKind::Dir);
    assert_eq!(attr.mode, 0o755);
    assert_eq!(attr.nlink, 1);
    assert_eq!(attr.uid, 1000);
    assert_eq!(attr.gid, 1000);
    Ok(())
}

#[test]
fn create_then_getattr() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/a.txt", 0o644, &ctx())?;

    let attr = fs.getattr("/a.txt", &ctx())?;
    assert_eq!(attr.kind, FileKind::File);
    assert_eq!(attr.mode & 0o7777, 0o644);
    assert_eq!(attr.size, 0);
    assert_eq!(attr.uid, 1000);
    assert_eq!(attr.gid, 1000);
    assert_eq!(attr.nlink, 1);
    assert!(attr.ctime > 0);
    Ok(())
}

#[test]
fn getattr_missing() {
    let fs = new_fs();
    let err = fs.getattr("/nope", &ctx()).unwrap_err();
    assert_eq!(err.errno(), libc::ENOENT);
}

#[test]
fn mkdir_then_readdir() -> FuseResult<()> {
    let fs = new_fs();
    fs.mkdir("/dir", 0o755, &ctx())?;

    let entries = fs.readdir("/")?;
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names.iter().filter(|n| **n == "dir").count(), 1);
    assert!(names.contains(&"."));
    assert!(names.contains(&".."));

    let dir = entries.iter().find(|e| e.name == "dir").unwrap();
    assert_eq!(dir.kind, FileKind::Dir);
    Ok(())
}

#[test]
fn readdir_of_missing_path_keeps_dots() -> FuseResult<()> {
    let fs = new_fs();
    let entries = fs.readdir("/nope")?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, ".");
    assert_eq!(entries[1].name, "..");
    Ok(())
}

#[test]
fn symlink_then_readlink() -> FuseResult<()> {
    let fs = new_fs();
    fs.symlink("/etc/passwd", "/link", &ctx())?;

    let target = fs.readlink("/link")?;
    assert_eq!(target, b"/etc/passwd".to_vec());

    let attr = fs.getattr("/link", &ctx())?;
    assert_eq!(attr.kind, FileKind::Link);
    assert_eq!(attr.mode & 0o7777, 0o444);
    assert_eq!(attr.size, 0);
    assert_eq!(attr.nlink, 1);
    Ok(())
}

#[test]
fn readlink_of_file_fails() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/a", 0o644, &ctx())?;
    let err = fs.readlink("/a").unwrap_err();
    assert_eq!(err.errno(), libc::ENOENT);
    Ok(())
}

#[test]
fn write_then_read() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;

    assert_eq!(fs.write("/f", 0, b"hello")?, 5);
    assert_eq!(fs.read("/f", 0, 5)?, b"hello".to_vec());

    // Appending continues where the first write ended.
    assert_eq!(fs.write("/f", 5, b" world")?, 6);
    assert_eq!(fs.read("/f", 0, 11)?, b"hello world".to_vec());
    assert_eq!(fs.getattr("/f", &ctx())?.size, 11);
    Ok(())
}

#[test]
fn read_clamps_to_file_size() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;
    fs.write("/f", 0, b"hello")?;

    assert_eq!(fs.read("/f", 0, 100)?, b"hello".to_vec());
    assert_eq!(fs.read("/f", 3, 100)?, b"lo".to_vec());
    assert_eq!(fs.read("/f", 5, 10)?, Vec::<u8>::new());
    assert_eq!(fs.read("/f", 50, 10)?, Vec::<u8>::new());
    Ok(())
}

#[test]
fn overwrite_keeps_the_tail() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;
    fs.write("/f", 0, b"hello world")?;

    // An in-place overwrite must not drop the bytes after it.
    fs.write("/f", 0, b"HELLO")?;
    assert_eq!(fs.read("/f", 0, 11)?, b"HELLO world".to_vec());

    fs.write("/f", 6, b"WORLD")?;
    assert_eq!(fs.read("/f", 0, 11)?, b"HELLO WORLD".to_vec());
    assert_eq!(fs.getattr("/f", &ctx())?.size, 11);
    Ok(())
}

#[test]
fn write_past_eof_zero_pads() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;

    fs.write("/f", 5, b"abc")?;
    assert_eq!(fs.getattr("/f", &ctx())?.size, 8);
    assert_eq!(fs.read("/f", 0, 8)?, b"\0\0\0\0\0abc".to_vec());
    Ok(())
}

#[test]
fn truncate_to_zero() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;
    fs.write("/f", 0, b"hello world")?;

    fs.truncate("/f", 0)?;
    assert_eq!(fs.getattr("/f", &ctx())?.size, 0);
    assert_eq!(fs.read("/f", 0, 100)?, Vec::<u8>::new());
    Ok(())
}

#[test]
fn truncate_honors_requested_size() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;
    fs.write("/f", 0, b"hello world")?;

    fs.truncate("/f", 5)?;
    assert_eq!(fs.getattr("/f", &ctx())?.size, 5);
    assert_eq!(fs.read("/f", 0, 100)?, b"hello".to_vec());

    fs.truncate("/f", 8)?;
    assert_eq!(fs.getattr("/f", &ctx())?.size, 8);
    assert_eq!(fs.read("/f", 0, 100)?, b"hello\0\0\0".to_vec());
    Ok(())
}

#[test]
fn truncate_refuses_directories() -> FuseResult<()> {
    let fs = new_fs();
    fs.mkdir("/d", 0o755, &ctx())?;
    let err = fs.truncate("/d", 0).unwrap_err();
    assert_eq!(err.errno(), libc::ENOENT);
    Ok(())
}

#[test]
fn unlink_erases_every_key() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/a", 0o644, &ctx())?;
    fs.write("/a", 0, b"data")?;

    fs.unlink("/a")?;
    let err = fs.getattr("/a", &ctx()).unwrap_err();
    assert_eq!(err.errno(), libc::ENOENT);

    // Only the global inode counter survives.
    assert_eq!(key_count(&fs), 1);
    Ok(())
}

#[test]
fn rmdir_erases_every_key() -> FuseResult<()> {
    let fs = new_fs();
    fs.mkdir("/d", 0o755, &ctx())?;
    fs.rmdir("/d")?;

    let err = fs.getattr("/d", &ctx()).unwrap_err();
    assert_eq!(err.errno(), libc::ENOENT);
    assert_eq!(key_count(&fs), 1);
    Ok(())
}

#[test]
fn rmdir_of_non_empty_directory() -> FuseResult<()> {
    let fs = new_fs();
    fs.mkdir("/p", 0o755, &ctx())?;
    fs.create("/p/q", 0o644, &ctx())?;

    let err = fs.rmdir("/p").unwrap_err();
    assert_eq!(err.errno(), libc::ENOTEMPTY);

    // Both entries remain.
    assert!(fs.getattr("/p", &ctx()).is_ok());
    assert!(fs.getattr("/p/q", &ctx()).is_ok());
    Ok(())
}

#[test]
fn rmdir_of_file_or_missing() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/a", 0o644, &ctx())?;

    assert_eq!(fs.rmdir("/a").unwrap_err().errno(), libc::ENOENT);
    assert_eq!(fs.rmdir("/nope").unwrap_err().errno(), libc::ENOENT);
    Ok(())
}

#[test]
fn duplicate_names_are_rejected() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/a", 0o644, &ctx())?;

    assert_eq!(
        fs.create("/a", 0o600, &ctx()).unwrap_err().errno(),
        libc::EEXIST
    );
    assert_eq!(
        fs.mkdir("/a", 0o755, &ctx()).unwrap_err().errno(),
        libc::EEXIST
    );
    assert_eq!(
        fs.symlink("/x", "/a", &ctx()).unwrap_err().errno(),
        libc::EEXIST
    );
    Ok(())
}

#[test]
fn create_under_missing_or_wrong_parent() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/file", 0o644, &ctx())?;

    assert_eq!(
        fs.create("/nope/a", 0o644, &ctx()).unwrap_err().errno(),
        libc::ENOENT
    );
    assert_eq!(
        fs.create("/file/a", 0o644, &ctx()).unwrap_err().errno(),
        libc::ENOTDIR
    );
    Ok(())
}

#[test]
fn chmod_chown_utimens() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/f", 0o644, &ctx())?;

    fs.chmod("/f", 0o600)?;
    assert_eq!(fs.getattr("/f", &ctx())?.mode & 0o7777, 0o600);

    fs.chown("/f", 12, 34)?;
    let attr = fs.getattr("/f", &ctx())?;
    assert_eq!((attr.uid, attr.gid), (12, 34));

    fs.utimens("/f", 111, 222)?;
    let attr = fs.getattr("/f", &ctx())?;
    assert_eq!((attr.atime, attr.mtime), (111, 222));
    Ok(())
}

#[test]
fn open_of_missing_path_is_ok() -> FuseResult<()> {
    let fs = new_fs();
    fs.open("/nope")?;
    fs.open("/")?;
    fs.access("/nope")?;

    // The root never gains attribute keys.
    assert_eq!(key_count(&fs), 0);
    Ok(())
}

// After renaming a parent directory, the subtree resolves through the
// new name with every attribute intact.
#[test]
fn rename_moves_a_subtree() -> FuseResult<()> {
    let fs = new_fs();
    fs.mkdir("/foo", 0o755, &ctx())?;
    fs.mkdir("/foo/bar", 0o755, &ctx())?;
    fs.mkdir("/foo/bar/baz", 0o755, &ctx())?;
    fs.create("/foo/bar/baz/passwd.new", 0o644, &ctx())?;
    fs.write("/foo/bar/baz/passwd.new", 0, b"root:x:0:0")?;

    let before = fs.getattr("/foo/bar/baz/passwd.new", &ctx())?;
    fs.rename("/foo/bar", "/foo/steve")?;

    let after = fs.getattr("/foo/steve/baz/passwd.new", &ctx())?;
    assert_eq!(after.inode, before.inode);
    assert_eq!(after.size, before.size);
    assert_eq!(after.uid, before.uid);
    assert_eq!(after.gid, before.gid);
    assert_eq!(after.mode, before.mode);

    assert_eq!(
        fs.getattr("/foo/bar", &ctx()).unwrap_err().errno(),
        libc::ENOENT
    );
    Ok(())
}

#[test]
fn rename_replaces_an_existing_destination() -> FuseResult<()> {
    let fs = new_fs();
    fs.create("/a", 0o644, &ctx())?;
    fs.write("/a", 0, b"aaa")?;
    fs.create("/b", 0o644, &ctx())?;
    fs.write("/b", 0, b"bbbbbb")?;
    let a = fs.getattr("/a", &ctx())?;
    let keys_before = key_count(&fs);

    fs.rename("/a", "/b")?;

    let b = fs.getattr("/b", &ctx())?;
    assert_eq!(b.inode, a.inode);
    assert_eq!(fs.read("/b", 0, 10)?, b"aaa".to_vec());
    assert_eq!(
        fs.getattr("/a", &ctx()).unwrap_err().errno(),
        libc::ENOENT
    );

    // The replaced inode's keys are gone.
    assert!(key_count(&fs) < keys_before);
    Ok(())
}

#[test]
fn rename_refuses_non_empty_directory_target() -> FuseResult<()> {
    let fs = new_fs();
    fs.mkdir("/src", 0o755, &ctx())?;
    fs.mkdir("/dst", 0o755, &ctx())?;
    fs.create("/dst/keep", 0o644, &ctx())?;

    let err = fs.rename("/src", "/dst").unwrap_err();
    assert_eq!(err.errno(), libc::ENOTEMPTY);
    assert!(fs.getattr("/src", &ctx()).is_ok());
    assert!(fs.getattr("/dst/keep", &ctx()).is_ok());
    Ok(())
}

#[test]
fn rename_of_missing_source() {
    let fs = new_fs();
    let err = fs.rename("/nope", "/other").unwrap_err();
    assert_eq!(err.errno(), libc::ENOENT);
}

// Every mutating operation refuses in read-only mode, before touching
// the store.
#[test]
fn read_only_mode_refuses_mutation() -> FuseResult<()> {
    let fs = read_only_fs();
    let c = ctx();

    assert_eq!(fs.mkdir("/d", 0o755, &c).unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.rmdir("/d").unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.create("/f", 0o644, &c).unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.unlink("/f").unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.write("/f", 0, b"x").unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.truncate("/f", 0).unwrap_err().errno(), libc::EPERM);
    assert_eq!(
        fs.symlink("/t", "/l", &c).unwrap_err().errno(),
        libc::EPERM
    );
    assert_eq!(fs.chmod("/f", 0o600).unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.chown("/f", 1, 1).unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.utimens("/f", 1, 2).unwrap_err().errno(), libc::EPERM);
    assert_eq!(fs.rename("/f", "/g").unwrap_err().errno(), libc::EPERM);

    // Nothing reached the store.
    assert_eq!(key_count(&fs), 0);
    Ok(())
}

// Create N files and delete them all: only the inode counter is left.
#[test]
fn stress_create_and_delete() -> FuseResult<()> {
    let fs = new_fs();
    let n = 1000;

    for i in 0..n {
        let path = format!("/file-{}", i);
        fs.create(&path, 0o644, &ctx())?;
    }

    let entries = fs.readdir("/")?;
    assert_eq!(entries.len(), n + 2);

    for i in 0..n {
        let path = format!("/file-{}", i);
        fs.unlink(&path)?;
    }

    assert_eq!(key_count(&fs), 1);
    assert_eq!(fs.readdir("/")?.len(), 2);
    Ok(())
}

// Inode numbers are monotone and survive deletion without reuse.
#[test]
fn inodes_are_never_reused() -> FuseResult<()> {
    let fs = new_fs();
    let a = fs.create("/a", 0o644, &ctx())?;
    fs.unlink("/a")?;
    let b = fs.create("/b", 0o644, &ctx())?;

    assert!(b.inode > a.inode);
    Ok(())
}
