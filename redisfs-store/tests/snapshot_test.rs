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

use redisfs_common::FsResult;
use redisfs_store::{snapshot, Command, MemStore, Reply, Store};

fn seed(store: &mut MemStore) -> FsResult<()> {
    store.run(Command::Set(
        "skx:INODE:1:NAME".to_string(),
        b"passwd".to_vec(),
    ))?;
    store.run(Command::Set(
        "skx:INODE:1:DATA".to_string(),
        b"root:x:0:0".to_vec(),
    ))?;
    store.run(Command::Set("skx:GLOBAL:INODE".to_string(), b"1".to_vec()))?;
    store.run(Command::SAdd("skx:DIRENT:-99".to_string(), "1".to_string()))?;
    Ok(())
}

#[test]
fn snapshot_clones_strings_and_sets() -> FsResult<()> {
    let mut store = MemStore::new();
    seed(&mut store)?;

    let cloned = snapshot(&mut store, "skx", "snap")?;
    assert_eq!(cloned, 4);

    let value = store.run(Command::Get("snap:INODE:1:NAME".to_string()))?;
    assert_eq!(value.as_bytes(), Some(&b"passwd"[..]));

    let value = store.run(Command::Get("snap:INODE:1:DATA".to_string()))?;
    assert_eq!(value.as_bytes(), Some(&b"root:x:0:0"[..]));

    let members = store.run(Command::SMembers("snap:DIRENT:-99".to_string()))?;
    assert_eq!(members, Reply::Array(vec![Reply::Data(b"1".to_vec())]));

    // The original namespace is untouched.
    let value = store.run(Command::Get("skx:INODE:1:NAME".to_string()))?;
    assert_eq!(value.as_bytes(), Some(&b"passwd"[..]));
    Ok(())
}

#[test]
fn snapshot_of_empty_namespace() -> FsResult<()> {
    let mut store = MemStore::new();
    let cloned = snapshot(&mut store, "skx", "snap")?;
    assert_eq!(cloned, 0);
    assert_eq!(store.key_count(), 0);
    Ok(())
}

#[test]
fn snapshot_is_repeatable() -> FsResult<()> {
    let mut store = MemStore::new();
    seed(&mut store)?;

    snapshot(&mut store, "skx", "snap")?;
    let cloned = snapshot(&mut store, "skx", "snap")?;
    assert_eq!(cloned, 4);

    let value = store.run(Command::Get("snap:GLOBAL:INODE".to_string()))?;
    assert_eq!(value.as_bytes(), Some(&b"1"[..]));
    Ok(())
}
