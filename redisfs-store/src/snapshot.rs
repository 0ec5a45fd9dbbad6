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

use crate::{Command, Reply, Store};
use log::debug;
use redisfs_common::{FsError, FsResult};

// Clone every key beneath one prefix to another prefix.
//
// String keys are copied value for value. Set keys are copied member by
// member; set members are inode numbers and need no rewriting. The tool
// is not synchronized with a running filesystem, it observes whatever
// state exists at snapshot time.
//
// Returns the number of keys cloned.
pub fn snapshot<S: Store>(store: &mut S, old_prefix: &str, new_prefix: &str) -> FsResult<u64> {
    store.ensure_alive()?;

    let reply = store.run(Command::Keys(format!("{}*", old_prefix)))?;
    let keys = reply
        .into_array()
        .ok_or_else(|| FsError::bad_reply("KEYS did not return an array"))?;

    let mut cloned = 0;
    for key in keys {
        let old_key = match key.as_str() {
            Some(v) => v.to_string(),
            None => continue,
        };
        let new_key = format!("{}{}", new_prefix, &old_key[old_prefix.len()..]);
        debug!("cloning {} -> {}", old_key, new_key);

        let kind = store.run(Command::Type(old_key.clone()))?;
        match kind.as_str() {
            Some("string") => {
                let value = store.run(Command::Get(old_key.clone()))?;
                if let Some(bytes) = value.into_bytes() {
                    store.run(Command::Set(new_key, bytes))?;
                }
            }
            Some("set") => {
                let members = store
                    .run(Command::SMembers(old_key.clone()))?
                    .into_array()
                    .ok_or_else(|| FsError::bad_reply("SMEMBERS did not return an array"))?;
                for member in members {
                    if let Some(v) = member.as_str() {
                        store.run(Command::SAdd(new_key.clone(), v.to_string()))?;
                    }
                }
            }
            other => {
                return Err(FsError::unsupported(format!(
                    "key {} has type {:?}",
                    old_key, other
                )));
            }
        }

        cloned += 1;
    }

    Ok(cloned)
}
