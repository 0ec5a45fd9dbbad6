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
use redisfs_common::{FsError, FsResult};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
enum MemValue {
    Str(Vec<u8>),
    Set(BTreeSet<String>),
}

// In-memory model of the backing store, for tests.
// Matches the server semantics the filesystem relies on: sets vanish
// when their last member is removed, GETRANGE is inclusive and clamped,
// SETRANGE zero-pads gaps.
#[derive(Debug, Default)]
pub struct MemStore {
    map: BTreeMap<String, MemValue>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_count(&self) -> usize {
        self.map.len()
    }

    fn wrong_type(key: &str) -> FsError {
        FsError::store(format!(
            "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
            key
        ))
    }

    fn str_value(&self, key: &str) -> FsResult<Option<&Vec<u8>>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(MemValue::Str(v)) => Ok(Some(v)),
            Some(MemValue::Set(_)) => Err(Self::wrong_type(key)),
        }
    }

    fn str_entry(&mut self, key: &str) -> FsResult<&mut Vec<u8>> {
        let entry = self
            .map
            .entry(key.to_string())
            .or_insert_with(|| MemValue::Str(Vec::new()));
        match entry {
            MemValue::Str(v) => Ok(v),
            MemValue::Set(_) => Err(Self::wrong_type(key)),
        }
    }

    fn int_value(&self, key: &str) -> FsResult<i64> {
        match self.str_value(key)? {
            None => Ok(0),
            Some(v) => std::str::from_utf8(v)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| FsError::store("value is not an integer or out of range")),
        }
    }

    fn incr_by(&mut self, key: &str, delta: i64) -> FsResult<Reply> {
        let next = self.int_value(key)? + delta;
        self.map
            .insert(key.to_string(), MemValue::Str(next.to_string().into_bytes()));
        Ok(Reply::Int(next))
    }

    fn set_range(&mut self, key: &str, offset: usize, value: &[u8]) -> FsResult<Reply> {
        if value.is_empty() {
            let len = self.str_value(key)?.map(|v| v.len()).unwrap_or(0);
            return Ok(Reply::Int(len as i64));
        }

        let data = self.str_entry(key)?;
        let end = offset + value.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(value);
        Ok(Reply::Int(data.len() as i64))
    }

    fn get_range(&self, key: &str, start: usize, end: usize) -> FsResult<Reply> {
        let data = match self.str_value(key)? {
            None => return Ok(Reply::Data(Vec::new())),
            Some(v) => v,
        };

        if data.is_empty() || start >= data.len() {
            return Ok(Reply::Data(Vec::new()));
        }

        // The range is inclusive on both ends.
        let end = end.min(data.len() - 1);
        Ok(Reply::Data(data[start..=end].to_vec()))
    }

    fn set_entry(&mut self, key: &str) -> FsResult<&mut BTreeSet<String>> {
        let entry = self
            .map
            .entry(key.to_string())
            .or_insert_with(|| MemValue::Set(BTreeSet::new()));
        match entry {
            MemValue::Set(v) => Ok(v),
            MemValue::Str(_) => Err(Self::wrong_type(key)),
        }
    }

    fn srem(&mut self, key: &str, member: &str) -> FsResult<Reply> {
        let removed = match self.map.get_mut(key) {
            None => false,
            Some(MemValue::Set(v)) => v.remove(member),
            Some(MemValue::Str(_)) => return Err(Self::wrong_type(key)),
        };

        // An empty set does not exist.
        if let Some(MemValue::Set(v)) = self.map.get(key) {
            if v.is_empty() {
                self.map.remove(key);
            }
        }

        Ok(Reply::Int(removed as i64))
    }

    fn keys(&self, pattern: &str) -> Reply {
        let matches: Vec<Reply> = match pattern.strip_suffix('*') {
            Some(prefix) => self
                .map
                .keys()
                .filter(|k| k.starts_with(prefix))
                .map(|k| Reply::Data(k.clone().into_bytes()))
                .collect(),
            None => self
                .map
                .keys()
                .filter(|k| k.as_str() == pattern)
                .map(|k| Reply::Data(k.clone().into_bytes()))
                .collect(),
        };
        Reply::Array(matches)
    }
}

impl Store for MemStore {
    fn ensure_alive(&mut self) -> FsResult<()> {
        Ok(())
    }

    fn run(&mut self, cmd: Command) -> FsResult<Reply> {
        match cmd {
            Command::Get(key) => Ok(match self.str_value(&key)? {
                None => Reply::Nil,
                Some(v) => Reply::Data(v.clone()),
            }),

            Command::Set(key, value) => {
                self.map.insert(key, MemValue::Str(value));
                Ok(Reply::Ok)
            }

            Command::MSet(pairs) => {
                for (key, value) in pairs {
                    self.map.insert(key, MemValue::Str(value));
                }
                Ok(Reply::Ok)
            }

            Command::MGet(keys) => {
                let mut replies = Vec::with_capacity(keys.len());
                for key in keys {
                    let reply = match self.map.get(&key) {
                        Some(MemValue::Str(v)) => Reply::Data(v.clone()),
                        // MGET never fails; non-string keys read as nil.
                        _ => Reply::Nil,
                    };
                    replies.push(reply);
                }
                Ok(Reply::Array(replies))
            }

            Command::Del(keys) => {
                let mut removed = 0;
                for key in keys {
                    if self.map.remove(&key).is_some() {
                        removed += 1;
                    }
                }
                Ok(Reply::Int(removed))
            }

            Command::Append(key, value) => {
                let data = self.str_entry(&key)?;
                data.extend_from_slice(&value);
                Ok(Reply::Int(data.len() as i64))
            }

            Command::SetRange(key, offset, value) => {
                self.set_range(&key, offset as usize, &value)
            }

            Command::GetRange(key, start, end) => {
                self.get_range(&key, start as usize, end as usize)
            }

            Command::Incr(key) => self.incr_by(&key, 1),

            Command::IncrBy(key, delta) => self.incr_by(&key, delta),

            Command::SAdd(key, member) => {
                let added = self.set_entry(&key)?.insert(member);
                Ok(Reply::Int(added as i64))
            }

            Command::SRem(key, member) => self.srem(&key, &member),

            Command::SMembers(key) => {
                let members = match self.map.get(&key) {
                    None => Vec::new(),
                    Some(MemValue::Set(v)) => v
                        .iter()
                        .map(|m| Reply::Data(m.clone().into_bytes()))
                        .collect(),
                    Some(MemValue::Str(_)) => return Err(Self::wrong_type(&key)),
                };
                Ok(Reply::Array(members))
            }

            Command::Keys(pattern) => Ok(self.keys(&pattern)),

            Command::Type(key) => {
                let name = match self.map.get(&key) {
                    None => "none",
                    Some(MemValue::Str(_)) => "string",
                    Some(MemValue::Set(_)) => "set",
                };
                Ok(Reply::Status(name.to_string()))
            }
        }
    }

    fn run_batch(&mut self, cmds: Vec<Command>) -> FsResult<Vec<Reply>> {
        let mut replies = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            replies.push(self.run(cmd)?);
        }
        Ok(replies)
    }
}
