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

//! The backing store command vocabulary, modelled as data so that
//! implementations can translate or interpret it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get(String),

    // Set a string key to a raw byte value.
    Set(String, Vec<u8>),

    MSet(Vec<(String, Vec<u8>)>),

    MGet(Vec<String>),

    Del(Vec<String>),

    // Append bytes to the end of a string key.
    Append(String, Vec<u8>),

    // Overwrite bytes starting at an offset, zero padding any gap.
    SetRange(String, u64, Vec<u8>),

    // Read the inclusive byte range [start, end] of a string key.
    GetRange(String, u64, u64),

    // Atomic integer increment, creating the key at 0 when absent.
    Incr(String),

    IncrBy(String, i64),

    // Set operations over the members of a set key.
    SAdd(String, String),

    SRem(String, String),

    SMembers(String),

    // Key enumeration and type introspection, used by the snapshot tool.
    Keys(String),

    Type(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,

    Ok,

    Int(i64),

    Data(Vec<u8>),

    Status(String),

    Array(Vec<Reply>),
}

impl Reply {
    // Integer reply, or a decimal ASCII string reply.
    // Any other shape reads as absent.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Reply::Int(v) => Some(*v),
            Reply::Data(v) => std::str::from_utf8(v).ok()?.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Reply::Data(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Status(v) => Some(v),
            Reply::Data(v) => std::str::from_utf8(v).ok(),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Reply>> {
        match self {
            Reply::Array(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Reply;

    #[test]
    fn lenient_accessors() {
        assert_eq!(Reply::Int(7).as_i64(), Some(7));
        assert_eq!(Reply::Data(b"42".to_vec()).as_i64(), Some(42));
        assert_eq!(Reply::Data(b"x42".to_vec()).as_i64(), None);
        assert_eq!(Reply::Nil.as_i64(), None);
        assert_eq!(Reply::Status("PONG".to_string()).as_str(), Some("PONG"));
    }
}
