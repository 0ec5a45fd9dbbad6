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
use log::{error, info};
use redis::{Connection, RedisResult, Value};
use redisfs_common::conf::StoreConf;
use redisfs_common::{FsError, FsResult};
use std::process;

// Owns the live server connection.
// Connecting is lazy; the first `ensure_alive` establishes it.
pub struct RedisStore {
    conf: StoreConf,
    conn: Option<Connection>,
}

impl RedisStore {
    pub fn new(conf: StoreConf) -> Self {
        Self { conf, conn: None }
    }

    fn connect(&self) -> FsResult<Connection> {
        let client = redis::Client::open(self.conf.url().as_str()).map_err(FsError::store)?;
        let conn = client
            .get_connection_with_timeout(self.conf.connect_timeout)
            .map_err(FsError::store)?;
        Ok(conn)
    }

    fn conn_mut(&mut self) -> FsResult<&mut Connection> {
        self.conn
            .as_mut()
            .ok_or_else(|| FsError::store("store connection is not established"))
    }

    fn to_cmd(cmd: &Command) -> redis::Cmd {
        match cmd {
            Command::Get(key) => {
                let mut c = redis::cmd("GET");
                c.arg(key);
                c
            }
            Command::Set(key, value) => {
                let mut c = redis::cmd("SET");
                c.arg(key).arg(&value[..]);
                c
            }
            Command::MSet(pairs) => {
                let mut c = redis::cmd("MSET");
                for (key, value) in pairs {
                    c.arg(key).arg(&value[..]);
                }
                c
            }
            Command::MGet(keys) => {
                let mut c = redis::cmd("MGET");
                for key in keys {
                    c.arg(key);
                }
                c
            }
            Command::Del(keys) => {
                let mut c = redis::cmd("DEL");
                for key in keys {
                    c.arg(key);
                }
                c
            }
            Command::Append(key, value) => {
                let mut c = redis::cmd("APPEND");
                c.arg(key).arg(&value[..]);
                c
            }
            Command::SetRange(key, offset, value) => {
                let mut c = redis::cmd("SETRANGE");
                c.arg(key).arg(*offset).arg(&value[..]);
                c
            }
            Command::GetRange(key, start, end) => {
                let mut c = redis::cmd("GETRANGE");
                c.arg(key).arg(*start).arg(*end);
                c
            }
            Command::Incr(key) => {
                let mut c = redis::cmd("INCR");
                c.arg(key);
                c
            }
            Command::IncrBy(key, delta) => {
                let mut c = redis::cmd("INCRBY");
                c.arg(key).arg(*delta);
                c
            }
            Command::SAdd(key, member) => {
                let mut c = redis::cmd("SADD");
                c.arg(key).arg(member);
                c
            }
            Command::SRem(key, member) => {
                let mut c = redis::cmd("SREM");
                c.arg(key).arg(member);
                c
            }
            Command::SMembers(key) => {
                let mut c = redis::cmd("SMEMBERS");
                c.arg(key);
                c
            }
            Command::Keys(pattern) => {
                let mut c = redis::cmd("KEYS");
                c.arg(pattern);
                c
            }
            Command::Type(key) => {
                let mut c = redis::cmd("TYPE");
                c.arg(key);
                c
            }
        }
    }

    fn from_value(value: Value) -> Reply {
        match value {
            Value::Nil => Reply::Nil,
            Value::Okay => Reply::Ok,
            Value::Int(v) => Reply::Int(v),
            Value::Data(v) => Reply::Data(v),
            Value::Status(v) => Reply::Status(v),
            Value::Bulk(v) => Reply::Array(v.into_iter().map(Self::from_value).collect()),
        }
    }
}

impl Store for RedisStore {
    // Ping the current connection, or establish a new one.
    // A filesystem cannot make progress without its backing store, so a
    // failed reconnect terminates the process.
    fn ensure_alive(&mut self) -> FsResult<()> {
        if let Some(conn) = self.conn.as_mut() {
            let pong: RedisResult<String> = redis::cmd("PING").query(conn);
            if matches!(pong.as_deref(), Ok("PONG")) {
                return Ok(());
            }
        }

        match self.connect() {
            Ok(conn) => {
                info!("Connected to redis server on [{}]", self.conf.addr());
                self.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to redis on [{}]: {}", self.conf.addr(), e);
                process::exit(1);
            }
        }
    }

    fn run(&mut self, cmd: Command) -> FsResult<Reply> {
        let conn = self.conn_mut()?;
        let value: RedisResult<Value> = Self::to_cmd(&cmd).query(conn);

        match value {
            Ok(v) => Ok(Self::from_value(v)),
            Err(e) => {
                // GETRANGE was once named SUBSTR; retry under the old name
                // when the server rejects the command.
                if let Command::GetRange(key, start, end) = &cmd {
                    if e.kind() == redis::ErrorKind::ResponseError {
                        let mut legacy = redis::cmd("SUBSTR");
                        legacy.arg(key).arg(*start).arg(*end);
                        let v: Value = legacy.query(conn).map_err(FsError::store)?;
                        return Ok(Self::from_value(v));
                    }
                }
                Err(FsError::store(e))
            }
        }
    }

    fn run_batch(&mut self, cmds: Vec<Command>) -> FsResult<Vec<Reply>> {
        if cmds.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.conn_mut()?;
        let mut pipe = redis::pipe();
        for cmd in &cmds {
            pipe.add_command(Self::to_cmd(cmd));
        }

        let values: Vec<Value> = pipe.query(conn).map_err(FsError::store)?;
        if values.len() != cmds.len() {
            return Err(FsError::bad_reply(format!(
                "pipeline of {} commands returned {} replies",
                cmds.len(),
                values.len()
            )));
        }

        Ok(values.into_iter().map(Self::from_value).collect())
    }
}
