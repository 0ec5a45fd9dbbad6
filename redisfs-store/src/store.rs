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

use crate::{Command, Reply};
use redisfs_common::FsResult;

// A key/value store holding string keys and unordered string sets.
// The live implementation talks to a redis server; tests run against
// the in-memory implementation.
pub trait Store {
    // Probe the connection, reconnecting when it is dead.
    fn ensure_alive(&mut self) -> FsResult<()>;

    // Issue a single command and wait for its reply.
    fn run(&mut self, cmd: Command) -> FsResult<Reply>;

    // Issue a batch of commands in one round trip.
    // Replies come back in issue order, one per command.
    fn run_batch(&mut self, cmds: Vec<Command>) -> FsResult<Vec<Reply>>;
}
