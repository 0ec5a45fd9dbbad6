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

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Backing store connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConf {
    pub host: String,

    pub port: u16,

    // String prepended to every key name; allows more than one filesystem
    // to be mounted against a single server.
    pub prefix: String,

    pub connect_timeout_ms: u64,

    #[serde(skip_serializing, skip_deserializing)]
    pub connect_timeout: Duration,
}

impl StoreConf {
    pub const DEFAULT_HOST: &'static str = "localhost";

    pub const DEFAULT_PORT: u16 = 6379;

    pub const DEFAULT_PREFIX: &'static str = "skx";

    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 1500;

    pub fn init(&mut self) {
        self.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
    }

    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for StoreConf {
    fn default() -> Self {
        let mut conf = Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            prefix: Self::DEFAULT_PREFIX.to_string(),
            connect_timeout_ms: Self::DEFAULT_CONNECT_TIMEOUT_MS,
            connect_timeout: Duration::default(),
        };
        conf.init();
        conf
    }
}
