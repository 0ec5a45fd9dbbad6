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

use crate::common::LogConf;
use crate::conf::{MountConf, StoreConf};
use crate::{FsError, FsResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;

// Top level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FsConf {
    // Whether to output the request response log.
    pub debug: bool,

    pub store: StoreConf,

    pub mount: MountConf,

    pub log: LogConf,
}

impl FsConf {
    // Parse a toml configuration file.
    pub fn from<T: AsRef<str>>(path: T) -> FsResult<Self> {
        let str = read_to_string(path.as_ref())?;
        let mut conf =
            toml::from_str::<Self>(&str).map_err(|e| FsError::common(e.to_string()))?;

        conf.init();
        Ok(conf)
    }

    pub fn init(&mut self) {
        self.store.init();
        if self.debug {
            self.log.level = "DEBUG".to_string();
        }
    }

    pub fn print(&self) {
        let str = toml::to_string(self).unwrap_or_default();
        info!("fs conf: \n{}", str)
    }
}

#[cfg(test)]
mod tests {
    use crate::conf::FsConf;

    #[test]
    fn default_conf() {
        let conf = FsConf::default();
        assert_eq!(conf.store.host, "localhost");
        assert_eq!(conf.store.port, 6379);
        assert_eq!(conf.store.prefix, "skx");
        assert_eq!(conf.mount.mnt_path, "/mnt/redis");
        assert!(!conf.mount.read_only);
        assert!(!conf.mount.fast);
    }

    #[test]
    fn parse_toml() {
        let str = r#"
            debug = true

            [store]
            host = "redis-1"
            port = 6380
            prefix = "fsa"

            [mount]
            mnt_path = "/mnt/a"
            read_only = true
        "#;

        let mut conf: FsConf = toml::from_str(str).unwrap();
        conf.init();

        assert!(conf.debug);
        assert_eq!(conf.store.host, "redis-1");
        assert_eq!(conf.store.port, 6380);
        assert_eq!(conf.store.prefix, "fsa");
        assert_eq!(conf.mount.mnt_path, "/mnt/a");
        assert!(conf.mount.read_only);
        assert_eq!(conf.log.level, "DEBUG");
        assert_eq!(conf.store.connect_timeout.as_millis(), 1500);
    }
}
