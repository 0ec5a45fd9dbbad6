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

use clap::Parser;
use redisfs_common::common::{LogConf, Logger};
use redisfs_common::conf::StoreConf;
use redisfs_common::FsResult;
use redisfs_store::{snapshot, RedisStore, Store};

// One-shot namespace cloner: copies every key beneath one prefix to a
// new prefix. Run against a quiesced or unmounted filesystem, the tool
// takes no locks.
fn main() -> FsResult<()> {
    let args = SnapshotArgs::parse();

    let mut log = LogConf::default();
    if args.debug {
        log.level = "DEBUG".to_string();
    }
    Logger::init(log);

    let conf = args.store_conf();
    println!("Connecting to redis server {}.", conf.addr());
    println!(
        "Cloning all keys with prefix '{}' -> '{}'",
        args.from, args.to
    );

    let mut store = RedisStore::new(conf);
    store.ensure_alive()?;

    let cloned = snapshot(&mut store, &args.from, &args.to)?;
    println!("Cloned {} keys.", cloned);

    Ok(())
}

#[derive(Debug, Parser, Clone)]
#[command(version, about = "Clone a redisfs namespace to a new key prefix")]
pub struct SnapshotArgs {
    // The hostname of the redis server.
    #[arg(long, default_value = StoreConf::DEFAULT_HOST)]
    pub host: String,

    // The port of the redis server.
    #[arg(long, default_value_t = StoreConf::DEFAULT_PORT)]
    pub port: u16,

    // The prefix we're copying from.
    #[arg(long, default_value = StoreConf::DEFAULT_PREFIX)]
    pub from: String,

    // The prefix we're copying to.
    #[arg(long, default_value = "snapshot")]
    pub to: String,

    #[arg(short, long, action = clap::ArgAction::SetTrue, default_value = "false")]
    pub debug: bool,
}

impl SnapshotArgs {
    fn store_conf(&self) -> StoreConf {
        let mut conf = StoreConf {
            host: self.host.clone(),
            port: self.port,
            ..Default::default()
        };
        conf.init();
        conf
    }
}
