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
use redisfs_common::common::Logger;
use redisfs_common::conf::FsConf;
use redisfs_common::{FsError, FsResult};
use redisfs_fuse::session;
use std::fs;
use std::process;

// Filesystem mount. Debugging against a local server:
// cargo run --bin redisfs-fuse -- --host localhost --mount /mnt/redis --debug
fn main() -> FsResult<()> {
    let args = FsArgs::parse();

    let conf = args.get_conf()?;
    Logger::init(conf.log.clone());
    conf.print();

    // allow_other mounts need root; refuse early like the mount helper would.
    if unsafe { libc::getuid() } != 0 {
        eprintln!("You must start this program as root.");
        process::exit(1);
    }

    conf.mount.check_mnt()?;
    write_pid(&conf.mount.pid_file)?;

    println!(
        "Connecting to redis-server {} and mounting at {}.",
        conf.store.addr(),
        conf.mount.mnt_path
    );
    println!("The prefix for all key-names is '{}'", conf.store.prefix);
    if conf.mount.read_only {
        println!("Filesystem is read-only.");
    }

    session::mount(conf)
}

fn write_pid(path: &str) -> FsResult<()> {
    fs::write(path, process::id().to_string())
        .map_err(|e| FsError::common(format!("Writing PID file {} failed: {}", path, e)))
}

// Mount command parameters. Flags override values from the optional
// configuration file.
#[derive(Debug, Parser, Clone)]
#[command(version, about = "Filesystem based upon FUSE, backed by a redis server")]
pub struct FsArgs {
    // The hostname of the redis server [localhost].
    #[arg(long)]
    pub host: Option<String>,

    // The port of the redis server [6379].
    #[arg(long)]
    pub port: Option<u16>,

    // The directory to mount our filesystem under [/mnt/redis].
    #[arg(long)]
    pub mount: Option<String>,

    // A string prepended to any redis key names [skx].
    #[arg(long)]
    pub prefix: Option<String>,

    // Mount the filesystem read-only.
    #[arg(long, action = clap::ArgAction::SetTrue, default_value = "false")]
    pub read_only: bool,

    // Skip atime updates, and mtime updates on appending writes.
    #[arg(long, action = clap::ArgAction::SetTrue, default_value = "false")]
    pub fast: bool,

    // Launch with debugging information.
    #[arg(short, long, action = clap::ArgAction::SetTrue, default_value = "false")]
    pub debug: bool,

    // Configuration file path (optional).
    #[arg(short, long)]
    pub conf: Option<String>,

    // Where to write our process id [/var/run/redisfs.pid].
    #[arg(long)]
    pub pid_file: Option<String>,
}

impl FsArgs {
    // Load the configuration file, then apply command line overrides.
    pub fn get_conf(&self) -> FsResult<FsConf> {
        let mut conf = match &self.conf {
            Some(path) => FsConf::from(path)?,
            None => FsConf::default(),
        };

        if let Some(v) = &self.host {
            conf.store.host = v.clone();
        }
        if let Some(v) = self.port {
            conf.store.port = v;
        }
        if let Some(v) = &self.prefix {
            conf.store.prefix = v.clone();
        }
        if let Some(v) = &self.mount {
            conf.mount.mnt_path = v.clone();
        }
        if let Some(v) = &self.pid_file {
            conf.mount.pid_file = v.clone();
        }
        if self.read_only {
            conf.mount.read_only = true;
        }
        if self.fast {
            conf.mount.fast = true;
        }
        if self.debug {
            conf.debug = true;
        }

        conf.init();
        Ok(conf)
    }
}
