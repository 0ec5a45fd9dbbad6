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

mod node_map;
pub use self::node_map::NodeMap;

mod fuse_adapter;
pub use self::fuse_adapter::RedisFuse;

use crate::fs::RedisFileSystem;
use crate::FS_NAME;
use fuser::MountOption;
use log::info;
use redisfs_common::conf::FsConf;
use redisfs_common::FsResult;
use redisfs_store::RedisStore;

// Mount the filesystem and serve kernel requests until unmounted.
pub fn mount(conf: FsConf) -> FsResult<()> {
    let store = RedisStore::new(conf.store.clone());
    let fs = RedisFileSystem::new(store, &conf);
    let adapter = RedisFuse::new(fs);

    let mut options = vec![MountOption::FSName(FS_NAME.to_string())];
    for opt in &conf.mount.fuse_opts {
        match opt.as_str() {
            "allow_other" => options.push(MountOption::AllowOther),
            "allow_root" => options.push(MountOption::AllowRoot),
            "auto_unmount" => options.push(MountOption::AutoUnmount),
            "default_permissions" => options.push(MountOption::DefaultPermissions),
            other => options.push(MountOption::CUSTOM(other.to_string())),
        }
    }
    if conf.mount.read_only {
        options.push(MountOption::RO);
    }

    info!("mounting {} at {}", FS_NAME, conf.mount.mnt_path);
    fuser::mount2(adapter, &conf.mount.mnt_path, &options)?;
    Ok(())
}
