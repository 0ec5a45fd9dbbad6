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

use crate::common::LocalTime;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

// If log_dir = "stdout", the log is output to standard output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConf {
    pub level: String,
    pub log_dir: String,
    pub file_name: String,
    pub max_log_files: usize,
}

impl Default for LogConf {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            log_dir: Logger::TARGET_STDOUT.to_string(),
            file_name: "redisfs.log".to_string(),
            max_log_files: 10,
        }
    }
}

static INSTANCE: OnceCell<Logger> = OnceCell::new();

// Holds the appender guard alive for the lifetime of the process.
#[allow(unused)]
#[derive(Debug)]
pub struct Logger {
    inner: Option<WorkerGuard>,
}

impl Logger {
    pub const TARGET_STDOUT: &'static str = "stdout";

    pub fn new(conf: LogConf) -> Self {
        let level = Level::from_str(&conf.level).unwrap_or(Level::INFO);

        if conf.log_dir == Self::TARGET_STDOUT {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_timer(LocalTime::new())
                .init();
            Logger { inner: None }
        } else {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(conf.file_name.clone())
                .max_log_files(conf.max_log_files)
                .build(&conf.log_dir)
                .expect("create log appender");

            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_timer(LocalTime::new())
                .with_writer(writer)
                .init();
            Logger { inner: Some(guard) }
        }
    }

    pub fn init(conf: LogConf) {
        let _ = INSTANCE.get_or_init(|| Self::new(conf));
    }
}
