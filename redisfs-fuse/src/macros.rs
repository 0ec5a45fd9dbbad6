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

// Create fuse error.
#[macro_export]
macro_rules! err_fuse {
    ($errno:expr) => ({
        let msg = format!("err_fuse {}", $errno);
        let err = $crate::FuseError::new($errno as i32, ::redisfs_common::FsError::common(msg));
        Err(err)
    });

    ($errno:expr, $($arg:tt)+) => ({
        let msg = format!($($arg)+);
        let err = $crate::FuseError::new($errno as i32, ::redisfs_common::FsError::common(msg));
        Err(err)
    });
}

#[cfg(test)]
mod test {
    use crate::FuseResult;

    #[test]
    pub fn test() {
        let err1: FuseResult<u32> = err_fuse!(1_usize);
        assert_eq!(err1.unwrap_err().errno(), 1);

        let err2: FuseResult<u32> = err_fuse!(libc::ENOENT, "error {}", 2);
        assert_eq!(err2.unwrap_err().errno(), libc::ENOENT);
    }
}
