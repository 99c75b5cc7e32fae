// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub const DEFAULT_CONFIG_NAME: &str = "oracle.config.yaml";

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walks from `start` towards the filesystem root looking for `filename`.
pub fn find_in_parent(start: &Path, filename: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

/// Picks the config file to load.
///
/// An explicit path wins (relative ones are taken from `cwd`). Otherwise the
/// nearest `filename` at or above `cwd` is used, falling back to
/// `default_dir/filename` whether or not it exists.
pub fn resolve_config_path(
    find: FindInParent,
    cwd: &Path,
    default_dir: &Path,
    filename: &str,
    explicit: Option<&Path>,
) -> PathBuf {
    match explicit {
        Some(file) if file.is_absolute() => file.to_path_buf(),
        Some(file) => clean(cwd.join(file)),
        None => find(cwd, filename).unwrap_or_else(|| clean(default_dir.join(filename))),
    }
}

/// Joins a relative `path` onto `base`. Absolute paths pass through.
pub fn resolve_relative(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => clean(base.join(path)),
        _ => clean(path),
    }
}
