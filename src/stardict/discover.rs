//! Discovery of installed dictionaries.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::format::ifo;

/// System-wide dictionary directory.
pub const SYSTEM_DICT_DIR: &str = "/usr/share/stardict/dic";
/// Per-user dictionary directory, relative to `$HOME`.
pub const USER_DICT_DIR: &str = ".stardict/dic";

/// An installed dictionary, identified by its `.ifo` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictLocation {
    pub dir: PathBuf,
    /// File stem shared by the `.ifo`, `.idx` and `.dict` files.
    pub name: String,
    pub book_name: String,
}

/// Dictionaries found by a scan, in scan order.
#[derive(Debug, Default)]
pub struct DictPaths {
    pub dicts: Vec<DictLocation>,
}

impl DictPaths {
    /// Scans the user directory, then the system directory.
    pub fn discover() -> Self {
        let mut dirs = Vec::new();
        if let Some(home) = env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join(USER_DICT_DIR));
        }
        dirs.push(PathBuf::from(SYSTEM_DICT_DIR));
        Self::scan(&dirs)
    }

    /// Scans `dirs` in order for `*.ifo` files with a book name.
    ///
    /// Directories that cannot be read are skipped, as are `.ifo` files
    /// that cannot be read or have no `bookname`.
    pub fn scan<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut dicts = Vec::new();
        for dir in dirs {
            scan_dir(dir.as_ref(), &mut dicts);
        }
        debug!("Found {} dictionaries", dicts.len());
        Self { dicts }
    }

    pub fn len(&self) -> usize {
        self.dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dicts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DictLocation> {
        self.dicts.iter()
    }
}

fn scan_dir(dir: &Path, dicts: &mut Vec<DictLocation>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping {}: {}", dir.display(), e);
            return;
        }
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "ifo") && path.is_file())
        .collect();
    found.sort();

    for path in found {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match ifo::read_book_name(&path) {
            Ok(Some(book_name)) => dicts.push(DictLocation {
                dir: dir.to_path_buf(),
                name: name.to_string(),
                book_name,
            }),
            Ok(None) => warn!("Invalid ifo file '{}': no bookname", path.display()),
            Err(e) => warn!("Skipping '{}': {}", path.display(), e),
        }
    }
}
