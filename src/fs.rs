//! File access used by `open`/`save` helpers
//!
//! The codecs themselves only see `Read + Seek` streams. Anything that
//! resolves a path goes through [`FileSystem`], so callers can load
//! assets from archives or memory instead of the local disk.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A readable, seekable stream
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Something that can open files by path
pub trait FileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek + '_>>;
}

/// The local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Files held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, data: Vec<u8>) {
        self.files.insert(path.into(), data);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek + '_>> {
        let data = self.files.get(path).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })?;
        Ok(Box::new(Cursor::new(data.as_slice())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_open() {
        let mut fs = MemoryFileSystem::new();
        fs.insert("a/b.ppd", vec![1, 2, 3]);

        let mut stream = fs.open(Path::new("a/b.ppd")).unwrap();
        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_memory_missing() {
        let fs = MemoryFileSystem::new();
        match fs.open(Path::new("missing.pmd")) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("expected NotFound"),
        };
    }
}
