//! The filesystem seam.
//!
//! The code generator only ever asks for "a writable file at this
//! slash-separated path under the pack root"; where those bytes go is this
//! trait's business. Production compiles use [`FsWriter`]; tests capture the
//! whole pack in memory with [`MemWriter`].

use std::cell::RefCell;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;

/// Destination for generated datapack files.
pub trait PackWriter {
    /// Opens `path` (slash-separated, relative to the pack root) for
    /// writing, creating any missing parent directories and truncating an
    /// existing file. The returned handle is owned by the caller and must be
    /// flushed before it is dropped.
    fn create(&mut self, path: &str) -> io::Result<Box<dyn Write>>;
}

/// Writes the pack into a real directory tree.
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsWriter { root: root.into() }
    }
}

impl PackWriter for FsWriter {
    fn create(&mut self, path: &str) -> io::Result<Box<dyn Write>> {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            full.push(segment);
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Box::new(BufWriter::new(fs::File::create(full)?)))
    }
}

/// Collects the pack in memory, keyed by path in creation order.
///
/// Cloning is cheap and shares the underlying map, so a clone handed to the
/// compiler can be inspected afterwards through the original.
#[derive(Clone, Default, Debug)]
pub struct MemWriter {
    files: Rc<RefCell<IndexMap<String, Vec<u8>>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All created paths, in creation order.
    pub fn paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    /// The contents of `path`, if it was created.
    pub fn contents(&self, path: &str) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl PackWriter for MemWriter {
    fn create(&mut self, path: &str) -> io::Result<Box<dyn Write>> {
        self.files.borrow_mut().insert(path.to_string(), Vec::new());
        Ok(Box::new(MemFile {
            path: path.to_string(),
            files: Rc::clone(&self.files),
        }))
    }
}

struct MemFile {
    path: String,
    files: Rc<RefCell<IndexMap<String, Vec<u8>>>>,
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut files = self.files.borrow_mut();
        files
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
