//! File-system backed nodes.
//!
//! Directory listings are sorted by file name so that repeated walks of an
//! unchanged tree yield the same order and therefore the same hashes.
//! Symbolic links and other special files are skipped.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{DagError, DagResult};
use crate::node::{Children, DirNode, FileNode, Node};

/// A regular file on disk.
#[derive(Clone, Debug)]
pub struct FsFile {
    path: PathBuf,
    name: String,
    size: u64,
}

impl FsFile {
    /// Open a regular file.
    pub fn open(path: impl Into<PathBuf>) -> DagResult<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(DagError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }
        Ok(Self {
            name: entry_name(&path),
            size: metadata.len(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileNode for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn content(&self) -> DagResult<Cow<'_, [u8]>> {
        Ok(Cow::Owned(std::fs::read(&self.path)?))
    }
}

/// Directory sizes computed so far, shared by every node of one walk.
type SizeCache = Arc<Mutex<HashMap<PathBuf, u64>>>;

/// A directory on disk.
#[derive(Clone, Debug)]
pub struct FsDir {
    path: PathBuf,
    name: String,
    ignore: Arc<[String]>,
    sizes: SizeCache,
}

impl FsDir {
    /// Open a directory.
    pub fn open(path: impl Into<PathBuf>) -> DagResult<Self> {
        let path = path.into();
        if !std::fs::metadata(&path)?.is_dir() {
            return Err(DagError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a directory: {}", path.display()),
            )));
        }
        Ok(Self {
            name: entry_name(&path),
            path,
            ignore: Arc::from(Vec::new()),
            sizes: SizeCache::default(),
        })
    }

    /// Skip entries with any of these names, at every depth.
    pub fn with_ignore(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.ignore = names.into_iter().collect();
        self.sizes = SizeCache::default();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.ignore.iter().any(|i| *i == name)
    }

    fn child(&self, entry: DirEntry) -> Option<DagResult<Node>> {
        let file_type = entry.file_type();
        if file_type.is_file() {
            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => return Some(Err(DagError::Io(e.into()))),
            };
            Some(Ok(Node::file(FsFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.into_path(),
                size,
            })))
        } else if file_type.is_dir() {
            Some(Ok(Node::dir(FsDir {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.into_path(),
                ignore: Arc::clone(&self.ignore),
                sizes: Arc::clone(&self.sizes),
            })))
        } else {
            warn!(path = %entry.path().display(), "skipping special file");
            None
        }
    }

    fn list(&self) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !self.is_ignored(e))
    }
}

impl DirNode for FsDir {
    fn name(&self) -> &str {
        &self.name
    }

    /// Sum of the sizes of all regular files below this directory.
    ///
    /// Computed bottom-up from the children and cached per path for the
    /// whole walk, so each directory is listed once. Entries that cannot be
    /// read are left out of the total.
    fn size(&self) -> u64 {
        let cached = self.sizes.lock().expect("lock poisoned").get(&self.path).copied();
        if let Some(size) = cached {
            return size;
        }
        let size = self
            .list()
            .filter_map(|entry| match entry {
                Ok(e) => self.child(e),
                Err(e) => Some(Err(DagError::Io(e.into()))),
            })
            .filter_map(|child| match child {
                Ok(node) => Some(node.size()),
                Err(e) => {
                    warn!(error = %e, "unreadable entry while sizing directory");
                    None
                }
            })
            .sum();
        self.sizes
            .lock()
            .expect("lock poisoned")
            .insert(self.path.clone(), size);
        size
    }

    fn children(&self) -> DagResult<Children<'_>> {
        debug!(path = %self.path.display(), "listing directory");
        Ok(Box::new(self.list().filter_map(move |entry| match entry {
            Ok(e) => self.child(e),
            Err(e) => Some(Err(DagError::Io(e.into()))),
        })))
    }
}

/// Open a path as a file or directory node.
pub fn open_node(path: impl AsRef<Path>, ignore: &[String]) -> DagResult<Node> {
    let path = path.as_ref();
    if std::fs::metadata(path)?.is_dir() {
        Ok(Node::dir(FsDir::open(path)?.with_ignore(ignore.iter().cloned())))
    } else {
        Ok(Node::file(FsFile::open(path)?))
    }
}

fn entry_name(path: &Path) -> String {
    let named = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    match named {
        Some(name) => name,
        None => std::fs::canonicalize(path)
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), b"bravo").unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha!").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.txt"), b"charlie").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("HEAD"), b"ref").unwrap();
        dir
    }

    fn names(dir: &FsDir) -> Vec<String> {
        dir.children()
            .unwrap()
            .map(|n| n.unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn children_are_sorted_by_name() {
        let tmp = fixture();
        let dir = FsDir::open(tmp.path()).unwrap();
        assert_eq!(names(&dir), vec![".git", "a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn ignored_names_are_skipped() {
        let tmp = fixture();
        let dir = FsDir::open(tmp.path()).unwrap().with_ignore([".git".to_string()]);
        assert_eq!(names(&dir), vec!["a.txt", "b.txt", "sub"]);
        // 6 + 5 + 7 bytes, without .git/HEAD.
        assert_eq!(dir.size(), 18);
    }

    #[test]
    fn aggregate_size_includes_nested_files() {
        let tmp = fixture();
        let dir = FsDir::open(tmp.path()).unwrap();
        assert_eq!(dir.size(), 18 + 3);
    }

    #[test]
    fn subdirectory_sizes_are_computed_once_per_walk() {
        let tmp = fixture();
        let dir = FsDir::open(tmp.path()).unwrap().with_ignore([".git".to_string()]);
        assert_eq!(dir.size(), 18);

        // Growing the subdirectory afterwards is not seen: the size sub
        // reported while its parent was sized is reused.
        fs::write(tmp.path().join("sub").join("late.txt"), b"later").unwrap();
        let sub = dir
            .children()
            .unwrap()
            .map(Result::unwrap)
            .find(|n| n.name() == "sub")
            .unwrap();
        assert_eq!(sub.size(), 7);
        assert_eq!(dir.size(), 18);

        // A fresh walk sees the new file.
        let fresh = FsDir::open(tmp.path()).unwrap().with_ignore([".git".to_string()]);
        assert_eq!(fresh.size(), 23);
    }

    #[test]
    fn file_nodes_carry_size_and_content() {
        let tmp = fixture();
        let dir = FsDir::open(tmp.path()).unwrap().with_ignore([".git".to_string()]);
        let first = dir.children().unwrap().next().unwrap().unwrap();
        match first {
            Node::File(f) => {
                assert_eq!(f.name(), "a.txt");
                assert_eq!(f.size(), 6);
                assert_eq!(&*f.content().unwrap(), b"alpha!");
            }
            Node::Dir(_) => panic!("expected a file"),
        }
    }

    #[test]
    fn subdirectories_inherit_ignore_list() {
        let tmp = fixture();
        fs::write(tmp.path().join("sub").join(".git"), b"worktree").unwrap();
        let dir = FsDir::open(tmp.path()).unwrap().with_ignore([".git".to_string()]);
        let sub = dir
            .children()
            .unwrap()
            .map(Result::unwrap)
            .find(|n| n.name() == "sub")
            .unwrap();
        match sub {
            Node::Dir(d) => {
                let listed: Vec<String> =
                    d.children().unwrap().map(|n| n.unwrap().name().to_string()).collect();
                assert_eq!(listed, vec!["c.txt"]);
            }
            Node::File(_) => panic!("expected a directory"),
        }
    }

    #[test]
    fn open_rejects_wrong_kind() {
        let tmp = fixture();
        assert!(FsDir::open(tmp.path().join("a.txt")).is_err());
        assert!(FsFile::open(tmp.path().join("sub")).is_err());
        assert!(FsDir::open(tmp.path().join("missing")).is_err());
    }

    #[test]
    fn open_node_dispatches_on_kind() {
        let tmp = fixture();
        assert!(open_node(tmp.path().join("a.txt"), &[]).unwrap().is_file());
        assert!(!open_node(tmp.path(), &[]).unwrap().is_file());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_skipped() {
        let tmp = fixture();
        std::os::unix::fs::symlink(tmp.path().join("a.txt"), tmp.path().join("link")).unwrap();
        let dir = FsDir::open(tmp.path()).unwrap().with_ignore([".git".to_string()]);
        assert_eq!(names(&dir), vec!["a.txt", "b.txt", "sub"]);
    }
}
