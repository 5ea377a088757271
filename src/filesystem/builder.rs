use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use snafu::Snafu;
use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;
use crate::filesystem::Node;

/// A directory whose listing could not be completed. The directory still
/// appears in the tree with whatever was gathered before the failure.
#[derive(Debug, Snafu)]
pub enum ScanFailure {
    #[snafu(display("Permission denied accessing {}", path.display()))]
    PermissionDenied { path: PathBuf, source: io::Error },
    #[snafu(display("Error scanning {}: {}", path.display(), source))]
    Unreadable { path: PathBuf, source: io::Error },
    #[snafu(display("Depth limit reached at {}", path.display()))]
    DepthLimit { path: PathBuf, limit: usize },
}

impl ScanFailure {
    fn from_io(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            ScanFailure::PermissionDenied { path, source }
        } else {
            ScanFailure::Unreadable { path, source }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScanFailure::PermissionDenied { path, .. }
            | ScanFailure::Unreadable { path, .. }
            | ScanFailure::DepthLimit { path, .. } => path,
        }
    }
}

/// Result of a full scan: the root directory node and every directory that
/// could not be fully listed, in the order they were encountered.
#[derive(Debug)]
pub struct ScanReport {
    pub root: Node,
    pub failures: Vec<ScanFailure>,
}

/// Walks a directory depth-first, pre-order, keeping listing order.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    max_depth: Option<usize>,
}

/// A directory being listed. Lives on the work stack until its listing is
/// exhausted, then gets attached to the frame below it.
struct Frame {
    node: Node,
    path: PathBuf,
    entries: Option<ReadDir>,
    depth: usize,
}

impl Frame {
    fn next_entry(&mut self, failures: &mut Vec<ScanFailure>) -> Option<PathBuf> {
        let entries = self.entries.as_mut()?;
        match entries.next() {
            Some(Ok(entry)) => Some(self.path.join(entry.file_name())),
            Some(Err(source)) => {
                record(failures, ScanFailure::from_io(self.path.clone(), source));
                self.entries = None;
                None
            }
            None => {
                self.entries = None;
                None
            }
        }
    }

    fn attach(&mut self, child: Node) {
        if let Err(child) = self.node.push(child) {
            warn!("Dropping {}: parent is not a directory", child.path());
        }
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directories at `max_depth` (root is 0) are emitted without being listed.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builds the tree under `root`. Listing failures never abort the scan;
    /// they end up in [`ScanReport::failures`].
    pub fn scan(&self, root: &Path) -> ScanReport {
        let mut failures = Vec::new();
        let mut stack = vec![self.open(root.to_path_buf(), 0, &mut failures)];
        let mut finished = None;

        while let Some(frame) = stack.last_mut() {
            match frame.next_entry(&mut failures) {
                Some(entry_path) if entry_path.is_dir() => {
                    let depth = frame.depth + 1;
                    let child = self.open(entry_path, depth, &mut failures);
                    stack.push(child);
                }
                Some(entry_path) => {
                    frame.attach(Node::file(entry_path.entry_name(), entry_path.lossy_string()));
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    match stack.last_mut() {
                        Some(parent) => parent.attach(done.node),
                        None => finished = Some(done.node),
                    }
                }
            }
        }

        let root = finished
            .unwrap_or_else(|| Node::directory(root.entry_name(), root.lossy_string()));
        ScanReport { root, failures }
    }

    fn open(&self, path: PathBuf, depth: usize, failures: &mut Vec<ScanFailure>) -> Frame {
        let node = Node::directory(path.entry_name(), path.lossy_string());

        let entries = match self.max_depth {
            Some(limit) if depth >= limit => {
                record(
                    failures,
                    ScanFailure::DepthLimit {
                        path: path.clone(),
                        limit,
                    },
                );
                None
            }
            _ => {
                debug!("Scanning {}", path.display());
                match fs::read_dir(&path) {
                    Ok(entries) => Some(entries),
                    Err(source) => {
                        record(failures, ScanFailure::from_io(path.clone(), source));
                        None
                    }
                }
            }
        };

        Frame {
            node,
            path,
            entries,
            depth,
        }
    }
}

fn record(failures: &mut Vec<ScanFailure>, failure: ScanFailure) {
    warn!(
        "{} ({})",
        failure,
        failure.path().best_effort_path_display()
    );
    failures.push(failure);
}
