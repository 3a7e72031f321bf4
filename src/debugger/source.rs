//! Source content cache backing the `list` command.
//!
//! Content is addressed either by a local path or by an adapter-supplied
//! `sourceReference` handle. Reference content is obtained through a
//! fetcher closure installed at construction, which keeps this cache free
//! of a back-pointer to its owner. Entries are immutable once populated;
//! the cache lives for one session and is flushed on session close.

use crate::debugger::Error;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub type ReferenceFetcher = Box<dyn Fn(i64) -> Result<String, Error>>;

pub struct SourceCache {
    by_path: RefCell<HashMap<PathBuf, Rc<[String]>>>,
    by_reference: RefCell<HashMap<i64, Rc<[String]>>>,
    fetcher: ReferenceFetcher,
}

impl SourceCache {
    pub fn new(fetcher: ReferenceFetcher) -> Self {
        Self {
            by_path: RefCell::default(),
            by_reference: RefCell::default(),
            fetcher,
        }
    }

    /// Lines of a local file. An unreadable file yields an empty sequence
    /// and is not cached, so a file that appears later can still be listed.
    pub fn get_by_path(&self, path: &Path) -> Rc<[String]> {
        if let Some(lines) = self.by_path.borrow().get(path) {
            return Rc::clone(lines);
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                let lines = split_lines(&content);
                self.by_path
                    .borrow_mut()
                    .insert(path.to_path_buf(), Rc::clone(&lines));
                lines
            }
            Err(e) => {
                log::debug!(target: "debugger", "cannot read {}: {e}", path.display());
                Rc::from([])
            }
        }
    }

    /// Lines of adapter-provided content. A failed fetch yields a one-line
    /// placeholder so the user sees what went wrong instead of nothing.
    pub fn get_by_reference(&self, reference: i64) -> Rc<[String]> {
        if let Some(lines) = self.by_reference.borrow().get(&reference) {
            return Rc::clone(lines);
        }

        let lines = match (self.fetcher)(reference) {
            Ok(content) => split_lines(&content),
            Err(e) => Rc::from([format!("cannot fetch source: {e}")]),
        };
        self.by_reference
            .borrow_mut()
            .insert(reference, Rc::clone(&lines));
        lines
    }

    /// Paths of cached local files, e.g. for console completion hints.
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        self.by_path.borrow().keys().cloned().collect()
    }

    pub fn flush(&self) {
        self.by_path.borrow_mut().clear();
        self.by_reference.borrow_mut().clear();
    }
}

/// Split on `\n`, stripping a trailing `\r` from every line.
fn split_lines(content: &str) -> Rc<[String]> {
    content.lines().map(ToString::to_string).collect()
}
