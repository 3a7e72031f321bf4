//! User-visible breakpoints.
//!
//! Breakpoints get stable 1-based numbers, allocated monotonically and never
//! reused, so `break remove 2` always means the same breakpoint it meant
//! when the user created it. The adapter-side state (id, verification,
//! message) is attached by the reconciler after every `setBreakpoints` /
//! `setFunctionBreakpoints` exchange and by asynchronous `breakpoint`
//! events.

use crate::dap::types::BreakpointInfo;
use crate::debugger::Error;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Shown for an enabled breakpoint the adapter did not confirm and gave no
/// explanation for.
pub const UNVERIFIED_MESSAGE: &str =
    "Could not set this breakpoint. The module may not have been loaded yet.";

#[derive(Debug, Clone)]
pub struct SourceBreakpoint {
    pub number: u32,
    pub path: PathBuf,
    pub line: u32,
    pub enabled: bool,
    pub id: Option<u32>,
    pub verified: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FunctionBreakpoint {
    pub number: u32,
    pub function: String,
    pub enabled: bool,
    pub id: Option<u32>,
    pub verified: bool,
    pub message: Option<String>,
    /// Location the adapter resolved the function to, if it reported one.
    pub resolved_path: Option<PathBuf>,
    pub resolved_line: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum Breakpoint {
    Source(SourceBreakpoint),
    Function(FunctionBreakpoint),
}

impl Breakpoint {
    pub fn number(&self) -> u32 {
        match self {
            Breakpoint::Source(b) => b.number,
            Breakpoint::Function(b) => b.number,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Breakpoint::Source(b) => b.enabled,
            Breakpoint::Function(b) => b.enabled,
        }
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            Breakpoint::Source(b) => b.id,
            Breakpoint::Function(b) => b.id,
        }
    }

    pub fn verified(&self) -> bool {
        match self {
            Breakpoint::Source(b) => b.verified,
            Breakpoint::Function(b) => b.verified,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Breakpoint::Source(b) => b.message.as_deref(),
            Breakpoint::Function(b) => b.message.as_deref(),
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        match self {
            Breakpoint::Source(b) => b.enabled = enabled,
            Breakpoint::Function(b) => b.enabled = enabled,
        }
    }

    fn reset_adapter_state(&mut self) {
        match self {
            Breakpoint::Source(b) => {
                b.id = None;
                b.verified = false;
                b.message = None;
            }
            Breakpoint::Function(b) => {
                b.id = None;
                b.verified = false;
                b.message = None;
            }
        }
    }
}

/// Collection of user breakpoints, ordered by number.
#[derive(Debug, Default)]
pub struct BreakpointRegistry {
    breakpoints: BTreeMap<u32, Breakpoint>,
    numbers_by_id: HashMap<u32, u32>,
    last_number: u32,
}

impl BreakpointRegistry {
    fn alloc_number(&mut self) -> u32 {
        self.last_number += 1;
        self.last_number
    }

    pub fn add_source(&mut self, path: impl Into<PathBuf>, line: u32) -> u32 {
        let number = self.alloc_number();
        self.breakpoints.insert(
            number,
            Breakpoint::Source(SourceBreakpoint {
                number,
                path: path.into(),
                line,
                enabled: true,
                id: None,
                verified: false,
                message: None,
            }),
        );
        number
    }

    pub fn add_function(&mut self, function: impl Into<String>) -> u32 {
        let number = self.alloc_number();
        self.breakpoints.insert(
            number,
            Breakpoint::Function(FunctionBreakpoint {
                number,
                function: function.into(),
                enabled: true,
                id: None,
                verified: false,
                message: None,
                resolved_path: None,
                resolved_line: None,
            }),
        );
        number
    }

    pub fn remove(&mut self, number: u32) -> Result<Breakpoint, Error> {
        let bp = self
            .breakpoints
            .remove(&number)
            .ok_or(Error::NoSuchBreakpoint(number))?;
        if let Some(id) = bp.id() {
            self.numbers_by_id.remove(&id);
        }
        Ok(bp)
    }

    /// Remove every breakpoint. Numbers are not reused afterwards.
    pub fn clear(&mut self) {
        self.breakpoints.clear();
        self.numbers_by_id.clear();
    }

    pub fn set_enabled(&mut self, number: u32, enabled: bool) -> Result<(), Error> {
        self.breakpoints
            .get_mut(&number)
            .ok_or(Error::NoSuchBreakpoint(number))?
            .set_enabled(enabled);
        Ok(())
    }

    pub fn get(&self, number: u32) -> Result<&Breakpoint, Error> {
        self.breakpoints
            .get(&number)
            .ok_or(Error::NoSuchBreakpoint(number))
    }

    pub fn get_by_id(&self, id: u32) -> Option<&Breakpoint> {
        let number = self.numbers_by_id.get(&id)?;
        self.breakpoints.get(number)
    }

    pub fn all(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.values()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Paths of every source breakpoint, enabled or not. A path with only
    /// disabled breakpoints still needs an (empty) `setBreakpoints` request
    /// to clear the adapter state.
    pub fn source_paths(&self) -> BTreeSet<PathBuf> {
        self.breakpoints
            .values()
            .filter_map(|bp| match bp {
                Breakpoint::Source(b) => Some(b.path.clone()),
                Breakpoint::Function(_) => None,
            })
            .collect()
    }

    /// Lines of enabled breakpoints in `path`, in breakpoint-number order.
    /// The reconciler sends exactly this list and pairs the response to it
    /// positionally, so [`Self::sync_source`] derives the same order.
    pub fn enabled_lines(&self, path: &Path) -> Vec<u32> {
        self.enabled_source_numbers(path)
            .into_iter()
            .map(|number| match &self.breakpoints[&number] {
                Breakpoint::Source(b) => b.line,
                Breakpoint::Function(_) => unreachable!("filtered to source breakpoints"),
            })
            .collect()
    }

    pub fn enabled_function_names(&self) -> Vec<String> {
        self.enabled_function_numbers()
            .into_iter()
            .map(|number| match &self.breakpoints[&number] {
                Breakpoint::Function(b) => b.function.clone(),
                Breakpoint::Source(_) => unreachable!("filtered to function breakpoints"),
            })
            .collect()
    }

    pub fn has_function_breakpoints(&self) -> bool {
        self.breakpoints
            .values()
            .any(|bp| matches!(bp, Breakpoint::Function(_)))
    }

    pub fn has_enabled_function_breakpoints(&self) -> bool {
        self.breakpoints
            .values()
            .any(|bp| matches!(bp, Breakpoint::Function(b) if b.enabled))
    }

    fn enabled_source_numbers(&self, path: &Path) -> Vec<u32> {
        self.breakpoints
            .values()
            .filter_map(|bp| match bp {
                Breakpoint::Source(b) if b.enabled && b.path == path => Some(b.number),
                _ => None,
            })
            .collect()
    }

    fn enabled_function_numbers(&self) -> Vec<u32> {
        self.breakpoints
            .values()
            .filter_map(|bp| match bp {
                Breakpoint::Function(b) if b.enabled => Some(b.number),
                _ => None,
            })
            .collect()
    }

    /// Apply the adapter's `setBreakpoints` response for one source. The
    /// response array is paired positionally with the enabled breakpoints
    /// of `path`; adapter state of disabled breakpoints is dropped since
    /// the request replaced the whole per-source set.
    pub fn sync_source(&mut self, path: &Path, infos: &[BreakpointInfo]) {
        let numbers: Vec<u32> = self
            .breakpoints
            .values()
            .filter_map(|bp| match bp {
                Breakpoint::Source(b) if b.path == path => Some(b.number),
                _ => None,
            })
            .collect();
        for number in numbers {
            self.reset_adapter_state(number);
        }

        let enabled = self.enabled_source_numbers(path);
        for (number, info) in enabled.into_iter().zip(infos) {
            self.apply_info(number, info);
        }
    }

    /// Apply the adapter's `setFunctionBreakpoints` response. Replaces the
    /// adapter state of the entire function-breakpoint set.
    pub fn sync_functions(&mut self, infos: &[BreakpointInfo]) {
        let numbers: Vec<u32> = self
            .breakpoints
            .values()
            .filter_map(|bp| match bp {
                Breakpoint::Function(b) => Some(b.number),
                _ => None,
            })
            .collect();
        for number in numbers {
            self.reset_adapter_state(number);
        }

        let enabled = self.enabled_function_numbers();
        for (number, info) in enabled.into_iter().zip(infos) {
            self.apply_info(number, info);
        }
    }

    /// Apply an asynchronous `breakpoint` event. Unknown ids are ignored:
    /// the adapter may report breakpoints this client never created.
    pub fn apply_event(&mut self, info: &BreakpointInfo) {
        let Some(id) = info.id else { return };
        let Some(&number) = self.numbers_by_id.get(&id) else {
            return;
        };
        let Some(bp) = self.breakpoints.get_mut(&number) else {
            return;
        };
        match bp {
            Breakpoint::Source(b) => {
                b.verified = info.verified;
                b.message = info.message.clone();
                if let Some(line) = info.line {
                    b.line = line;
                }
            }
            Breakpoint::Function(b) => {
                b.verified = info.verified;
                b.message = info.message.clone();
                if let Some(line) = info.line {
                    b.resolved_line = Some(line);
                }
                if let Some(path) = info.source.as_ref().and_then(|s| s.path.as_deref()) {
                    b.resolved_path = Some(PathBuf::from(path));
                }
            }
        }
    }

    fn reset_adapter_state(&mut self, number: u32) {
        if let Some(bp) = self.breakpoints.get_mut(&number) {
            if let Some(id) = bp.id() {
                self.numbers_by_id.remove(&id);
            }
            bp.reset_adapter_state();
        }
    }

    fn apply_info(&mut self, number: u32, info: &BreakpointInfo) {
        let Some(bp) = self.breakpoints.get_mut(&number) else {
            return;
        };

        if let Some(id) = info.id {
            self.numbers_by_id.insert(id, number);
        }

        // A breakpoint without an id can never be confirmed by a later
        // `breakpoint` event, so take the adapter's word for it now.
        let verified = info.verified || info.id.is_none();
        let message = match (&info.message, verified) {
            (Some(m), _) => Some(m.clone()),
            (None, false) => Some(UNVERIFIED_MESSAGE.to_string()),
            (None, true) => None,
        };

        match bp {
            Breakpoint::Source(b) => {
                b.id = info.id;
                b.verified = verified;
                b.message = message;
            }
            Breakpoint::Function(b) => {
                b.id = info.id;
                b.verified = verified;
                b.message = message;
                b.resolved_line = info.line;
                b.resolved_path = info
                    .source
                    .as_ref()
                    .and_then(|s| s.path.as_deref())
                    .map(PathBuf::from);
            }
        }
    }
}
