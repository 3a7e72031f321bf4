//! Debuggee thread registry.
//!
//! Keeps the set of live threads reported by the adapter, their
//! running/stopped status, the focus thread (whose frames and variables the
//! console shows by default) and the frame the user selected per thread.

use crate::dap::types::ThreadInfo;
use crate::debugger::Error;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Thread {
    pub id: i64,
    pub name: String,
    pub running: bool,
    /// 0-based index into the thread's stack trace, reset on every stop.
    pub selected_frame: u32,
}

#[derive(Debug, Default)]
pub struct ThreadRegistry {
    threads: BTreeMap<i64, Thread>,
    in_focus: Option<i64>,
}

impl ThreadRegistry {
    /// Reconcile against a full `threads` response. Threads missing from
    /// `list` are dropped; surviving threads keep their status and selected
    /// frame; new threads start as running. Focus survives only if the
    /// focused thread does.
    pub fn update(&mut self, list: Vec<ThreadInfo>) {
        let mut next = BTreeMap::new();
        for info in list {
            let thread = match self.threads.remove(&info.id) {
                Some(mut known) => {
                    known.name = info.name;
                    known
                }
                None => Thread {
                    id: info.id,
                    name: info.name,
                    running: true,
                    selected_frame: 0,
                },
            };
            next.insert(info.id, thread);
        }
        self.threads = next;
        if let Some(focus) = self.in_focus
            && !self.threads.contains_key(&focus)
        {
            self.in_focus = None;
        }
    }

    pub fn add(&mut self, id: i64, name: String, running: bool) {
        self.threads.insert(
            id,
            Thread {
                id,
                name,
                running,
                selected_frame: 0,
            },
        );
    }

    pub fn remove(&mut self, id: i64) {
        self.threads.remove(&id);
        if self.in_focus == Some(id) {
            self.in_focus = None;
        }
    }

    pub fn mark_running(&mut self, id: i64) {
        if let Some(t) = self.threads.get_mut(&id) {
            t.running = true;
        }
    }

    /// Stopping a thread also resets its frame selection: the old stack is
    /// gone.
    pub fn mark_stopped(&mut self, id: i64) {
        if let Some(t) = self.threads.get_mut(&id) {
            t.running = false;
            t.selected_frame = 0;
        }
    }

    pub fn mark_all_running(&mut self) {
        for t in self.threads.values_mut() {
            t.running = true;
        }
    }

    pub fn mark_all_stopped(&mut self) {
        for t in self.threads.values_mut() {
            t.running = false;
            t.selected_frame = 0;
        }
    }

    pub fn set_focus(&mut self, id: i64) -> Result<(), Error> {
        if !self.threads.contains_key(&id) {
            return Err(Error::NoSuchThread(id));
        }
        self.in_focus = Some(id);
        Ok(())
    }

    pub fn focus(&self) -> Option<&Thread> {
        self.threads.get(&self.in_focus?)
    }

    pub fn focus_id(&self) -> Option<i64> {
        self.in_focus
    }

    /// First stopped thread by ascending id, for a deterministic default
    /// focus.
    pub fn first_stopped(&self) -> Option<&Thread> {
        self.threads.values().find(|t| !t.running)
    }

    pub fn all_running(&self) -> bool {
        self.threads.values().all(|t| t.running)
    }

    pub fn all_stopped(&self) -> bool {
        self.threads.values().all(|t| !t.running)
    }

    pub fn get(&self, id: i64) -> Option<&Thread> {
        self.threads.get(&id)
    }

    pub fn set_selected_frame(&mut self, id: i64, frame: u32) -> Result<(), Error> {
        let thread = self.threads.get_mut(&id).ok_or(Error::NoSuchThread(id))?;
        thread.selected_frame = frame;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Thread> {
        self.threads.values()
    }

    pub fn first(&self) -> Option<&Thread> {
        self.threads.values().next()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
