use crate::debugger::ConsoleHook;
use crate::ui::console::print::ExternalPrinter;
use std::sync::{Arc, Condvar, Mutex};

/// Prompt gate shared between the session core and the readline thread.
///
/// The readline thread consumes one permit per prompt: it blocks in
/// [`InputGate::wait`] until input is enabled, then closes the gate again so
/// the next prompt needs a fresh `start_input`. Closing an open gate before
/// the permit was consumed simply retracts it.
#[derive(Default)]
pub struct InputGate {
    allowed: Mutex<bool>,
    cond: Condvar,
}

impl InputGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self) {
        let mut allowed = self.allowed.lock().unwrap();
        *allowed = true;
        self.cond.notify_one();
    }

    pub fn close(&self) {
        *self.allowed.lock().unwrap() = false;
    }

    /// Block until input is enabled, consuming the permit.
    pub fn wait(&self) {
        let mut allowed = self.allowed.lock().unwrap();
        while !*allowed {
            allowed = self.cond.wait(allowed).unwrap();
        }
        *allowed = false;
    }
}

/// Terminal implementation of the session core's console surface.
pub struct TerminalHook {
    printer: ExternalPrinter,
    gate: Arc<InputGate>,
}

impl TerminalHook {
    pub fn new(printer: ExternalPrinter, gate: Arc<InputGate>) -> Self {
        Self { printer, gate }
    }
}

impl ConsoleHook for TerminalHook {
    fn output(&self, text: &str) {
        self.printer.print(text);
    }

    fn output_line(&self, text: &str) {
        self.printer.println(text);
    }

    fn start_input(&self) {
        self.gate.open();
    }

    fn stop_input(&self) {
        self.gate.close();
    }
}
