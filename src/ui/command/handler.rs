//! Maps parsed console commands onto session core operations and renders
//! the results.

use super::{
    BreakpointCommand, BreakpointIdentity, Command, CommandError, FrameCommand, ThreadCommand, help,
};
use crate::dap::types::StackFrame;
use crate::debugger::breakpoint::Breakpoint;
use crate::debugger::{ConsoleHook, Debugger, Error};
use crate::ui::console::print::ExternalPrinter;
use crate::ui::console::print::style::{
    ErrorView, FilePathView, FunctionNameView, ImportantView, KeywordView,
};
use std::path::Path;

pub struct CommandHandler<'a, H: ConsoleHook> {
    debugger: &'a mut Debugger<H>,
    printer: &'a ExternalPrinter,
}

impl<'a, H: ConsoleHook> CommandHandler<'a, H> {
    pub fn new(debugger: &'a mut Debugger<H>, printer: &'a ExternalPrinter) -> Self {
        Self { debugger, printer }
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), CommandError> {
        match cmd {
            Command::Run => self.debugger.run()?,
            Command::Continue => self.debugger.continue_execution()?,
            Command::Pause => self.debugger.pause()?,
            Command::StepInto => self.debugger.step_into()?,
            Command::StepOver => self.debugger.step_over()?,
            Command::Breakpoint(cmd) => self.handle_breakpoint(cmd)?,
            Command::Thread(cmd) => self.handle_thread(cmd)?,
            Command::Frame(cmd) => self.handle_frame(cmd)?,
            Command::PrintBacktrace(levels) => self.handle_backtrace(levels)?,
            Command::PrintVariables(scope) => self.handle_variables(scope.as_deref())?,
            Command::Evaluate(expression) => {
                let result = self.debugger.evaluate(&expression)?;
                match result.type_name {
                    Some(type_name) => self
                        .printer
                        .println(format!("{} ({})", result.result, KeywordView::from(type_name))),
                    None => self.printer.println(result.result),
                }
            }
            Command::SourceCode(bounds) => self.handle_list(bounds.unwrap_or(5))?,
            Command::Help { command } => self.printer.println(help::for_command(command.as_deref())),
        }
        Ok(())
    }

    fn handle_breakpoint(&mut self, cmd: BreakpointCommand) -> Result<(), CommandError> {
        match cmd {
            BreakpointCommand::Add(BreakpointIdentity::Line(file, line)) => {
                let number = self.debugger.add_breakpoint(&file, line)?;
                self.print_new_breakpoint(number)?;
            }
            BreakpointCommand::Add(BreakpointIdentity::Function(function)) => {
                let number = self.debugger.add_function_breakpoint(&function)?;
                self.print_new_breakpoint(number)?;
            }
            BreakpointCommand::Add(BreakpointIdentity::Number(_)) => {
                self.printer
                    .println(ErrorView::from("a breakpoint number is not a location"));
            }
            BreakpointCommand::Remove(identity) => {
                let numbers = self.matching_numbers(&identity);
                if numbers.is_empty() {
                    self.printer.println("No matching breakpoints");
                }
                for number in numbers {
                    self.debugger.remove_breakpoint(number)?;
                    self.printer.println(format!("Removed breakpoint {number}"));
                }
            }
            BreakpointCommand::Enable(number) => {
                self.debugger.set_breakpoint_enabled(number, true)?;
                self.print_breakpoint_status(number)?;
            }
            BreakpointCommand::Disable(number) => {
                self.debugger.set_breakpoint_enabled(number, false)?;
                self.printer.println(format!("Breakpoint {number} disabled"));
            }
            BreakpointCommand::Info => {
                let breakpoints = self.debugger.breakpoints_snapshot();
                if breakpoints.is_empty() {
                    self.printer.println("No breakpoints set");
                }
                for bp in &breakpoints {
                    self.printer.println(render_breakpoint(bp));
                    if let Some(message) = bp.message() {
                        if !bp.verified() {
                            self.printer.println(format!("     {}", ErrorView::from(message)));
                        }
                    }
                }
            }
            BreakpointCommand::Clear => {
                self.debugger.clear_breakpoints()?;
                self.printer.println(ImportantView::from("All breakpoints removed"));
            }
        }
        Ok(())
    }

    fn matching_numbers(&self, identity: &BreakpointIdentity) -> Vec<u32> {
        self.debugger
            .breakpoints_snapshot()
            .iter()
            .filter(|bp| match (identity, bp) {
                (BreakpointIdentity::Number(n), bp) => bp.number() == *n,
                (BreakpointIdentity::Line(file, line), Breakpoint::Source(b)) => {
                    b.line == *line && (b.path == Path::new(file) || b.path.ends_with(file))
                }
                (BreakpointIdentity::Function(f), Breakpoint::Function(b)) => b.function == *f,
                _ => false,
            })
            .map(Breakpoint::number)
            .collect()
    }

    fn print_new_breakpoint(&mut self, number: u32) -> Result<(), CommandError> {
        self.printer.println(format!("New breakpoint {number}"));
        self.print_breakpoint_status(number)
    }

    fn print_breakpoint_status(&mut self, number: u32) -> Result<(), CommandError> {
        let breakpoints = self.debugger.breakpoints_snapshot();
        let Some(bp) = breakpoints.iter().find(|bp| bp.number() == number) else {
            return Err(Error::NoSuchBreakpoint(number).into());
        };
        self.printer.println(render_breakpoint(bp));
        if !bp.verified()
            && let Some(message) = bp.message()
        {
            self.printer.println(format!("     {}", ErrorView::from(message)));
        }
        Ok(())
    }

    fn handle_thread(&mut self, cmd: ThreadCommand) -> Result<(), CommandError> {
        match cmd {
            ThreadCommand::Info => {
                let focus = self.debugger.focus_thread().map(|t| t.id);
                for thread in self.debugger.get_threads()? {
                    let marker = if focus == Some(thread.id) { "*" } else { " " };
                    let status = if thread.running { "running" } else { "stopped" };
                    self.printer.println(format!(
                        "{marker}#{} {} ({})",
                        thread.id,
                        FunctionNameView::from(&thread.name),
                        KeywordView::from(status),
                    ));
                }
            }
            ThreadCommand::Current => match self.debugger.focus_thread() {
                Some(thread) => self.printer.println(format!(
                    "#{} {}",
                    thread.id,
                    FunctionNameView::from(&thread.name)
                )),
                None => self.printer.println("No thread in focus"),
            },
            ThreadCommand::Switch(id) => {
                self.debugger.set_focus_thread(id)?;
                self.printer.println(format!("Switched to thread {id}"));
            }
        }
        Ok(())
    }

    fn handle_frame(&mut self, cmd: FrameCommand) -> Result<(), CommandError> {
        match cmd {
            FrameCommand::Info => {
                let index = self.debugger.selected_frame().unwrap_or(0);
                let frames = self
                    .debugger
                    .get_stack_trace(None, Some(i64::from(index) + 1))?;
                match frames.into_iter().nth(index as usize) {
                    Some(frame) => self.printer.println(render_frame(index, &frame)),
                    None => return Err(Error::NoSuchFrame(index).into()),
                }
            }
            FrameCommand::Switch(index) => {
                let frame = self.debugger.set_selected_frame(index)?;
                self.printer.println(render_frame(index, &frame));
            }
        }
        Ok(())
    }

    fn handle_backtrace(&mut self, levels: Option<i64>) -> Result<(), CommandError> {
        let frames = self.debugger.get_stack_trace(None, levels)?;
        for (index, frame) in frames.iter().enumerate() {
            self.printer.println(render_frame(index as u32, frame));
        }
        Ok(())
    }

    fn handle_variables(&mut self, scope: Option<&str>) -> Result<(), CommandError> {
        for scope in self.debugger.get_variables(scope)? {
            self.printer
                .println(format!("{}:", KeywordView::from(&scope.name)));
            for variable in &scope.variables {
                self.printer
                    .println(format!("  {} = {}", variable.name, variable.value));
            }
        }
        Ok(())
    }

    fn handle_list(&mut self, bounds: u32) -> Result<(), CommandError> {
        let index = self.debugger.selected_frame().unwrap_or(0);
        let frames = self
            .debugger
            .get_stack_trace(None, Some(i64::from(index) + 1))?;
        let Some(frame) = frames.into_iter().nth(index as usize) else {
            return Err(Error::NoSuchFrame(index).into());
        };
        let Some(source) = frame.source else {
            self.printer.println("No source for the current frame");
            return Ok(());
        };

        let start = frame.line.saturating_sub(bounds).max(1);
        let lines = self
            .debugger
            .get_source_lines(&source, start, bounds * 2 + 1);
        if lines.is_empty() {
            self.printer.println("No source available");
            return Ok(());
        }
        for (i, text) in lines.iter().enumerate() {
            let line_no = start + i as u32;
            let marker = if line_no == frame.line { ">" } else { " " };
            self.printer.println(format!("{marker}{line_no:>4} {text}"));
        }
        Ok(())
    }
}

fn render_breakpoint(bp: &Breakpoint) -> String {
    let status = if bp.enabled() { "enabled" } else { "disabled" };
    let verification = if bp.verified() { "verified" } else { "pending" };
    match bp {
        Breakpoint::Source(b) => format!(
            "{}: {}:{} ({status}, {verification})",
            b.number,
            FilePathView::from(b.path.display()),
            b.line,
        ),
        Breakpoint::Function(b) => {
            let mut line = format!(
                "{}: fn {} ({status}, {verification})",
                b.number,
                FunctionNameView::from(&b.function),
            );
            if let (Some(path), Some(resolved_line)) = (&b.resolved_path, b.resolved_line) {
                line.push_str(&format!(
                    " at {}:{resolved_line}",
                    FilePathView::from(path.display())
                ));
            }
            line
        }
    }
}

fn render_frame(index: u32, frame: &StackFrame) -> String {
    let place = frame
        .source
        .as_ref()
        .and_then(|s| s.path.clone().or_else(|| s.name.clone()));
    match place {
        Some(place) => format!(
            "#{index} {} at {}:{}",
            FunctionNameView::from(&frame.name),
            FilePathView::from(place),
            frame.line,
        ),
        None => format!("#{index} {}", FunctionNameView::from(&frame.name)),
    }
}
