use crate::dap::types::Event;
use crate::debugger::adapter::AdapterFactory;
use crate::debugger::{Debugger, EventOutcome, SessionState};
use crate::ui::command::handler::CommandHandler;
use crate::ui::command::{Command, CommandError};
use crate::ui::console::editor::{CliEditor, CommandCompleter};
use crate::ui::console::hook::{InputGate, TerminalHook};
use crate::ui::console::print::ExternalPrinter;
use crate::ui::console::print::style::ErrorView;
use rustyline::error::ReadlineError;
use std::process::exit;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, Once};
use std::thread;

pub mod editor;
pub mod hook;
pub mod print;

const WELCOME_TEXT: &str = r#"
dapshell greets, type `help` for the command list
"#;
const PROMT: &str = "(dap) ";

enum UserAction {
    /// New command from user received
    Cmd(String),
    /// SIGINT arrived while no prompt was active
    Interrupt,
    /// Terminate application
    Terminate,
    /// Do nothing
    Nop,
}

enum AppEvent {
    User(UserAction),
    Session(u64, Event),
}

pub struct AppBuilder {
    factory: Box<dyn AdapterFactory>,
}

impl AppBuilder {
    pub fn new(factory: Box<dyn AdapterFactory>) -> Self {
        Self { factory }
    }

    pub fn build(self) -> anyhow::Result<TerminalApplication> {
        let mut editor = editor::create_editor(PROMT)?;
        let completer = Arc::clone(
            &editor
                .helper_mut()
                .expect("helper must exist")
                .completer,
        );

        let gate = InputGate::new();
        let hook = TerminalHook::new(ExternalPrinter::new_for_editor(&mut editor)?, gate.clone());

        let (app_tx, app_rx) = channel::<AppEvent>();

        // Session events come from client reader threads; bridge them into
        // the single application channel.
        let (event_tx, event_rx) = channel::<(u64, Event)>();
        {
            let app_tx = app_tx.clone();
            thread::spawn(move || {
                while let Ok((generation, event)) = event_rx.recv() {
                    if app_tx.send(AppEvent::Session(generation, event)).is_err() {
                        return;
                    }
                }
            });
        }

        let debugger = Debugger::new(self.factory, hook, event_tx);

        Ok(TerminalApplication {
            debugger,
            editor,
            gate,
            completer,
            app_tx,
            app_rx,
        })
    }
}

pub struct TerminalApplication {
    debugger: Debugger<TerminalHook>,
    editor: CliEditor,
    gate: Arc<InputGate>,
    completer: Arc<Mutex<CommandCompleter>>,
    app_tx: Sender<AppEvent>,
    app_rx: Receiver<AppEvent>,
}

impl TerminalApplication {
    pub fn run(mut self) -> anyhow::Result<()> {
        static CTRLC_ONCE: Once = Once::new();
        {
            let app_tx = self.app_tx.clone();
            CTRLC_ONCE.call_once(|| {
                // this handler is called only while the debuggee runs,
                // otherwise ctrl+c is handled by `readline`
                ctrlc::set_handler(move || {
                    _ = app_tx.send(AppEvent::User(UserAction::Interrupt));
                })
                .expect("error setting Ctrl-C handler")
            });
        }

        let printer = ExternalPrinter::new_for_editor(&mut self.editor)?;
        let error_printer = ExternalPrinter::new_for_editor(&mut self.editor)?;

        // readline thread: prompts only when the input gate grants a permit
        {
            let gate = self.gate.clone();
            let app_tx = self.app_tx.clone();
            let mut editor = self.editor;
            thread::spawn(move || {
                println!("{WELCOME_TEXT}");

                loop {
                    gate.wait();

                    let line = editor.readline(PROMT);
                    match line {
                        Ok(input) => {
                            if input == "q" || input == "quit" {
                                _ = app_tx.send(AppEvent::User(UserAction::Terminate));
                                break;
                            } else {
                                _ = editor.add_history_entry(&input);
                                _ = app_tx.send(AppEvent::User(UserAction::Cmd(input)));
                            }
                        }
                        Err(err) => match err {
                            ReadlineError::Interrupted => {
                                // SIGINT at the prompt: drop the line, take
                                // the next command
                                _ = app_tx.send(AppEvent::User(UserAction::Nop));
                            }
                            ReadlineError::Eof => {
                                _ = app_tx.send(AppEvent::User(UserAction::Terminate));
                                break;
                            }
                            _ => {
                                error_printer.println(ErrorView::from(err));
                                _ = app_tx.send(AppEvent::User(UserAction::Terminate));
                                break;
                            }
                        },
                    }
                }
            });
        }

        if let Err(e) = self.debugger.start() {
            printer.println(ErrorView::from(format!("Failed to debug target: {e:#}")));
            return Err(e.into());
        }

        loop {
            let Ok(event) = self.app_rx.recv() else {
                return Ok(());
            };

            match event {
                AppEvent::User(UserAction::Cmd(command)) => {
                    if !command.is_empty() {
                        let result = Command::parse(&command).and_then(|cmd| {
                            CommandHandler::new(&mut self.debugger, &printer).handle_command(cmd)
                        });
                        if let Err(e) = result {
                            Self::handle_error(&printer, e);
                        }
                    }
                    self.debugger.refresh_input_gate();
                }
                AppEvent::User(UserAction::Nop) => self.debugger.refresh_input_gate(),
                AppEvent::User(UserAction::Interrupt) => {
                    if self.debugger.state() == SessionState::Running
                        && let Err(e) = self.debugger.pause()
                    {
                        Self::handle_error(&printer, e.into());
                    }
                }
                AppEvent::User(UserAction::Terminate) => {
                    self.debugger.close_session();
                    return Ok(());
                }
                AppEvent::Session(generation, event) => {
                    match self.debugger.process_event(generation, event) {
                        Ok(EventOutcome::Continue) => {}
                        Ok(EventOutcome::Exit) => return Ok(()),
                        Err(e) => Self::handle_error(&printer, e.into()),
                    }
                    self.completer
                        .lock()
                        .unwrap()
                        .replace_file_hints(self.debugger.known_source_paths());
                }
            }
        }
    }

    fn handle_error(printer: &ExternalPrinter, error: CommandError) {
        match error {
            CommandError::Parsing(pretty_error) => {
                printer.println(pretty_error);
            }
            CommandError::Handle(ref err) if err.is_fatal() => {
                printer.println(ErrorView::from("Shutdown debugger"));
                printer.println(ErrorView::from(format!("Fatal error: {error:#}")));
                exit(1);
            }
            CommandError::Handle(_) => {
                printer.println(ErrorView::from(format!("Error: {error:#}")));
            }
        }
    }
}
