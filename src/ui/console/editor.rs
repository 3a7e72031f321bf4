use crate::ui::command::parser::{
    BACKTRACE_COMMAND, BACKTRACE_COMMAND_SHORT, BREAK_CLEAR_SUBCOMMAND, BREAK_COMMAND,
    BREAK_COMMAND_SHORT, BREAK_DISABLE_SUBCOMMAND, BREAK_ENABLE_SUBCOMMAND, BREAK_INFO_SUBCOMMAND,
    BREAK_REMOVE_SUBCOMMAND, CONTINUE_COMMAND, CONTINUE_COMMAND_SHORT, FRAME_COMMAND,
    FRAME_COMMAND_INFO_SUBCOMMAND, FRAME_COMMAND_SHORT, FRAME_COMMAND_SWITCH_SUBCOMMAND,
    HELP_COMMAND, HELP_COMMAND_SHORT, LIST_COMMAND, LIST_COMMAND_SHORT, PAUSE_COMMAND,
    PRINT_COMMAND, PRINT_COMMAND_SHORT, RUN_COMMAND, RUN_COMMAND_SHORT, STEP_INTO_COMMAND,
    STEP_INTO_COMMAND_SHORT, STEP_OVER_COMMAND, STEP_OVER_COMMAND_SHORT, THREAD_COMMAND,
    THREAD_COMMAND_CURRENT_SUBCOMMAND, THREAD_COMMAND_INFO_SUBCOMMAND,
    THREAD_COMMAND_SWITCH_SUBCOMMAND, VAR_COMMAND,
};
use crossterm::style::{Color, Stylize};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::MemHistory;
use rustyline::line_buffer::LineBuffer;
use rustyline::validate::MatchingBracketValidator;
use rustyline::{Changeset, CompletionType, Config, Context, Editor};
use rustyline_derive::{Helper, Hinter, Validator};
use std::borrow::Cow;
use std::borrow::Cow::{Borrowed, Owned};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use trie_rs::{Trie, TrieBuilder};

pub type CliEditor = Editor<RLHelper, MemHistory>;

struct CommandHint {
    short: Option<String>,
    long: String,
    subcommands: Vec<String>,
}

impl CommandHint {
    fn long(&self) -> String {
        self.long.clone()
    }

    fn display_with_short(&self) -> String {
        if let Some(ref short) = self.short {
            if self.long.starts_with(short) {
                format!(
                    "{}{}",
                    short.clone().bold().underlined(),
                    &self.long[short.len()..]
                )
            } else {
                format!("{}|{}", &self.long, short.clone().bold().underlined())
            }
        } else {
            self.long()
        }
    }
}

impl From<&str> for CommandHint {
    fn from(value: &str) -> Self {
        CommandHint {
            short: None,
            long: value.to_string(),
            subcommands: vec![],
        }
    }
}

impl From<(&str, &str)> for CommandHint {
    fn from((short, long): (&str, &str)) -> Self {
        CommandHint {
            short: Some(short.to_string()),
            long: long.to_string(),
            subcommands: vec![],
        }
    }
}

pub struct CommandCompleter {
    commands: Vec<CommandHint>,
    subcommand_hints: HashMap<String, Vec<String>>,
    file_hints: Trie<u8>,
}

impl CommandCompleter {
    fn new(commands: impl IntoIterator<Item = CommandHint>) -> Self {
        let commands: Vec<CommandHint> = commands.into_iter().collect();
        let subcommand_hints = commands
            .iter()
            .flat_map(|cmd| {
                let mut hints = vec![(cmd.long.clone(), cmd.subcommands.clone())];
                if let Some(ref short) = cmd.short {
                    hints.push((short.clone(), cmd.subcommands.clone()));
                }
                hints
            })
            .collect::<HashMap<String, Vec<String>>>();

        Self {
            commands,
            subcommand_hints,
            file_hints: TrieBuilder::new().build(),
        }
    }

    /// Replace path hints offered after `break`. Fed from sources the
    /// debugger has seen: breakpoint paths and listed files.
    pub fn replace_file_hints(&mut self, files: impl IntoIterator<Item = String>) {
        let mut builder = TrieBuilder::new();
        files.into_iter().for_each(|path| {
            builder.push(path);
        });
        self.file_hints = builder.build();
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let mut words = line.split_whitespace();
        let first = words.next().unwrap_or_default();
        let second = words.next();
        let more = words.next().is_some();

        // `break <partial-path>` completes against known source files
        if (first == BREAK_COMMAND || first == BREAK_COMMAND_SHORT)
            && !more
            && let Some(partial) = second
            && line.ends_with(partial)
        {
            let variants = self.file_hints.predictive_search(partial);
            if !variants.is_empty() {
                let pos = line.len() - partial.len();
                let pairs = variants
                    .iter()
                    .map(|v| {
                        let path = std::str::from_utf8(v.as_slice()).unwrap_or_default();
                        Pair {
                            display: path.to_string(),
                            replacement: format!("{path}:"),
                        }
                    })
                    .collect();
                return Ok((pos, pairs));
            }
        }

        // `<command> <partial-subcommand>`
        if !more
            && let Some(subcommands) = self.subcommand_hints.get(first)
            && !subcommands.is_empty()
            && (second.is_some() || line.ends_with(' '))
        {
            let partial = second.unwrap_or_default();
            let pos = line.len() - partial.len();
            let pairs = subcommands
                .iter()
                .filter(|subcmd| subcmd.starts_with(partial))
                .map(|subcmd| Pair {
                    display: subcmd.to_string(),
                    replacement: subcmd.to_string(),
                })
                .collect();
            return Ok((pos, pairs));
        }

        let pairs = self
            .commands
            .iter()
            .filter(|&cmd| cmd.long.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.display_with_short(),
                replacement: cmd.long(),
            })
            .collect();
        Ok((0, pairs))
    }
}

#[derive(Helper, Hinter, Validator)]
pub struct RLHelper {
    pub completer: Arc<Mutex<CommandCompleter>>,
    highlighter: MatchingBracketHighlighter,
    #[rustyline(Validator)]
    validator: MatchingBracketValidator,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    pub colored_prompt: String,
}

impl Completer for RLHelper {
    type Candidate = <CommandCompleter as Completer>::Candidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        self.completer.lock().unwrap().complete(line, pos, ctx)
    }

    fn update(&self, line: &mut LineBuffer, start: usize, elected: &str, cl: &mut Changeset) {
        self.completer
            .lock()
            .unwrap()
            .update(line, start, elected, cl)
    }
}

impl Highlighter for RLHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Borrowed(&self.colored_prompt)
        } else {
            Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned("\x1b[1m".to_owned() + hint + "\x1b[m")
    }

    fn highlight_char(&self, line: &str, pos: usize) -> bool {
        self.highlighter.highlight_char(line, pos)
    }
}

pub fn create_editor(promt: &str) -> anyhow::Result<CliEditor> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let commands = [
        VAR_COMMAND.into(),
        (PRINT_COMMAND_SHORT, PRINT_COMMAND).into(),
        (CONTINUE_COMMAND_SHORT, CONTINUE_COMMAND).into(),
        (RUN_COMMAND_SHORT, RUN_COMMAND).into(),
        PAUSE_COMMAND.into(),
        (STEP_INTO_COMMAND_SHORT, STEP_INTO_COMMAND).into(),
        (STEP_OVER_COMMAND_SHORT, STEP_OVER_COMMAND).into(),
        (BACKTRACE_COMMAND_SHORT, BACKTRACE_COMMAND).into(),
        CommandHint {
            short: Some(BREAK_COMMAND_SHORT.to_string()),
            long: BREAK_COMMAND.to_string(),
            subcommands: vec![
                BREAK_REMOVE_SUBCOMMAND.to_string(),
                BREAK_INFO_SUBCOMMAND.to_string(),
                BREAK_ENABLE_SUBCOMMAND.to_string(),
                BREAK_DISABLE_SUBCOMMAND.to_string(),
                BREAK_CLEAR_SUBCOMMAND.to_string(),
            ],
        },
        CommandHint {
            short: None,
            long: THREAD_COMMAND.to_string(),
            subcommands: vec![
                THREAD_COMMAND_INFO_SUBCOMMAND.to_string(),
                THREAD_COMMAND_SWITCH_SUBCOMMAND.to_string(),
                THREAD_COMMAND_CURRENT_SUBCOMMAND.to_string(),
            ],
        },
        CommandHint {
            short: Some(FRAME_COMMAND_SHORT.to_string()),
            long: FRAME_COMMAND.to_string(),
            subcommands: vec![
                FRAME_COMMAND_INFO_SUBCOMMAND.to_string(),
                FRAME_COMMAND_SWITCH_SUBCOMMAND.to_string(),
            ],
        },
        (LIST_COMMAND_SHORT, LIST_COMMAND).into(),
        (HELP_COMMAND_SHORT, HELP_COMMAND).into(),
        ("q", "quit").into(),
    ];

    let h = RLHelper {
        completer: Arc::new(Mutex::new(CommandCompleter::new(commands))),
        highlighter: MatchingBracketHighlighter::new(),
        hinter: HistoryHinter {},
        colored_prompt: format!("{}", promt.with(Color::DarkGreen)),
        validator: MatchingBracketValidator::new(),
    };

    let mut editor = Editor::with_history(config, MemHistory::new())?;
    editor.set_helper(Some(h));
    Ok(editor)
}
