use super::{
    BreakpointCommand, BreakpointIdentity, Command, CommandError, CommandResult, FrameCommand,
    ThreadCommand,
};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use chumsky::error::{Rich, RichPattern, RichReason};
use chumsky::prelude::{any, choice, end, just};
use chumsky::text::whitespace;
use chumsky::{Boxed, Parser, extra, text};
use itertools::Itertools;

pub const VAR_COMMAND: &str = "var";
pub const PRINT_COMMAND: &str = "print";
pub const PRINT_COMMAND_SHORT: &str = "p";
pub const BACKTRACE_COMMAND: &str = "backtrace";
pub const BACKTRACE_COMMAND_SHORT: &str = "bt";
pub const CONTINUE_COMMAND: &str = "continue";
pub const CONTINUE_COMMAND_SHORT: &str = "c";
pub const RUN_COMMAND: &str = "run";
pub const RUN_COMMAND_SHORT: &str = "r";
pub const PAUSE_COMMAND: &str = "pause";
pub const STEP_INTO_COMMAND: &str = "step";
pub const STEP_INTO_COMMAND_SHORT: &str = "s";
pub const STEP_OVER_COMMAND: &str = "next";
pub const STEP_OVER_COMMAND_SHORT: &str = "n";
pub const BREAK_COMMAND: &str = "break";
pub const BREAK_COMMAND_SHORT: &str = "b";
pub const BREAK_REMOVE_SUBCOMMAND: &str = "remove";
pub const BREAK_REMOVE_SUBCOMMAND_SHORT: &str = "r";
pub const BREAK_INFO_SUBCOMMAND: &str = "info";
pub const BREAK_ENABLE_SUBCOMMAND: &str = "enable";
pub const BREAK_DISABLE_SUBCOMMAND: &str = "disable";
pub const BREAK_CLEAR_SUBCOMMAND: &str = "clear";
pub const THREAD_COMMAND: &str = "thread";
pub const THREAD_COMMAND_INFO_SUBCOMMAND: &str = "info";
pub const THREAD_COMMAND_CURRENT_SUBCOMMAND: &str = "current";
pub const THREAD_COMMAND_SWITCH_SUBCOMMAND: &str = "switch";
pub const FRAME_COMMAND: &str = "frame";
pub const FRAME_COMMAND_SHORT: &str = "f";
pub const FRAME_COMMAND_INFO_SUBCOMMAND: &str = "info";
pub const FRAME_COMMAND_SWITCH_SUBCOMMAND: &str = "switch";
pub const LIST_COMMAND: &str = "list";
pub const LIST_COMMAND_SHORT: &str = "l";
pub const HELP_COMMAND: &str = "help";
pub const HELP_COMMAND_SHORT: &str = "h";

type Err<'a> = extra::Err<Rich<'a, char>>;

fn brkpt_at_line<'a>() -> impl chumsky::Parser<'a, &'a str, BreakpointIdentity, Err<'a>> + Clone {
    any()
        .filter(|c: &char| *c != ':')
        .repeated()
        .to_slice()
        .then_ignore(just(':'))
        .then(text::int(10).from_str().unwrapped())
        .map(|(file, line): (&str, u32)| BreakpointIdentity::Line(file.trim().to_string(), line))
        .padded()
}

fn brkpt_number<'a>() -> impl chumsky::Parser<'a, &'a str, BreakpointIdentity, Err<'a>> + Clone {
    text::int(10)
        .from_str()
        .unwrapped()
        .map(|number: u32| BreakpointIdentity::Number(number))
        .padded()
}

fn brkpt_at_fn<'a>() -> impl chumsky::Parser<'a, &'a str, BreakpointIdentity, Err<'a>> + Clone {
    any()
        .repeated()
        .to_slice()
        .map(|fn_name: &str| BreakpointIdentity::Function(fn_name.trim().to_string()))
}

fn command<'a, I>(ctx: &'static str, inner: I) -> Boxed<'a, 'a, &'a str, Command, Err<'a>>
where
    I: chumsky::Parser<'a, &'a str, Command, Err<'a>> + 'a,
{
    inner.then_ignore(end()).labelled(ctx).boxed()
}

impl Command {
    pub fn render_errors(src: &str, errors: Vec<Rich<char>>) -> String {
        let mut reports = vec![];

        for e in errors {
            fn generate_reports(
                src: &str,
                reports: &mut Vec<String>,
                err: &Rich<char>,
                reason: &RichReason<char>,
            ) {
                let report = Report::build(ReportKind::Error, "<command>", err.span().start)
                    .with_help("try \"help\" command");

                let report = match reason {
                    RichReason::ExpectedFound { expected, found } => report
                        .with_message(format!(
                            "{}, expected {}",
                            if found.is_some() {
                                "unexpected token in input"
                            } else {
                                "unexpected end of input"
                            },
                            if expected.is_empty() {
                                "something else".to_string()
                            } else {
                                expected
                                    .iter()
                                    .map(|e| match e {
                                        RichPattern::Token(tok) => tok.to_string(),
                                        RichPattern::Label(label) => label.to_string(),
                                        RichPattern::EndOfInput => "end of input".to_string(),
                                        _ => "something else".to_string(),
                                    })
                                    .join(", ")
                            }
                        ))
                        .with_label(
                            Label::new(("<command>", err.span().into_range()))
                                .with_message(format!(
                                    "unexpected token {}",
                                    err.found()
                                        .map(|t| t.to_string())
                                        .unwrap_or("EOL".to_string())
                                        .fg(Color::Red)
                                ))
                                .with_color(Color::Red),
                        ),
                    RichReason::Custom(msg) => report.with_message(msg).with_label(
                        Label::new(("<command>", err.span().into_range()))
                            .with_message(format!("{}", msg.fg(Color::Red)))
                            .with_color(Color::Red),
                    ),
                };

                let mut buf = vec![];
                _ = report
                    .finish()
                    .write_for_stdout(("<command>", Source::from(&src)), &mut buf);
                reports.push(
                    std::str::from_utf8(&buf[..])
                        .expect("infallible")
                        .to_string(),
                );
            }

            generate_reports(src, &mut reports, &e, e.reason());
        }

        reports.join("\n")
    }

    fn parser<'a>() -> impl Parser<'a, &'a str, Command, Err<'a>> {
        let ws_req = whitespace().at_least(1);
        let ws_req_or_end = ws_req.or(end());
        let op = |sym| whitespace().then(just(sym)).then(ws_req_or_end);
        let op_w_arg = |sym| whitespace().then(just(sym)).then(ws_req);
        let sub_op = |sym| just(sym).then(ws_req_or_end);
        let sub_op_w_arg = |sym| just(sym).then(ws_req);

        let op2 = |full, short| op(full).or(op(short));
        let op2_w_arg = |full, short| op_w_arg(full).or(op_w_arg(short));
        let sub_op2_w_arg = |full, short| sub_op_w_arg(full).or(sub_op_w_arg(short));

        let rest = || any().repeated().at_least(1).to_slice();

        let run = op2(RUN_COMMAND, RUN_COMMAND_SHORT).to(Command::Run);
        let r#continue = op2(CONTINUE_COMMAND, CONTINUE_COMMAND_SHORT).to(Command::Continue);
        let pause = op(PAUSE_COMMAND).to(Command::Pause);
        let step_into = op2(STEP_INTO_COMMAND, STEP_INTO_COMMAND_SHORT).to(Command::StepInto);
        let step_over = op2(STEP_OVER_COMMAND, STEP_OVER_COMMAND_SHORT).to(Command::StepOver);

        let variables = choice((
            op_w_arg(VAR_COMMAND)
                .ignore_then(rest())
                .map(|s: &str| Command::PrintVariables(Some(s.trim().to_string()))),
            op(VAR_COMMAND).to(Command::PrintVariables(None)),
        ))
        .boxed();

        let evaluate = op2_w_arg(PRINT_COMMAND, PRINT_COMMAND_SHORT)
            .ignore_then(rest())
            .map(|s: &str| Command::Evaluate(s.trim().to_string()))
            .boxed();

        let backtrace = op2(BACKTRACE_COMMAND, BACKTRACE_COMMAND_SHORT)
            .ignore_then(
                text::int(10)
                    .from_str()
                    .unwrapped()
                    .padded()
                    .or_not(),
            )
            .map(Command::PrintBacktrace)
            .boxed();

        let r#break = op2_w_arg(BREAK_COMMAND, BREAK_COMMAND_SHORT)
            .ignore_then(choice((
                sub_op2_w_arg(BREAK_REMOVE_SUBCOMMAND, BREAK_REMOVE_SUBCOMMAND_SHORT)
                    .ignore_then(choice((brkpt_number(), brkpt_at_line(), brkpt_at_fn())))
                    .map(|brkpt| Command::Breakpoint(BreakpointCommand::Remove(brkpt))),
                sub_op_w_arg(BREAK_ENABLE_SUBCOMMAND)
                    .ignore_then(text::int(10).from_str().unwrapped())
                    .map(|number| Command::Breakpoint(BreakpointCommand::Enable(number)))
                    .padded(),
                sub_op_w_arg(BREAK_DISABLE_SUBCOMMAND)
                    .ignore_then(text::int(10).from_str().unwrapped())
                    .map(|number| Command::Breakpoint(BreakpointCommand::Disable(number)))
                    .padded(),
                sub_op(BREAK_INFO_SUBCOMMAND)
                    .to(Command::Breakpoint(BreakpointCommand::Info)),
                sub_op(BREAK_CLEAR_SUBCOMMAND)
                    .to(Command::Breakpoint(BreakpointCommand::Clear)),
                choice((brkpt_at_line(), brkpt_at_fn()))
                    .map(|brkpt| Command::Breakpoint(BreakpointCommand::Add(brkpt))),
            )))
            .boxed();

        let thread = op_w_arg(THREAD_COMMAND)
            .ignore_then(choice((
                sub_op(THREAD_COMMAND_INFO_SUBCOMMAND)
                    .to(Command::Thread(ThreadCommand::Info)),
                sub_op(THREAD_COMMAND_CURRENT_SUBCOMMAND)
                    .to(Command::Thread(ThreadCommand::Current)),
                sub_op_w_arg(THREAD_COMMAND_SWITCH_SUBCOMMAND)
                    .ignore_then(text::int(10).from_str().unwrapped())
                    .map(|id| Command::Thread(ThreadCommand::Switch(id)))
                    .padded(),
            )))
            .boxed();

        let frame = op2_w_arg(FRAME_COMMAND, FRAME_COMMAND_SHORT)
            .ignore_then(choice((
                sub_op(FRAME_COMMAND_INFO_SUBCOMMAND).to(Command::Frame(FrameCommand::Info)),
                sub_op_w_arg(FRAME_COMMAND_SWITCH_SUBCOMMAND)
                    .ignore_then(text::int(10).from_str().unwrapped())
                    .map(|num| Command::Frame(FrameCommand::Switch(num)))
                    .padded(),
            )))
            .boxed();

        let list = op2(LIST_COMMAND, LIST_COMMAND_SHORT)
            .ignore_then(
                text::int(10)
                    .from_str()
                    .unwrapped()
                    .padded()
                    .or_not(),
            )
            .map(Command::SourceCode)
            .boxed();

        let help = op2(HELP_COMMAND, HELP_COMMAND_SHORT)
            .ignore_then(any().repeated().at_least(1).padded().to_slice().or_not())
            .map(|s: Option<&str>| Command::Help {
                command: s.map(|s| s.trim().to_string()),
            })
            .padded()
            .boxed();

        choice((
            command(VAR_COMMAND, variables),
            command(PRINT_COMMAND, evaluate),
            command(CONTINUE_COMMAND, r#continue),
            command(RUN_COMMAND, run),
            command(PAUSE_COMMAND, pause),
            command(STEP_INTO_COMMAND, step_into),
            command(STEP_OVER_COMMAND, step_over),
            command(BACKTRACE_COMMAND, backtrace),
            command(BREAK_COMMAND, r#break),
            command(THREAD_COMMAND, thread),
            command(FRAME_COMMAND, frame),
            command(LIST_COMMAND, list),
            command(HELP_COMMAND, help),
        ))
    }

    /// Parse input string into command.
    pub fn parse(input: &str) -> CommandResult<Command> {
        Self::parser()
            .parse(input)
            .into_result()
            .map_err(|e| CommandError::Parsing(Self::render_errors(input, e)))
    }
}
