use anyhow::Context;
use clap::Parser;
use dapshell::debugger::adapter::{AdapterAction, AdapterDescriptor, GenericAdapter};
use dapshell::ui::console::AppBuilder;
use serde_json::Value;
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser, Debug)]
#[command(author, version, about = "Console debugger front-end for DAP adapters", long_about = None)]
struct Args {
    /// Debug adapter executable to spawn (DAP over stdio).
    #[clap(long)]
    adapter: PathBuf,

    /// Additional argument passed to the adapter process (repeatable).
    #[clap(long = "adapter-arg")]
    adapter_args: Vec<String>,

    /// JSON payload of the `launch` request.
    #[clap(long, conflicts_with = "attach")]
    launch: Option<String>,

    /// JSON payload of the `attach` request. Switches the session into
    /// attach mode.
    #[clap(long)]
    attach: Option<String>,

    /// Thread to pause right after an attach handshake.
    #[clap(long)]
    stop_thread: Option<i64>,
}

fn main() {
    let logger = env_logger::Logger::from_default_env();
    let filter = logger.filter();
    dapshell::log::LOGGER_SWITCHER.switch(logger, filter);

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Failed to debug target: {e:#}");
        exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let action = if args.attach.is_some() {
        AdapterAction::Attach
    } else {
        AdapterAction::Launch
    };
    let launch_arguments = parse_payload(args.launch.as_deref()).context("--launch payload")?;
    let attach_arguments = parse_payload(args.attach.as_deref()).context("--attach payload")?;

    let descriptor = AdapterDescriptor {
        program: args.adapter,
        args: args.adapter_args,
        action,
        launch_arguments,
        attach_arguments,
        adapter: Box::new(GenericAdapter {
            stop_thread: args.stop_thread,
        }),
    };

    let app = AppBuilder::new(Box::new(descriptor)).build()?;
    app.run()
}

fn parse_payload(raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Value::Object(serde_json::Map::new())),
    }
}
