//! Interactive console for calling methods without an HTTP client.
//!
//! Launch with `jsonrpc-dispatch repl`. Type `<method> [json params]` to
//! dispatch a call, `/help` for console commands, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::Value;
use tokio::runtime::Handle;

use jsonrpc_dispatch::{Dispatcher, JsonRpcRequest, RequestId};

use crate::handlers::MethodTable;

/// Available console commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/methods", "List registered methods"),
    ("/schema", "Show the parameter schema of a method"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the console"),
];

/// Tab completion for console commands and method names.
struct ConsoleHelper {
    methods: Vec<String>,
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if input.starts_with('/') && !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Method name, either bare or as the argument of /schema.
        let (start, prefix) = match input.strip_prefix("/schema ") {
            Some(rest) => (input.len() - rest.len(), rest),
            None if !input.contains(' ') => (0, input),
            None => return Ok((pos, Vec::new())),
        };
        let matches: Vec<Pair> = self
            .methods
            .iter()
            .filter(|m| m.starts_with(prefix.trim()))
            .map(|m| Pair {
                display: m.clone(),
                replacement: format!("{m} "),
            })
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ConsoleHelper {}
impl Validator for ConsoleHelper {}
impl Helper for ConsoleHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// A parsed console line.
#[derive(Debug, PartialEq)]
enum Input {
    Command { name: String, args: String },
    Call { method: String, params: Option<Value> },
}

fn parse_input(line: &str) -> Result<Input, String> {
    if let Some(rest) = line.strip_prefix('/') {
        let mut parts = rest.splitn(2, ' ');
        let name = parts.next().unwrap_or("").to_string();
        let args = parts.next().unwrap_or("").trim().to_string();
        return Ok(Input::Command { name, args });
    }

    let (method, raw_params) = match line.split_once(char::is_whitespace) {
        Some((method, rest)) => (method, rest.trim()),
        None => (line, ""),
    };
    let params = if raw_params.is_empty() {
        None
    } else {
        Some(serde_json::from_str(raw_params).map_err(|e| format!("Params are not valid JSON: {e}"))?)
    };

    Ok(Input::Call {
        method: method.to_string(),
        params,
    })
}

/// Run the interactive console. Must be called off the async runtime's
/// worker threads (e.g. from `spawn_blocking`); calls are driven on `runtime`.
pub fn run(table: MethodTable, runtime: Handle) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mjsonrpc-dispatch v{}\x1b[0m \x1b[90m\u{2014} JSON-RPC console\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Type \x1b[36m<method> [json]\x1b[0m to call, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ConsoleHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ConsoleHelper {
        methods: table.methods().iter().map(|m| m.method.clone()).collect(),
    }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".jsonrpc_dispatch_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let dispatcher = table.dispatcher();
    let mut next_id: i64 = 1;
    let prompt = " \x1b[36mrpc>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match parse_input(line) {
                    Ok(Input::Command { name, args }) => match name.as_str() {
                        "exit" | "quit" => {
                            eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                            break;
                        }
                        "" | "help" | "h" | "?" => cmd_help(),
                        "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                        "methods" => cmd_methods(&table),
                        "schema" => cmd_schema(&args, &table),
                        _ => {
                            eprintln!("  Unknown command '/{name}'. Type /help for commands.");
                        }
                    },
                    Ok(Input::Call { method, params }) => {
                        let request = JsonRpcRequest::new(RequestId::from(next_id), method, params);
                        next_id += 1;
                        cmd_call(&dispatcher, &runtime, request);
                    }
                    Err(message) => eprintln!("  {message}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Calls:  hello {{\"name\": \"Ada\"}}");
    eprintln!();
}

fn cmd_methods(table: &MethodTable) {
    eprintln!();
    eprintln!("  {} method(s) registered:", table.len());
    eprintln!();
    for bound in table.methods() {
        eprintln!(
            "    {:<20} {:<12} {}",
            bound.method, bound.definition.name, bound.definition.description
        );
    }
    eprintln!();
}

fn cmd_schema(args: &str, table: &MethodTable) {
    if args.is_empty() {
        eprintln!("  Usage: /schema <method>");
        return;
    }
    match table.get(args) {
        Some(bound) => match &bound.definition.schema {
            Some(schema) => {
                let rendered = serde_json::to_string_pretty(schema.as_json())
                    .unwrap_or_else(|e| e.to_string());
                eprintln!("{rendered}");
            }
            None => eprintln!("  '{args}' accepts any params."),
        },
        None => eprintln!("  No method named '{args}'."),
    }
}

fn cmd_call(dispatcher: &Dispatcher, runtime: &Handle, request: JsonRpcRequest) {
    let response = runtime.block_on(dispatcher.handle(request));
    match serde_json::to_string_pretty(&response) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("  Failed to render response: {e}"),
    }
}
