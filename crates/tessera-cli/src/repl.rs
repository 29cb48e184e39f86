//! Interactive REPL (Read-Eval-Print-Loop) for TesseraDB.
//!
//! Provides an interactive shell with command history, line editing, and
//! keyword completion over one in-process engine.

use std::borrow::Cow;
use std::time::Instant;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{CompletionType, Config, Editor};
use tracing::{debug, error};

use tessera_engine::Engine;

use crate::commands::MetaCommand;
use crate::config::CliConfig;
use crate::formatter::{format_view, OutputFormat};

/// The REPL prompt shown when waiting for input.
const PROMPT: &str = "tessera> ";

/// REPL helper for rustyline.
struct ReplHelper {
    /// Language keywords for completion.
    keywords: Vec<String>,
}

impl ReplHelper {
    fn new() -> Self {
        Self {
            keywords: [
                "CREATE",
                "TABLE",
                "INSERT",
                "SELECT",
                "UPDATE",
                "DELETE",
                "JOIN",
                "ON",
                "SET",
                "FROM",
                "TO",
                "WHERE",
                "TRUE",
                "FALSE",
                "INT32",
                "STRING",
                "BYTES",
                "BOOL",
                "unique",
                "key",
                "autoincrement",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == '{' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);

        let word = &line[start..pos];
        let word_upper = word.to_uppercase();

        let matches: Vec<Pair> = self
            .keywords
            .iter()
            .filter(|kw| kw.to_uppercase().starts_with(&word_upper))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw.clone(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for ReplHelper {
    fn validate(&self, _ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

impl rustyline::Helper for ReplHelper {}

/// The interactive shell.
pub struct Repl {
    engine: Engine,
    config: CliConfig,
    format: OutputFormat,
    timing: bool,
}

impl Repl {
    /// Creates a shell over a fresh engine.
    pub fn new(config: CliConfig, format: OutputFormat) -> Self {
        let timing = config.timing;
        Self {
            engine: Engine::new(),
            config,
            format,
            timing,
        }
    }

    /// Runs the read-eval-print loop until `\quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let editor_config = Config::builder()
            .completion_type(CompletionType::List)
            .max_history_size(self.config.history_size)?
            .build();
        let mut editor: Editor<ReplHelper, DefaultHistory> =
            Editor::with_config(editor_config)?;
        editor.set_helper(Some(ReplHelper::new()));

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            // A missing history file is expected on first launch.
            let _ = editor.load_history(path);
        }

        println!("TesseraDB shell. Type \\help for help, \\quit to exit.");

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(line)?;

                    if line.starts_with('\\') {
                        match self.run_meta(line) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(e) => eprintln!("error: {}", e),
                        }
                    } else {
                        self.run_statement(line);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(e) => {
                    error!("readline failed: {}", e);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            if let Err(e) = editor.save_history(path) {
                debug!("could not save history: {}", e);
            }
        }
        Ok(())
    }

    /// Executes one statement and prints its result.
    fn run_statement(&self, line: &str) {
        let started = Instant::now();
        match self.engine.execute(line) {
            Ok(Some(view)) => {
                println!("{}", format_view(&view, self.format).trim_end());
                println!("{} row(s)", view.len());
            }
            Ok(None) => println!("ok"),
            Err(e) => eprintln!("error: {}", e),
        }
        if self.timing {
            println!("time: {:.3?}", started.elapsed());
        }
    }

    /// Executes one meta command; returns `true` to leave the loop.
    fn run_meta(&mut self, line: &str) -> Result<bool> {
        match MetaCommand::parse(line)? {
            MetaCommand::Help => println!("{}", MetaCommand::help_text()),
            MetaCommand::Quit => return Ok(true),
            MetaCommand::Tables => {
                let names = self.engine.table_names();
                if names.is_empty() {
                    println!("no tables");
                } else {
                    for name in names {
                        println!("{}", name);
                    }
                }
            }
            MetaCommand::Format(None) => println!("format: {}", self.format.name()),
            MetaCommand::Format(Some(name)) => match OutputFormat::from_name(&name) {
                Some(format) => {
                    self.format = format;
                    println!("format: {}", format.name());
                }
                None => eprintln!("unknown format: {}", name),
            },
            MetaCommand::Dump { table, path } => {
                self.engine.dump_table(&table, &path)?;
                println!("dumped {} to {}", table, path.display());
            }
            MetaCommand::Load { path } => {
                let name = self.engine.load_table(&path)?;
                println!("loaded {} from {}", name, path.display());
            }
            MetaCommand::Timing => {
                self.timing = !self.timing;
                println!("timing: {}", if self.timing { "on" } else { "off" });
            }
        }
        Ok(false)
    }
}
