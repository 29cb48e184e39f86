//! Backslash meta commands of the interactive shell.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

/// A parsed meta command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    /// `\help` — show usage.
    Help,
    /// `\quit` / `\q` — leave the shell.
    Quit,
    /// `\tables` — list catalog tables.
    Tables,
    /// `\format [name]` — show or switch the output format.
    Format(Option<String>),
    /// `\dump <table> <file>` — dump a table to a file.
    Dump {
        /// Table to dump.
        table: String,
        /// Destination file.
        path: PathBuf,
    },
    /// `\load <file>` — restore a table from a file.
    Load {
        /// Dump file to restore.
        path: PathBuf,
    },
    /// `\timing` — toggle per-statement timing.
    Timing,
}

impl MetaCommand {
    /// Parses a backslash command line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let head = parts.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<&str> = parts.collect();

        let command = match head {
            "\\help" | "\\h" | "\\?" => MetaCommand::Help,
            "\\quit" | "\\q" => MetaCommand::Quit,
            "\\tables" | "\\t" => MetaCommand::Tables,
            "\\format" | "\\f" => MetaCommand::Format(args.first().map(|s| s.to_string())),
            "\\dump" => match args.as_slice() {
                [table, path] => MetaCommand::Dump {
                    table: (*table).to_string(),
                    path: PathBuf::from(path),
                },
                _ => bail!("usage: \\dump <table> <file>"),
            },
            "\\load" => match args.as_slice() {
                [path] => MetaCommand::Load {
                    path: PathBuf::from(path),
                },
                _ => bail!("usage: \\load <file>"),
            },
            "\\timing" => MetaCommand::Timing,
            other => bail!("unknown command: {}", other),
        };
        Ok(command)
    }

    /// The help text printed by `\help`.
    pub fn help_text() -> &'static str {
        "Meta commands:\n\
         \\help               show this help\n\
         \\quit               leave the shell\n\
         \\tables             list tables\n\
         \\format [name]      show or set output format (table, json, csv, raw)\n\
         \\dump <table> <file> dump a table to a file\n\
         \\load <file>        restore a table from a file\n\
         \\timing             toggle per-statement timing\n\
         \n\
         Statements:\n\
         create table <name> (<columns>)\n\
         insert (<col> = <lit>, ...) to <table>\n\
         select <cols|*> from <table> [where <predicate>]\n\
         update <table> set <col> = <lit>, ... [where <predicate>]\n\
         delete <table> [where <predicate>]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(MetaCommand::parse("\\help").unwrap(), MetaCommand::Help);
        assert_eq!(MetaCommand::parse("\\q").unwrap(), MetaCommand::Quit);
        assert_eq!(MetaCommand::parse("\\tables").unwrap(), MetaCommand::Tables);
        assert_eq!(MetaCommand::parse("\\timing").unwrap(), MetaCommand::Timing);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(
            MetaCommand::parse("\\format json").unwrap(),
            MetaCommand::Format(Some("json".to_string()))
        );
        assert_eq!(
            MetaCommand::parse("\\format").unwrap(),
            MetaCommand::Format(None)
        );
    }

    #[test]
    fn test_parse_dump_load() {
        assert_eq!(
            MetaCommand::parse("\\dump users /tmp/users.db").unwrap(),
            MetaCommand::Dump {
                table: "users".to_string(),
                path: PathBuf::from("/tmp/users.db"),
            }
        );
        assert_eq!(
            MetaCommand::parse("\\load /tmp/users.db").unwrap(),
            MetaCommand::Load {
                path: PathBuf::from("/tmp/users.db"),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(MetaCommand::parse("\\dump users").is_err());
        assert!(MetaCommand::parse("\\load").is_err());
        assert!(MetaCommand::parse("\\nope").is_err());
    }
}
