//! CLI Module for codeshelf
//! The command-line front-end over [`SnippetStore`]. It gathers input, asks the
//! user before overwriting or deleting files, and prints what the store
//! returns.

pub mod commands;

use crate::config::Config;
use crate::models::{Language, SnippetStore};
use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::path::PathBuf;

/// Optional inputs shared by `new` and `edit`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditArgs {
    pub title: Option<String>,
    pub language: Option<Language>,
    /// `-` reads the code from stdin
    pub file: Option<PathBuf>,
    pub tags: Option<Vec<String>>,
    pub auto_tags: bool,
    pub yes: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Search { term: String },
    Show { id: u64 },
    New { title: String, args: EditArgs },
    Edit { id: u64, args: EditArgs },
    Delete { id: u64, yes: bool },
    Tags { args: EditArgs },
    Languages,
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let (positional, flags) = split_flags(rest)?;

        let command = match name.as_str() {
            "list" | "ls" => Command::List,
            "search" | "find" => {
                if positional.is_empty() {
                    bail!("Missing search query\nUsage: codeshelf search <TERM>");
                }
                Command::Search {
                    term: positional.join(" "),
                }
            }
            "show" | "view" | "cat" => Command::Show {
                id: parse_id(positional.first())?,
            },
            "new" | "add" => {
                if positional.is_empty() {
                    bail!("Missing snippet title\nUsage: codeshelf new <TITLE> --lang <LANGUAGE>");
                }
                if flags.language.is_none() {
                    bail!("Missing --lang\nUsage: codeshelf new <TITLE> --lang <LANGUAGE>");
                }
                Command::New {
                    title: positional.join(" "),
                    args: flags,
                }
            }
            "edit" => Command::Edit {
                id: parse_id(positional.first())?,
                args: flags,
            },
            "delete" | "rm" => Command::Delete {
                id: parse_id(positional.first())?,
                yes: flags.yes,
            },
            "tags" => {
                if flags.language.is_none() {
                    bail!("Missing --lang\nUsage: codeshelf tags --lang <LANGUAGE> [--title T]");
                }
                Command::Tags { args: flags }
            }
            "languages" | "langs" => Command::Languages,
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("Unknown command: {other}"),
        };
        Ok(command)
    }
}

fn parse_id(raw: Option<&String>) -> Result<u64> {
    let raw = raw.context("Missing snippet id")?;
    raw.parse()
        .with_context(|| format!("Snippet id must be a number, got '{raw}'"))
}

fn split_flags(args: &[String]) -> Result<(Vec<String>, EditArgs)> {
    let mut positional = Vec::new();
    let mut flags = EditArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--lang" | "-l" => flags.language = Some(value(arg.as_str())?.parse()?),
            "--title" | "-t" => flags.title = Some(value(arg.as_str())?),
            "--file" | "-f" => flags.file = Some(PathBuf::from(value(arg.as_str())?)),
            "--tags" => {
                flags.tags = Some(value(arg.as_str())?.split(',').map(str::to_string).collect());
            }
            "--auto-tags" | "-a" => flags.auto_tags = true,
            "--yes" | "-y" => flags.yes = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {flag}"),
            _ => positional.push(arg.clone()),
        }
    }
    Ok((positional, flags))
}

/// Executes CLI commands based on the provided arguments
pub fn execute_cli(args: &[String]) -> Result<()> {
    let command = match Command::parse(args) {
        Ok(command) => command,
        Err(e) => {
            print_help();
            return Err(e);
        }
    };

    if command == Command::Help {
        print_help();
        return Ok(());
    }
    if let Command::Languages = command {
        commands::list_languages();
        return Ok(());
    }
    if let Command::Tags { args } = &command {
        return commands::show_tags(args);
    }

    let config = Config::resolve()?;
    let store = SnippetStore::open(&config)
        .with_context(|| format!("Cannot open snippet store at {}", config.base_dir.display()))?;

    let outcome = match command {
        Command::List => commands::list_snippets(&store),
        Command::Search { term } => commands::search_snippets(&store, &term),
        Command::Show { id } => commands::show_snippet(&store, id),
        Command::New { title, args } => commands::create_snippet(&store, &title, args),
        Command::Edit { id, args } => commands::edit_snippet(&store, id, args),
        Command::Delete { id, yes } => commands::delete_snippet(&store, id, yes),
        Command::Tags { .. } | Command::Languages | Command::Help => Ok(()),
    };
    if let Some(hint) = outcome.as_ref().err().and_then(input_hint) {
        eprintln!("{}  {}", "┃".bright_magenta(), hint.bright_yellow());
    }
    outcome
}

/// A usage reminder for errors caused by what the user typed
fn input_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<crate::Error>()
        .is_some_and(crate::Error::is_validation)
        .then_some("Snippets need a non-empty title, some code and a known --lang (see `codeshelf languages`)")
}

/// Prints the help message with available commands
fn print_help() {
    let bar = "┃".bright_magenta();
    println!("{}  {}", bar, "CODESHELF - CODE SNIPPET LIBRARY".bold());
    println!("{}  {}", bar, "USAGE:".bright_yellow());
    println!("{}  codeshelf [COMMAND] [ARGS]", bar);
    println!("{}  {}", bar, "COMMANDS:".bright_yellow());

    let rows = [
        ("list, ls", "List all saved snippets"),
        ("search, find <TERM>", "Search titles, languages, filenames and tags"),
        ("show, cat <ID>", "Display a snippet and its code"),
        ("new <TITLE> --lang <L>", "Save code from --file (or stdin) as a new snippet"),
        ("edit <ID>", "Change title, language, code or tags of a snippet"),
        ("delete, rm <ID>", "Delete a snippet and its file"),
        ("tags --lang <L>", "Suggest tags for code from --file (or stdin)"),
        ("languages", "List supported languages and extensions"),
        ("help", "Display this help message"),
    ];
    for (usage, about) in rows {
        println!("{}  {:<27} {}", bar, usage.bright_white(), about);
    }

    println!("{}  {}", bar, "OPTIONS:".bright_yellow());
    let options = [
        ("--lang, -l <L>", "Language (see `codeshelf languages`)"),
        ("--title, -t <T>", "New title (edit) or title words for tags"),
        ("--file, -f <PATH>", "Read code from PATH; `-` means stdin"),
        ("--tags <a,b,c>", "Tags to store, comma separated"),
        ("--auto-tags, -a", "Add tags suggested from the code"),
        ("--yes, -y", "Skip overwrite and delete confirmations"),
    ];
    for (usage, about) in options {
        println!("{}  {:<27} {}", bar, usage.bright_white(), about);
    }

    println!("{}  {}", bar, "TIP:".bright_green());
    println!(
        "{}  Set CODESHELF_DIR or ~/.config/codeshelf/config.toml to change where snippets are kept",
        bar
    );
}
