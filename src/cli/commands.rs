use crate::cli::EditArgs;
use crate::models::tags::merge_tags;
use crate::models::{Language, Snippet, SnippetStore, classify, normalize_tags};
use anyhow::{Context, Result, bail};
use colored::{ColoredString, Colorize};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

/// Tags shown on a listing row before the rest collapse into `+N`
const LISTED_TAGS: usize = 3;

fn bar() -> ColoredString {
    "┃".bright_magenta()
}

/// Lists every snippet in the index
pub fn list_snippets(store: &SnippetStore) -> Result<()> {
    let snippets = store.list()?;

    if snippets.is_empty() {
        println!("{}  No snippets yet!", bar());
        println!(
            "{}  Save one with: codeshelf new <TITLE> --lang <LANGUAGE> --file <PATH>",
            bar()
        );
        return Ok(());
    }

    println!("{}  {} snippets:", bar(), snippets.len());
    print_rows(&snippets);
    Ok(())
}

/// Searches for snippets matching a query string
pub fn search_snippets(store: &SnippetStore, term: &str) -> Result<()> {
    let results = store.search(term)?;

    println!(
        "{}  {} '{}'",
        bar(),
        "SEARCH RESULTS FOR".bold(),
        term.bright_white()
    );

    if results.is_empty() {
        println!("{}  No snippets found matching query: {}", bar(), term);
        return Ok(());
    }

    println!(
        "{}  Found {} snippets matching '{}':",
        bar(),
        results.len(),
        term
    );
    print_rows(&results);
    Ok(())
}

/// Shows a snippet's metadata followed by the code on disk
pub fn show_snippet(store: &SnippetStore, id: u64) -> Result<()> {
    let snippet = store.get(id)?;
    let code = store.read_code(&snippet)?;

    println!(
        "{}  {} {}",
        bar(),
        "SNIPPET".bright_green().bold(),
        snippet.title.bold()
    );
    println!("{}", "─".repeat(60).bright_magenta());
    println!(
        "{}  {}: {}",
        bar(),
        "Language".bright_yellow(),
        snippet.language
    );
    println!(
        "{}  {}: {}",
        bar(),
        "Path".bright_magenta(),
        snippet.filepath.display()
    );
    println!("{}  {}: {}", bar(), "Created".bright_blue(), snippet.created);
    if !snippet.tags.is_empty() {
        println!(
            "{}  {}: {}",
            bar(),
            "Tags".bright_cyan(),
            hash_tags(&snippet.tags).join(" ")
        );
    }
    println!("{}  {}: {}", bar(), "ID".bright_black(), snippet.id);
    println!("{}", "─".repeat(60).bright_magenta());

    for line in code.lines() {
        println!("{}  {}", bar(), line);
    }
    Ok(())
}

/// Saves code as a new snippet, asking first if the target file exists
pub fn create_snippet(store: &SnippetStore, title: &str, args: EditArgs) -> Result<()> {
    let language = args.language.context("Missing --lang")?;
    let code = read_code_input(args.file.as_deref())?;

    let mut tags = normalize_tags(args.tags.unwrap_or_default());
    if args.auto_tags {
        merge_tags(&mut tags, classify(&code, title, language)?);
    }

    let path = store.target_path(title, language);
    if store.would_overwrite(&path) && !args.yes {
        let filename = SnippetStore::filename_for(title, language);
        if !ask_overwrite(&filename, reads_stdin(args.file.as_deref()))? {
            println!("{}  Cancelled, nothing was saved.", bar());
            return Ok(());
        }
    }

    let snippet = store.create(title, language, &code, tags)?;
    print_saved(&snippet);
    Ok(())
}

/// Rewrites a snippet. Fields without a flag keep their current value, and
/// without `--file` the code on disk is kept.
pub fn edit_snippet(store: &SnippetStore, id: u64, args: EditArgs) -> Result<()> {
    let current = store.get(id)?;

    let title = args.title.unwrap_or_else(|| current.title.clone());
    let language = args.language.unwrap_or(current.language);
    let code = match args.file.as_deref() {
        Some(path) => read_code_input(Some(path))?,
        None => store.read_code(&current)?,
    };

    let mut tags = match args.tags {
        Some(tags) => normalize_tags(tags),
        None => current.tags.clone(),
    };
    if args.auto_tags {
        merge_tags(&mut tags, classify(&code, &title, language)?);
    }

    let path = store.target_path(&title, language);
    if path != current.filepath && store.would_overwrite(&path) && !args.yes {
        let filename = SnippetStore::filename_for(&title, language);
        let code_from_stdin = args.file.as_deref().is_some_and(|p| reads_stdin(Some(p)));
        if !ask_overwrite(&filename, code_from_stdin)? {
            println!("{}  Cancelled, snippet {} unchanged.", bar(), id);
            return Ok(());
        }
    }

    let snippet = store.update(id, &title, language, &code, tags)?;
    print_saved(&snippet);
    Ok(())
}

/// Deletes a snippet and its file after confirmation
pub fn delete_snippet(store: &SnippetStore, id: u64, yes: bool) -> Result<()> {
    let snippet = store.get(id)?;

    if !yes {
        let question = format!("Delete this snippet and its file? {}", snippet.filename);
        if !confirm(&question)? {
            println!("{}  Cancelled, nothing was deleted.", bar());
            return Ok(());
        }
    }

    let removed = store.delete(id)?;
    println!(
        "{}  {} {} ({})",
        bar(),
        "Deleted".bright_red().bold(),
        removed.title.bright_white(),
        removed.filepath.display()
    );
    Ok(())
}

/// Prints the tags the classifier suggests for some code
pub fn show_tags(args: &EditArgs) -> Result<()> {
    let language = args.language.context("Missing --lang")?;
    let code = read_code_input(args.file.as_deref())?;
    let title = args.title.as_deref().unwrap_or_default();

    let tags = classify(&code, title, language)?;
    println!(
        "{}  Generated {} tags: {}",
        bar(),
        tags.len(),
        hash_tags(&tags).join(" ").bright_cyan()
    );
    Ok(())
}

/// Lists the languages a snippet can be saved as
pub fn list_languages() {
    for language in Language::ALL {
        println!(
            "{}  {:<12} {}",
            bar(),
            language.name().bright_white(),
            language.extension().bright_green()
        );
    }
}

fn print_rows(snippets: &[Snippet]) {
    println!("{}", "─".repeat(60).bright_magenta());
    for (idx, snippet) in snippets.iter().enumerate() {
        println!(
            "{}  {}. {} {} {}  {}",
            bar(),
            snippet.id.to_string().bright_yellow(),
            snippet.title.bright_white().bold(),
            format!(" {} ", snippet.language).on_blue(),
            snippet.extension.bright_green(),
            snippet.created_date().bright_black()
        );
        println!("{}     {}", bar(), snippet.filename.bright_black());

        let tags = tag_summary(&snippet.tags, LISTED_TAGS);
        if !tags.is_empty() {
            println!("{}     {}", bar(), tags.bright_cyan());
        }

        if idx < snippets.len() - 1 {
            println!("{}  {}", bar(), "─".repeat(40).bright_black());
        }
    }
}

fn print_saved(snippet: &Snippet) {
    println!(
        "{}  {} {}",
        bar(),
        "Code saved as:".bright_green().bold(),
        snippet.filename.bright_white()
    );
    println!(
        "{}  {}: {}",
        bar(),
        "Location".bright_blue(),
        snippet.filepath.display()
    );
    println!("{}  {}: {}", bar(), "ID".bright_black(), snippet.id);
    if !snippet.tags.is_empty() {
        println!(
            "{}  {}: {}",
            bar(),
            "Tags".bright_cyan(),
            hash_tags(&snippet.tags).join(" ")
        );
    }
}

fn hash_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|tag| format!("#{tag}")).collect()
}

/// `#a #b #c +2` style summary of the first `shown` tags
pub fn tag_summary(tags: &[String], shown: usize) -> String {
    let mut summary = hash_tags(&tags[..tags.len().min(shown)]).join(" ");
    if tags.len() > shown {
        summary.push_str(&format!(" +{}", tags.len() - shown));
    }
    summary
}

/// Reads code from a file, or from stdin when the path is `-` or missing
fn read_code_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read code from {}", path.display())),
        _ => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read code from stdin")?;
            Ok(code)
        }
    }
}

/// True when [`read_code_input`] takes the code from stdin
fn reads_stdin(path: Option<&Path>) -> bool {
    path.is_none_or(|path| path == Path::new("-"))
}

/// Asks before replacing `filename`. Once stdin has supplied the code it is
/// drained, so a prompt could only ever read "no"; require `--yes` instead.
fn ask_overwrite(filename: &str, code_from_stdin: bool) -> Result<bool> {
    if code_from_stdin {
        bail!("File '{filename}' already exists and the code came from stdin; pass --yes to overwrite it");
    }
    confirm(&format!("File '{filename}' already exists. Overwrite?"))
}

/// Asks a yes/no question on stdin. Anything but an explicit yes is a no,
/// including a closed stdin.
fn confirm(question: &str) -> Result<bool> {
    print!("{}  {} [y/N] ", bar(), question.bright_yellow());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
