//! ngram-spell command line.
//!
//! ```text
//! ngram-spell build --corpus brown.txt --corpus reuters.txt --n 2 --n 3
//! ngram-spell check "I was aple to sleep tonight."
//! ngram-spell check --file essay.txt
//! ```
//!
//! Stores must be built before anything can be checked. Defaults come from
//! the `confy` config file; command-line flags override them.

use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{info, LevelFilter};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

use ngram_spell::config::Config;
use ngram_spell::corpus::Corpus;
use ngram_spell::corrector::{CorrectionResult, Corrector, CorrectorSettings};
use ngram_spell::dictionary::Dictionary;
use ngram_spell::linguistics::BasicServices;
use ngram_spell::store::{build_stores, NGramStore};

#[derive(Parser, Debug)]
#[command(name = "ngram-spell")]
#[command(about = "Context-aware spelling correction with n-gram models")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Store directory (overrides the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Custom dictionary file path
    #[arg(short, long, global = true)]
    dictionary: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build n-gram stores from corpus files
    Build(BuildArgs),
    /// Check text for spelling errors
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Corpus text files, concatenated in the given order
    #[arg(short, long = "corpus", required = true)]
    corpora: Vec<PathBuf>,

    /// Model orders to build (repeatable)
    #[arg(short, long = "n")]
    n_values: Vec<usize>,

    /// Size of the most-common-words vocabulary
    #[arg(long)]
    max_vocabulary: Option<usize>,

    /// Replace words outside the vocabulary with the sentinel word
    #[arg(long)]
    fold_rare_words: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Text to check
    text: Option<String>,

    /// Check a file, one text per line
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Worker threads for --file
    #[arg(short, long)]
    workers: Option<usize>,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn load_services(cli: &Cli, config: &Config) -> Result<BasicServices, Box<dyn std::error::Error>> {
    let path = cli.dictionary.as_deref().or(config.dictionary_path.as_deref());
    let dictionary = Dictionary::load_from_path(path)?;
    Ok(BasicServices::new(dictionary))
}

fn run_build(
    cli: &Cli,
    args: &BuildArgs,
    config: &Config,
    store: &NGramStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = load_services(cli, config)?;

    let mut corpus = Corpus::new();
    for path in &args.corpora {
        corpus.add_file(path, &services)?;
    }

    let n_values = if args.n_values.is_empty() {
        config.n_values.clone()
    } else {
        args.n_values.clone()
    };
    let max_vocabulary = args.max_vocabulary.unwrap_or(config.max_vocabulary_size);
    let mut options = config.build_options();
    options.fold_rare_words |= args.fold_rare_words;

    info!(
        "Building n = {:?} from {} tokens in {} files",
        n_values,
        corpus.token_count(),
        corpus.source_count()
    );
    for path in build_stores(&corpus, &n_values, max_vocabulary, options, store)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// All of `input`, so a piped multi-line paragraph is checked as one text.
fn read_text<R: Read>(mut input: R) -> std::io::Result<String> {
    let mut buffer = String::new();
    input.read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn print_results(line: Option<usize>, results: &[CorrectionResult]) {
    for result in results {
        let prefix = line.map(|l| format!("{}:", l + 1)).unwrap_or_default();
        println!(
            "{}{}\t{}\t{}",
            prefix,
            result.position,
            result.original,
            result.candidates.join(", ")
        );
    }
}

fn run_check(
    cli: &Cli,
    args: &CheckArgs,
    config: &Config,
    store: &NGramStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = load_services(cli, config)?;
    let corrector = Corrector::from_store(store, services, CorrectorSettings::from(config))?;

    if let Some(path) = &args.file {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }

        let workers = args.workers.unwrap_or(config.workers);
        for (i, results) in corrector.check_batch(&lines, workers)?.iter().enumerate() {
            print_results(Some(i), results);
        }
        return Ok(());
    }

    let text = match &args.text {
        Some(text) => text.clone(),
        None => read_text(std::io::stdin().lock())?,
    };
    print_results(None, &corrector.check(&text));
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Persist defaults so users get a concrete config file on first run.
    if let Err(err) = config.save() {
        log::warn!("Failed to persist config defaults: {err}");
    }

    let store = NGramStore::new(cli.store.clone().unwrap_or_else(|| config.store_dir.clone()));

    match &cli.command {
        Command::Build(args) => run_build(&cli, args, &config, &store),
        Command::Check(args) => run_check(&cli, args, &config, &store),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_text_keeps_every_line() {
        let input = Cursor::new("I was aple to sleep.\nThe grean shrt is new.\n");
        let text = read_text(input).unwrap();
        assert_eq!(text, "I was aple to sleep.\nThe grean shrt is new.\n");
    }
}
