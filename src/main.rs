//! Command-line lookup in installed StarDict dictionaries.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use stardict_reader::{DictPaths, StarDict};
use tracing_subscriber::{EnvFilter, fmt};

/// Look up a word prefix in a StarDict dictionary
#[derive(Parser, Debug)]
#[command(name = "sd-lookup")]
#[command(version)]
struct Args {
    /// Prefix to look up
    prefix: Option<String>,

    /// Dictionary directory (requires --name)
    #[arg(short, long, requires = "name")]
    dir: Option<PathBuf>,

    /// Dictionary file name without extension (requires --dir)
    #[arg(short, long, requires = "dir")]
    name: Option<String>,

    /// Strip markup from the printed entry
    #[arg(short, long)]
    strip: bool,

    /// Maximum number of matching words to print
    #[arg(short, long, default_value = "20")]
    limit: usize,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let (dir, name) = match (args.dir.clone(), args.name.clone()) {
        (Some(dir), Some(name)) => (dir, name),
        _ => {
            let paths = DictPaths::discover();
            if paths.is_empty() {
                println!("No dictionaries found");
                return ExitCode::FAILURE;
            }
            println!("Found {} dictionaries", paths.len());
            for location in paths.iter() {
                println!("  dict '{}' ({})", location.book_name, location.name);
            }
            println!();
            let first = &paths.dicts[0];
            (first.dir.clone(), first.name.clone())
        }
    };

    println!("Opening dict '{}'", name);
    let mut dict = match StarDict::open(&dir, &name) {
        Ok(dict) => dict,
        Err(e) => {
            eprintln!("ERROR: Failed to load dict");
            eprintln!("  {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("Dict loaded, word count={}", dict.word_count());

    let Some(prefix) = args.prefix.as_deref() else {
        return ExitCode::SUCCESS;
    };

    print!("Lookup '{}' ... ", prefix);
    let Some(range) = dict.lookup(prefix) else {
        println!("none");
        return ExitCode::SUCCESS;
    };
    println!("{}", range.len());

    println!("Result {} - {}", range.min, range.max);
    println!(
        "{} - {}",
        dict.word(range.min).unwrap_or_default(),
        dict.word(range.max).unwrap_or_default()
    );
    for idx in range.indices().take(args.limit) {
        println!("{}", dict.word(idx).unwrap_or_default());
    }
    if range.len() > args.limit {
        println!("... and {} more", range.len() - args.limit);
    }
    println!();

    let entry = match dict.entry(range.min) {
        Ok(entry) => entry,
        Err(e) => {
            eprintln!("ERROR: Failed to read entry");
            eprintln!("  {}", e);
            return ExitCode::FAILURE;
        }
    };
    let text = if args.strip {
        entry.plain_text().unwrap_or_else(|| entry.text())
    } else {
        entry.text()
    };
    println!("{}", text);

    dict.close();
    ExitCode::SUCCESS
}
