//! Headless operator console
//!
//! Stands in for the controller/live window pair: commands drive the same
//! presentation surface the GUI uses, and `present` runs an interactive
//! session whose console renderer subscribes to verse changes exactly like
//! the projected live window would.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use versedeck::config;
use versedeck::presentation::{PresentationState, VerseObserver};
use versedeck::reference::parse_reference;
use versedeck::store::{Verse, VerseStore};

#[derive(Parser)]
#[command(name = "versedeck", about = "Verse navigation for live presentations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed translations from the data directory and exit
    Seed,
    /// List available translations
    Translations,
    /// Look up and print one verse, e.g. `show "John 3:16"`
    Show {
        reference: String,
        #[arg(short, long, default_value = "KJV")]
        translation: String,
    },
    /// Search verses by book name or text substring
    Search {
        text: String,
        #[arg(short, long, default_value = "KJV")]
        translation: String,
    },
    /// Interactive session: n(ext), p(revious), t <CODE>, g <reference>, q(uit)
    Present {
        reference: String,
        #[arg(short, long, default_value = "KJV")]
        translation: String,
    },
}

/// Prints each newly shown verse, the way the live window redraws
struct ConsoleRenderer {
    store: Arc<VerseStore>,
}

impl VerseObserver for ConsoleRenderer {
    fn on_verse_changed(&self, verse: &Verse) {
        if let Ok(Some(header)) =
            self.store
                .chapter_header(&verse.translation, &verse.book, verse.chapter)
        {
            println!("-- {} --", header);
        }
        println!("{}", verse.reference());
        println!("{}", verse.text);
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("[Versedeck] {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    config::load_env();
    let cli = Cli::parse();

    // No reachable store at startup is fatal; everything after this point
    // surfaces errors per operation instead.
    let store = Arc::new(VerseStore::open(&config::db_path())?);

    let data_dir = config::data_dir();
    store.seed_from_dir(&data_dir)?;
    store.seed_chapter_headers(&data_dir)?;

    match cli.command {
        Command::Seed => {
            for translation in store.available_translations()? {
                println!(
                    "{}: {} verses",
                    translation,
                    store.translation_verse_count(&translation)?
                );
            }
        }
        Command::Translations => {
            for translation in store.available_translations()? {
                println!("{}", translation);
            }
        }
        Command::Show {
            reference,
            translation,
        } => {
            let r = parse_reference(&reference)?;
            let verse = store.get_verse(&translation, &r.book, r.chapter, r.verse)?;
            println!("{}", verse.reference());
            println!("{}", verse.text);
        }
        Command::Search { text, translation } => {
            for verse in store.search_verses(&translation, &text)? {
                println!("{}  {}", verse.reference(), verse.text);
            }
        }
        Command::Present {
            reference,
            translation,
        } => {
            present(store, &reference, &translation)?;
        }
    }

    Ok(())
}

fn present(store: Arc<VerseStore>, reference: &str, translation: &str) -> Result<(), Box<dyn Error>> {
    let state = PresentationState::new(store.clone());
    state.add_observer(Arc::new(ConsoleRenderer { store }));

    let r = parse_reference(reference)?;
    state.fetch_and_set(translation, &r.book, r.chapter, r.verse)?;

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        // Recoverable problems are reported to the operator; the shown
        // verse never changes on a failed operation.
        let result = match line {
            "" => continue,
            "q" | "quit" => break,
            "n" | "next" => state.fetch_and_set_next(),
            "p" | "prev" => state.fetch_and_set_previous(),
            _ => {
                if let Some(code) = line.strip_prefix("t ") {
                    state.switch_translation(code.trim())
                } else if let Some(target) = line.strip_prefix("g ") {
                    match parse_reference(target.trim()) {
                        Ok(r) => {
                            let current = state
                                .current_verse()
                                .map(|v| v.translation)
                                .unwrap_or_else(|| translation.to_string());
                            state.fetch_and_set(&current, &r.book, r.chapter, r.verse)
                        }
                        Err(e) => {
                            eprintln!("{}", e);
                            continue;
                        }
                    }
                } else {
                    eprintln!("commands: n, p, t <CODE>, g <reference>, q");
                    continue;
                }
            }
        };

        if let Err(e) = result {
            eprintln!("{}", e);
        }
    }

    Ok(())
}
