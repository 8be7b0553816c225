use classmatch_core::normalize::{Vocabulary, VocabularyEntry};
use colored::Colorize;

use crate::prelude::{println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct VocabOptions {
    /// Resolve a raw spelling against the class, trainer and location lists
    #[arg(long, value_name = "TEXT")]
    pub lookup: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: VocabOptions, global: crate::Global) -> Result<()> {
    let config = crate::settings::load_config(&global)?;
    let vocabulary = config.vocabulary();

    if let Some(raw) = &options.lookup {
        let normalizer = config.normalizer();
        let resolved = [
            ("class", normalizer.classes().lookup(raw)),
            ("trainer", normalizer.trainers().lookup(raw)),
            ("location", normalizer.locations().lookup(raw)),
        ];
        for (kind, hit) in resolved {
            println!(
                "{:>8}: {}",
                kind.green(),
                hit.map(|h| h.bright_white().to_string())
                    .unwrap_or_else(|| "-".bright_black().to_string())
            );
        }
        return Ok(());
    }

    if options.json {
        println!("{}", format_vocab_json(&vocabulary)?);
    } else {
        println!("{}", format_vocab_text(&vocabulary, global.verbose));
    }

    Ok(())
}

fn format_vocab_json(vocabulary: &Vocabulary) -> Result<String> {
    serde_json::to_string_pretty(vocabulary).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn section(title: &str, entries: &[VocabularyEntry]) -> String {
    let mut result = String::new();
    result.push_str(&f!("\n{}\n", f!("{} ({})", title, entries.len()).bright_yellow().bold()));

    let mut table = crate::prelude::new_table();
    table.set_titles(prettytable::row!["Canonical", "Aliases"]);
    for entry in entries {
        table.add_row(prettytable::row![entry.canonical, entry.aliases.join(", ")]);
    }
    result.push_str(&table.to_string());
    result
}

fn format_vocab_text(vocabulary: &Vocabulary, verbose: bool) -> String {
    let mut result = String::new();

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!("{}\n", "VOCABULARY".bright_cyan().bold()));
    result.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&section("CLASSES", &vocabulary.classes));
    result.push_str(&section("TRAINERS", &vocabulary.trainers));
    result.push_str(&section("LOCATIONS", &vocabulary.locations));

    if verbose {
        result.push_str(&f!(
            "\n{}: {}\n{}: {}\n",
            "Fuzzy threshold".green(),
            vocabulary.fuzzy_threshold,
            "Never a class".green(),
            vocabulary.class_denylist.join(", ")
        ));
    }

    result
}
