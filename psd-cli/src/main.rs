//! Command-line interface for psd
//!
//! This binary drives the two-pass tagging protocol over Penn-style
//! bracketed treebank files and the related corpus utilities.
//!
//! Usage:
//!   psd number FILE [--nodes PATH] [--tagme PATH] [--start N]
//!   psd merge ANNOT FILE [--markers rl,rt]
//!   psd repair FILE
//!   psd coding FILE [--label CODING] [--format tsv|json]
//!   psd tokens FILE [--columns 3]

use clap::{Arg, Command};
use std::fs;
use std::process;

use psd_parser::psd::{
    merge, records, AnnotationTable, CorpusLoader, MergeMarkers, PositionCounter,
    DEFAULT_CODING_LABEL,
};

fn main() {
    let matches = Command::new("psd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tools for Penn-style bracketed treebank (psd) files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("number")
                .about("Number terminal nodes and emit the tagger-facing word lists")
                .arg(Arg::new("file").help("Corpus file").required(true).index(1))
                .arg(
                    Arg::new("nodes")
                        .long("nodes")
                        .help("Write #id/word lines to this path"),
                )
                .arg(
                    Arg::new("tagme")
                        .long("tagme")
                        .help("Write words-only tagger input to this path"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .default_value("0")
                        .help("First position id to issue"),
                )
                .arg(
                    Arg::new("lemma-code")
                        .long("lemma-code")
                        .short('L')
                        .default_value("l")
                        .help("Marker code used for inline lemmas (e.g. 'l' for @l=)"),
                ),
        )
        .subcommand(
            Command::new("merge")
                .about("Merge tagger annotation rows back into a numbered corpus copy")
                .arg(
                    Arg::new("annot")
                        .help("Annotation rows: #id, word, tag, lemma (tab-separated)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("file")
                        .help("Numbered corpus copy from the same run")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("markers")
                        .long("markers")
                        .default_value("l,t")
                        .help("Lemma and tag marker codes, comma separated (e.g. rl,rt)"),
                ),
        )
        .subcommand(
            Command::new("repair")
                .about("Backfill missing annotation layers with NA placeholders")
                .arg(Arg::new("file").help("Corpus file").required(true).index(1)),
        )
        .subcommand(
            Command::new("coding")
                .about("List coded subtrees and their terminal yields")
                .arg(Arg::new("file").help("Corpus file").required(true).index(1))
                .arg(
                    Arg::new("label")
                        .long("label")
                        .default_value(DEFAULT_CODING_LABEL)
                        .help("Coding node label"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .default_value("tsv")
                        .help("Output format: tsv or json"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Flat word/tag/lemma listing of taggable terminals")
                .arg(Arg::new("file").help("Corpus file").required(true).index(1))
                .arg(
                    Arg::new("columns")
                        .long("columns")
                        .short('c')
                        .default_value("3")
                        .help("Output columns: 1, 2 or 3"),
                )
                .arg(
                    Arg::new("lemma-code")
                        .long("lemma-code")
                        .short('L')
                        .default_value("l")
                        .help("Marker code used for inline lemmas"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("number", sub)) => handle_number(sub),
        Some(("merge", sub)) => handle_merge(sub),
        Some(("repair", sub)) => handle_repair(sub),
        Some(("coding", sub)) => handle_coding(sub),
        Some(("tokens", sub)) => handle_tokens(sub),
        _ => unreachable!("subcommand required"),
    }
}

fn load(path: &str) -> CorpusLoader {
    CorpusLoader::from_path(path).unwrap_or_else(|err| {
        eprintln!("Error reading {}: {}", path, err);
        process::exit(1);
    })
}

fn handle_number(matches: &clap::ArgMatches) {
    let path = required(matches, "file");
    let lemma_code = required(matches, "lemma-code");
    let start: u64 = required(matches, "start").parse().unwrap_or_else(|_| {
        eprintln!("Error: --start must be a non-negative integer");
        process::exit(1);
    });

    let loader = load(path);
    let mut counter = PositionCounter::starting_at(start);
    let out = loader.number_corpus_with(&mut counter, lemma_code);

    if let Some(nodes_path) = matches.get_one::<String>("nodes") {
        write_or_die(nodes_path, &out.nodes);
    }
    if let Some(tagme_path) = matches.get_one::<String>("tagme") {
        write_or_die(tagme_path, &out.tagme);
    }
    print!("{}", out.numbered);
    let s = &out.summary;
    eprintln!(
        "records: {}  sentences: {}  terminals: {}  taggable: {}  markup: {}  missing ids: {}  skipped: {}",
        s.records, s.sentences, s.terminals, s.taggable, s.markup, s.missing_ids, s.skipped
    );
}

fn handle_merge(matches: &clap::ArgMatches) {
    let annot_path = required(matches, "annot");
    let file_path = required(matches, "file");
    let markers = parse_markers(required(matches, "markers"));

    let rows = fs::read_to_string(annot_path).unwrap_or_else(|err| {
        eprintln!("Error reading {}: {}", annot_path, err);
        process::exit(1);
    });
    let table = AnnotationTable::parse(&rows, &markers).unwrap_or_else(|err| {
        eprintln!("Merge aborted: {}", err);
        process::exit(1);
    });
    let loader = load(file_path);
    let (merged, stats) = merge(loader.source(), &table);
    print!("{}", merged);
    eprintln!(
        "applied: {}  unmatched: {}  rejected rows: {}  sanitized lemmas: {}",
        stats.applied, stats.unmatched, stats.rejected_rows, stats.sanitized_lemmas
    );
}

fn handle_repair(matches: &clap::ArgMatches) {
    let loader = load(required(matches, "file"));
    let (repaired, counts) = loader.reconcile();
    print!("{}", repaired);
    eprintln!(
        "added primary: {}  added secondary: {}  divergent: {}",
        counts.added_primary, counts.added_secondary, counts.divergent
    );
}

fn handle_coding(matches: &clap::ArgMatches) {
    let loader = load(required(matches, "file"));
    let label = required(matches, "label");
    let format = required(matches, "format");
    let sentences = loader.select_coded(label);

    match format.as_str() {
        "json" => {
            let mut rows: Vec<serde_json::Value> = Vec::new();
            for sentence in &sentences {
                for span in &sentence.spans {
                    rows.push(serde_json::json!({
                        "id": sentence.id,
                        "start": span.start,
                        "end": span.end,
                        "features": span.features,
                        "terminals": span.terminals,
                    }));
                }
            }
            let text = serde_json::to_string_pretty(&rows).unwrap_or_else(|err| {
                eprintln!("Error formatting coding rows: {}", err);
                process::exit(1);
            });
            println!("{}", text);
        }
        "tsv" => {
            for sentence in &sentences {
                let id = sentence.id.as_deref().unwrap_or("");
                for span in &sentence.spans {
                    let terminals = span
                        .terminals
                        .iter()
                        .map(|node| format!("{} {}", node.tag, node.form))
                        .collect::<Vec<_>>()
                        .join("; ");
                    println!(
                        "{}\t{}\t{}\t{}",
                        id,
                        span.start,
                        span.features.as_deref().unwrap_or(""),
                        terminals
                    );
                }
            }
        }
        other => {
            eprintln!("Format '{}' not supported; use tsv or json", other);
            process::exit(1);
        }
    }
    let total: usize = sentences.iter().map(|s| s.spans.len()).sum();
    eprintln!("coded spans: {}  sentences with codings: {}", total, sentences.len());
}

fn handle_tokens(matches: &clap::ArgMatches) {
    let loader = load(required(matches, "file"));
    let lemma_code = required(matches, "lemma-code");
    let columns: u8 = required(matches, "columns").parse().unwrap_or_else(|_| {
        eprintln!("Error: --columns must be 1, 2 or 3");
        process::exit(1);
    });
    print!("{}", records::token_rows(loader.source(), lemma_code, columns));
}

fn parse_markers(spec: &str) -> MergeMarkers {
    match spec.split_once(',') {
        Some((lemma, tag)) if !lemma.is_empty() && !tag.is_empty() => MergeMarkers {
            lemma: lemma.to_string(),
            tag: tag.to_string(),
        },
        _ => {
            eprintln!("Error: --markers expects two comma-separated codes, e.g. rl,rt");
            process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a String {
    matches
        .get_one::<String>(name)
        .expect("argument is required or defaulted")
}

fn write_or_die(path: &str, content: &str) {
    if let Err(err) = fs::write(path, content) {
        eprintln!("Error writing {}: {}", path, err);
        process::exit(1);
    }
}
