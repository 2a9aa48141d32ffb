use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use vote_merge::{codec, Group, Record, TallyTable};

use crate::collect::board::ResultsBoard;
use crate::collect::config_reader::*;
use crate::collect::io_common::{default_origin, now_timestamp, simplify_file_name};
use crate::collect::io_store::LocalStore;

pub mod board;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_remote;
pub mod io_store;
pub mod report;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VmError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error encoding {what} as JSON"))]
    EncodingJson {
        source: serde_json::Error,
        what: String,
    },
    #[snafu(display("Unknown source provider {provider:?}: expected remote, local or csv"))]
    UnknownProvider { provider: String },
    #[snafu(display("Source {provider:?} requires the field {field}"))]
    MissingSourceField { provider: String, field: String },
    #[snafu(display("Unknown group {label:?}: expected neutral or nudged"))]
    UnknownGroup { label: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type VmResult<T> = Result<T, VmError>;

/// Reads every source, in order, into a fresh board.
///
/// A source that cannot be read contributes nothing; this never fails.
pub fn collect_votes(settings: &RunSettings) -> ResultsBoard {
    let mut board = ResultsBoard::default();
    for source in settings.sources.iter() {
        match source {
            SourceSpec::Remote { url, timeout } => {
                let votes = io_remote::fetch_remote(url.as_deref(), *timeout);
                board.absorb("remote", votes);
            }
            SourceSpec::Local { store_dir } => {
                let votes = LocalStore::new(store_dir).read_all();
                board.absorb("local", votes);
            }
            SourceSpec::Csv { path } => {
                for p in io_csv::collect_csv_paths(path) {
                    let votes = io_csv::read_csv_votes(&p);
                    board.absorb(&simplify_file_name(&p), votes);
                }
            }
        }
    }
    info!(
        "collect_votes: {} votes from {} sources",
        board.len(),
        settings.sources.len()
    );
    board
}

fn tally_to_json(tallies: &TallyTable) -> JSValue {
    let mut totals: JSMap<String, JSValue> = JSMap::new();
    let mut per_group: JSMap<String, JSValue> = JSMap::new();
    for g in Group::ALL {
        totals.insert(g.label().to_string(), json!(tallies.total(g)));
        let mut counts: JSMap<String, JSValue> = JSMap::new();
        for (category, count) in tallies.group(g).iter() {
            counts.insert(category.clone(), json!(count));
        }
        per_group.insert(g.label().to_string(), JSValue::Object(counts));
    }
    json!({
        "totals": totals,
        "tally": per_group,
        "maxCount": tallies.max_count()
    })
}

fn build_summary_js(settings: &RunSettings, board: &ResultsBoard) -> JSValue {
    let mut js = tally_to_json(&board.tallies());
    js["config"] = json!({ "title": settings.title });
    js["records"] = json!(board.len());
    js
}

pub fn read_summary(path: &str) -> VmResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

// 'stdout' prints instead of writing a file.
fn write_output(path: &str, contents: &str) -> VmResult<()> {
    if path == "stdout" {
        println!("{}", contents);
        return Ok(());
    }
    fs::write(path, contents).context(WritingOutputSnafu { path })?;
    info!("write_output: wrote {}", path);
    Ok(())
}

pub fn run_tally(
    settings: &RunSettings,
    out: Option<String>,
    reference: Option<String>,
) -> VmResult<()> {
    let board = collect_votes(settings);
    let tallies = board.tallies();

    println!(
        "{}",
        report::render_report(&settings.title, &tallies, &settings.topics)
    );

    let summary_js = build_summary_js(settings, &board);
    let pretty_js_stats =
        serde_json::to_string_pretty(&summary_js).context(EncodingJsonSnafu { what: "summary" })?;
    debug!("run_tally: summary: {}", pretty_js_stats);

    if let Some(out_path) = out.or_else(|| settings.output_path.clone()) {
        write_output(&out_path, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref = serde_json::to_string_pretty(&summary_ref).context(
            EncodingJsonSnafu {
                what: summary_p.clone(),
            },
        )?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary {}", summary_p);
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
        info!("run_tally: summary matches the reference {}", summary_p);
    }
    Ok(())
}

pub fn run_submit(
    settings: &RunSettings,
    group_label: &str,
    choice: &str,
    origin: Option<String>,
    backup: Option<String>,
) -> VmResult<Record> {
    let group = Group::from_label(group_label).context(UnknownGroupSnafu { label: group_label })?;
    if choice.trim().is_empty() {
        whatever!("A choice is required to submit a vote")
    }
    let record = Record::new(group, choice, &now_timestamp())
        .with_origin(&origin.unwrap_or_else(default_origin));

    let store = LocalStore::new(&settings.store_dir);
    let slot = store.append(&record);
    info!(
        "run_submit: {} now holds {} votes",
        store.slot_path(group).display(),
        slot.len()
    );

    if let Some(backup_path) = backup {
        write_output(&backup_path, &codec::serialize(&slot))?;
    }

    println!(
        "Thanks for voting! You chose: {}",
        report::topic_title(&settings.topics, choice)
    );
    Ok(record)
}

pub fn run_export(settings: &RunSettings, output: Option<String>) -> VmResult<()> {
    let board = collect_votes(settings);
    debug!("run_export: exporting {} votes", board.snapshot().len());
    let text = board.export();
    write_output(output.as_deref().unwrap_or("stdout"), &text)
}

pub fn run_clear(settings: &RunSettings) -> VmResult<()> {
    let store = LocalStore::new(&settings.store_dir);
    let mut board = ResultsBoard::default();
    board.absorb("local", store.read_all());
    let dropped = board.len();
    board.clear(&store);
    println!(
        "Cleared {} local votes from {}",
        dropped,
        settings.store_dir.display()
    );
    Ok(())
}
