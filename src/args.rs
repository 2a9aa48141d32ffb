use clap::{Parser, Subcommand};

/// Collects the votes of the class poll from all its sources and counts them
/// without double counting.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the sources, the output and the topics.
    /// See the manual of the vote_merge crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, optional) The directory of the local vote store. Overrides the
    /// directory of the local sources in the configuration. Defaults to `votes`.
    #[clap(long, value_parser)]
    pub store_dir: Option<String>,

    /// (URL, optional) The collection endpoint returning all the votes as a JSON array.
    /// Overrides the URL of the remote sources in the configuration.
    #[clap(long, value_parser)]
    pub endpoint: Option<String>,

    /// (file or directory path, repeatable) Exported CSV files to import. Only files ending in
    /// `.csv` are read. They are merged after all the other sources.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// If passed as an argument, will turn on debug logging.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Merges all the sources and prints the counts (default).
    Tally {
        /// (file path, 'stdout' or empty) If specified, the summary in JSON format is written to
        /// the given location. Overrides the path that may be specified with the --config option.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference summary in JSON format. If provided, the computed summary
        /// must match it.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Records a new vote in the local store.
    Submit {
        /// neutral or nudged
        #[clap(long, value_parser)]
        group: String,
        /// The topic id, for example mental-health
        #[clap(long, value_parser)]
        choice: String,
        /// Description of the submitting client. Defaults to the name of this program.
        #[clap(long, value_parser)]
        origin: Option<String>,
        /// (file path) Writes the votes of this group in the local store as a CSV backup.
        #[clap(long, value_parser)]
        backup: Option<String>,
    },
    /// Writes the merged votes as CSV.
    Export {
        /// (file path or 'stdout') Defaults to the standard output.
        #[clap(short, long, value_parser)]
        output: Option<String>,
    },
    /// Removes all the votes from the local store.
    Clear,
}
