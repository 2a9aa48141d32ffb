use log::{debug, LevelFilter};

use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod collect;

use crate::args::{Args, Command};
use crate::collect::config_reader::load_settings;
use crate::collect::*;

fn run(args: Args) -> VmResult<()> {
    let settings = load_settings(
        args.config.as_deref(),
        args.store_dir.as_deref(),
        args.endpoint.as_deref(),
        &args.input,
    )?;

    let command = args.command.unwrap_or(Command::Tally {
        out: None,
        reference: None,
    });
    debug!("run: command: {:?}", command);

    match command {
        Command::Tally { out, reference } => run_tally(&settings, out, reference),
        Command::Submit {
            group,
            choice,
            origin,
            backup,
        } => run_submit(&settings, &group, &choice, origin, backup).map(|_| ()),
        Command::Export { output } => run_export(&settings, output),
        Command::Clear => run_clear(&settings),
    }
}

fn main() {
    let args = Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = run(args) {
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("{}", bt);
        }
        std::process::exit(1);
    }
}
