mod args;
mod tally;

use std::process::exit;

use clap::{CommandFactory, Parser};
use crowd_scoring::FillMode;
use log::{debug, warn};

use crate::tally::config_reader::{InputType, TallySettings};

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    let fill_mode: FillMode = match args.missing.parse() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    if args.print_teams {
        let path = match &args.teams {
            Some(p) => p,
            None => {
                eprintln!("--print-teams requires a teams file (--teams)");
                exit(1);
            }
        };
        match tally::load_roster(path) {
            Ok(roster) => {
                tally::report::print_teams(&roster);
                exit(0);
            }
            Err(e) => {
                eprintln!("An error occured: {}", e);
                exit(2);
            }
        }
    }

    let input_path = match &args.input {
        Some(p) => p.clone(),
        None => {
            // Nothing to tally
            let _ = args::Args::command().print_help();
            exit(1);
        }
    };

    let input_type = match InputType::from_option(&args.input_type, &input_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    let settings = TallySettings {
        input_path,
        input_type,
        excel_worksheet_name: args.excel_worksheet_name.clone(),
        teams_path: args.teams.clone(),
        individual: args.individual,
        fill_mode,
        out: args.out.clone(),
        reference: args.reference.clone(),
    };

    if let Err(e) = tally::run_tally(&settings) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        exit(2);
    }
}
