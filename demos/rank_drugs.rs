//! Ranks the adverse-event phenotypes of all drugs in a directory of
//! relation tables and writes the ranked tables to an output directory

use std::process;

use phenorank::pipeline::run;
use phenorank::RankConfig;

fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("Usage: rank_drugs <INPUT DIR> <OUTPUT DIR> [CONFIG]");
        process::exit(1);
    };

    let config = match args.next() {
        Some(path) => RankConfig::from_file(path).unwrap(),
        None => RankConfig::default(),
    };

    match run(&input, &output, &config) {
        Ok(summary) => {
            println!(
                "Ranked {} drugs, wrote {} files, skipped {} rows",
                summary.drugs(),
                summary.files().len(),
                summary.warnings().len()
            );
            for warning in summary.warnings() {
                println!("  {warning}");
            }
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
