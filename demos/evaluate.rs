//! Ranks a single drug and compares the ranking to a list of
//! known adverse events
//!
//! The gold list contains one HPO term id or standardized term per line

use phenorank::eval::{read_gold_list, EvalReport, Projection};
use phenorank::pipeline::load_index;
use phenorank::{DrugId, RankConfig, Ranker};

fn main() {
    simple_logger::init_with_env().unwrap();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: evaluate <INPUT DIR> <DRUG> <GOLD LIST> [K]");
        std::process::exit(1);
    }
    let k: usize = args.get(4).map_or(10, |k| k.parse().unwrap());

    let config = RankConfig::default();
    let (index, _) = load_index(&args[1], &config).unwrap();
    let drug = DrugId::new(&args[2]);
    let gold = read_gold_list(&args[3]).unwrap();

    let ranking = Ranker::new(&index, config.coefficients).rank_drug(&drug);
    let report = EvalReport::new(&ranking, &gold, &index, k);

    println!("drug\tspace\tP@{k}\tnDCG@{k}");
    println!(
        "{}\t{}\t{:.4}\t{:.4}",
        drug,
        report.space(),
        report.precision(),
        report.ndcg()
    );

    let projection = Projection::new(&ranking, &gold, &index);
    for item in &gold {
        match projection.rank_of(item) {
            Some(rank) => println!("{item}\t{rank}"),
            None => println!("{item}\tnot ranked"),
        }
    }
}
