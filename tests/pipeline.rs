use std::fs;
use std::path::{Path, PathBuf};

use phenorank::eval::{read_gold_list, EvalReport, EvalSpace};
use phenorank::parser::WarningKind;
use phenorank::pipeline::{load_index, run};
use phenorank::{DrugId, PhenotypeId, RankConfig, RankError, Ranker};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn output_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "phenorank-it-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn full_run_writes_ranked_tables() {
    let out = output_dir("full");
    let summary = run(fixture("basic"), &out, &RankConfig::default()).unwrap();

    assert_eq!(summary.drugs(), 2);
    assert_eq!(summary.files().len(), 5);

    assert_eq!(
        fs::read_to_string(out.join("CHEMBL1064_ranked_hpo.csv")).unwrap(),
        "phenotype_id,score\nHP:0003198,2.840000\nHP:0001250,1.200000\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("CHEMBL108_ranked_hpo.csv")).unwrap(),
        "phenotype_id,score\nHP:0001250,1.050000\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("debug_CHEMBL1064.txt")).unwrap(),
        "top3 HPO: HP:0003198, HP:0001250\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("topk_preview.csv")).unwrap(),
        "drug,rank,phenotype_id,standardized_term,score\n\
         CHEMBL1064,1,HP:0003198,Myopathy,2.840000\n\
         CHEMBL1064,2,HP:0001250,Seizure,1.200000\n\
         CHEMBL108,1,HP:0001250,Seizure,1.050000\n"
    );
    fs::remove_dir_all(&out).unwrap();
}

#[test]
fn malformed_rows_are_reported() {
    let (_, warnings) = load_index(fixture("basic"), &RankConfig::default()).unwrap();
    assert_eq!(warnings.len(), 4);

    assert_eq!(warnings[0].table(), "drug_targets");
    assert_eq!(warnings[0].line(), 4);
    assert_eq!(warnings[0].kind(), &WarningKind::MissingField("protein_id"));

    let tables: Vec<&str> = warnings.iter().map(|w| w.table()).collect();
    assert_eq!(
        tables,
        vec!["drug_targets", "pgx_weights", "pgx_weights", "term_priors"]
    );
    assert!(matches!(
        warnings[3].kind(),
        WarningKind::OutOfRange { column: "prior", .. }
    ));
}

#[test]
fn missing_required_table_fails_without_output() {
    let out = output_dir("missing");
    let mut config = RankConfig::default();
    config.tables.gene_phenotypes = "does_not_exist.csv".to_string();

    let err = run(fixture("basic"), &out, &config).unwrap_err();
    assert!(matches!(
        err,
        RankError::Load {
            table: "gene_phenotypes",
            ..
        }
    ));
    assert!(!out.exists());
}

#[test]
fn empty_and_missing_optional_tables() {
    // `minimal` has an empty pharmacogenomic table and no mapping or prior tables
    let out = output_dir("minimal");
    let summary = run(fixture("minimal"), &out, &RankConfig::default()).unwrap();
    assert_eq!(summary.drugs(), 1);
    assert!(summary.warnings().is_empty());
    assert_eq!(
        fs::read_to_string(out.join("D1_ranked_hpo.csv")).unwrap(),
        "phenotype_id,score\nHP:0000001,1.000000\n"
    );
    fs::remove_dir_all(&out).unwrap();
}

#[test]
fn required_table_with_header_only() {
    // `header_only` has a gene phenotype table without any rows
    let out = output_dir("header-only");
    let summary = run(fixture("header_only"), &out, &RankConfig::default()).unwrap();
    assert_eq!(summary.drugs(), 1);
    assert!(summary.warnings().is_empty());
    assert_eq!(
        fs::read_to_string(out.join("D1_ranked_hpo.csv")).unwrap(),
        "phenotype_id,score\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("debug_D1.txt")).unwrap(),
        "top3 HPO: \n"
    );
    fs::remove_dir_all(&out).unwrap();
}

#[test]
fn repeated_runs_are_byte_identical() {
    let first = output_dir("first");
    let second = output_dir("second");
    run(fixture("basic"), &first, &RankConfig::default()).unwrap();
    run(fixture("basic"), &second, &RankConfig::default()).unwrap();

    for name in [
        "CHEMBL1064_ranked_hpo.csv",
        "CHEMBL108_ranked_hpo.csv",
        "topk_preview.csv",
    ] {
        assert_eq!(
            fs::read(first.join(name)).unwrap(),
            fs::read(second.join(name)).unwrap()
        );
    }
    fs::remove_dir_all(&first).unwrap();
    fs::remove_dir_all(&second).unwrap();
}

#[test]
fn coefficients_from_config() {
    let config = RankConfig::from_toml_str("[coefficients]\nbeta = 0.0\nlambda = 0.0\n").unwrap();
    let (index, _) = load_index(fixture("basic"), &config).unwrap();
    let ranking = Ranker::new(&index, config.coefficients).rank_drug(&DrugId::new("CHEMBL1064"));

    let best = &ranking.entries()[0];
    assert_eq!(best.phenotype(), &PhenotypeId::new("HP:0003198"));
    assert_eq!(format!("{:.6}", best.score()), "2.300000");
    assert_eq!(best.breakdown().paths(), 2);
}

#[test]
fn evaluate_against_gold_list() {
    let config = RankConfig::default();
    let (index, _) = load_index(fixture("basic"), &config).unwrap();
    let ranking = Ranker::new(&index, config.coefficients).rank_drug(&DrugId::new("CHEMBL1064"));
    let gold = read_gold_list(fixture("gold_chembl1064.txt")).unwrap();
    assert_eq!(gold, vec!["HP:0003198", "HP:0001250"]);

    let report = EvalReport::new(&ranking, &gold, &index, 10);
    assert_eq!(report.space(), EvalSpace::Term);
    assert_eq!(report.precision(), 1.0);
    assert_eq!(report.ndcg(), 1.0);
}
