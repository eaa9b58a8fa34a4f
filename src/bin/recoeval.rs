/**
 * RecoEval
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use getopts::{Matches, Options};
use tracing_subscriber::EnvFilter;

use recoeval::io;
use recoeval::pipeline::{self, PipelineReport};
use recoeval::{PipelineConfig, RecoError};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("c", "config", "JSON configuration file (optional). Options given on the \
        command line take precedence.", "PATH");
    opts.optopt("d", "data-dir", "Directory that holds the extracted ml-latest-small dataset \
        (optional, defaults to 'data').", "PATH");
    opts.optopt("k", "top-k", "Length of the recommendation lists to evaluate (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("t", "threads", "Number of worker threads (optional, defaults to the number of \
        CPUs).", "NUMBER");
    opts.optopt("o", "outputfile", "Write the evaluation report as JSON to this file \
        (optional).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match configure(&matches) {
        Ok(config) => config,
        Err(failure) => exit_with(&failure),
    };

    let report_path = matches.opt_str("o").map(PathBuf::from);

    if let Err(failure) = evaluate(&config, report_path.as_deref()) {
        exit_with(&failure);
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    if hint.is_some() {
        process::exit(2);
    }
}

fn exit_with(failure: &RecoError) -> ! {
    eprintln!("{}", error_line(failure));
    process::exit(1);
}

fn error_line(failure: &RecoError) -> String {
    format!("Error [{}]: {}", failure.kind(), failure)
}

fn configure(matches: &Matches) -> Result<PipelineConfig, RecoError> {

    let mut config = match matches.opt_str("c") {
        Some(path) => PipelineConfig::from_json_file(&path)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = matches.opt_str("d") {
        config.data.local_cache_dir = PathBuf::from(dir);
    }

    if let Some(k) = parse_number(matches, "k")? {
        config.evaluation.k = k;
    }

    if let Some(num_threads) = parse_number(matches, "t")? {
        config.evaluation.num_threads = num_threads;
    }

    config.validate()?;

    Ok(config)
}

fn parse_number(matches: &Matches, option: &str) -> Result<Option<usize>, RecoError> {
    matches.opt_get::<usize>(option)
        .map_err(|failure| RecoError::InvalidConfig(
            format!("Problem with option '{}': {}", option, failure)))
}

fn evaluate(config: &PipelineConfig, report_path: Option<&Path>) -> Result<(), RecoError> {

    println!("{}", "=".repeat(50));
    println!("RUNNING MOVIELENS RECSYS PIPELINE");
    println!("{}", "=".repeat(50));

    let report = pipeline::run(config)?;

    print_report(&report);

    if let Some(path) = report_path {
        println!("Writing report to {}", path.display());
        io::write_json(&report, Some(path))?;
    }

    Ok(())
}

fn print_report(report: &PipelineReport) {

    println!(
        "\n{} users, {} items, {} training and {} test interactions",
        report.num_users, report.num_items, report.train_nnz, report.test_nnz,
    );

    for (index, model) in report.models.iter().enumerate() {
        println!("\n{}", "-".repeat(20));
        println!("MODEL {}: {}", index + 1, model.name);
        println!("{}", "-".repeat(20));
        println!("Precision@{}: {:.4}", report.k, model.precision);
        println!("NDCG@{}: {:.4}", report.k, model.ndcg);
        println!("({} users evaluated in {}ms)", model.num_users, model.elapsed_ms);
    }

    let summary: Vec<String> = report.models.iter()
        .map(|model| format!("{} ({:.4})", model.name, model.precision))
        .collect();

    println!("\n{}", "=".repeat(50));
    println!("RESULT: {}", summary.join(" vs "));
    println!("{}", "=".repeat(50));
}


#[cfg(test)]
mod tests {

    use std::path::PathBuf;

    use recoeval::RecoError;

    use super::error_line;

    #[test]
    fn error_line_names_kind_and_cause() {
        let failure = RecoError::MissingDataset {
            path: PathBuf::from("data/ml-latest-small/ratings.csv"),
            download_url: "https://example.org/ml-latest-small.zip".to_string(),
        };

        let line = error_line(&failure);

        assert!(line.starts_with("Error [MissingDatasetError]: "));
        assert!(line.contains("ratings.csv"));
        assert!(line.contains("https://example.org/ml-latest-small.zip"));
    }

    #[test]
    fn invalid_options_are_reported_as_config_errors() {
        let failure = RecoError::InvalidConfig("Problem with option 'k': invalid digit".to_string());

        assert_eq!(
            error_line(&failure),
            format!("Error [InvalidConfigError]: {}", failure),
        );
    }
}
