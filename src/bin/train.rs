/**
 * BPRank
 * Copyright (C) 2026 The bprank developers
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
use std::error::Error;
use std::fs::File;
use std::io::stdout;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use getopts::Options;
use rand::rngs::StdRng;
use rand::SeedableRng;

use bprank::bpr::{BprLinear, TrainingConfig};
use bprank::io;
use bprank::stats::DataDictionary;
use bprank::utils;
use bprank::{Persistable, ProgressObserver, TrainableModel};

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of interactions \
        between users and items. The input file must contain a user, an item and a rating per \
        line, separated by a tab.", "PATH");
    opts.optopt("a", "attributesfile", "Attribute file name (required). Must contain an item and \
        an attribute id per line, separated by a tab.", "PATH");
    opts.optopt("m", "modelfile", "Model output file name (optional, the model will be written \
        to stdout by default).", "PATH");
    opts.optopt("", "learn-rate", "Gradient ascent step size (optional, defaults to 0.05).",
        "NUMBER");
    opts.optopt("", "reg", "L2 regularization coefficient (optional, defaults to 0.015).",
        "NUMBER");
    opts.optopt("", "num-iter", "Number of training epochs (optional, defaults to 10).",
        "NUMBER");
    opts.optopt("", "iteration-length", "Update-budget multiplier per epoch (optional, defaults \
        to 5).", "NUMBER");
    opts.optopt("", "init-mean", "Mean of the initial weight distribution (optional, defaults \
        to 0).", "NUMBER");
    opts.optopt("", "init-stdev", "Standard deviation of the initial weight distribution \
        (optional, defaults to 0.1).", "NUMBER");
    opts.optopt("", "fast-sampling-memory-limit", "Memory ceiling in MiB below which the \
        precomputed sampling index is built (optional, defaults to 1024).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint));
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    if !matches.opt_present("i") {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        );
    }

    if !matches.opt_present("a") {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an attributesfile via --attributesfile."),
        );
    }

    let interactions_path = matches.opt_str("i").unwrap();
    let attributes_path = matches.opt_str("a").unwrap();
    let model_path = matches.opt_str("m");

    let defaults = TrainingConfig::default();

    let config = TrainingConfig {
        learn_rate: match matches.opt_get_default("learn-rate", defaults.learn_rate) {
            Ok(value) => value,
            Err(failure) => return print_option_failure(&program, opts, "learn-rate", failure),
        },
        reg: match matches.opt_get_default("reg", defaults.reg) {
            Ok(value) => value,
            Err(failure) => return print_option_failure(&program, opts, "reg", failure),
        },
        num_iter: match matches.opt_get_default("num-iter", defaults.num_iter) {
            Ok(value) => value,
            Err(failure) => return print_option_failure(&program, opts, "num-iter", failure),
        },
        iteration_length: match matches.opt_get_default(
            "iteration-length", defaults.iteration_length) {
            Ok(value) => value,
            Err(failure) =>
                return print_option_failure(&program, opts, "iteration-length", failure),
        },
        init_f_mean: match matches.opt_get_default("init-mean", defaults.init_f_mean) {
            Ok(value) => value,
            Err(failure) => return print_option_failure(&program, opts, "init-mean", failure),
        },
        init_f_stdev: match matches.opt_get_default("init-stdev", defaults.init_f_stdev) {
            Ok(value) => value,
            Err(failure) => return print_option_failure(&program, opts, "init-stdev", failure),
        },
        fast_sampling_memory_limit: match matches.opt_get_default(
            "fast-sampling-memory-limit", defaults.fast_sampling_memory_limit) {
            Ok(value) => value,
            Err(failure) =>
                return print_option_failure(&program, opts, "fast-sampling-memory-limit", failure),
        },
    };

    if let Err(failure) = train_model(&interactions_path, &attributes_path, model_path, config) {
        eprintln!("Training failed: {}", failure);
        std::process::exit(1);
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>,
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
}

fn print_option_failure<F: std::fmt::Display>(
    program: &str,
    opts: Options,
    option: &str,
    failure: F,
) {
    let hint = format!("Problem with option '{}': {}", option, failure);
    print_usage_and_exit(program, opts, Some(&hint))
}

/// Prints a dot to stderr for every block of processed samples and a line
/// per finished epoch.
struct DotProgress;

impl ProgressObserver for DotProgress {

    fn samples_processed(&mut self, _epoch: u32, _num_samples: u64) {
        eprint!(".");
    }

    fn epoch_finished(&mut self, epoch: u32) {
        eprintln!(" epoch {} finished", epoch + 1);
    }
}

fn train_model(
    interactions_path: &str,
    attributes_path: &str,
    model_path: Option<String>,
    config: TrainingConfig,
) -> Result<(), Box<dyn Error>> {

    println!("Reading {} to compute data statistics (pass 1/2)", interactions_path);

    let mut reader_pass_one = io::csv_reader(interactions_path)?;
    let data_dict = DataDictionary::from_reader(&mut reader_pass_one)?;

    println!(
        "Found {} interactions between {} users and {} items.",
        data_dict.num_interactions(),
        data_dict.num_users(),
        data_dict.num_items(),
    );

    println!("Reading {} to build the interaction index (pass 2/2)", interactions_path);

    let mut reader_pass_two = io::csv_reader(interactions_path)?;
    let interactions = io::read_interactions(&mut reader_pass_two, &data_dict)?;

    println!("Reading item attributes from {}", attributes_path);

    let mut attribute_reader = io::csv_reader(attributes_path)?;
    let attributes = io::read_attributes(&mut attribute_reader, &data_dict)?;

    println!("Found {} attributes.", attributes.num_attributes());

    let mut model = BprLinear::new(interactions, attributes, config)?;
    model.set_progress_observer(Box::new(DotProgress));

    println!(
        "Training with {} sampling...",
        if model.uses_fast_sampling() { "precomputed" } else { "direct" },
    );

    let training_start = Instant::now();

    let mut rng = StdRng::from_entropy();
    model.train(&mut rng);

    let training_duration = utils::to_millis(training_start.elapsed());
    println!("Training took {}ms", training_duration);

    let mut out: Box<dyn Write> = match model_path {
        Some(path) => {
            println!("Writing model to {}", path);
            Box::new(File::create(&Path::new(&path))?)
        },
        _ => Box::new(stdout()),
    };

    model.save(&mut out)?;

    Ok(())
}
