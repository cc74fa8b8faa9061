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
use std::io::BufReader;

use getopts::Options;

use bprank::bpr::{BprLinear, TrainingConfig};
use bprank::io;
use bprank::recommend;
use bprank::stats::{DataDictionary, Renaming};
use bprank::Persistable;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of interactions \
        between users and items. The input file must contain a user, an item and a rating per \
        line, separated by a tab.", "PATH");
    opts.optopt("a", "attributesfile", "Attribute file name (required). Must contain an item and \
        an attribute id per line, separated by a tab.", "PATH");
    opts.optopt("m", "modelfile", "File with a previously trained model (required).", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, rankings will be written to \
        stdout by default).", "PATH");
    opts.optopt("n", "num-items", "Number of items to rank per user (optional, defaults to 10).",
        "NUMBER");
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

    for &(option, hint) in &[
        ("i", "Please specify an inputfile via --inputfile."),
        ("a", "Please specify an attributesfile via --attributesfile."),
        ("m", "Please specify a modelfile via --modelfile."),
    ] {
        if !matches.opt_present(option) {
            return print_usage_and_exit(&program, opts, Some(hint));
        }
    }

    let interactions_path = matches.opt_str("i").unwrap();
    let attributes_path = matches.opt_str("a").unwrap();
    let model_path = matches.opt_str("m").unwrap();
    let ranking_path = matches.opt_str("o");

    let how_many: usize = match matches.opt_get_default("n", 10) {
        Ok(how_many) => how_many,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint));
        },
    };

    let outcome = compute_rankings(
        &interactions_path,
        &attributes_path,
        &model_path,
        how_many,
        ranking_path,
    );

    if let Err(failure) = outcome {
        eprintln!("Ranking failed: {}", failure);
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

fn compute_rankings(
    interactions_path: &str,
    attributes_path: &str,
    model_path: &str,
    how_many: usize,
    ranking_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    println!("Reading {} to compute data statistics (pass 1/3)", interactions_path);

    let mut reader_pass_one = io::csv_reader(interactions_path)?;
    let data_dict = DataDictionary::from_reader(&mut reader_pass_one)?;

    println!(
        "Found {} interactions between {} users and {} items.",
        data_dict.num_interactions(),
        data_dict.num_users(),
        data_dict.num_items(),
    );

    println!("Reading {} to build the interaction index (pass 2/3)", interactions_path);

    let mut reader_pass_two = io::csv_reader(interactions_path)?;
    let interactions = io::read_interactions(&mut reader_pass_two, &data_dict)?;

    println!("Reading item attributes from {}", attributes_path);

    let mut attribute_reader = io::csv_reader(attributes_path)?;
    let attributes = io::read_attributes(&mut attribute_reader, &data_dict)?;

    let mut model = BprLinear::new(interactions, attributes, TrainingConfig::default())?;

    println!("Loading model from {}", model_path);

    let mut model_reader = BufReader::new(File::open(model_path)?);
    model.load(&mut model_reader)?;

    println!("Reading {} to load user histories (pass 3/3)", interactions_path);

    let mut reader_pass_three = io::csv_reader(interactions_path)?;
    let histories = io::read_interactions(&mut reader_pass_three, &data_dict)?;

    // Build the reverse index, make sure we consume the data dictionary
    let renaming: Renaming = data_dict.into();

    println!("Ranking the top {} unseen items per user...", how_many);
    let rankings = recommend::recommend(&model, &histories, how_many);

    println!("Writing rankings...");
    io::write_rankings(&rankings, &renaming, ranking_path)?;

    Ok(())
}
