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

use std::error::Error;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use serde_derive::Serialize;
use serde_json::json;

use crate::data::{AttributeIndex, InteractionIndex};
use crate::matrix::WeightModel;
use crate::recommend::ScoredItem;
use crate::stats::{DataDictionary, Renaming};

/// Accepted rating scale of the input data. Ratings outside of it are kept,
/// but reported once per load.
const MIN_RATING: f64 = 0.0;
const MAX_RATING: f64 = 5.0;

/// Reads a CSV input file. We expect NO headers and tab separation. Records
/// are read flexibly so that we can validate the field count ourselves.
pub fn csv_reader(file: &str) -> Result<csv::Reader<File>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_path(file)
}

pub fn csv_reader_from<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(input)
}

/// Reads `<user> <item> <rating>` records into an interaction index, using
/// the data dictionary for the id mapping. A record with fewer than three
/// fields or an unparseable rating aborts the read; a rating outside of the
/// accepted scale is reported once and the interaction kept.
pub fn read_interactions<R: Read>(
    reader: &mut csv::Reader<R>,
    data_dict: &DataDictionary,
) -> Result<InteractionIndex, Box<dyn Error>> {

    let mut interactions =
        InteractionIndex::with_dimensions(data_dict.num_users(), data_dict.num_items());

    let mut rating_warning_emitted = false;

    for record in reader.records() {
        let record = record?;

        if record.len() < 3 {
            return Err(From::from(format!(
                "Malformed interaction record with {} fields, expected at least 3",
                record.len()
            )));
        }

        let user_index = data_dict.user_index(&record[0])
            .ok_or_else(|| format!("Unknown user identifier {}", &record[0]))?;
        let item_index = data_dict.item_index(&record[1])
            .ok_or_else(|| format!("Unknown item identifier {}", &record[1]))?;

        let rating: f64 = record[2].parse()?;

        if (rating < MIN_RATING || rating > MAX_RATING) && !rating_warning_emitted {
            eprintln!(
                "Rating {} outside of the scale [{}, {}], keeping it anyway",
                rating, MIN_RATING, MAX_RATING
            );
            rating_warning_emitted = true;
        }

        interactions.insert(user_index, item_index);
    }

    Ok(interactions)
}

/// Reads `<item> <attribute_id>` records into an attribute index. Attributes
/// of items that never occur in the interaction data are skipped, as no
/// internal id exists for them.
pub fn read_attributes<R: Read>(
    reader: &mut csv::Reader<R>,
    data_dict: &DataDictionary,
) -> Result<AttributeIndex, Box<dyn Error>> {

    let mut attributes = AttributeIndex::with_dimensions(data_dict.num_items(), 0);

    let mut num_skipped: u64 = 0;

    for record in reader.records() {
        let record = record?;

        if record.len() < 2 {
            return Err(From::from(format!(
                "Malformed attribute record with {} fields, expected at least 2",
                record.len()
            )));
        }

        let attribute: u32 = record[1].parse()?;

        match data_dict.item_index(&record[0]) {
            Some(item_index) => attributes.insert(item_index, attribute),
            None => num_skipped += 1,
        }
    }

    if num_skipped > 0 {
        eprintln!("Skipped {} attribute records for unknown items", num_skipped);
    }

    Ok(attributes)
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Writes a weight matrix as plain text: a `<num_rows> <num_cols>` header
/// line followed by one `<row> <col> <value>` line per entry.
pub fn write_weight_model(model: &WeightModel, out: &mut dyn Write) -> io::Result<()> {

    writeln!(out, "{} {}", model.num_rows(), model.num_cols())?;

    for row in 0..model.num_rows() as u32 {
        for col in 0..model.num_cols() as u32 {
            writeln!(out, "{} {} {}", row, col, model.get(row, col))?;
        }
    }

    Ok(())
}

/// Reads a weight matrix from the plain text format written by
/// [`write_weight_model`]. The dimensions are taken from the header; reading
/// stops at the first line that does not split into exactly three tokens.
/// An entry outside of the declared dimensions is an error.
pub fn read_weight_model(input: &mut dyn BufRead) -> io::Result<WeightModel> {

    let mut header = String::new();
    if input.read_line(&mut header)? == 0 {
        return Err(invalid_data(String::from("Missing model header")));
    }

    let dimensions: Vec<&str> = header.split_whitespace().collect();
    if dimensions.len() != 2 {
        return Err(invalid_data(format!("Malformed model header: {}", header.trim_end())));
    }

    let num_rows: usize = dimensions[0].parse()
        .map_err(|_| invalid_data(format!("Malformed row count: {}", dimensions[0])))?;
    let num_cols: usize = dimensions[1].parse()
        .map_err(|_| invalid_data(format!("Malformed column count: {}", dimensions[1])))?;

    let mut model = WeightModel::new(num_rows, num_cols);

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            break;
        }

        let row: usize = tokens[0].parse()
            .map_err(|_| invalid_data(format!("Malformed row index: {}", tokens[0])))?;
        let col: usize = tokens[1].parse()
            .map_err(|_| invalid_data(format!("Malformed column index: {}", tokens[1])))?;
        let value: f64 = tokens[2].parse()
            .map_err(|_| invalid_data(format!("Malformed value: {}", tokens[2])))?;

        if row >= num_rows || col >= num_cols {
            return Err(invalid_data(format!(
                "Entry ({}, {}) out of range for a {} x {} matrix",
                row, col, num_rows, num_cols
            )));
        }

        model.set(row as u32, col as u32, value);
    }

    Ok(model)
}

/// Struct used for JSON serialization of ranked items. Field names will be
/// used in JSON.
#[derive(Serialize)]
struct RankedItems<'a> {
    for_user: &'a str,
    ranked_items: Vec<RankedItem<'a>>,
}

#[derive(Serialize)]
struct RankedItem<'a> {
    item: &'a str,
    score: f64,
}

/// Output the computed per-user rankings in JSON format, using the original
/// identifiers from the input file. If a `ranking_path` is supplied, we write
/// to a file at the specified path, otherwise, we output to stdout.
pub fn write_rankings(
    rankings: &[Vec<ScoredItem>],
    renaming: &Renaming,
    ranking_path: Option<String>,
) -> io::Result<()> {

    let mut out: Box<dyn Write> = match ranking_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout()),
    };

    for (user_index, scored_items) in rankings.iter().enumerate() {

        let for_user = renaming.user_name(user_index as u32);

        let ranked_items: Vec<RankedItem> = scored_items.iter()
            .map(|scored_item| RankedItem {
                item: renaming.item_name(scored_item.item),
                score: scored_item.score,
            })
            .collect();

        let rankings_as_json = json!(
            RankedItems {
                for_user,
                ranked_items
            });

        writeln!(out, "{}", rankings_as_json)?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {

    use std::io::BufReader;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::stats::DataDictionary;

    fn data_dict_for(data: &str) -> DataDictionary {
        let mut reader = csv_reader_from(data.as_bytes());
        DataDictionary::from_reader(&mut reader).unwrap()
    }

    #[test]
    fn interactions_are_indexed_bidirectionally() {

        let data = "alice\tpony\t5.0\nbob\tpony\t4.0\nalice\tbike\t1.0\n";
        let data_dict = data_dict_for(data);

        let mut reader = csv_reader_from(data.as_bytes());
        let interactions = read_interactions(&mut reader, &data_dict).unwrap();

        assert_eq!(interactions.num_interactions(), 3);
        assert!(interactions.contains(0, 0));
        assert!(interactions.contains(1, 0));
        assert!(interactions.contains(0, 1));
        assert!(!interactions.contains(1, 1));
        assert_eq!(interactions.users_of(0).len(), 2);
    }

    #[test]
    fn out_of_scale_ratings_are_kept() {

        let data = "alice\tpony\t99.0\nbob\tpony\t-3.0\n";
        let data_dict = data_dict_for(data);

        let mut reader = csv_reader_from(data.as_bytes());
        let interactions = read_interactions(&mut reader, &data_dict).unwrap();

        assert_eq!(interactions.num_interactions(), 2);
    }

    #[test]
    fn unparseable_rating_aborts_the_read() {

        let data = "alice\tpony\t5.0\n";
        let data_dict = data_dict_for(data);

        let malformed = "alice\tpony\tgreat\n";
        let mut reader = csv_reader_from(malformed.as_bytes());

        assert!(read_interactions(&mut reader, &data_dict).is_err());
    }

    #[test]
    fn attributes_of_unknown_items_are_skipped() {

        let data = "alice\tpony\t5.0\nalice\tbike\t5.0\n";
        let data_dict = data_dict_for(data);

        let attribute_data = "pony\t0\npony\t2\nbike\t1\nunicorn\t2\n";
        let mut reader = csv_reader_from(attribute_data.as_bytes());
        let attributes = read_attributes(&mut reader, &data_dict).unwrap();

        assert_eq!(attributes.num_attributes(), 3);
        assert!(attributes.attributes_of(0).contains(&0));
        assert!(attributes.attributes_of(0).contains(&2));
        assert!(attributes.attributes_of(1).contains(&1));
        assert_eq!(attributes.attributes_of(1).len(), 1);
    }

    #[test]
    fn weight_model_roundtrips_exactly() {

        let mut rng = StdRng::seed_from_u64(42);
        let mut model = WeightModel::new(3, 4);
        model.init_normal(0.0, 0.1, &mut rng);

        let mut buffer = Vec::new();
        write_weight_model(&model, &mut buffer).unwrap();

        let restored = read_weight_model(&mut BufReader::new(&buffer[..])).unwrap();

        assert_eq!(restored, model);
    }

    #[test]
    fn reading_stops_at_the_first_short_line() {

        let persisted = "2 2\n0 0 0.5\n1 1 -0.25\ntrailing garbage\n0 1 99.0\n";
        let model = read_weight_model(&mut BufReader::new(persisted.as_bytes())).unwrap();

        assert_eq!(model.num_rows(), 2);
        assert_eq!(model.get(0, 0), 0.5);
        assert_eq!(model.get(1, 1), -0.25);
        // The entry after the terminating line must not have been applied
        assert_eq!(model.get(0, 1), 0.0);
    }

    #[test]
    fn out_of_range_entry_is_rejected() {

        let persisted = "2 2\n0 0 0.5\n5 0 1.0\n";
        let result = read_weight_model(&mut BufReader::new(persisted.as_bytes()));

        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("out of range"));
    }

    #[test]
    fn malformed_header_is_rejected() {

        let persisted = "2\n0 0 0.5\n";
        assert!(read_weight_model(&mut BufReader::new(persisted.as_bytes())).is_err());

        let empty = "";
        assert!(read_weight_model(&mut BufReader::new(empty.as_bytes())).is_err());
    }
}
