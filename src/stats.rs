use std::error::Error;
use std::io::Read;

use fnv::FnvHashMap;

/// Maps the arbitrary string identifiers of the input data to consecutive
/// integer ids, built in a first pass over the interaction file. The integer
/// ids are assigned in order of first appearance and stay fixed afterwards.
pub struct DataDictionary {
    user_dict: FnvHashMap<String, u32>,
    item_dict: FnvHashMap<String, u32>,
    num_interactions: u64,
}

impl DataDictionary {

    pub fn num_users(&self) -> usize {
        self.user_dict.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_dict.len()
    }

    pub fn num_interactions(&self) -> u64 {
        self.num_interactions
    }

    pub fn user_index(&self, name: &str) -> Option<u32> {
        self.user_dict.get(name).copied()
    }

    pub fn item_index(&self, name: &str) -> Option<u32> {
        self.item_dict.get(name).copied()
    }
}

impl DataDictionary {

    /// Builds the dictionary from `<user> <item> <rating>` records. A record
    /// with fewer than three fields aborts the read.
    pub fn from_reader<R: Read>(reader: &mut csv::Reader<R>) -> Result<Self, Box<dyn Error>> {

        let mut user_index: u32 = 0;
        let mut user_dict: FnvHashMap<String, u32> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut item_index: u32 = 0;
        let mut item_dict: FnvHashMap<String, u32> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut num_interactions: u64 = 0;

        for record in reader.records() {
            let record = record?;

            if record.len() < 3 {
                return Err(From::from(format!(
                    "Malformed interaction record with {} fields, expected at least 3",
                    record.len()
                )));
            }

            let user = &record[0];
            let item = &record[1];

            if !user_dict.contains_key(user) {
                user_dict.insert(user.to_owned(), user_index);
                user_index += 1;
            }

            if !item_dict.contains_key(item) {
                item_dict.insert(item.to_owned(), item_index);
                item_index += 1;
            }

            num_interactions += 1;
        }

        Ok(DataDictionary { user_dict, item_dict, num_interactions })
    }
}

/// Reverse mapping from integer ids back to the original string identifiers,
/// used when writing output for human consumption.
pub struct Renaming {
    user_names: FnvHashMap<u32, String>,
    item_names: FnvHashMap<u32, String>,
}

impl Renaming {

    pub fn user_name(&self, user_index: u32) -> &str {
        &self.user_names[&user_index]
    }

    pub fn item_name(&self, item_index: u32) -> &str {
        &self.item_names[&item_index]
    }
}

impl From<DataDictionary> for Renaming {

    fn from(data_dict: DataDictionary) -> Self {

        let mut user_names: FnvHashMap<u32, String> =
            FnvHashMap::with_capacity_and_hasher(data_dict.num_users(), Default::default());

        let mut item_names: FnvHashMap<u32, String> =
            FnvHashMap::with_capacity_and_hasher(data_dict.num_items(), Default::default());

        for (user, user_id) in data_dict.user_dict.into_iter() {
            user_names.insert(user_id, user);
        }

        for (item, item_id) in data_dict.item_dict.into_iter() {
            item_names.insert(item_id, item);
        }

        Renaming { user_names, item_names }
    }
}


#[cfg(test)]
mod tests {

    use super::{DataDictionary, Renaming};
    use crate::io;

    #[test]
    fn dictionary_assigns_consecutive_ids() {

        let data = "alice\tpony\t5.0\nbob\tpony\t4.0\nalice\tbike\t1.0\n";
        let mut reader = io::csv_reader_from(data.as_bytes());

        let data_dict = DataDictionary::from_reader(&mut reader).unwrap();

        assert_eq!(data_dict.num_users(), 2);
        assert_eq!(data_dict.num_items(), 2);
        assert_eq!(data_dict.num_interactions(), 3);
        assert_eq!(data_dict.user_index("alice"), Some(0));
        assert_eq!(data_dict.user_index("bob"), Some(1));
        assert_eq!(data_dict.item_index("pony"), Some(0));
        assert_eq!(data_dict.item_index("bike"), Some(1));
        assert_eq!(data_dict.user_index("charles"), None);

        let renaming = Renaming::from(data_dict);
        assert_eq!(renaming.user_name(1), "bob");
        assert_eq!(renaming.item_name(1), "bike");
    }

    #[test]
    fn too_few_fields_abort_the_read() {

        let data = "alice\tpony\t5.0\nbob\tpony\n";
        let mut reader = io::csv_reader_from(data.as_bytes());

        assert!(DataDictionary::from_reader(&mut reader).is_err());
    }
}
