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

use crate::types;
use crate::types::{SparseBinaryMatrix, SparseBinarySet};

/// Bidirectional index over observed user-item interactions. Both directions
/// offer O(1) membership tests; the per-user item lists additionally allow
/// uniform draws by index during sampling. Duplicate interactions collapse.
pub struct InteractionIndex {
    user_item_lists: Vec<Vec<u32>>,
    user_items: SparseBinaryMatrix,
    item_users: SparseBinaryMatrix,
    num_interactions: u64,
}

impl InteractionIndex {

    pub fn with_dimensions(num_users: usize, num_items: usize) -> Self {
        InteractionIndex {
            user_item_lists: vec![Vec::new(); num_users],
            user_items: types::new_sparse_binary_matrix(num_users),
            item_users: types::new_sparse_binary_matrix(num_items),
            num_interactions: 0,
        }
    }

    /// Records an interaction between `user` and `item`, keeping both
    /// directions of the index in sync.
    pub fn insert(&mut self, user: u32, item: u32) {
        if self.user_items[user as usize].insert(item) {
            self.user_item_lists[user as usize].push(item);
            self.item_users[item as usize].insert(user);
            self.num_interactions += 1;
        }
    }

    pub fn num_users(&self) -> usize {
        self.user_items.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_users.len()
    }

    /// Number of distinct positive interactions in the index.
    pub fn num_interactions(&self) -> u64 {
        self.num_interactions
    }

    pub fn items_of(&self, user: u32) -> &[u32] {
        &self.user_item_lists[user as usize]
    }

    pub fn users_of(&self, item: u32) -> &SparseBinarySet {
        &self.item_users[item as usize]
    }

    pub fn contains(&self, user: u32, item: u32) -> bool {
        self.user_items[user as usize].contains(&item)
    }

    /// True if at least one user interacted with `item`.
    pub fn item_is_known(&self, item: u32) -> bool {
        !self.item_users[item as usize].is_empty()
    }
}

/// Binary item attributes: for every item the set of attribute ids assigned
/// to it. Attribute ids are dense in `[0, num_attributes)`.
pub struct AttributeIndex {
    item_attributes: SparseBinaryMatrix,
    num_attributes: usize,
}

impl AttributeIndex {

    pub fn with_dimensions(num_items: usize, num_attributes: usize) -> Self {
        AttributeIndex {
            item_attributes: types::new_sparse_binary_matrix(num_items),
            num_attributes,
        }
    }

    pub fn insert(&mut self, item: u32, attribute: u32) {
        self.item_attributes[item as usize].insert(attribute);
        if attribute as usize >= self.num_attributes {
            self.num_attributes = attribute as usize + 1;
        }
    }

    pub fn num_items(&self) -> usize {
        self.item_attributes.len()
    }

    pub fn num_attributes(&self) -> usize {
        self.num_attributes
    }

    pub fn attributes_of(&self, item: u32) -> &SparseBinarySet {
        &self.item_attributes[item as usize]
    }
}
