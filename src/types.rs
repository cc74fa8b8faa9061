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

use fnv::FnvHashSet;

pub type SparseBinarySet = FnvHashSet<u32>;

pub type SparseBinaryMatrix = Vec<SparseBinarySet>;

pub fn new_sparse_binary_set() -> SparseBinarySet {
    FnvHashSet::with_capacity_and_hasher(0, Default::default())
}

pub fn new_sparse_binary_matrix(num_rows: usize) -> SparseBinaryMatrix {
    vec![new_sparse_binary_set(); num_rows]
}
