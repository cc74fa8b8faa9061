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

use rand::Rng;
use rand_distr::StandardNormal;

/// Dense row-major matrix of per-user, per-attribute weights. Accessors are
/// unchecked beyond the slice bounds; callers guarantee valid indices, the
/// lenient bounds handling for unknown entities lives one level up in the
/// scoring code.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightModel {
    num_rows: usize,
    num_cols: usize,
    entries: Vec<f64>,
}

impl WeightModel {

    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        WeightModel {
            num_rows,
            num_cols,
            entries: vec![0.0; num_rows * num_cols],
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Fills every entry with an independent draw from a normal distribution
    /// with the given mean and standard deviation.
    pub fn init_normal<R: Rng>(&mut self, mean: f64, stdev: f64, rng: &mut R) {
        for entry in self.entries.iter_mut() {
            let standard: f64 = rng.sample(StandardNormal);
            *entry = mean + stdev * standard;
        }
    }

    #[inline(always)]
    pub fn get(&self, row: u32, col: u32) -> f64 {
        self.entries[row as usize * self.num_cols + col as usize]
    }

    #[inline(always)]
    pub fn set(&mut self, row: u32, col: u32, value: f64) {
        self.entries[row as usize * self.num_cols + col as usize] = value;
    }
}
