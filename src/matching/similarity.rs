/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use std::collections::HashMap;

/// A normalized similarity score between two strings, in [0, 1].
pub trait Similarity {
	fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Gestalt pattern matching (Ratcliff/Obershelp): find the longest common
/// contiguous block, recurse on what lies left and right of it, and score
/// `2 * matched / (len(a) + len(b))`.
///
/// Scores are asymmetric only in how ties between equally long blocks are
/// broken: the earliest block in `a` wins, then the earliest in `b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gestalt;

impl Similarity for Gestalt {
	fn ratio(&self, a: &str, b: &str) -> f64 {
		let a: Vec<char> = a.chars().collect();
		let b: Vec<char> = b.chars().collect();

		let total = a.len() + b.len();
		if total == 0 {
			return 1.0;
		}

		2.0 * matched_chars(&a, &b) as f64 / total as f64
	}
}

/// Sum of the sizes of all matching blocks between a and b.
fn matched_chars(a: &[char], b: &[char]) -> usize {
	let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
	for (j, c) in b.iter().enumerate() {
		b2j.entry(*c).or_default().push(j);
	}

	let mut matched = 0;
	let mut queue = vec![(0, a.len(), 0, b.len())];
	while let Some((alo, ahi, blo, bhi)) = queue.pop() {
		let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
		if size == 0 {
			continue;
		}

		matched += size;
		if alo < i && blo < j {
			queue.push((alo, i, blo, j));
		}
		if i + size < ahi && j + size < bhi {
			queue.push((i + size, ahi, j + size, bhi));
		}
	}

	matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` within the given bounds.
/// `j2len[j]` holds the length of the match ending at `a[i-1]`, `b[j]`.
fn longest_match(
	a: &[char],
	b2j: &HashMap<char, Vec<usize>>,
	alo: usize,
	ahi: usize,
	blo: usize,
	bhi: usize,
) -> (usize, usize, usize) {
	let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
	let mut j2len: HashMap<usize, usize> = HashMap::new();

	for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
		let mut next_j2len = HashMap::new();
		if let Some(positions) = b2j.get(c) {
			for &j in positions {
				if j < blo {
					continue;
				}
				if j >= bhi {
					break;
				}

				let k = j
					.checked_sub(1)
					.and_then(|prev| j2len.get(&prev))
					.copied()
					.unwrap_or(0) + 1;
				next_j2len.insert(j, k);

				if k > best_size {
					best_i = i + 1 - k;
					best_j = j + 1 - k;
					best_size = k;
				}
			}
		}
		j2len = next_j2len;
	}

	(best_i, best_j, best_size)
}
