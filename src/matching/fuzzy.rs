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
use crate::matching::similarity::{Gestalt, Similarity};

/// A pair scoring above this is accepted on sight; the search stops there
/// even though a later pair might score higher.
pub const EARLY_EXIT_SCORE: f64 = 0.9;

/// Picks the closest canonical string for noisy input. Absent strings on
/// either side are never compared.
pub struct Matcher<S: Similarity = Gestalt> {
	metric: S,
}

impl Matcher<Gestalt> {
	pub fn new() -> Self {
		Self { metric: Gestalt }
	}
}

impl<S: Similarity> Matcher<S> {
	pub fn with_metric(metric: S) -> Self {
		Self { metric }
	}

	/// The target scoring strictly highest against the candidate; the first
	/// one wins a tie. None if nothing was comparable or nothing scored
	/// above zero.
	pub fn best_of<'t>(
		&self,
		targets: &[Option<&'t str>],
		candidate: Option<&str>,
	) -> Option<&'t str> {
		let candidate = candidate?;

		let mut high_score = 0.0;
		let mut most_similar = None;
		for target in targets.iter().flatten() {
			let score = self.metric.ratio(target, candidate);
			if score > high_score {
				high_score = score;
				most_similar = Some(*target);
			}
		}

		most_similar
	}

	/// Best target over every (candidate, target) pair, candidates outer.
	/// Returns the first pair to score above EARLY_EXIT_SCORE without
	/// looking further. `(None, 0.0)` if no pair scored above zero.
	pub fn best_pair<'t>(
		&self,
		targets: &[Option<&'t str>],
		candidates: &[Option<&str>],
	) -> (Option<&'t str>, f64) {
		let mut high_score = 0.0;
		let mut most_similar = None;

		for candidate in candidates.iter().flatten() {
			for target in targets.iter().flatten() {
				let score = self.metric.ratio(target, candidate);
				if score > high_score {
					high_score = score;
					most_similar = Some(*target);
					if high_score > EARLY_EXIT_SCORE {
						return (most_similar, high_score);
					}
				}
			}
		}

		(most_similar, high_score)
	}
}
