// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `pathref`.
//
// `pathref` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `pathref` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `pathref`. If not, see <https://www.gnu.org/licenses/>.

//! Errors produced when validating external path data.

use super::Verb;

/// The reason raw path data was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The verb sequence is not empty, but does not start with [`Verb::Move`].
    #[error("verb sequence must begin with a move, found {0:?}")]
    MissingInitialMove(Verb),

    /// The verbs consume a different number of points than were supplied.
    #[error("verbs consume {expected} points but {actual} were supplied")]
    PointCountMismatch {
        /// The number of points the verbs consume.
        expected: usize,

        /// The number of points supplied.
        actual: usize,
    },

    /// The number of conic weights does not match the number of conic verbs.
    #[error("verbs contain {expected} conics but {actual} weights were supplied")]
    WeightCountMismatch {
        /// The number of conic verbs.
        expected: usize,

        /// The number of weights supplied.
        actual: usize,
    },

    /// A byte could not be decoded into a [`Verb`].
    #[error("invalid verb tag {0}")]
    InvalidVerbTag(u8),
}

/// Check that a verb sequence matches the point and weight counts supplied with it.
pub(crate) fn validate(
    verbs: &[Verb],
    point_count: usize,
    weight_count: usize,
) -> Result<(), PathError> {
    if let Some(&first) = verbs.first() {
        if first != Verb::Move {
            return Err(PathError::MissingInitialMove(first));
        }
    }

    let (expected_points, expected_weights) =
        verbs.iter().fold((0, 0), |(points, conics), &verb| {
            (
                points + verb.point_count(),
                conics + usize::from(verb == Verb::Conic),
            )
        });

    if expected_points != point_count {
        return Err(PathError::PointCountMismatch {
            expected: expected_points,
            actual: point_count,
        });
    }

    if expected_weights != weight_count {
        return Err(PathError::WeightCountMismatch {
            expected: expected_weights,
            actual: weight_count,
        });
    }

    Ok(())
}
