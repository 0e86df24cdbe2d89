//! Per-point difficulty scoring.
//!
//! Points are classed by downhill grade (drop over run):
//!
//! | grade         | class | roughly        |
//! |---------------|-------|----------------|
//! | < 10%         | 0     | flat / uphill  |
//! | 10% .. 25%    | 1     | beginner       |
//! | 25% .. 40%    | 2     | intermediate   |
//! | 40% .. 60%    | 3     | advanced       |
//! | >= 60%        | 4     | expert         |
//!
//! GPX tracks and mountain trails are scored with the same function
//! so their results can be compared.

use crate::constants::MAX_POINT_DIFFICULTY;

/// Lower grade bound of classes 1 through 4.
const GRADE_THRESHOLDS: [f64; MAX_POINT_DIFFICULTY as usize] = [0.10, 0.25, 0.40, 0.60];

/// Returns the difficulty class, 0 through [`MAX_POINT_DIFFICULTY`],
/// for a point with the given slope.
///
/// Negative slopes are downhill. Uphill and NaN slopes score 0.
pub fn point_difficulty(slope: f64) -> u8 {
    let grade = -slope;
    #[allow(clippy::cast_possible_truncation)]
    let class = GRADE_THRESHOLDS
        .iter()
        .take_while(|threshold| grade >= **threshold)
        .count() as u8;
    class
}

pub fn point_difficulties(slopes: &[f64]) -> Vec<u8> {
    slopes.iter().copied().map(point_difficulty).collect()
}
