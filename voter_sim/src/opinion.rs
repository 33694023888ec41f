//! Binary cell state.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::fmt;
use std::iter::Sum;

/// Opinion held by a single lattice cell.
///
/// The discriminants are the signed encoding used for every aggregate:
/// majority votes, lattice sums and serialized snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Opinion {
    Left = -1,
    Right = 1,
}

impl Opinion {
    /// Returns the signed integer encoding (`-1` or `1`).
    pub fn value(self) -> i8 {
        self as i8
    }

    /// Returns the opposite opinion.
    pub fn flipped(self) -> Self {
        match self {
            Opinion::Left => Opinion::Right,
            Opinion::Right => Opinion::Left,
        }
    }

    /// Majority adoption given the signed sum of the neighbors.
    ///
    /// An exact tie keeps `current`.
    pub fn majority(neighbor_sum: i32, current: Opinion) -> Self {
        match neighbor_sum {
            s if s > 0 => Opinion::Right,
            s if s < 0 => Opinion::Left,
            _ => current,
        }
    }
}

impl TryFrom<i8> for Opinion {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Opinion::Left),
            1 => Ok(Opinion::Right),
            other => Err(other),
        }
    }
}

impl From<Opinion> for i64 {
    fn from(opinion: Opinion) -> Self {
        i64::from(opinion.value())
    }
}

impl fmt::Display for Opinion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Sum<Opinion> for i64 {
    fn sum<I: Iterator<Item = Opinion>>(iter: I) -> Self {
        iter.map(i64::from).sum()
    }
}

impl<'a> Sum<&'a Opinion> for i64 {
    fn sum<I: Iterator<Item = &'a Opinion>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Unbiased coin: one `bool` draw per opinion.
impl Distribution<Opinion> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Opinion {
        if rng.gen::<bool>() {
            Opinion::Right
        } else {
            Opinion::Left
        }
    }
}
