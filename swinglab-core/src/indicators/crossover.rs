//! Crossover detection between two streaming series.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossDirection {
    /// `a` moved from <= `b` to > `b` on this bar.
    Up,
    /// `a` moved from >= `b` to < `b` on this bar.
    Down,
    Neutral,
}

impl CrossDirection {
    pub fn sign(self) -> i8 {
        match self {
            CrossDirection::Up => 1,
            CrossDirection::Down => -1,
            CrossDirection::Neutral => 0,
        }
    }
}

/// Compares the current pair of values with the previous bar's pair.
///
/// Undefined (`None`) on the first bar and whenever either series is missing
/// on the current or the previous bar.
#[derive(Debug, Clone, Default)]
pub struct CrossOver {
    prev: Option<(f64, f64)>,
}

impl CrossOver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, a: Option<f64>, b: Option<f64>) -> Option<CrossDirection> {
        let current = a.zip(b);
        let direction = match (self.prev, current) {
            (Some((pa, pb)), Some((ca, cb))) => Some(if pa <= pb && ca > cb {
                CrossDirection::Up
            } else if pa >= pb && ca < cb {
                CrossDirection::Down
            } else {
                CrossDirection::Neutral
            }),
            _ => None,
        };
        self.prev = current;
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(a: &[f64], b: &[f64]) -> Vec<Option<CrossDirection>> {
        let mut x = CrossOver::new();
        a.iter()
            .zip(b)
            .map(|(&a, &b)| x.update(Some(a), Some(b)))
            .collect()
    }

    #[test]
    fn first_bar_is_undefined() {
        assert_eq!(feed(&[1.0], &[2.0]), vec![None]);
    }

    #[test]
    fn equal_series_never_signal() {
        let out = feed(&[5.0; 10], &[5.0; 10]);
        assert!(out[1..].iter().all(|d| *d == Some(CrossDirection::Neutral)));
    }

    #[test]
    fn single_crossing_detected_once() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [3.5; 6];
        let out = feed(&a, &b);
        let ups: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == Some(CrossDirection::Up))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(ups, vec![3]);
        assert!(!out.contains(&Some(CrossDirection::Down)));
    }

    #[test]
    fn touch_then_cross_counts_from_equality() {
        // a == b on bar 1, a > b on bar 2: the transition from <= to > is an Up.
        let out = feed(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]);
        assert_eq!(out[1], Some(CrossDirection::Neutral));
        assert_eq!(out[2], Some(CrossDirection::Up));
    }

    #[test]
    fn downward_cross() {
        let out = feed(&[3.0, 1.0], &[2.0, 2.0]);
        assert_eq!(out[1], Some(CrossDirection::Down));
        assert_eq!(CrossDirection::Down.sign(), -1);
    }

    #[test]
    fn warming_series_is_undefined_on_next_bar_too() {
        let mut x = CrossOver::new();
        assert_eq!(x.update(Some(1.0), None), None);
        // Previous pair was incomplete, so no comparison yet.
        assert_eq!(x.update(Some(3.0), Some(2.0)), None);
        assert_eq!(
            x.update(Some(1.0), Some(2.0)),
            Some(CrossDirection::Down)
        );
    }
}
