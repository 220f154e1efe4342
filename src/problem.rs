use crate::config::Level;
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Problem {
    pub a: u32,
    pub b: u32,
}

impl Problem {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn answer(&self) -> u64 {
        self.a as u64 * self.b as u64
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} = ?", self.a, self.b)
    }
}

/// Draws problems for a level, optionally steering away from the last few.
///
/// Recency is checked on the exact ordered pair, so `3 x 7` does not block
/// `7 x 3`. With a capacity of zero no history is kept at all.
#[derive(Debug, Clone)]
pub struct ProblemGenerator {
    history: VecDeque<Problem>,
    capacity: usize,
    max_attempts: u32,
}

impl ProblemGenerator {
    pub fn new(capacity: usize, max_attempts: u32) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn next<R: Rng + ?Sized>(&mut self, level: &Level, rng: &mut R) -> Problem {
        let mut attempts = 0;
        let problem = loop {
            let candidate = Problem::new(
                rng.gen_range(level.factor_a.lo..=level.factor_a.hi),
                rng.gen_range(level.factor_b.lo..=level.factor_b.hi),
            );
            attempts += 1;

            if !self.is_recent(&candidate) {
                break candidate;
            }
            if attempts >= self.max_attempts {
                log::warn!(
                    "no non-recent problem after {} draws on level {}; repeating {}x{}",
                    attempts,
                    level.name,
                    candidate.a,
                    candidate.b
                );
                break candidate;
            }
        };

        self.remember(problem);
        problem
    }

    pub fn is_recent(&self, problem: &Problem) -> bool {
        self.history.contains(problem)
    }

    /// Most recent first
    pub fn history(&self) -> impl Iterator<Item = &Problem> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn remember(&mut self, problem: Problem) {
        if self.capacity == 0 {
            return;
        }
        self.history.push_front(problem);
        self.history.truncate(self.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactorRange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn level(a: (u32, u32), b: (u32, u32)) -> Level {
        Level::new(
            "Test",
            "Test level",
            FactorRange::new(a.0, a.1),
            FactorRange::new(b.0, b.1),
        )
    }

    #[test]
    fn answer_is_product() {
        assert_eq!(Problem::new(7, 8).answer(), 56);
        assert_eq!(Problem::new(0, 9).answer(), 0);
        assert_eq!(Problem::new(99, 9).to_string(), "99 x 9 = ?");
    }

    #[test]
    fn draws_stay_within_inclusive_bounds() {
        let lvl = level((1, 3), (0, 10));
        let mut gen = ProblemGenerator::new(0, 50);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_lo = false;
        let mut seen_hi = false;
        for _ in 0..500 {
            let p = gen.next(&lvl, &mut rng);
            assert!(lvl.factor_a.contains(p.a));
            assert!(lvl.factor_b.contains(p.b));
            seen_lo |= p.a == 1;
            seen_hi |= p.a == 3;
        }
        assert!(seen_lo && seen_hi);
    }

    #[test]
    fn history_prevents_immediate_repeats() {
        let lvl = level((1, 3), (0, 10));
        let mut gen = ProblemGenerator::new(4, 50);
        let mut rng = StdRng::seed_from_u64(42);
        let drawn: Vec<Problem> = (0..200).map(|_| gen.next(&lvl, &mut rng)).collect();
        for window in drawn.windows(5) {
            let newest = window[4];
            assert!(
                !window[..4].contains(&newest),
                "{newest:?} repeated within the last four"
            );
        }
    }

    #[test]
    fn history_is_bounded_and_most_recent_first() {
        let lvl = level((1, 9), (1, 9));
        let mut gen = ProblemGenerator::new(3, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let drawn: Vec<Problem> = (0..6).map(|_| gen.next(&lvl, &mut rng)).collect();
        let history: Vec<Problem> = gen.history().copied().collect();
        assert_eq!(history, vec![drawn[5], drawn[4], drawn[3]]);

        gen.clear_history();
        assert_eq!(gen.history().count(), 0);
    }

    #[test]
    fn exhausted_range_accepts_a_repeat() {
        let lvl = level((2, 2), (3, 3));
        let mut gen = ProblemGenerator::new(4, 50);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(gen.next(&lvl, &mut rng), Problem::new(2, 3));
        assert_eq!(gen.next(&lvl, &mut rng), Problem::new(2, 3));
    }

    #[test]
    fn zero_capacity_keeps_no_history() {
        let lvl = level((2, 2), (3, 3));
        let mut gen = ProblemGenerator::new(0, 50);
        let mut rng = StdRng::seed_from_u64(3);
        gen.next(&lvl, &mut rng);
        assert_eq!(gen.history().count(), 0);
        assert!(!gen.is_recent(&Problem::new(2, 3)));
    }

    #[test]
    fn recency_compares_ordered_pairs_only() {
        let lvl = level((3, 7), (3, 7));
        let mut gen = ProblemGenerator::new(4, 50);
        let mut rng = StdRng::seed_from_u64(9);
        let p = gen.next(&lvl, &mut rng);
        assert!(gen.is_recent(&p));
        if p.a != p.b {
            assert!(!gen.is_recent(&Problem::new(p.b, p.a)));
        }
    }
}
