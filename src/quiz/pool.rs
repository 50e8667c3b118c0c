//! Unused question ids per tier for one session.
//!
//! Sets are ordered so a seeded random source always yields the same draw.

use rand::{seq::IteratorRandom, Rng};
use std::collections::{BTreeMap, BTreeSet};

use super::catalog::{Catalog, Difficulty};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingPool {
    tiers: BTreeMap<Difficulty, BTreeSet<u32>>,
}

impl RemainingPool {
    /// Every catalog question except the ones already asked.
    pub fn from_catalog<'a>(catalog: &Catalog, asked: impl IntoIterator<Item = &'a u32>) -> Self {
        let mut pool = Self::default();
        for question in catalog.questions() {
            pool.tiers
                .entry(question.difficulty)
                .or_default()
                .insert(question.id);
        }
        for id in asked {
            pool.remove(*id);
        }
        pool
    }

    /// Uniform draw among the unused ids of `difficulty`, without removing it.
    pub fn pick_from<R: Rng + ?Sized>(&self, difficulty: Difficulty, rng: &mut R) -> Option<u32> {
        self.tiers
            .get(&difficulty)
            .and_then(|ids| ids.iter().copied().choose(rng))
    }

    /// Uniform draw over the union of every tier, without removing it.
    pub fn pick_any<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        self.tiers
            .values()
            .flat_map(|ids| ids.iter().copied())
            .choose(rng)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        self.tiers.values_mut().any(|ids| ids.remove(&id))
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.tiers.values().any(|ids| ids.contains(&id))
    }

    #[must_use]
    pub fn tier_len(&self, difficulty: Difficulty) -> usize {
        self.tiers.get(&difficulty).map_or(0, BTreeSet::len)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.values().all(BTreeSet::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::tests::question;
    use rand::{rngs::StdRng, SeedableRng};

    fn catalog() -> Catalog {
        let built = Catalog::from_questions([
            question(1, Difficulty::Easy),
            question(2, Difficulty::Easy),
            question(3, Difficulty::Medium),
            question(4, Difficulty::Hard),
        ]);
        match built {
            Ok(catalog) => catalog,
            Err(err) => panic!("test catalog: {err}"),
        }
    }

    #[test]
    fn excludes_asked_questions() {
        let pool = RemainingPool::from_catalog(&catalog(), &[2, 4]);
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(1));
        assert!(!pool.contains(2));
        assert_eq!(pool.tier_len(Difficulty::Hard), 0);
    }

    #[test]
    fn pick_from_stays_in_tier() {
        let pool = RemainingPool::from_catalog(&catalog(), &[]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let id = pool.pick_from(Difficulty::Easy, &mut rng);
            assert!(matches!(id, Some(1 | 2)));
        }
        assert_eq!(pool.pick_from(Difficulty::Hard, &mut rng), Some(4));
    }

    #[test]
    fn pick_from_empty_tier_is_none() {
        let pool = RemainingPool::from_catalog(&catalog(), &[4]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pool.pick_from(Difficulty::Hard, &mut rng), None);
        assert!(pool.pick_any(&mut rng).is_some());
    }

    #[test]
    fn remove_drains_pool() {
        let mut pool = RemainingPool::from_catalog(&catalog(), &[]);
        for id in 1..=4 {
            assert!(pool.remove(id));
        }
        assert!(!pool.remove(1));
        assert!(pool.is_empty());
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(pool.pick_any(&mut rng), None);
    }

    #[test]
    fn seeded_draws_repeat() {
        let pool = RemainingPool::from_catalog(&catalog(), &[]);
        let first: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..8).map(|_| pool.pick_any(&mut rng)).collect()
        };
        let second: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..8).map(|_| pool.pick_any(&mut rng)).collect()
        };
        assert_eq!(first, second);
    }
}
