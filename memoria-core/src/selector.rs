use std::collections::HashSet;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::dataset::{GroupCatalog, ItemGroup};

/// Query keys for one round's group lookup. Category and difficulty are
/// matched case-insensitively; the subpool id is an exact match.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupQuery<'q> {
    pub size: u32,
    pub difficulty: Option<&'q str>,
    pub category: Option<&'q str>,
    pub subpool: Option<&'q str>,
}

/// Priority-ordered fallback search over a [`GroupCatalog`]. Prefers the most
/// specific match for the requested category and difficulty, degrading
/// gracefully instead of returning nothing, since dataset coverage is not
/// guaranteed for every combination.
pub struct GroupSelector<'a> {
    catalog: &'a GroupCatalog,
}

impl<'a> GroupSelector<'a> {
    pub fn new(catalog: &'a GroupCatalog) -> Self {
        Self { catalog }
    }

    /// Four-tier search; the first tier with at least one candidate wins and
    /// the search stops. Tiers never merge. Tier 4 terminates the search
    /// even when its own result is empty.
    ///
    /// 1. category + size + difficulty
    /// 2. any category + size + difficulty
    /// 3. category + size, any difficulty
    /// 4. any category + size, any difficulty
    ///
    /// A subpool constraint applies inside every tier. Size is a hard filter
    /// at every tier.
    pub fn select_candidates(&self, query: &GroupQuery) -> Vec<&'a ItemGroup> {
        if query.category.is_some() {
            let hits = self.collect(query, query.category, query.difficulty);
            if !hits.is_empty() {
                debug!("tier 1 matched {} groups", hits.len());
                return hits;
            }
        }

        let hits = self.collect(query, None, query.difficulty);
        if !hits.is_empty() {
            debug!("tier 2 matched {} groups", hits.len());
            return hits;
        }

        if query.category.is_some() {
            let hits = self.collect(query, query.category, None);
            if !hits.is_empty() {
                debug!("tier 3 matched {} groups", hits.len());
                return hits;
            }
        }

        let hits = self.collect(query, None, None);
        if hits.is_empty() {
            warn!("no group of size {} anywhere in the catalog", query.size);
        } else {
            debug!("tier 4 matched {} groups", hits.len());
        }
        hits
    }

    fn collect(
        &self,
        query: &GroupQuery,
        category: Option<&str>,
        difficulty: Option<&str>,
    ) -> Vec<&'a ItemGroup> {
        self.catalog
            .groups()
            .iter()
            .filter(|g| {
                g.size == query.size
                    && category.map_or(true, |c| g.category.eq_ignore_ascii_case(c))
                    && difficulty.map_or(true, |d| g.difficulty.eq_ignore_ascii_case(d))
                    && query.subpool.map_or(true, |sp| g.subpool_id == sp)
            })
            .collect()
    }

    /// Uniformly shuffle the winning tier's candidates and take the first.
    /// `None` only when tier 4 itself came up empty.
    pub fn select_one<R: Rng>(&self, query: &GroupQuery, rng: &mut R) -> Option<&'a ItemGroup> {
        let mut candidates = self.select_candidates(query);
        if candidates.is_empty() {
            return None;
        }
        candidates.shuffle(rng);
        Some(candidates[0])
    }

    /// Like [`Self::select_one`], but prefers a group sharing no member with
    /// `excluded`. When every candidate is tainted, returns one anyway:
    /// repeating an item beats presenting nothing.
    pub fn select_one_avoiding<R: Rng>(
        &self,
        query: &GroupQuery,
        excluded: &HashSet<String>,
        rng: &mut R,
    ) -> Option<&'a ItemGroup> {
        let mut candidates = self.select_candidates(query);
        if candidates.is_empty() {
            return None;
        }
        candidates.shuffle(rng);

        if let Some(clean) = candidates
            .iter()
            .copied()
            .find(|g| g.members.iter().all(|m| !excluded.contains(m)))
        {
            return Some(clean);
        }
        debug!("every candidate reuses an excluded item, taking the first anyway");
        Some(candidates[0])
    }

    /// Reverse lookup: which subpool does a chosen group belong to?
    ///
    /// Two passes over a preference ladder. Exact pass: the catalog group
    /// holds exactly the chosen members (order-insensitive), preferring the
    /// hinted category and difficulty, then relaxing each. Subset pass: the
    /// chosen members are contained in a catalog group, same ladder minus
    /// the category-only step.
    pub fn find_subpool_for_group(
        &self,
        members: &[String],
        difficulty_hint: Option<&str>,
        category_hint: Option<&str>,
    ) -> Option<&'a str> {
        if members.is_empty() {
            return None;
        }
        let chosen: HashSet<&str> = members.iter().map(String::as_str).collect();

        let exact_steps = [
            (category_hint, difficulty_hint),
            (None, difficulty_hint),
            (category_hint, None),
            (None, None),
        ];
        for (cat, diff) in exact_steps {
            if let Some(found) = self.scan_for(cat, diff, |g| {
                let set: HashSet<&str> = g.members.iter().map(String::as_str).collect();
                set == chosen
            }) {
                return Some(found);
            }
        }

        let subset_steps = [
            (category_hint, difficulty_hint),
            (None, difficulty_hint),
            (None, None),
        ];
        for (cat, diff) in subset_steps {
            if let Some(found) = self.scan_for(cat, diff, |g| {
                let set: HashSet<&str> = g.members.iter().map(String::as_str).collect();
                chosen.is_subset(&set)
            }) {
                return Some(found);
            }
        }

        None
    }

    fn scan_for<F>(
        &self,
        category: Option<&str>,
        difficulty: Option<&str>,
        mut matches: F,
    ) -> Option<&'a str>
    where
        F: FnMut(&ItemGroup) -> bool,
    {
        self.catalog
            .groups()
            .iter()
            .filter(|g| {
                category.map_or(true, |c| g.category.eq_ignore_ascii_case(c))
                    && difficulty.map_or(true, |d| g.difficulty.eq_ignore_ascii_case(d))
            })
            .find(|g| matches(g))
            .map(|g| g.subpool_id.as_str())
    }
}
