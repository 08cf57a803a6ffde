use log::{debug, info, warn};

use crate::levels::{LevelCatalog, LevelDefinition};
use crate::params::{clamp01, lerp, ParameterSpace, PoolSimilarity, ResolvedParameters};
use crate::{MemoriaError, Result};

/// Input priority for [`DifficultyResolver::resolve_auto`]: an override score
/// beats a manual level, which beats the catalog's first entry, which beats
/// the built-in default of 0.5.
#[derive(Debug, Clone)]
pub struct ResolveMode {
    /// Forces score-based resolution when >= 0; negative disables it.
    pub override_score: f32,
    pub use_manual_level: bool,
    /// 1-based catalog index, clamped on use.
    pub manual_level: i32,
}

impl Default for ResolveMode {
    fn default() -> Self {
        Self {
            override_score: -1.0,
            use_manual_level: true,
            manual_level: 1,
        }
    }
}

/// Maps a difficulty signal to concrete round parameters, using the level
/// catalog when one is loaded and a built-in linear mapping otherwise.
/// Pure: the same inputs against the same catalog always produce the same
/// output.
pub struct DifficultyResolver {
    space: ParameterSpace,
    catalog: LevelCatalog,
}

impl DifficultyResolver {
    pub fn new(space: ParameterSpace, catalog: LevelCatalog) -> Self {
        Self { space, catalog }
    }

    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Resolve from a difficulty estimate. Out-of-range scores are clamped
    /// to [0, 1], never rejected; estimators upstream are noisy.
    ///
    /// With a non-empty catalog this picks the entry whose target score is
    /// nearest by absolute difference. The scan uses strict `<`, so on an
    /// exact tie the first entry in catalog order wins.
    pub fn resolve_by_score(&self, score: f32) -> ResolvedParameters {
        let score = clamp01(score);

        let levels = self.catalog.levels();
        if levels.is_empty() {
            debug!("no level catalog, mapping score {score:.3} directly");
            return self.map_score_to_params(score);
        }

        let mut best_idx = 0;
        let mut best_dist = (score - levels[0].target_score).abs();
        for (i, entry) in levels.iter().enumerate().skip(1) {
            let dist = (score - entry.target_score).abs();
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        debug!(
            "score {:.3} matched entry {} ({})",
            score,
            best_idx + 1,
            levels[best_idx].name
        );
        self.apply_entry(&levels[best_idx], (best_idx + 1) as u32)
    }

    /// Resolve a 1-based level index against the catalog. The index is
    /// clamped to [1, N]; an empty catalog is the one structural failure,
    /// callers recover by falling back to [`Self::resolve_by_score`].
    pub fn resolve_by_level(&self, level: i32) -> Result<ResolvedParameters> {
        if self.catalog.is_empty() {
            return Err(MemoriaError::ConfigurationMissing);
        }

        let clamped = level.clamp(1, self.catalog.len() as i32) as usize;
        let entry = &self.catalog.levels()[clamped - 1];
        info!("level {} -> {}", clamped, entry.name);
        Ok(self.apply_entry(entry, clamped as u32))
    }

    /// Session-flow entry point: resolve whatever the mode settles on.
    pub fn resolve_auto(&self, mode: &ResolveMode) -> ResolvedParameters {
        if mode.override_score >= 0.0 {
            return self.resolve_by_score(mode.override_score);
        }
        if mode.use_manual_level {
            if let Ok(params) = self.resolve_by_level(mode.manual_level) {
                return params;
            }
        }
        if let Some(first) = self.catalog.get(0) {
            return self.resolve_by_score(first.target_score);
        }
        warn!("no level catalog loaded, resolving at default score 0.5");
        self.resolve_by_score(0.5)
    }

    fn apply_entry(&self, entry: &LevelDefinition, level: u32) -> ResolvedParameters {
        ResolvedParameters {
            level,
            score: clamp01(entry.target_score),
            item_count: self.space.snap_item_count(entry.preferred_item_count),
            memorise_time: self.space.clamp_memorise_time(entry.memorise_time),
            swap_enabled: entry.swap_enabled,
            pool_similarity: entry.pool_similarity,
            category: entry.category.clone(),
        }
    }

    // Built-in mapping for when no catalog is configured: five equal-width
    // level bands, item count interpolated up and memorise time down.
    fn map_score_to_params(&self, score: f32) -> ResolvedParameters {
        let level = if score <= 0.20 {
            1
        } else if score <= 0.40 {
            2
        } else if score <= 0.60 {
            3
        } else if score <= 0.80 {
            4
        } else {
            5
        };

        let desired = lerp(
            self.space.min_item_count as f32,
            self.space.max_item_count as f32,
            score,
        )
        .round() as i32;
        let time = lerp(
            self.space.max_memorise_time as f32,
            self.space.min_memorise_time as f32,
            score,
        )
        .round() as i32;

        ResolvedParameters {
            level,
            score,
            item_count: self.space.snap_item_count(desired),
            memorise_time: self.space.clamp_memorise_time(time),
            swap_enabled: score > 0.6,
            pool_similarity: if score > 0.5 {
                PoolSimilarity::Hard
            } else {
                PoolSimilarity::Easy
            },
            category: "Any".to_string(),
        }
    }
}
