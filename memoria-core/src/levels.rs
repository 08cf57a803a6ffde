use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::params::PoolSimilarity;
use crate::Result;

/// Serde adapters for the legacy integer encodings used by existing level
/// config files (swap and pool similarity are stored as 0/1, clamped on read).
mod legacy {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::params::PoolSimilarity;

    pub mod int_bool {
        use super::*;

        pub fn serialize<S: Serializer>(v: &bool, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_i32(if *v { 1 } else { 0 })
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
            let v = i32::deserialize(d)?;
            Ok(v.clamp(0, 1) == 1)
        }
    }

    pub mod int_similarity {
        use super::*;

        pub fn serialize<S: Serializer>(v: &PoolSimilarity, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_i32(v.to_legacy_int())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PoolSimilarity, D::Error> {
            let v = i32::deserialize(d)?;
            Ok(PoolSimilarity::from_legacy_int(v))
        }
    }
}

/// One named difficulty tier. Wire names and integer encodings follow the
/// legacy level-config data so existing files load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDefinition {
    #[serde(default = "default_name")]
    pub name: String,
    /// Target difficulty score in [0, 1]. Negative means "assign
    /// automatically"; see [`LevelCatalog::normalize`].
    #[serde(rename = "targetD", default = "default_target_score")]
    pub target_score: f32,
    /// Preferred count before snapping to the allowed set.
    #[serde(rename = "numItems", default = "default_item_count")]
    pub preferred_item_count: i32,
    #[serde(rename = "memoriseTimeMs", default = "default_memorise_time")]
    pub memorise_time: i32,
    #[serde(rename = "swap", default, with = "legacy::int_bool")]
    pub swap_enabled: bool,
    #[serde(
        rename = "poolSimilarityInt",
        default = "default_similarity",
        with = "legacy::int_similarity"
    )]
    pub pool_similarity: PoolSimilarity,
    /// Carried for data fidelity; resolution always applies the stored
    /// fields regardless of this flag.
    #[serde(rename = "useManualParams", default = "default_true")]
    pub use_manual_params: bool,
    #[serde(rename = "categoria", default = "default_category")]
    pub category: String,
}

fn default_name() -> String {
    "Level".to_string()
}

fn default_target_score() -> f32 {
    -1.0
}

fn default_item_count() -> i32 {
    6
}

fn default_memorise_time() -> i32 {
    3
}

fn default_similarity() -> PoolSimilarity {
    PoolSimilarity::Easy
}

fn default_true() -> bool {
    true
}

fn default_category() -> String {
    "Any".to_string()
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self {
            name: default_name(),
            target_score: default_target_score(),
            preferred_item_count: default_item_count(),
            memorise_time: default_memorise_time(),
            swap_enabled: false,
            pool_similarity: default_similarity(),
            use_manual_params: true,
            category: default_category(),
        }
    }
}

/// Ordered list of level definitions, immutable once loaded and normalized.
/// An empty catalog is valid; the resolver then uses its built-in mapping.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: Vec<LevelDefinition>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelDefinition>) -> Self {
        Self { levels }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse an ordered JSON array of level definitions.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let levels: Vec<LevelDefinition> = serde_json::from_str(json)?;
        Ok(Self { levels })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelDefinition> {
        self.levels.get(index)
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    /// Assign evenly spaced target scores across [0, 1]: a single entry gets
    /// 0.5, N entries get i / (N - 1). Every entry is overwritten, matching
    /// the legacy auto-assign behavior. Call once after loading; scores are
    /// never recomputed implicitly.
    pub fn normalize(&mut self) {
        let n = self.levels.len();
        if n == 0 {
            return;
        }
        if n == 1 {
            self.levels[0].target_score = 0.5;
        } else {
            for (i, entry) in self.levels.iter_mut().enumerate() {
                entry.target_score = i as f32 / (n - 1) as f32;
            }
        }
        debug!("normalized {} level target scores", n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> LevelDefinition {
        LevelDefinition {
            name: name.to_string(),
            ..LevelDefinition::default()
        }
    }

    #[test]
    fn normalize_distributes_scores_evenly() {
        let mut catalog = LevelCatalog::new(vec![named("a"), named("b"), named("c")]);
        catalog.normalize();
        let scores: Vec<f32> = catalog.levels().iter().map(|l| l.target_score).collect();
        assert_eq!(scores, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn normalize_single_entry_centers() {
        let mut catalog = LevelCatalog::new(vec![named("only")]);
        catalog.normalize();
        assert_eq!(catalog.get(0).unwrap().target_score, 0.5);
    }

    #[test]
    fn normalize_empty_is_noop() {
        let mut catalog = LevelCatalog::empty();
        catalog.normalize();
        assert!(catalog.is_empty());
    }

    #[test]
    fn sparse_json_takes_defaults() {
        let catalog = LevelCatalog::from_json_str(r#"[{"name": "Tutorial"}]"#).unwrap();
        let entry = catalog.get(0).unwrap();
        assert_eq!(entry.name, "Tutorial");
        assert_eq!(entry.target_score, -1.0);
        assert_eq!(entry.preferred_item_count, 6);
        assert_eq!(entry.memorise_time, 3);
        assert!(!entry.swap_enabled);
        assert_eq!(entry.pool_similarity, PoolSimilarity::Easy);
        assert!(entry.use_manual_params);
        assert_eq!(entry.category, "Any");
    }

    #[test]
    fn legacy_ints_decode_and_clamp() {
        let json = r#"[
            {"name": "L1", "swap": 1, "poolSimilarityInt": 0},
            {"name": "L2", "swap": 5, "poolSimilarityInt": 9}
        ]"#;
        let catalog = LevelCatalog::from_json_str(json).unwrap();
        assert!(catalog.get(0).unwrap().swap_enabled);
        assert_eq!(catalog.get(0).unwrap().pool_similarity, PoolSimilarity::Hard);
        // Out-of-range legacy values clamp into {0, 1}.
        assert!(catalog.get(1).unwrap().swap_enabled);
        assert_eq!(catalog.get(1).unwrap().pool_similarity, PoolSimilarity::Easy);
    }

    #[test]
    fn serialization_uses_legacy_wire_names() {
        let entry = LevelDefinition {
            swap_enabled: true,
            pool_similarity: PoolSimilarity::Hard,
            ..LevelDefinition::default()
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"targetD\""));
        assert!(json.contains("\"swap\":1"));
        assert!(json.contains("\"poolSimilarityInt\":0"));
        assert!(json.contains("\"categoria\""));
    }
}
