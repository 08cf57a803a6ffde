use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::Result;

// Wire model of the curated difficulty-sets file. The file nests
// category -> subpool -> sets; each set entry carries one item group plus
// the scoring metadata emitted by the offline set builder.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatasetRoot {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoryEntry {
    category: String,
    #[serde(default)]
    subpools: Vec<SubpoolEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubpoolEntry {
    #[serde(rename = "subpoolId")]
    subpool_id: String,
    #[serde(default)]
    sets: Vec<SetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SetEntry {
    size: u32,
    difficulty: String,
    #[serde(default)]
    group: Vec<String>,
    #[serde(default)]
    intra_mean: f32,
    #[serde(default)]
    hardness_pct: f32,
    #[serde(default)]
    easiness_pct: f32,
    #[serde(default)]
    viz_image: Option<String>,
}

/// One curated set of item identifiers sharing a size and difficulty tier.
/// Member ids are opaque; their order is preserved from the dataset. The
/// scoring metadata passes through unchanged for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup {
    pub category: String,
    pub subpool_id: String,
    pub size: u32,
    /// Difficulty tier, "easy" or "hard". Compared case-insensitively.
    pub difficulty: String,
    pub members: Vec<String>,
    pub intra_mean: f32,
    pub hardness_pct: f32,
    pub easiness_pct: f32,
    pub viz_image: Option<String>,
}

/// Flattened, read-only index of every curated group in a dataset. Populate
/// once and share; reloads replace the whole catalog, never patch it.
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
    groups: Vec<ItemGroup>,
}

impl GroupCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(groups: Vec<ItemGroup>) -> Self {
        Self { groups }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let root: DatasetRoot = serde_json::from_str(json)?;
        Ok(Self::from_root(root))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn from_root(root: DatasetRoot) -> Self {
        let mut groups = Vec::new();
        let mut dropped = 0usize;

        for cat in root.categories {
            for sp in cat.subpools {
                for set in sp.sets {
                    // Member-less groups can never be selected; drop them at
                    // the door so every catalog entry is eligible.
                    if set.group.is_empty() {
                        dropped += 1;
                        continue;
                    }
                    groups.push(ItemGroup {
                        category: cat.category.clone(),
                        subpool_id: sp.subpool_id.clone(),
                        size: set.size,
                        difficulty: set.difficulty,
                        members: set.group,
                        intra_mean: set.intra_mean,
                        hardness_pct: set.hardness_pct,
                        easiness_pct: set.easiness_pct,
                        viz_image: set.viz_image,
                    });
                }
            }
        }

        if dropped > 0 {
            warn!("dropped {dropped} member-less groups from dataset");
        }
        debug!("loaded {} groups", groups.len());
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[ItemGroup] {
        &self.groups
    }
}
