//! Sprite catalog: one entry per evolution stage, the local boss list,
//! search/filter and pagination.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::moves::record::{Creature, CreatureId, Dataset};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: CreatureId,
    pub base_name: String,
    pub evo_stage: usize,
    pub evo_name: String,
    pub total_stages: usize,
    pub element: String,
    pub rarity: String,
    pub all_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossEntry {
    pub id: i64,
    #[serde(default = "unknown")]
    pub first_name: String,
    #[serde(default = "no_element")]
    pub element: String,
    /// Bosses reuse the rarity slot for their location.
    #[serde(default)]
    pub rarity: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn no_element() -> String {
    "None".to_string()
}

/// What the grid, the filter and the patcher need from a catalog row.
pub trait CatalogItem {
    fn id(&self) -> i64;
    fn title(&self) -> String;
    /// Name the CDN files are keyed by.
    fn sprite_name(&self) -> &str;
    fn element(&self) -> &str;
    fn rarity(&self) -> &str;
    fn haystack(&self) -> String;
}

impl CatalogItem for CatalogEntry {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        display_name(&self.base_name)
    }

    fn sprite_name(&self) -> &str {
        &self.evo_name
    }

    fn element(&self) -> &str {
        &self.element
    }

    fn rarity(&self) -> &str {
        &self.rarity
    }

    fn haystack(&self) -> String {
        format!("{} {} {}", self.base_name, self.evo_name, self.rarity).to_lowercase()
    }
}

impl CatalogItem for BossEntry {
    fn id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        display_name(&self.first_name)
    }

    fn sprite_name(&self) -> &str {
        &self.first_name
    }

    fn element(&self) -> &str {
        &self.element
    }

    fn rarity(&self) -> &str {
        &self.rarity
    }

    fn haystack(&self) -> String {
        let final_name = self
            .extra
            .get("final_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        format!("{} {} {}", self.first_name, final_name, self.rarity).to_lowercase()
    }
}

fn stage_names(creature: &Creature) -> Vec<String> {
    let names = creature.names();
    if !names.is_empty() {
        return names.into_iter().map(str::to_string).collect();
    }
    vec![creature.first_name().to_string()]
}

pub fn expand_creature(creature: &Creature) -> Vec<CatalogEntry> {
    let names = stage_names(creature);
    let base_name = names[0].clone();
    let element = creature
        .element_opt()
        .map(str::to_string)
        .unwrap_or_else(no_element);
    let rarity = creature.str_field("rarity").unwrap_or("Common").to_string();
    names
        .iter()
        .enumerate()
        .map(|(index, evo_name)| CatalogEntry {
            id: creature.id,
            base_name: base_name.clone(),
            evo_stage: index + 1,
            evo_name: evo_name.clone(),
            total_stages: names.len(),
            element: element.clone(),
            rarity: rarity.clone(),
            all_names: names.clone(),
        })
        .collect()
}

pub fn expand_stages(dataset: &Dataset) -> Vec<CatalogEntry> {
    dataset.creatures.iter().flat_map(expand_creature).collect()
}

pub fn stages_for(entries: &[CatalogEntry], id: CreatureId) -> Vec<CatalogEntry> {
    let mut stages: Vec<CatalogEntry> = entries.iter().filter(|entry| entry.id == id).cloned().collect();
    stages.sort_by_key(|entry| entry.evo_stage);
    stages
}

pub fn entry_by_stage(entries: &[CatalogEntry], id: CreatureId, stage: usize) -> Option<&CatalogEntry> {
    entries
        .iter()
        .find(|entry| entry.id == id && entry.evo_stage == stage)
}

/// One row per creature for the grid.
pub fn first_stages(entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| entry.evo_stage == 1 && seen.insert(entry.id))
        .cloned()
        .collect()
}

const SEARCH_ALIASES: &[(&str, &str)] = &[("gb", "global boss"), ("globalboss", "global boss")];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub query: String,
    pub rarities: Vec<String>,
    pub elements: Vec<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.rarities.is_empty() && self.elements.is_empty()
    }

    fn needle(&self) -> Option<String> {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let resolved = SEARCH_ALIASES
            .iter()
            .find(|(alias, _)| *alias == needle)
            .map(|(_, target)| target.to_string());
        Some(resolved.unwrap_or(needle))
    }

    pub fn matches<T: CatalogItem>(&self, item: &T) -> bool {
        if let Some(needle) = self.needle() {
            if !item.haystack().contains(&needle) {
                return false;
            }
        }
        if !self.rarities.is_empty() && !self.rarities.iter().any(|r| r == item.rarity()) {
            return false;
        }
        if !self.elements.is_empty() && !self.elements.iter().any(|e| e == item.element()) {
            return false;
        }
        true
    }

    pub fn apply<T: CatalogItem + Clone>(&self, items: &[T]) -> Vec<T> {
        items.iter().filter(|item| self.matches(*item)).cloned().collect()
    }
}

pub fn rarity_options<T: CatalogItem>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.rarity().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn element_options<T: CatalogItem>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.element().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub total: usize,
    pub page_size: usize,
}

impl Page {
    /// Clamps `page` into range.
    pub fn new(page: usize, total: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let mut this = Self {
            page: 0,
            total,
            page_size,
        };
        this.page = page.min(this.max_page());
        this
    }

    pub fn max_page(&self) -> usize {
        self.total.saturating_sub(1) / self.page_size
    }

    pub fn start(&self) -> usize {
        (self.page * self.page_size).min(self.total)
    }

    pub fn end(&self) -> usize {
        (self.start() + self.page_size).min(self.total)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end().min(items.len());
        &items[self.start().min(end)..end]
    }

    pub fn label(&self) -> String {
        if self.total == 0 {
            return "Showing 0 of 0".to_string();
        }
        format!("Showing {}-{} of {}", self.start() + 1, self.end(), self.total)
    }
}

/// `"flue_pup"` -> `"Flue Pup"`.
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn short_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
