use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{DebugSection, DebugState, ron_string};

use crate::catalog::{self, BossEntry, CatalogEntry, CatalogFilter, CatalogItem, Page};
use crate::config::PAGE_SIZE;
use crate::moves::order;
use crate::moves::projection::EditBuffer;
use crate::moves::{Ability, AbilityId, Creature, CreatureId, RecordStore};
use crate::patch::PatchOutcome;
use crate::sprite::{EditMode, ResizePlan, SpriteInfo};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Catalog,
    Patch,
    Moves,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Catalog, Screen::Patch, Screen::Moves];

    pub fn label(self) -> &'static str {
        match self {
            Screen::Catalog => "Catalog",
            Screen::Patch => "Patch",
            Screen::Moves => "Moves Editor",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogTab {
    #[default]
    Miscrits,
    Bosses,
}

/// A catalog row as the grid shows it; bosses and creatures flatten to this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: i64,
    pub title: String,
    pub sprite_name: String,
    pub element: String,
    pub rarity: String,
}

impl CatalogRow {
    fn from_item<T: CatalogItem>(item: &T) -> Self {
        Self {
            id: item.id(),
            title: item.title(),
            sprite_name: item.sprite_name().to_string(),
            element: item.element().to_string(),
            rarity: item.rarity().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogState {
    pub tab: CatalogTab,
    /// Every evolution stage of every creature.
    pub miscrits: DataResource<Vec<CatalogEntry>>,
    pub bosses: DataResource<Vec<BossEntry>>,
    pub filter: CatalogFilter,
    pub selected: usize,
    pub sprites: HashMap<String, SpriteInfo>,
    pub sprite_requests: HashSet<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            tab: CatalogTab::Miscrits,
            miscrits: DataResource::Empty,
            bosses: DataResource::Empty,
            filter: CatalogFilter::default(),
            selected: 0,
            sprites: HashMap::new(),
            sprite_requests: HashSet::new(),
        }
    }
}

impl CatalogState {
    pub fn rows(&self) -> Vec<CatalogRow> {
        match self.tab {
            CatalogTab::Miscrits => {
                let firsts = self
                    .miscrits
                    .data()
                    .map(|entries| catalog::first_stages(entries))
                    .unwrap_or_default();
                self.filter
                    .apply(&firsts)
                    .iter()
                    .map(CatalogRow::from_item)
                    .collect()
            }
            CatalogTab::Bosses => self
                .bosses
                .data()
                .map(|bosses| {
                    self.filter
                        .apply(bosses)
                        .iter()
                        .map(CatalogRow::from_item)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn rarity_options(&self) -> Vec<String> {
        match self.tab {
            CatalogTab::Miscrits => self
                .miscrits
                .data()
                .map(|entries| catalog::rarity_options(entries))
                .unwrap_or_default(),
            CatalogTab::Bosses => self
                .bosses
                .data()
                .map(|bosses| catalog::rarity_options(bosses))
                .unwrap_or_default(),
        }
    }

    pub fn element_options(&self) -> Vec<String> {
        match self.tab {
            CatalogTab::Miscrits => self
                .miscrits
                .data()
                .map(|entries| catalog::element_options(entries))
                .unwrap_or_default(),
            CatalogTab::Bosses => self
                .bosses
                .data()
                .map(|bosses| catalog::element_options(bosses))
                .unwrap_or_default(),
        }
    }

    pub fn page(&self, total: usize) -> Page {
        Page::new(self.selected / PAGE_SIZE, total, PAGE_SIZE)
    }

    pub fn active_resource_loading(&self) -> bool {
        match self.tab {
            CatalogTab::Miscrits => self.miscrits.is_loading(),
            CatalogTab::Bosses => self.bosses.is_loading(),
        }
    }

    pub fn active_error(&self) -> Option<&str> {
        match self.tab {
            CatalogTab::Miscrits => self.miscrits.error(),
            CatalogTab::Bosses => self.bosses.error(),
        }
    }
}

/// The creature or boss picked for patching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTarget {
    pub id: i64,
    pub title: String,
    /// Stage names in evolution order; a single entry for bosses.
    pub stage_names: Vec<String>,
    pub is_boss: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchState {
    pub target: Option<PatchTarget>,
    /// 1-based; `None` until the user picks a stage.
    pub stage: Option<usize>,
    pub stage_cursor: usize,
    pub mode: EditMode,
    pub upload_path: Option<String>,
    pub plan: ResizePlan,
    pub encoder_error: Option<String>,
    pub running: bool,
    pub last: Option<PatchOutcome>,
    pub error: Option<String>,
}

impl PatchState {
    pub fn selected_name(&self) -> Option<&str> {
        let target = self.target.as_ref()?;
        let stage = self.stage?;
        target.stage_names.get(stage - 1).map(String::as_str)
    }

    pub fn current_url(&self) -> Option<String> {
        self.selected_name().map(|name| self.mode.cdn_url(name))
    }

    pub fn can_encode(&self) -> bool {
        !self.running
            && self.encoder_error.is_none()
            && self.selected_name().is_some()
            && self.upload_path.is_some()
    }

    pub fn clear_upload(&mut self) {
        self.upload_path = None;
        self.last = None;
        self.error = None;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovesFocus {
    #[default]
    Creatures,
    Abilities,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovesState {
    pub store: RecordStore,
    pub loading: bool,
    pub load_error: Option<String>,
    pub focus: MovesFocus,
    pub creature_query: String,
    pub creature_index: usize,
    /// Index into the display order of the selected creature.
    pub ability_index: usize,
    pub buffer: Option<EditBuffer>,
    pub show_log: bool,
    /// Set after a reload request was refused because of unsaved edits.
    pub confirm_discard: bool,
    pub last_export: Option<String>,
}

impl MovesState {
    /// Creatures matching the picker query, sorted by id.
    pub fn creature_ids(&self) -> Vec<CreatureId> {
        let query = self.creature_query.trim().to_lowercase();
        let dataset = self.store.dataset();
        dataset
            .sorted_ids()
            .into_iter()
            .filter(|id| {
                query.is_empty()
                    || dataset
                        .creature(*id)
                        .map(|creature| creature.selector_label().to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    pub fn selected_creature(&self) -> Option<&Creature> {
        let id = *self.creature_ids().get(self.creature_index)?;
        self.store.dataset().creature(id)
    }

    pub fn display_abilities(&self) -> Vec<(AbilityId, &Ability)> {
        self.selected_creature()
            .map(order::display_order)
            .unwrap_or_default()
    }

    pub fn selected_ability(&self) -> Option<(CreatureId, &Ability)> {
        let creature = self.selected_creature()?;
        let (_, ability) = order::display_order(creature)
            .into_iter()
            .nth(self.ability_index)?;
        Some((creature.id, ability))
    }

    /// Rebuilds the edit buffer from the stored ability under the cursor.
    pub fn reset_buffer(&mut self) {
        let buffer = self
            .selected_ability()
            .map(|(_, ability)| EditBuffer::from_ability(ability, self.store.ui_types()));
        self.buffer = buffer;
    }

    pub fn buffer_dirty(&self) -> bool {
        match (&self.buffer, self.selected_ability()) {
            (Some(buffer), Some((_, ability))) => buffer.is_dirty(ability, self.store.ui_types()),
            _ => false,
        }
    }

    pub fn clamp_selection(&mut self) {
        let creatures = self.creature_ids().len();
        self.creature_index = self.creature_index.min(creatures.saturating_sub(1));
        let abilities = self.display_abilities().len();
        self.ability_index = self.ability_index.min(abilities.saturating_sub(1));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputTarget {
    CatalogSearch,
    UploadPath,
    ImportPath,
    AbilityName,
    CreatureSearch,
}

impl InputTarget {
    pub fn prompt(self) -> &'static str {
        match self {
            InputTarget::CatalogSearch => "Search",
            InputTarget::UploadPath => "Image path (PNG/JPG)",
            InputTarget::ImportPath => "miscrits.json path",
            InputTarget::AbilityName => "Ability name",
            InputTarget::CreatureSearch => "Find creature",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub target: InputTarget,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,
    pub catalog: CatalogState,
    pub patch: PatchState,
    pub moves: MovesState,
    pub input: Option<TextInput>,
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::Catalog,
            catalog: CatalogState::default(),
            patch: PatchState::default(),
            moves: MovesState::default(),
            input: None,
            message: None,
            tick: 0,
        }
    }
}

impl AppState {
    pub fn input_active(&self) -> bool {
        self.input.is_some()
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("App")
                .entry("screen", ron_string(&self.screen))
                .entry("input", ron_string(&self.input))
                .entry("message", ron_string(&self.message)),
            DebugSection::new("Catalog")
                .entry("tab", ron_string(&self.catalog.tab))
                .entry("loading", ron_string(&self.catalog.active_resource_loading()))
                .entry("filter", ron_string(&self.catalog.filter))
                .entry("selected", ron_string(&self.catalog.selected))
                .entry("sprites", ron_string(&self.catalog.sprites.len())),
            DebugSection::new("Patch")
                .entry("target", ron_string(&self.patch.selected_name()))
                .entry("mode", ron_string(&self.patch.mode))
                .entry("plan", ron_string(&self.patch.plan))
                .entry("upload", ron_string(&self.patch.upload_path))
                .entry("running", ron_string(&self.patch.running))
                .entry("encoder_error", ron_string(&self.patch.encoder_error)),
            DebugSection::new("Moves")
                .entry("source", ron_string(&self.moves.store.source()))
                .entry("creatures", ron_string(&self.moves.store.creature_count()))
                .entry("abilities", ron_string(&self.moves.store.ability_count()))
                .entry("unsaved", ron_string(&self.moves.store.has_unsaved_changes()))
                .entry("edits", ron_string(&self.moves.store.edit_log().len()))
                .entry("buffer", ron_string(&self.moves.buffer)),
        ]
    }
}
