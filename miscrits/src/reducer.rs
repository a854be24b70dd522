use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::api::LoadSource;
use crate::catalog;
use crate::config::PAGE_SIZE;
use crate::effect::Effect;
use crate::moves::export;
use crate::moves::{projection, AbilityField, FieldValue, RecordStore};
use crate::sprite;
use crate::state::{AppState, CatalogTab, InputTarget, MovesFocus, PatchTarget, Screen, TextInput};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog.miscrits = DataResource::Loading;
            state.catalog.bosses = DataResource::Loading;
            state.moves.loading = true;
            state.message = None;
            DispatchResult::changed_with_many(vec![
                Effect::LoadCatalog,
                Effect::LoadBosses,
                Effect::CheckEncoder,
                Effect::LoadDataset {
                    source: LoadSource::Auto,
                },
            ])
        }

        Action::ScreenSet(screen) => {
            if state.screen == screen {
                return DispatchResult::unchanged();
            }
            state.screen = screen;
            DispatchResult::changed()
        }

        Action::CatalogDidLoad(entries) => {
            state.catalog.miscrits = DataResource::Loaded(entries);
            state.catalog.selected = 0;
            with_effects(page_sprite_effect(state))
        }

        Action::CatalogDidError(error) => {
            state.message = Some(format!("Catalog error: {error}"));
            state.catalog.miscrits = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::BossesDidLoad(bosses) => {
            state.catalog.bosses = DataResource::Loaded(bosses);
            if state.catalog.tab == CatalogTab::Bosses {
                return with_effects(page_sprite_effect(state));
            }
            DispatchResult::changed()
        }

        Action::BossesDidError(error) => {
            state.message = Some(format!("Boss catalog error: {error}"));
            state.catalog.bosses = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::CatalogRetry => match state.catalog.tab {
            CatalogTab::Miscrits if !state.catalog.miscrits.is_loading() => {
                state.catalog.miscrits = DataResource::Loading;
                DispatchResult::changed_with(Effect::LoadCatalog)
            }
            CatalogTab::Bosses if !state.catalog.bosses.is_loading() => {
                state.catalog.bosses = DataResource::Loading;
                DispatchResult::changed_with(Effect::LoadBosses)
            }
            _ => DispatchResult::unchanged(),
        },

        Action::CatalogTabToggle => {
            state.catalog.tab = match state.catalog.tab {
                CatalogTab::Miscrits => CatalogTab::Bosses,
                CatalogTab::Bosses => CatalogTab::Miscrits,
            };
            state.catalog.filter.rarities.clear();
            state.catalog.filter.elements.clear();
            state.catalog.selected = 0;
            with_effects(page_sprite_effect(state))
        }

        Action::CatalogMove(delta) => move_catalog_selection(state, i64::from(delta)),
        Action::CatalogSelect(index) => {
            let delta = index as i64 - state.catalog.selected as i64;
            move_catalog_selection(state, delta)
        }
        Action::CatalogPage(delta) => {
            move_catalog_selection(state, i64::from(delta) * PAGE_SIZE as i64)
        }

        Action::CatalogRarityNext => {
            let options = state.catalog.rarity_options();
            state.catalog.filter.rarities = next_option(&options, &state.catalog.filter.rarities);
            state.catalog.selected = 0;
            with_effects(page_sprite_effect(state))
        }

        Action::CatalogElementNext => {
            let options = state.catalog.element_options();
            state.catalog.filter.elements = next_option(&options, &state.catalog.filter.elements);
            state.catalog.selected = 0;
            with_effects(page_sprite_effect(state))
        }

        Action::CatalogFilterClear => {
            if state.catalog.filter.is_empty() {
                return DispatchResult::unchanged();
            }
            state.catalog.filter = Default::default();
            state.catalog.selected = 0;
            with_effects(page_sprite_effect(state))
        }

        Action::CatalogOpen => open_patch_target(state),

        Action::SpriteInfoDidLoad(infos) => {
            for info in infos {
                state.catalog.sprite_requests.remove(&info.url);
                state.catalog.sprites.insert(info.url.clone(), info);
            }
            DispatchResult::changed()
        }

        Action::InputStart(target) => start_input(state, target),
        Action::InputChar(ch) => {
            let Some(input) = state.input.as_mut() else {
                return DispatchResult::unchanged();
            };
            input.value.push(ch);
            with_effects(apply_live_input(state))
        }
        Action::InputBackspace => {
            let Some(input) = state.input.as_mut() else {
                return DispatchResult::unchanged();
            };
            if input.value.pop().is_none() {
                return DispatchResult::unchanged();
            }
            with_effects(apply_live_input(state))
        }
        Action::InputSubmit => submit_input(state),
        Action::InputCancel => {
            let Some(input) = state.input.take() else {
                return DispatchResult::unchanged();
            };
            match input.target {
                InputTarget::CatalogSearch => {
                    state.catalog.filter.query.clear();
                    state.catalog.selected = 0;
                    with_effects(page_sprite_effect(state))
                }
                InputTarget::CreatureSearch => {
                    state.moves.creature_query.clear();
                    select_creature(state, 0);
                    DispatchResult::changed()
                }
                _ => DispatchResult::changed(),
            }
        }

        Action::PatchStageMove(delta) => {
            let Some(target) = state.patch.target.as_ref() else {
                return DispatchResult::unchanged();
            };
            let next = step_index(state.patch.stage_cursor, i64::from(delta), target.stage_names.len());
            if next == state.patch.stage_cursor {
                return DispatchResult::unchanged();
            }
            state.patch.stage_cursor = next;
            DispatchResult::changed()
        }

        Action::PatchStageCursor(index) => {
            let Some(target) = state.patch.target.as_ref() else {
                return DispatchResult::unchanged();
            };
            if index >= target.stage_names.len() || index == state.patch.stage_cursor {
                return DispatchResult::unchanged();
            }
            state.patch.stage_cursor = index;
            DispatchResult::changed()
        }

        Action::PatchStageSelect => {
            if state.patch.target.is_none() {
                return DispatchResult::unchanged();
            }
            let stage = state.patch.stage_cursor + 1;
            if state.patch.stage != Some(stage) {
                state.patch.stage = Some(stage);
                state.patch.clear_upload();
            }
            with_effects(patch_sprite_effect(state))
        }

        Action::PatchModeToggle => {
            state.patch.mode = state.patch.mode.toggle();
            state.patch.last = None;
            with_effects(patch_sprite_effect(state))
        }

        Action::PatchScale(delta) => {
            let before = state.patch.plan;
            state.patch.plan.step(delta);
            if state.patch.plan == before {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::PatchScaleReset => {
            let before = state.patch.plan;
            state.patch.plan.reset();
            if state.patch.plan == before {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::PatchAspectToggle => {
            state.patch.plan.keep_aspect = !state.patch.plan.keep_aspect;
            DispatchResult::changed()
        }

        Action::PatchEncode => request_encode(state),

        Action::PatchDidEncode(outcome) => {
            state.patch.running = false;
            state.patch.error = None;
            state.message = Some(if outcome.reused {
                format!("Upload unchanged, {} already exported", outcome.cache_name)
            } else {
                format!("Encoded {}", outcome.exported_path.display())
            });
            state.patch.last = Some(outcome);
            DispatchResult::changed()
        }

        Action::PatchDidError(error) => {
            state.patch.running = false;
            state.message = Some(format!("Patch failed: {error}"));
            state.patch.error = Some(error);
            DispatchResult::changed()
        }

        Action::EncoderDidCheck(error) => {
            if state.patch.encoder_error == error {
                return DispatchResult::unchanged();
            }
            state.patch.encoder_error = error;
            DispatchResult::changed()
        }

        Action::MovesLoad(source) => request_load(state, source),

        Action::MovesDidLoad { dataset, source } => {
            let count = dataset.len();
            let label = source.to_string();
            if state.moves.store.is_loaded() {
                state.moves.store.replace(dataset, source);
            } else {
                state.moves.store = RecordStore::new(dataset, source);
            }
            state.moves.loading = false;
            state.moves.load_error = None;
            state.moves.confirm_discard = false;
            state.moves.creature_index = 0;
            state.moves.ability_index = 0;
            state.moves.clamp_selection();
            state.moves.reset_buffer();
            state.message = Some(format!("Loaded {count} creatures from {label}"));
            DispatchResult::changed()
        }

        Action::MovesDidError(error) => {
            state.moves.loading = false;
            state.message = Some(format!("Dataset error: {error}"));
            state.moves.load_error = Some(error);
            DispatchResult::changed()
        }

        Action::MovesFocusToggle => {
            state.moves.focus = match state.moves.focus {
                MovesFocus::Creatures => MovesFocus::Abilities,
                MovesFocus::Abilities => MovesFocus::Creatures,
            };
            DispatchResult::changed()
        }

        Action::MovesCreatureMove(delta) => {
            let len = state.moves.creature_ids().len();
            let next = step_index(state.moves.creature_index, i64::from(delta), len);
            if next == state.moves.creature_index {
                return DispatchResult::unchanged();
            }
            select_creature(state, next);
            DispatchResult::changed()
        }

        Action::MovesCreatureSelect(index) => {
            if index >= state.moves.creature_ids().len() || index == state.moves.creature_index {
                return DispatchResult::unchanged();
            }
            select_creature(state, index);
            DispatchResult::changed()
        }

        Action::MovesAbilitySelect(index) => {
            if index >= state.moves.display_abilities().len() || index == state.moves.ability_index {
                return DispatchResult::unchanged();
            }
            state.moves.ability_index = index;
            state.moves.reset_buffer();
            DispatchResult::changed()
        }

        Action::MovesAbilityMove(delta) => {
            let len = state.moves.display_abilities().len();
            let next = step_index(state.moves.ability_index, i64::from(delta), len);
            if next == state.moves.ability_index {
                return DispatchResult::unchanged();
            }
            state.moves.ability_index = next;
            state.moves.reset_buffer();
            DispatchResult::changed()
        }

        Action::MovesTypeCycle(delta) => {
            let ui_types = state.moves.store.ui_types().clone();
            let Some(buffer) = state.moves.buffer.as_mut() else {
                return DispatchResult::unchanged();
            };
            buffer.ui_type = ui_types.cycle(&buffer.ui_type, delta);
            DispatchResult::changed()
        }

        Action::MovesCommit => commit_buffer(state),

        Action::MovesRevert => {
            if !state.moves.buffer_dirty() {
                return DispatchResult::unchanged();
            }
            state.moves.reset_buffer();
            DispatchResult::changed()
        }

        Action::MovesAbilityUp => {
            let Some((creature_id, ability_id)) = selected_ids(state) else {
                return DispatchResult::unchanged();
            };
            if !state.moves.store.move_visual_up(creature_id, ability_id) {
                return DispatchResult::unchanged();
            }
            state.moves.ability_index = state.moves.ability_index.saturating_sub(1);
            DispatchResult::changed()
        }

        Action::MovesAbilityDown => {
            let Some((creature_id, ability_id)) = selected_ids(state) else {
                return DispatchResult::unchanged();
            };
            if !state.moves.store.move_visual_down(creature_id, ability_id) {
                return DispatchResult::unchanged();
            }
            state.moves.ability_index += 1;
            DispatchResult::changed()
        }

        Action::MovesApStep(delta) => {
            let Some((creature_id, ability)) = state.moves.selected_ability() else {
                return DispatchResult::unchanged();
            };
            let (ability_id, ap) = (ability.id, ability.ap());
            let Some(value) = FieldValue::number(ap + delta as f64) else {
                return DispatchResult::unchanged();
            };
            write_field(state, creature_id, ability_id, AbilityField::Ap, value)
        }

        Action::MovesTrueDamageToggle => {
            let Some((creature_id, ability)) = state.moves.selected_ability() else {
                return DispatchResult::unchanged();
            };
            let (ability_id, flag) = (ability.id, ability.true_dmg());
            write_field(
                state,
                creature_id,
                ability_id,
                AbilityField::TrueDamage,
                FieldValue::Flag(!flag),
            )
        }

        Action::MovesLogToggle => {
            state.moves.show_log = !state.moves.show_log;
            DispatchResult::changed()
        }

        Action::MovesExport => {
            if !state.moves.store.is_loaded() {
                state.message = Some("Nothing to export: no dataset loaded".to_string());
                return DispatchResult::changed();
            }
            match export::serialize(state.moves.store.dataset()) {
                Ok(bytes) => {
                    state.moves.store.mark_saved();
                    state.message = Some("Exporting...".to_string());
                    DispatchResult::changed_with(Effect::WriteExport { bytes })
                }
                Err(error) => {
                    state.message = Some(format!("Export failed: {error}"));
                    DispatchResult::changed()
                }
            }
        }

        Action::ExportDidWrite(path) => {
            state.message = Some(format!("Exported {path}"));
            state.moves.last_export = Some(path);
            DispatchResult::changed()
        }

        Action::ExportDidError(error) => {
            state.moves.store.mark_unsaved();
            state.message = Some(format!("Export failed: {error}"));
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.patch.running
                || state.moves.loading
                || state.catalog.active_resource_loading()
            {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn with_effects(effects: Vec<Effect>) -> DispatchResult<Effect> {
    if effects.is_empty() {
        DispatchResult::changed()
    } else {
        DispatchResult::changed_with_many(effects)
    }
}

/// Moves `index` by `delta`, clamped to `0..len`.
fn step_index(index: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = (index as i64 + delta).clamp(0, len as i64 - 1);
    next as usize
}

/// Single-select cycling over filter options: none, first, ..., last, none.
fn next_option(options: &[String], current: &[String]) -> Vec<String> {
    let position = current
        .first()
        .and_then(|value| options.iter().position(|option| option == value));
    let next = match position {
        None => options.first(),
        Some(index) => options.get(index + 1),
    };
    next.cloned().into_iter().collect()
}

fn move_catalog_selection(state: &mut AppState, delta: i64) -> DispatchResult<Effect> {
    let len = state.catalog.rows().len();
    let next = step_index(state.catalog.selected, delta, len);
    if next == state.catalog.selected {
        return DispatchResult::unchanged();
    }
    let page_changed = next / PAGE_SIZE != state.catalog.selected / PAGE_SIZE;
    state.catalog.selected = next;
    if page_changed {
        return with_effects(page_sprite_effect(state));
    }
    DispatchResult::changed()
}

/// Requests sizes for visible sprites that have not been fetched yet.
fn page_sprite_effect(state: &mut AppState) -> Vec<Effect> {
    let rows = state.catalog.rows();
    let page = state.catalog.page(rows.len());
    let urls: Vec<String> = page
        .slice(&rows)
        .iter()
        .map(|row| sprite::sprite_cdn_url(&row.sprite_name))
        .collect();
    request_sprites(state, urls)
}

fn patch_sprite_effect(state: &mut AppState) -> Vec<Effect> {
    let urls = state.patch.current_url().into_iter().collect();
    request_sprites(state, urls)
}

fn request_sprites(state: &mut AppState, urls: Vec<String>) -> Vec<Effect> {
    let urls: Vec<String> = urls
        .into_iter()
        .filter(|url| {
            !state.catalog.sprites.contains_key(url) && !state.catalog.sprite_requests.contains(url)
        })
        .collect();
    if urls.is_empty() {
        return Vec::new();
    }
    state.catalog.sprite_requests.extend(urls.iter().cloned());
    vec![Effect::LoadSpriteInfo { urls }]
}

fn open_patch_target(state: &mut AppState) -> DispatchResult<Effect> {
    let rows = state.catalog.rows();
    let Some(row) = rows.get(state.catalog.selected) else {
        return DispatchResult::unchanged();
    };
    let target = match state.catalog.tab {
        CatalogTab::Miscrits => {
            let entries = state.catalog.miscrits.data().map(Vec::as_slice).unwrap_or(&[]);
            let stages = catalog::stages_for(entries, row.id);
            PatchTarget {
                id: row.id,
                title: row.title.clone(),
                stage_names: stages.into_iter().map(|stage| stage.evo_name).collect(),
                is_boss: false,
            }
        }
        CatalogTab::Bosses => PatchTarget {
            id: row.id,
            title: row.title.clone(),
            stage_names: vec![row.sprite_name.clone()],
            is_boss: true,
        },
    };
    state.patch.stage = if target.is_boss { Some(1) } else { None };
    state.patch.stage_cursor = 0;
    state.patch.target = Some(target);
    state.patch.clear_upload();
    state.screen = Screen::Patch;
    with_effects(patch_sprite_effect(state))
}

fn start_input(state: &mut AppState, target: InputTarget) -> DispatchResult<Effect> {
    if state.input.is_some() {
        return DispatchResult::unchanged();
    }
    let value = match target {
        InputTarget::CatalogSearch => state.catalog.filter.query.clone(),
        InputTarget::UploadPath => state.patch.upload_path.clone().unwrap_or_default(),
        InputTarget::ImportPath => String::new(),
        InputTarget::AbilityName => match state.moves.buffer.as_ref() {
            Some(buffer) => buffer.name.clone(),
            None => return DispatchResult::unchanged(),
        },
        InputTarget::CreatureSearch => state.moves.creature_query.clone(),
    };
    state.input = Some(TextInput { target, value });
    DispatchResult::changed()
}

/// Search inputs filter as the user types.
fn apply_live_input(state: &mut AppState) -> Vec<Effect> {
    let Some(input) = state.input.as_ref() else {
        return Vec::new();
    };
    match input.target {
        InputTarget::CatalogSearch => {
            state.catalog.filter.query = input.value.clone();
            state.catalog.selected = 0;
            page_sprite_effect(state)
        }
        InputTarget::CreatureSearch => {
            state.moves.creature_query = input.value.clone();
            select_creature(state, 0);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn submit_input(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(input) = state.input.take() else {
        return DispatchResult::unchanged();
    };
    let value = input.value.trim().to_string();
    match input.target {
        InputTarget::CatalogSearch | InputTarget::CreatureSearch => DispatchResult::changed(),
        InputTarget::UploadPath => {
            state.patch.clear_upload();
            if !value.is_empty() {
                state.patch.upload_path = Some(value);
            }
            DispatchResult::changed()
        }
        InputTarget::ImportPath => {
            if value.is_empty() {
                return DispatchResult::changed();
            }
            request_load(state, LoadSource::Upload(value))
        }
        InputTarget::AbilityName => {
            if let Some(buffer) = state.moves.buffer.as_mut() {
                buffer.name = input.value;
            }
            DispatchResult::changed()
        }
    }
}

fn request_encode(state: &mut AppState) -> DispatchResult<Effect> {
    if state.patch.running {
        return DispatchResult::unchanged();
    }
    if let Some(error) = state.patch.encoder_error.clone() {
        state.message = Some(format!("Encoder unavailable: {error}"));
        return DispatchResult::changed();
    }
    let Some(name) = state.patch.selected_name().map(str::to_string) else {
        state.message = Some("Select a stage first".to_string());
        return DispatchResult::changed();
    };
    let Some(upload_path) = state.patch.upload_path.clone() else {
        state.message = Some("Choose an image to upload first".to_string());
        return DispatchResult::changed();
    };
    state.patch.running = true;
    state.patch.error = None;
    state.message = Some(format!("Encoding {name}..."));
    DispatchResult::changed_with(Effect::EncodePatch {
        name,
        mode: state.patch.mode,
        upload_path,
        plan: state.patch.plan,
        previous: state.patch.last.clone(),
    })
}

fn request_load(state: &mut AppState, source: LoadSource) -> DispatchResult<Effect> {
    if state.moves.loading {
        return DispatchResult::unchanged();
    }
    if state.moves.store.has_unsaved_changes() && !state.moves.confirm_discard {
        state.moves.confirm_discard = true;
        state.message = Some("Unsaved edits: repeat to discard them and reload".to_string());
        return DispatchResult::changed();
    }
    state.moves.confirm_discard = false;
    state.moves.loading = true;
    state.moves.load_error = None;
    DispatchResult::changed_with(Effect::LoadDataset { source })
}

fn select_creature(state: &mut AppState, index: usize) {
    state.moves.creature_index = index;
    state.moves.ability_index = 0;
    state.moves.clamp_selection();
    state.moves.reset_buffer();
}

fn selected_ids(state: &AppState) -> Option<(i64, i64)> {
    state
        .moves
        .selected_ability()
        .map(|(creature_id, ability)| (creature_id, ability.id))
}

fn write_field(
    state: &mut AppState,
    creature_id: i64,
    ability_id: i64,
    field: AbilityField,
    value: FieldValue,
) -> DispatchResult<Effect> {
    match state.moves.store.update(creature_id, ability_id, field, value) {
        // Name and type edits still sitting in the buffer are kept.
        Ok(true) => DispatchResult::changed(),
        Ok(false) => DispatchResult::unchanged(),
        Err(error) => {
            state.message = Some(error.to_string());
            DispatchResult::changed()
        }
    }
}

fn commit_buffer(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(buffer) = state.moves.buffer.clone() else {
        return DispatchResult::unchanged();
    };
    let Some((creature_id, ability_id)) = selected_ids(state) else {
        return DispatchResult::unchanged();
    };
    let store = &mut state.moves.store;
    // The type selector shows a coerced view of `type`/`element`, so they are
    // only written when the selection itself moved.
    let retype = match store.find(creature_id, ability_id) {
        Ok(stored) => buffer.ui_type != projection::storage_to_ui(stored, store.ui_types()),
        Err(_) => false,
    };
    let result = store
        .update(
            creature_id,
            ability_id,
            AbilityField::Name,
            FieldValue::Text(buffer.name.clone()),
        )
        .and_then(|renamed| {
            if !retype {
                return Ok(renamed);
            }
            store
                .apply_ui_type(creature_id, ability_id, &buffer.ui_type)
                .map(|retyped| renamed || retyped)
        });
    state.message = Some(match result {
        Ok(true) => format!("Saved {}", buffer.name),
        Ok(false) => "No changes to save".to_string(),
        Err(error) => error.to_string(),
    });
    state.moves.reset_buffer();
    DispatchResult::changed()
}
