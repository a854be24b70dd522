//! Store flows driven through EffectStoreTestHarness.

use tui_dispatch::testing::*;
use tui_dispatch::DataResource;

use miscrits::action::Action;
use miscrits::api::LoadSource;
use miscrits::catalog::{self, BossEntry, CatalogEntry};
use miscrits::effect::Effect;
use miscrits::moves::icon;
use miscrits::moves::{Ability, Creature, DataSource, Dataset};
use miscrits::reducer::reducer;
use miscrits::state::{AppState, CatalogTab, InputTarget, MovesFocus, Screen};

fn sample_dataset() -> Dataset {
    let flue = Creature::new(1, &["Flue", "Flameling", "Flamio", "Blazio"])
        .with_element("Fire")
        .with_field("rarity", "Common")
        .with_ability(Ability::new(10, "Flick").with_category("Attack", "Fire").with_ap(20))
        .with_ability(Ability::new(11, "Heat Up").with_category("Buff", "Misc").with_ap(2))
        .with_ability(Ability::new(12, "Scorch").with_category("Attack", "Fire").with_ap(35));
    let sparkitt = Creature::new(2, &["Sparkitt", "Sparkat"])
        .with_element("Lightning")
        .with_field("rarity", "Rare")
        .with_ability(Ability::new(20, "Zap").with_category("Attack", "Lightning").with_ap(18));
    Dataset::new(vec![flue, sparkitt])
}

fn catalog_entries() -> Vec<CatalogEntry> {
    catalog::expand_stages(&sample_dataset())
}

fn moves_state(dataset: Dataset) -> AppState {
    let mut state = AppState::default();
    let _ = reducer(
        &mut state,
        Action::MovesDidLoad {
            dataset,
            source: DataSource::Local,
        },
    );
    state
}

fn loaded_state() -> AppState {
    let mut state = moves_state(sample_dataset());
    let _ = reducer(&mut state, Action::CatalogDidLoad(catalog_entries()));
    state
}

fn rename_selected(harness: &mut EffectStoreTestHarness<AppState, Action, Effect>, suffix: &str) {
    harness.dispatch_collect(Action::ScreenSet(Screen::Moves));
    harness.dispatch_collect(Action::MovesFocusToggle);
    harness.dispatch_collect(Action::InputStart(InputTarget::AbilityName));
    for ch in suffix.chars() {
        harness.dispatch_collect(Action::InputChar(ch));
    }
    harness.dispatch_collect(Action::InputSubmit);
}

#[test]
fn init_requests_every_source() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::Init);
    harness.assert_state(|s| s.catalog.miscrits.is_loading() && s.moves.loading);

    let effects = harness.drain_effects();
    effects.effects_count(4);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadCatalog));
}

#[test]
fn catalog_load_requests_visible_sprites() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::CatalogDidLoad(catalog_entries()));
    harness.assert_state(|s| s.catalog.miscrits.is_loaded());

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::LoadSpriteInfo { urls } if urls.len() == 2));
    harness.assert_state(|s| s.catalog.sprite_requests.len() == 2);
}

#[test]
fn catalog_error_then_retry() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);
    harness.dispatch_collect(Action::CatalogDidError("timeout".into()));
    harness.assert_state(|s| s.catalog.active_error() == Some("timeout"));

    harness.dispatch_collect(Action::CatalogRetry);
    harness.assert_state(|s| s.catalog.miscrits.is_loading());
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadCatalog));
}

#[test]
fn search_filters_rows_while_typing() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::InputStart(InputTarget::CatalogSearch));
    for ch in "spark".chars() {
        harness.dispatch_collect(Action::InputChar(ch));
    }
    harness.assert_state(|s| s.catalog.rows().len() == 1);

    harness.dispatch_collect(Action::InputCancel);
    harness.assert_state(|s| s.catalog.filter.query.is_empty() && s.catalog.rows().len() == 2);
}

#[test]
fn rarity_filter_cycles_back_to_all() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::CatalogRarityNext);
    harness.assert_state(|s| s.catalog.filter.rarities == vec!["Common".to_string()]);
    harness.dispatch_collect(Action::CatalogRarityNext);
    harness.dispatch_collect(Action::CatalogRarityNext);
    harness.assert_state(|s| s.catalog.filter.rarities.is_empty());
}

#[test]
fn opening_a_miscrit_waits_for_a_stage() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::CatalogOpen);
    harness.assert_state(|s| s.screen == Screen::Patch);
    harness.assert_state(|s| s.patch.stage.is_none());
    harness.assert_state(|s| {
        s.patch
            .target
            .as_ref()
            .map(|target| target.stage_names.len() == 4)
            .unwrap_or(false)
    });

    harness.dispatch_collect(Action::PatchStageMove(2));
    harness.dispatch_collect(Action::PatchStageSelect);
    harness.assert_state(|s| s.patch.selected_name() == Some("Flamio"));
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadSpriteInfo { .. }));
}

#[test]
fn bosses_open_with_their_only_stage() {
    let mut state = loaded_state();
    let boss: BossEntry = serde_json::from_str(
        r#"{"id": 900, "first_name": "Mega Crab", "element": "Water", "rarity": "Shores"}"#,
    )
    .unwrap();
    state.catalog.bosses = DataResource::Loaded(vec![boss]);
    state.catalog.tab = CatalogTab::Bosses;

    let mut harness = EffectStoreTestHarness::new(state, reducer);
    harness.dispatch_collect(Action::CatalogOpen);
    harness.assert_state(|s| s.patch.selected_name() == Some("Mega Crab"));
}

#[test]
fn encode_needs_stage_and_upload() {
    let mut state = loaded_state();
    state.patch.encoder_error = None;
    let mut harness = EffectStoreTestHarness::new(state, reducer);
    harness.dispatch_collect(Action::CatalogOpen);
    harness.dispatch_collect(Action::PatchEncode);
    harness.assert_state(|s| !s.patch.running);

    harness.dispatch_collect(Action::PatchStageSelect);
    harness.dispatch_collect(Action::InputStart(InputTarget::UploadPath));
    for ch in "/tmp/flue.png".chars() {
        harness.dispatch_collect(Action::InputChar(ch));
    }
    harness.dispatch_collect(Action::InputSubmit);
    harness.drain_effects();

    harness.dispatch_collect(Action::PatchEncode);
    harness.assert_state(|s| s.patch.running);
    harness.drain_effects().effects_first_matches(|e| {
        matches!(e, Effect::EncodePatch { name, upload_path, .. }
            if name == "Flue" && upload_path == "/tmp/flue.png")
    });
}

#[test]
fn missing_encoder_blocks_encoding() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::EncoderDidCheck(Some("godot not found".into())));
    harness.dispatch_collect(Action::CatalogOpen);
    harness.dispatch_collect(Action::PatchStageSelect);
    harness.dispatch_collect(Action::PatchEncode);
    harness.assert_state(|s| !s.patch.running);
    harness.assert_state(|s| {
        s.message
            .as_deref()
            .map(|m| m.contains("godot not found"))
            .unwrap_or(false)
    });
}

#[test]
fn abilities_are_listed_newest_first() {
    let state = loaded_state();
    let ids: Vec<i64> = state
        .moves
        .display_abilities()
        .iter()
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(ids, vec![12, 11, 10]);
}

#[test]
fn rename_and_retype_commit_together() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::ScreenSet(Screen::Moves));
    harness.dispatch_collect(Action::MovesFocusToggle);
    harness.assert_state(|s| s.moves.focus == MovesFocus::Abilities);

    harness.dispatch_collect(Action::InputStart(InputTarget::AbilityName));
    harness.dispatch_collect(Action::InputChar('!'));
    harness.dispatch_collect(Action::InputSubmit);
    harness.dispatch_collect(Action::MovesTypeCycle(1));
    harness.assert_state(|s| s.moves.buffer_dirty());
    harness.assert_state(|s| !s.moves.store.has_unsaved_changes());

    harness.dispatch_collect(Action::MovesCommit);
    harness.assert_state(|s| {
        let ability = s.moves.store.find(1, 12).unwrap();
        ability.name() == "Scorch!" && ability.kind() == "Attack" && ability.element() != "Fire"
    });
    harness.assert_state(|s| s.moves.store.has_unsaved_changes());
    harness.assert_state(|s| s.moves.store.edit_log().len() == 2);
    harness.assert_state(|s| !s.moves.buffer_dirty());
}

#[test]
fn rename_alone_leaves_a_status_move_category_alone() {
    let sizzle = Creature::new(5, &["Sizzle"])
        .with_ability(Ability::new(50, "Sear").with_category("Dot", "Fire").with_ap(-8));
    let mut harness = EffectStoreTestHarness::new(moves_state(Dataset::new(vec![sizzle])), reducer);
    rename_selected(&mut harness, "!");
    harness.dispatch_collect(Action::MovesCommit);

    harness.assert_state(|s| {
        let ability = s.moves.store.find(5, 50).unwrap();
        ability.name() == "Sear!" && ability.kind() == "Dot" && ability.element() == "Fire"
    });
    harness.assert_state(|s| s.moves.store.edit_log().len() == 1);
    harness.assert_state(|s| {
        icon::resolve_icon(s.moves.store.find(5, 50).unwrap()) == "fire_poison"
    });
}

#[test]
fn rename_alone_keeps_an_element_the_picker_cannot_show() {
    let gloomy = Creature::new(6, &["Gloomy"])
        .with_ability(Ability::new(60, "Umbra").with_category("Attack", "Shadow"));
    let mut harness = EffectStoreTestHarness::new(moves_state(Dataset::new(vec![gloomy])), reducer);
    harness.assert_state(|s| {
        s.moves
            .buffer
            .as_ref()
            .map(|buffer| buffer.ui_type == "Physical")
            .unwrap_or(false)
    });
    rename_selected(&mut harness, "s");
    harness.dispatch_collect(Action::MovesCommit);

    harness.assert_state(|s| {
        let ability = s.moves.store.find(6, 60).unwrap();
        ability.name() == "Umbras" && ability.element() == "Shadow"
    });
    harness.assert_state(|s| s.moves.store.edit_log().len() == 1);
}

#[test]
fn ap_and_true_damage_keep_a_pending_rename() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    rename_selected(&mut harness, "!");
    harness.dispatch_collect(Action::MovesApStep(5));
    harness.dispatch_collect(Action::MovesTrueDamageToggle);

    harness.assert_state(|s| s.moves.store.find(1, 12).unwrap().ap() == 40.0);
    harness.assert_state(|s| s.moves.store.find(1, 12).unwrap().true_dmg());
    harness.assert_state(|s| {
        s.moves
            .buffer
            .as_ref()
            .map(|buffer| buffer.name == "Scorch!")
            .unwrap_or(false)
    });
    harness.assert_state(|s| s.moves.buffer_dirty());

    harness.dispatch_collect(Action::MovesCommit);
    harness.assert_state(|s| s.moves.store.find(1, 12).unwrap().name() == "Scorch!");
    harness.assert_state(|s| s.moves.store.edit_log().len() == 3);
}

#[test]
fn ap_step_works_on_fractional_values() {
    let dataset: Dataset =
        serde_json::from_str(r#"[{"id":8,"names":["Drip"],"abilities":[{"id":80,"name":"Mist","ap":1.5}]}]"#)
            .unwrap();
    let mut harness = EffectStoreTestHarness::new(moves_state(dataset), reducer);
    harness.dispatch_collect(Action::MovesApStep(1));
    harness.assert_state(|s| s.moves.store.find(8, 80).unwrap().ap() == 2.5);
    harness.assert_state(|s| s.moves.store.edit_log().len() == 1);
}

#[test]
fn revert_discards_buffer_edits() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::MovesTypeCycle(1));
    harness.assert_state(|s| s.moves.buffer_dirty());
    harness.dispatch_collect(Action::MovesRevert);
    harness.assert_state(|s| !s.moves.buffer_dirty());
    harness.assert_state(|s| s.moves.store.edit_log().is_empty());
}

#[test]
fn reorder_keeps_cursor_on_the_ability() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::MovesAbilityDown);
    harness.assert_state(|s| s.moves.ability_index == 1);
    harness.assert_state(|s| {
        s.moves
            .selected_ability()
            .map(|(_, ability)| ability.id == 12)
            .unwrap_or(false)
    });
    harness.assert_state(|s| s.moves.store.has_unsaved_changes());
}

#[test]
fn reload_with_unsaved_edits_needs_confirmation() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::MovesApStep(5));
    harness.assert_state(|s| s.moves.store.has_unsaved_changes());

    harness.dispatch_collect(Action::MovesLoad(LoadSource::Remote));
    harness.assert_state(|s| s.moves.confirm_discard && !s.moves.loading);
    harness.drain_effects().effects_count(0);

    harness.dispatch_collect(Action::MovesLoad(LoadSource::Remote));
    harness.assert_state(|s| s.moves.loading);
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::LoadDataset { source: LoadSource::Remote }));

    harness.complete_action(Action::MovesDidLoad {
        dataset: sample_dataset(),
        source: DataSource::Remote,
    });
    harness.process_emitted();
    harness.assert_state(|s| !s.moves.store.has_unsaved_changes());
    harness.assert_state(|s| s.moves.store.edit_log().len() == 1);
}

#[test]
fn export_marks_saved_until_the_write_fails() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::MovesTrueDamageToggle);
    harness.dispatch_collect(Action::MovesExport);
    harness.assert_state(|s| !s.moves.store.has_unsaved_changes());
    harness
        .drain_effects()
        .effects_first_matches(|e| matches!(e, Effect::WriteExport { bytes } if !bytes.is_empty()));

    harness.complete_action(Action::ExportDidError("read-only".into()));
    harness.process_emitted();
    harness.assert_state(|s| s.moves.store.has_unsaved_changes());
}

#[test]
fn creature_search_narrows_the_picker() {
    let mut harness = EffectStoreTestHarness::new(loaded_state(), reducer);
    harness.dispatch_collect(Action::InputStart(InputTarget::CreatureSearch));
    for ch in "spark".chars() {
        harness.dispatch_collect(Action::InputChar(ch));
    }
    harness.dispatch_collect(Action::InputSubmit);
    harness.assert_state(|s| s.moves.creature_ids() == vec![2]);
    harness.assert_state(|s| {
        s.moves
            .buffer
            .as_ref()
            .map(|buffer| buffer.name == "Zap")
            .unwrap_or(false)
    });
}
