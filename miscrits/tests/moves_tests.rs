//! Dataset load, edit and export through the public API.

use pretty_assertions::assert_eq;
use serde_json::Value;

use miscrits::api::{self, DatasetLocations, LoadSource};
use miscrits::moves::{export, icon, AbilityField, DataSource, FieldValue, LoadError, RecordStore};

const RAW: &str = r#"[
  {
    "id": 4,
    "names": ["Papa", "Papagaio"],
    "element": "Wind",
    "ability_order": [40, 41],
    "abilities": [
      {"id": 40, "name": "Gust", "type": "Attack", "element": "Wind", "ap": 22},
      {"id": 41, "name": "Ruffle", "type": "Buff", "element": "Misc", "ap": -2, "keys": ["acc"], "turns": 2}
    ],
    "rarity": "Epic",
    "spawn": {"zone": "Cave"}
  }
]"#;

fn locations() -> DatasetLocations {
    DatasetLocations {
        local: None,
        url: "http://127.0.0.1:9/miscrits.json".to_string(),
    }
}

#[tokio::test]
async fn upload_edit_export_keeps_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("miscrits.json");
    std::fs::write(&input, RAW).unwrap();

    let source = LoadSource::Upload(input.display().to_string());
    let (dataset, origin) = api::load_dataset(&source, &locations()).await.unwrap();
    assert_eq!(origin, DataSource::Upload(input.display().to_string()));

    let mut store = RecordStore::new(dataset, origin);
    assert_eq!(icon::resolve_icon(store.find(4, 41).unwrap()), "accuracy_debuff");
    store.apply_ui_type(4, 40, "Fire").unwrap();
    store
        .update(4, 41, AbilityField::Ap, FieldValue::from(-3))
        .unwrap();
    assert_eq!(store.edit_log().len(), 2);

    let bytes = export::serialize(store.dataset()).unwrap();
    let path = api::write_export(dir.path(), "out.json", &bytes).await.unwrap();
    let written: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();

    let creature = &written[0];
    assert_eq!(creature["spawn"]["zone"], "Cave");
    assert_eq!(creature["rarity"], "Epic");
    assert_eq!(creature["abilities"][0]["element"], "Fire");
    assert_eq!(creature["abilities"][1]["ap"], -3);
    assert_eq!(creature["abilities"][1]["turns"], 2);
}

#[tokio::test]
async fn irregular_upload_exports_unchanged_apart_from_the_edit() {
    let raw = r#"[{"rarity":"R","id":1,"name":"Old","abilities":[{"id":2,"name":"x","true_dmg":null,"keys":null,"ap":0.5}]}]"#;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("irregular.json");
    std::fs::write(&input, raw).unwrap();

    let source = LoadSource::Upload(input.display().to_string());
    let (dataset, origin) = api::load_dataset(&source, &locations()).await.unwrap();
    let mut store = RecordStore::new(dataset, origin);
    assert_eq!(export::serialize(store.dataset()).unwrap(), raw.as_bytes());

    store
        .update(1, 2, AbilityField::Name, FieldValue::text("y"))
        .unwrap();
    let exported = String::from_utf8(export::serialize(store.dataset()).unwrap()).unwrap();
    assert_eq!(exported, raw.replace(r#""name":"x""#, r#""name":"y""#));
}

#[tokio::test]
async fn corrupt_upload_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    std::fs::write(&input, "{not json").unwrap();

    let source = LoadSource::Upload(input.display().to_string());
    let error = api::load_dataset(&source, &locations()).await.unwrap_err();
    assert!(matches!(error, LoadError::InvalidInput(_)), "{error:?}");
}

#[test]
fn wrong_value_shape_is_rejected() {
    let dataset = export::parse(RAW.as_bytes()).unwrap();
    let mut store = RecordStore::new(dataset, DataSource::Local);
    let result = store.update(4, 40, AbilityField::Ap, FieldValue::text("lots"));
    assert!(result.is_err());
    assert!(!store.has_unsaved_changes());
}
