mod common;

use common::{strings, TestData};
use std::fs;
use wordguard::{Blacklist, BlacklistStore, JsonBlacklistStore, ValidateOptions};

#[test]
fn test_add_blacklist_persists_sanitized_terms() {
    let data = TestData::new(&Blacklist {
        common: strings(&["badwordc", "badwordd"]),
        ..Default::default()
    });
    let guard = data.guard();

    let added = guard
        .add_blacklist(&Blacklist {
            common: strings(&["B4dword4", "badwordb", "badwordb"]),
            common_variant: strings(&["so bad"]),
            special: strings(&["P3n1sland"]),
        })
        .unwrap();
    assert_eq!(added, strings(&["badworda", "badwordb", "sobad", "penisland"]));

    let stored = data.read_blacklist();
    assert_eq!(
        stored.common,
        strings(&["badwordc", "badwordd", "badworda", "badwordb"])
    );
    assert_eq!(stored.common_variant, strings(&["sobad"]));
    assert_eq!(stored.special, strings(&["penisland"]));
}

#[test]
fn test_added_terms_take_effect_immediately() {
    let data = TestData::new(&Blacklist::default());
    let guard = data.guard();

    assert!(
        !guard
            .validate("pen island", ValidateOptions::default())
            .unwrap()
            .is_blacklisted
    );

    guard
        .add_blacklist(&Blacklist {
            special: strings(&["penisland"]),
            ..Default::default()
        })
        .unwrap();

    let result = guard
        .validate(
            "pen island",
            ValidateOptions {
                verbose: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(result.is_blacklisted);
    assert_eq!(result.blacklist_match.as_deref(), Some("penisland"));
}

#[test]
fn test_remove_blacklist_from_every_category() {
    let data = TestData::new(&Blacklist {
        common: strings(&["badwordc", "badwordd"]),
        common_variant: strings(&["badwordd"]),
        special: strings(&["other"]),
    });
    let guard = data.guard();

    let removed = guard
        .remove_blacklist(&["badwordd", "notInBlacklist"])
        .unwrap();
    assert_eq!(removed, strings(&["badwordd", "badwordd"]));

    let stored = data.read_blacklist();
    assert_eq!(stored.common, strings(&["badwordc"]));
    assert!(stored.common_variant.is_empty());
    assert_eq!(stored.special, strings(&["other"]));
}

#[test]
fn test_blacklist_file_format() {
    let data = TestData::new(&Blacklist::default());
    let store = JsonBlacklistStore::new(data.blacklist_path());

    store
        .save(&Blacklist {
            common_variant: strings(&["badwordbad"]),
            ..Default::default()
        })
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data.blacklist_path()).unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "common": [],
            "commonVariant": ["badwordbad"],
            "special": []
        })
    );

    // No temp files are left behind
    let leftovers: Vec<_> = fs::read_dir(data.data_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            !name.ends_with(".json.gz") && name != "blacklist.json"
        })
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_partial_blacklist_document() {
    let data = TestData::new(&Blacklist::default());
    fs::write(data.blacklist_path(), r#"{ "special": ["penisland"] }"#).unwrap();

    let blacklist = data.guard().blacklist().unwrap();
    assert!(blacklist.common.is_empty());
    assert!(blacklist.common_variant.is_empty());
    assert_eq!(blacklist.special, strings(&["penisland"]));
}
