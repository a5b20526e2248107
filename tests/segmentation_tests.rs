mod common;

use common::{memory_guard, strings, TestData};
use wordguard::Blacklist;

#[test]
fn test_split_string_without_character_mapping() {
    let guard = memory_guard(Blacklist::default());

    let words = guard.split_string("teststring", false).unwrap();
    assert_eq!(words, strings(&["test", "string"]));
}

#[test]
fn test_split_string_with_leet() {
    let guard = memory_guard(Blacklist::default());

    let words = guard.split_string("Th3 qu1ck br0wn f0x", true).unwrap();
    assert_eq!(words, strings(&["the", "quick", "brown", "fox"]));

    // Without mapping the digits are dropped instead of rewritten
    let words = guard.split_string("Th3 qu1ck br0wn f0x", false).unwrap();
    assert_eq!(words.concat(), "thquckbrwnfx");
}

#[test]
fn test_split_string_from_chunk_files() {
    let data = TestData::new(&Blacklist::default());
    let guard = data.guard();

    assert_eq!(
        guard.split_string("Hello, World", true).unwrap(),
        strings(&["hello", "world"])
    );
    assert_eq!(
        guard.split_string("thisisatest", true).unwrap(),
        strings(&["this", "is", "a", "test"])
    );
}

#[test]
fn test_split_string_empty_and_symbols_only() {
    let guard = memory_guard(Blacklist::default());

    assert!(guard.split_string("", true).unwrap().is_empty());
    assert!(guard.split_string("%%% ***", false).unwrap().is_empty());
}

#[test]
fn test_unknown_text_falls_back_to_single_characters() {
    let guard = memory_guard(Blacklist::default());

    let words = guard.split_string("qzxv", true).unwrap();
    assert_eq!(words, strings(&["q", "z", "x", "v"]));
}

#[test]
fn test_special_terms_are_kept_whole() {
    let plain = memory_guard(Blacklist::default());
    assert_eq!(
        plain.split_string("penisland", true).unwrap(),
        strings(&["pen", "island"])
    );

    let curated = memory_guard(Blacklist {
        special: strings(&["penisland"]),
        ..Default::default()
    });
    assert_eq!(
        curated.split_string("penisland", true).unwrap(),
        strings(&["penisland"])
    );
}

#[test]
fn test_chunk_cache_gives_same_results() {
    let data = TestData::new(&Blacklist::default());
    let mut config = wordguard::config::WordguardConfig::default().resolve_with_defaults();
    config.dictionary.data_dir = data.data_dir().to_path_buf();
    config.blacklist.path = data.blacklist_path();
    config.dictionary.chunk_cache_size = 4;

    let guard = wordguard::Guard::from_config(&config).unwrap();
    let cache = guard.dictionary().chunk_cache().unwrap();

    let first = guard.split_string("teststring", true).unwrap();
    assert!(!cache.is_empty());
    assert!(cache.len() <= 4);

    let second = guard.split_string("teststring", true).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, strings(&["test", "string"]));
}

#[test]
fn test_chunk_cache_picks_up_new_special_terms() {
    let data = TestData::new(&Blacklist::default());
    let mut config = wordguard::config::WordguardConfig::default().resolve_with_defaults();
    config.dictionary.data_dir = data.data_dir().to_path_buf();
    config.blacklist.path = data.blacklist_path();
    config.dictionary.chunk_cache_size = 8;

    let guard = wordguard::Guard::from_config(&config).unwrap();
    assert_eq!(
        guard.split_string("penisland", true).unwrap(),
        strings(&["pen", "island"])
    );
    assert!(!guard.dictionary().chunk_cache().unwrap().is_empty());

    guard
        .add_blacklist(&Blacklist {
            special: strings(&["penisland"]),
            ..Default::default()
        })
        .unwrap();

    // Same cached chunks, new overlay
    assert_eq!(
        guard.split_string("penisland", true).unwrap(),
        strings(&["penisland"])
    );
}
