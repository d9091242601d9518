#![cfg(feature = "serde")]

use zzprint_layout::*;

#[tokio::test]
async fn test_missing_history_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let history = PrintHistory::load(dir.path().join("history.json")).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_corrupt_history_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{ not json").unwrap();

    let history = PrintHistory::load(&path).await.unwrap();
    assert!(history.is_empty());
    assert_eq!(history.path(), path.as_path());
}

#[tokio::test]
async fn test_hash_file_is_content_md5() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.pdf");
    std::fs::write(&path, b"abc").unwrap();

    let hash = PrintHistory::hash_file(&path).await.unwrap();
    assert_eq!(hash, "900150983cd24fb0d6963f7d28e17f72");
}

#[tokio::test]
async fn test_hash_file_spans_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.pdf");
    let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &data).unwrap();

    let hash = PrintHistory::hash_file(&path).await.unwrap();
    assert_eq!(hash, format!("{:x}", md5::compute(&data)));
}

#[tokio::test]
async fn test_record_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.json");
    let invoice = dir.path().join("invoice.pdf");
    std::fs::write(&invoice, b"%PDF-1.7 invoice").unwrap();

    let mut history = PrintHistory::load(&path).await.unwrap();
    assert!(!history.was_printed(&invoice).await.unwrap());
    assert!(history.record_file(&invoice).await.unwrap());
    assert!(!history.record_file(&invoice).await.unwrap());
    history.save().await.unwrap();

    let reloaded = PrintHistory::load(&path).await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.was_printed(&invoice).await.unwrap());

    let json: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json.len(), 1);
}

#[tokio::test]
async fn test_renamed_file_is_still_recognised() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("invoice.pdf");
    let renamed = dir.path().join("renamed.pdf");
    std::fs::write(&original, b"same bytes").unwrap();
    std::fs::write(&renamed, b"same bytes").unwrap();

    let mut history = PrintHistory::new(dir.path().join("history.json"));
    history.record_file(&original).await.unwrap();
    assert!(history.was_printed(&renamed).await.unwrap());
}

#[test]
fn test_forget_and_clear() {
    let mut history = PrintHistory::new("history.json");
    history.record("aaa");
    history.record("bbb");

    assert!(history.forget("aaa"));
    assert!(!history.forget("aaa"));
    assert_eq!(history.iter().collect::<Vec<_>>(), vec!["bbb"]);

    history.clear();
    assert!(history.is_empty());
}
