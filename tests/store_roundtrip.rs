use std::fs;
use std::path::PathBuf;

use ringosc_figures::store::StoreData;

fn unique_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "ringosc_store_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

#[test]
fn ragged_rows_with_empty_entries_survive() {
    let dir = unique_dir("ragged");
    let store = StoreData::new(&dir, "csc_s7_fixed_placement", None);
    let rows = vec![
        vec![1.5, 2.25, 1e-12],
        Vec::new(),
        vec![42.0],
        Vec::new(),
    ];
    assert!(store.write_data(&rows, false).unwrap());
    assert!(store.file_exists());

    let back = store.read_data().unwrap().expect("cache written");
    assert_eq!(back, rows);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn existing_file_is_kept_without_overwrite() {
    let dir = unique_dir("overwrite");
    let store = StoreData::new(&dir, "h_vs_csc_s7", Some(200));
    assert!(store.write_data(&[vec![1.0, 2.0]], false).unwrap());
    assert!(!store.write_data(&[vec![3.0]], false).unwrap());
    assert_eq!(store.read_data().unwrap(), Some(vec![vec![1.0, 2.0]]));

    assert!(store.write_data(&[vec![3.0]], true).unwrap());
    assert_eq!(store.read_data().unwrap(), Some(vec![vec![3.0]]));
    assert!(
        store
            .file_path()
            .to_string_lossy()
            .ends_with("h_vs_csc_s7_200.csv")
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_cache_reads_as_none() {
    let dir = unique_dir("missing");
    let store = StoreData::new(&dir, "nothing", None);
    assert!(!store.file_exists());
    assert!(store.read_data().unwrap().is_none());
}

#[test]
fn non_numeric_cache_is_an_error() {
    let dir = unique_dir("garbage");
    fs::create_dir_all(&dir).unwrap();
    let store = StoreData::new(&dir, "bad", None);
    fs::write(store.file_path(), "1.0,abc\n").unwrap();
    assert!(store.read_data().is_err());

    let _ = fs::remove_dir_all(&dir);
}
