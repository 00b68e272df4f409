use std::fs;
use std::path::PathBuf;

use ringosc_figures::error::FigureError;
use ringosc_figures::measurements::{Measurement, read_column, read_periods};

fn unique_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "ringosc_measurements_{}_{}.csv",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

#[test]
fn header_is_skipped_and_columns_scale() {
    let path = unique_path("scaled");
    fs::write(&path, "conf, period_ns\n1, 3.5\n2, 3.75\n2.0, 4\n").unwrap();

    let m = Measurement::read(&path).unwrap().expect("data rows");
    assert_eq!(m.len(), 3);
    assert_eq!(m.column_i64(0).unwrap(), vec![1, 2, 2]);
    let periods = m.column_f64(1, 1e-9).unwrap();
    assert!((periods[0] - 3.5e-9).abs() < 1e-21);
    assert!((periods[2] - 4e-9).abs() < 1e-21);

    let (confs, pers) = read_periods(&path, 0, 1, 1.0).unwrap().unwrap();
    assert_eq!(confs, vec![1, 2, 2]);
    assert_eq!(pers, vec![3.5, 3.75, 4.0]);

    let _ = fs::remove_file(&path);
}

#[test]
fn missing_and_header_only_files_are_skipped() {
    let missing = unique_path("missing");
    assert!(read_column(&missing, 1, 1.0).unwrap().is_none());

    let empty = unique_path("header_only");
    fs::write(&empty, "a,b,c\n").unwrap();
    assert!(Measurement::read(&empty).unwrap().is_none());
    let _ = fs::remove_file(&empty);
}

#[test]
fn bad_values_report_their_position() {
    let path = unique_path("bad");
    fs::write(&path, "a,b\n1,2\n3,x\n").unwrap();
    let m = Measurement::read(&path).unwrap().unwrap();
    match m.column_f64(1, 1.0) {
        Err(FigureError::Parse { row, column, value, .. }) => {
            assert_eq!((row, column, value.as_str()), (2, 1, "x"));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(matches!(
        m.column_f64(5, 1.0),
        Err(FigureError::MissingColumn { column: 5, .. })
    ));
    assert!(matches!(m.column_i64(0), Ok(v) if v == vec![1, 3]));
    let _ = fs::remove_file(&path);
}

#[test]
fn fractional_configuration_ids_are_rejected() {
    let path = unique_path("fraction");
    fs::write(&path, "conf,per\n1.5,3.0\n").unwrap();
    let m = Measurement::read(&path).unwrap().unwrap();
    assert!(m.column_i64(0).is_err());
    let _ = fs::remove_file(&path);
}
