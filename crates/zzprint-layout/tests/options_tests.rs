use std::path::PathBuf;
use zzprint_layout::*;

fn options_with_input() -> LayoutOptions {
    let mut options = LayoutOptions::default();
    options.input_files.push(InputFile::new("invoice.pdf"));
    options
}

#[test]
fn test_validation_no_input_files() {
    let options = LayoutOptions::default();
    match options.validate() {
        Err(LayoutError::Config(msg)) => assert!(msg.contains("No input files")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_default_options_are_valid() {
    let options = options_with_input();
    assert!(options.validate().is_ok());
    assert_eq!(options.grid, Grid::OneByTwo);
    assert_eq!(options.paper_size, PaperSize::A4);
    assert_eq!(options.page_order, PageOrder::Collated);
    assert_eq!(options.failure_policy, FailurePolicy::Placeholder);
}

#[test]
fn test_validation_copies_range() {
    let mut options = options_with_input();

    for copies in 1..=4 {
        options.copies = copies;
        assert!(options.validate().is_ok(), "copies {} should be valid", copies);
    }

    options.copies = 0;
    assert!(options.validate().is_err());

    options.copies = 5;
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_per_file_copies() {
    let mut options = options_with_input();
    options.input_files.push(InputFile::with_copies("second.pdf", 4));
    assert!(options.validate().is_ok());

    options.input_files.push(InputFile::with_copies("third.pdf", 9));
    match options.validate() {
        Err(LayoutError::Config(msg)) => assert!(msg.contains("third.pdf")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_copies_for_falls_back_to_global() {
    let mut options = options_with_input();
    options.copies = 2;
    options.input_files.push(InputFile::with_copies("second.pdf", 3));

    assert_eq!(options.copies_for(0), 2);
    assert_eq!(options.copies_for(1), 3);
    assert_eq!(options.copies_for(7), 2);
}

#[test]
fn test_validation_grid_bounds() {
    let mut options = options_with_input();

    options.grid = Grid::new(3, 3);
    assert!(options.validate().is_ok());

    options.grid = Grid::Custom { cols: 0, rows: 2 };
    assert!(options.validate().is_err());

    options.grid = Grid::new(9, 1);
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_rejects_negative_margins() {
    let mut options = options_with_input();
    options.sheet_margins.left_mm = -1.0;
    assert!(options.validate().is_err());

    let mut options = options_with_input();
    options.cell_padding_mm = f32::NAN;
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_rejects_padding_larger_than_cell() {
    let mut options = options_with_input();
    options.grid = Grid::TwoByFour;
    options.cell_padding_mm = 40.0;
    assert!(options.validate().is_err());
}

#[test]
fn test_grid_labels() {
    assert_eq!("1×2".parse::<Grid>().unwrap(), Grid::OneByTwo);
    assert_eq!("2x3".parse::<Grid>().unwrap(), Grid::TwoByThree);
    assert_eq!(" 2 X 4 ".parse::<Grid>().unwrap(), Grid::TwoByFour);
    assert_eq!("3*2".parse::<Grid>().unwrap(), Grid::Custom { cols: 3, rows: 2 });
    assert_eq!(Grid::TwoByFour.to_string(), "2×4");
    assert_eq!(Grid::TwoByFour.cells_per_sheet(), 8);

    assert!("0x2".parse::<Grid>().is_err());
    assert!("two by two".parse::<Grid>().is_err());
    assert!("2".parse::<Grid>().is_err());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_options_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");

    let mut options = options_with_input();
    options.grid = Grid::TwoByThree;
    options.copies = 3;
    options.paper_size = PaperSize::Custom {
        width_mm: 241.0,
        height_mm: 140.0,
    };
    options.input_files.push(InputFile::with_copies(PathBuf::from("b.ofd"), 2));
    options.cut_guides = true;

    options.save(&path).await.unwrap();
    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"2×3\""));

    let loaded = LayoutOptions::load(&path).await.unwrap();
    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_options_load_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{ "grid": "2x2", "paper_size": "A5" }"#).unwrap();

    let loaded = LayoutOptions::load(&path).await.unwrap();
    assert_eq!(loaded.grid, Grid::TwoByTwo);
    assert_eq!(loaded.paper_size, PaperSize::A5);
    assert_eq!(loaded.copies, LayoutOptions::default().copies);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_options_load_rejects_bad_grid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "grid": "lots" }"#).unwrap();

    assert!(matches!(
        LayoutOptions::load(&path).await,
        Err(LayoutError::Config(_))
    ));
}
