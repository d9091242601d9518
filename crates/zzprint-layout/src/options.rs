use crate::constants::{
    DEFAULT_CELL_PADDING_MM, DEFAULT_COPIES, MAX_COPIES, MAX_GRID_DIMENSION, MIN_COPIES,
};
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One input document and its optional repeat count
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputFile {
    pub path: PathBuf,
    /// Overrides `LayoutOptions::copies` for this document
    #[cfg_attr(feature = "serde", serde(default))]
    pub copies: Option<u8>,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            copies: None,
        }
    }

    pub fn with_copies(path: impl Into<PathBuf>, copies: u8) -> Self {
        Self {
            path: path.into(),
            copies: Some(copies),
        }
    }
}

impl From<PathBuf> for InputFile {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// Complete layout configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    // Input
    pub input_files: Vec<InputFile>,

    // Arrangement
    pub grid: Grid,
    pub copies: u8,
    pub page_order: PageOrder,

    // Output sheet
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub sheet_margins: SheetMargins,

    // Cells
    pub cell_padding_mm: f32,
    pub scaling_mode: ScalingMode,
    pub auto_rotate: bool,
    pub cut_guides: bool,

    // Unreadable sources
    pub failure_policy: FailurePolicy,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            grid: Grid::default(),
            copies: DEFAULT_COPIES,
            page_order: PageOrder::Collated,
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            sheet_margins: SheetMargins::default(),
            cell_padding_mm: DEFAULT_CELL_PADDING_MM,
            scaling_mode: ScalingMode::Fit,
            auto_rotate: false,
            cut_guides: false,
            failure_policy: FailurePolicy::Placeholder,
        }
    }
}

impl LayoutOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| LayoutError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Repeat count for the document at `index`
    pub fn copies_for(&self, index: usize) -> u8 {
        self.input_files
            .get(index)
            .and_then(|file| file.copies)
            .unwrap_or(self.copies)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.input_files.is_empty() {
            return Err(LayoutError::Config("No input files specified".to_string()));
        }
        self.validate_layout()
    }

    /// Validate copies, grid and sheet geometry, ignoring the input list
    pub fn validate_layout(&self) -> Result<()> {
        validate_copies(self.copies, "copies")?;
        for file in &self.input_files {
            if let Some(copies) = file.copies {
                validate_copies(copies, &file.path.display().to_string())?;
            }
        }

        let (cols, rows) = self.grid.dimensions();
        if cols == 0 || rows == 0 || cols > MAX_GRID_DIMENSION || rows > MAX_GRID_DIMENSION {
            return Err(LayoutError::Config(format!(
                "Grid {} is out of range (1 to {} columns and rows)",
                self.grid, MAX_GRID_DIMENSION
            )));
        }

        let (width_mm, height_mm) = self.paper_size.dimensions_mm();
        if !(width_mm > 0.0 && height_mm > 0.0) {
            return Err(LayoutError::Config(format!(
                "Paper size must be positive, got {} × {} mm",
                width_mm, height_mm
            )));
        }

        let margins = &self.sheet_margins;
        if [
            margins.top_mm,
            margins.bottom_mm,
            margins.left_mm,
            margins.right_mm,
            self.cell_padding_mm,
        ]
        .iter()
        .any(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(LayoutError::Config(
                "Margins and cell padding must be non-negative".to_string(),
            ));
        }

        let (sheet_w, sheet_h) = self.paper_size.dimensions_with_orientation(self.orientation);
        let cell_w = (sheet_w - margins.left_mm - margins.right_mm) / cols as f32;
        let cell_h = (sheet_h - margins.top_mm - margins.bottom_mm) / rows as f32;
        let padding = 2.0 * self.cell_padding_mm;
        if cell_w <= padding || cell_h <= padding {
            return Err(LayoutError::Config(format!(
                "Margins and padding leave no room for content in a {} grid",
                self.grid
            )));
        }

        Ok(())
    }
}

fn validate_copies(copies: u8, what: &str) -> Result<()> {
    if (MIN_COPIES..=MAX_COPIES).contains(&copies) {
        Ok(())
    } else {
        Err(LayoutError::Config(format!(
            "Copies for {} must be between {} and {}, got {}",
            what, MIN_COPIES, MAX_COPIES, copies
        )))
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    // Grids travel as their label, e.g. "1×2"
    impl Serialize for Grid {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Grid {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }

    /// On-disk form of a paper size: a name, or explicit dimensions
    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum PaperSizeRepr {
        Named(String),
        Custom { width_mm: f32, height_mm: f32 },
    }

    const PAPER_NAMES: [(&str, PaperSize); 5] = [
        ("A3", PaperSize::A3),
        ("A4", PaperSize::A4),
        ("A5", PaperSize::A5),
        ("Letter", PaperSize::Letter),
        ("Legal", PaperSize::Legal),
    ];

    impl Serialize for PaperSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let repr = match PAPER_NAMES.iter().find(|(_, size)| size == self) {
                Some((name, _)) => PaperSizeRepr::Named(name.to_string()),
                None => {
                    let (width_mm, height_mm) = self.dimensions_mm();
                    PaperSizeRepr::Custom {
                        width_mm,
                        height_mm,
                    }
                }
            };
            repr.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for PaperSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            match PaperSizeRepr::deserialize(deserializer)? {
                PaperSizeRepr::Named(name) => PAPER_NAMES
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(&name))
                    .map(|&(_, size)| size)
                    .ok_or_else(|| {
                        serde::de::Error::unknown_variant(
                            &name,
                            &["A3", "A4", "A5", "Letter", "Legal", "Custom"],
                        )
                    }),
                PaperSizeRepr::Custom {
                    width_mm,
                    height_mm,
                } => Ok(PaperSize::Custom {
                    width_mm,
                    height_mm,
                }),
            }
        }
    }
}
