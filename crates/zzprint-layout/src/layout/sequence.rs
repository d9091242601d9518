//! Cell sequencing
//!
//! Expands sources and their repeat counts into the flat list of cells,
//! then splits that list into sheets.

use crate::types::PageOrder;

use super::CellRef;

/// Expand every source into the cells it occupies, documents in input order.
///
/// `page_counts[i]` and `copies[i]` describe source `i`; a missing copies
/// entry counts as one copy.
pub fn expand_sequence(page_counts: &[usize], copies: &[u8], order: PageOrder) -> Vec<CellRef> {
    let mut sequence = Vec::with_capacity(total_cells(page_counts, copies));

    for (source, &pages) in page_counts.iter().enumerate() {
        let repeat = copies.get(source).copied().unwrap_or(1) as usize;
        match order {
            PageOrder::Collated => {
                for _ in 0..repeat {
                    sequence.extend((0..pages).map(|page| CellRef::new(source, page)));
                }
            }
            PageOrder::Grouped => {
                for page in 0..pages {
                    sequence.extend(std::iter::repeat_n(CellRef::new(source, page), repeat));
                }
            }
        }
    }

    sequence
}

/// Number of cells the sources fill: Σ pages × copies
pub fn total_cells(page_counts: &[usize], copies: &[u8]) -> usize {
    page_counts
        .iter()
        .enumerate()
        .map(|(i, &pages)| pages * copies.get(i).copied().unwrap_or(1) as usize)
        .sum()
}

/// Sheets needed for `cells` cells: ⌈cells / cells_per_sheet⌉
pub fn sheet_count(cells: usize, cells_per_sheet: usize) -> usize {
    if cells_per_sheet == 0 {
        0
    } else {
        cells.div_ceil(cells_per_sheet)
    }
}

/// Split the cell sequence into sheets, filling each sheet completely
/// before starting the next.
pub fn paginate(sequence: &[CellRef], cells_per_sheet: usize) -> Vec<Vec<CellRef>> {
    if cells_per_sheet == 0 {
        return Vec::new();
    }
    sequence
        .chunks(cells_per_sheet)
        .map(<[CellRef]>::to_vec)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collated_repeats_whole_document() {
        let seq = expand_sequence(&[2, 1], &[2, 1], PageOrder::Collated);
        assert_eq!(
            seq,
            vec![
                CellRef::new(0, 0),
                CellRef::new(0, 1),
                CellRef::new(0, 0),
                CellRef::new(0, 1),
                CellRef::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_grouped_repeats_each_page() {
        let seq = expand_sequence(&[2], &[2], PageOrder::Grouped);
        assert_eq!(
            seq,
            vec![
                CellRef::new(0, 0),
                CellRef::new(0, 0),
                CellRef::new(0, 1),
                CellRef::new(0, 1),
            ]
        );
    }

    #[test]
    fn test_empty_source_contributes_nothing() {
        let seq = expand_sequence(&[0, 1], &[3, 1], PageOrder::Collated);
        assert_eq!(seq, vec![CellRef::new(1, 0)]);
    }

    #[test]
    fn test_sheet_count_rounds_up() {
        // 3 documents × 2 copies on 1×2
        assert_eq!(sheet_count(6, 2), 3);
        assert_eq!(sheet_count(5, 4), 2);
        assert_eq!(sheet_count(8, 8), 1);
        assert_eq!(sheet_count(0, 2), 0);
    }

    #[test]
    fn test_paginate_matches_sheet_count() {
        let seq = expand_sequence(&[1, 1, 1, 1, 1], &[1; 5], PageOrder::Collated);
        let sheets = paginate(&seq, 4);
        assert_eq!(sheets.len(), sheet_count(seq.len(), 4));
        assert_eq!(sheets[0].len(), 4);
        assert_eq!(sheets[1], vec![CellRef::new(4, 0)]);
    }

    #[test]
    fn test_total_cells() {
        assert_eq!(total_cells(&[3, 2], &[2, 4]), 14);
    }
}
