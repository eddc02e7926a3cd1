// ============================================================================
// COLOR FILTERS — pure per-pixel transforms over RGB images
// ============================================================================
//
// Every filter is a pixel -> pixel mapping: no cross-pixel reads, no state
// carried between pixels, so application parallelizes by row. Channel math
// runs in f64, clamps to [0, 255] and truncates toward zero on write-back.

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Rows in a custom color matrix.
pub const MATRIX_ROWS: usize = 3;
/// Columns in a custom color matrix: r, g, b weights plus a constant term.
pub const MATRIX_COLS: usize = 4;

/// Error type for malformed custom-filter matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// The grid is not exactly 3 rows by 4 columns.
    Shape { rows: usize, cols: usize },
    /// A cell could not be parsed as a number.
    Parse { row: usize, col: usize, value: String },
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::Shape { rows, cols } => write!(
                f,
                "Invalid matrix: expected {}x{}, got {}x{}",
                MATRIX_ROWS, MATRIX_COLS, rows, cols
            ),
            MatrixError::Parse { row, col, value } => write!(
                f,
                "Invalid matrix: cell ({}, {}) is not a number: '{}'",
                row, col, value
            ),
        }
    }
}

/// Clamp to the channel domain, then truncate toward zero (no rounding).
fn clamp_channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

// ============================================================================
// COLOR MATRIX — 3x4 affine transform
// ============================================================================

/// Affine color transform: each output channel is a weighted sum of the
/// input r, g, b plus a constant term. Coefficients are unrestricted;
/// out-of-range results are clamped at apply time, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix([[f64; MATRIX_COLS]; MATRIX_ROWS]);

impl ColorMatrix {
    pub fn new(rows: [[f64; MATRIX_COLS]; MATRIX_ROWS]) -> Self {
        Self(rows)
    }

    /// Unit diagonal, zero constant column: a pixel-for-pixel no-op.
    pub fn identity() -> Self {
        Self([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Build from row vectors, rejecting any shape that is not 3x4.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.len() != MATRIX_ROWS || rows.iter().any(|r| r.len() != MATRIX_COLS) {
            return Err(MatrixError::Shape { rows: rows.len(), cols });
        }
        let mut m = [[0.0; MATRIX_COLS]; MATRIX_ROWS];
        for (dst, src) in m.iter_mut().zip(rows) {
            dst.copy_from_slice(src);
        }
        Ok(Self(m))
    }

    /// Parse a 3x4 grid of numeric strings (the matrix dialog's raw cells).
    /// Shape is checked before any cell is parsed.
    pub fn parse(cells: &[Vec<String>]) -> Result<Self, MatrixError> {
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        if cells.len() != MATRIX_ROWS || cells.iter().any(|r| r.len() != MATRIX_COLS) {
            return Err(MatrixError::Shape { rows: cells.len(), cols });
        }
        let mut m = [[0.0; MATRIX_COLS]; MATRIX_ROWS];
        for (i, row) in cells.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                m[i][j] = cell.trim().parse::<f64>().map_err(|_| MatrixError::Parse {
                    row: i,
                    col: j,
                    value: cell.clone(),
                })?;
            }
        }
        Ok(Self(m))
    }

    fn transform(&self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let mut out = [0u8; 3];
        for (ch, row) in out.iter_mut().zip(&self.0) {
            *ch = clamp_channel(row[0] * r + row[1] * g + row[2] * b + row[3]);
        }
        out
    }
}

// Fixed matrices for the built-in linear filters (no constant term).
const SEPIA: ColorMatrix = ColorMatrix([
    [0.393, 0.769, 0.189, 0.0],
    [0.349, 0.686, 0.168, 0.0],
    [0.272, 0.534, 0.131, 0.0],
]);
const MAX_HUE: ColorMatrix = ColorMatrix([
    [-0.547, 1.500, 0.044, 0.0],
    [0.409, 0.417, 0.174, 0.0],
    [0.509, 1.350, -0.858, 0.0],
]);
const MAX_SATURATION: ColorMatrix = ColorMatrix([
    [2.570, -1.430, -0.144, 0.0],
    [-0.426, 1.570, -0.144, 0.0],
    [-0.426, -1.430, 2.860, 0.0],
]);

// ============================================================================
// FILTER SET
// ============================================================================

/// The closed set of color filters. Dispatch is a pattern match rather than
/// a trait object: the set is known at design time and each variant carries
/// only the parameters it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    BlackWhite,
    OnlyRed,
    OnlyGreen,
    OnlyBlue,
    Sepia,
    MaxHue,
    MaxSaturation,
    MaxContrast,
    Custom(ColorMatrix),
}

impl Filter {
    /// Display name used by filter buttons and history entries.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::BlackWhite => "Black & white",
            Filter::OnlyRed => "Only red",
            Filter::OnlyGreen => "Only green",
            Filter::OnlyBlue => "Only blue",
            Filter::Sepia => "Sepia",
            Filter::MaxHue => "Max hue",
            Filter::MaxSaturation => "Max saturation",
            Filter::MaxContrast => "Max contrast",
            Filter::Custom(_) => "Custom matrix",
        }
    }

    /// The built-in filter set, in menu order.
    pub fn built_ins() -> [Filter; 8] {
        [
            Filter::BlackWhite,
            Filter::OnlyRed,
            Filter::OnlyGreen,
            Filter::OnlyBlue,
            Filter::Sepia,
            Filter::MaxHue,
            Filter::MaxSaturation,
            Filter::MaxContrast,
        ]
    }

    fn map_pixel(&self, px: [u8; 3]) -> [u8; 3] {
        let [r, g, b] = px;
        match self {
            Filter::BlackWhite => {
                let mean = ((r as u16 + g as u16 + b as u16) / 3) as u8;
                [mean, mean, mean]
            }
            Filter::OnlyRed => [r, 0, 0],
            Filter::OnlyGreen => [0, g, 0],
            Filter::OnlyBlue => [0, 0, b],
            Filter::Sepia => SEPIA.transform(px),
            Filter::MaxHue => MAX_HUE.transform(px),
            Filter::MaxSaturation => MAX_SATURATION.transform(px),
            Filter::MaxContrast => [
                clamp_channel(2.0 * r as f64 - 0.5),
                clamp_channel(2.0 * g as f64 - 0.5),
                clamp_channel(2.0 * b as f64 - 0.5),
            ],
            Filter::Custom(matrix) => matrix.transform(px),
        }
    }

    /// Apply the filter to every pixel, producing a new image of identical
    /// dimensions. Rows are processed in parallel; the source is untouched.
    pub fn apply(&self, src: &RgbImage) -> RgbImage {
        let (w, h) = src.dimensions();
        if w == 0 || h == 0 {
            return src.clone();
        }
        let stride = w as usize * 3;
        let src_raw = src.as_raw();
        let mut dst_raw = vec![0u8; src_raw.len()];

        dst_raw
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row_out)| {
                let row_in = &src_raw[y * stride..(y + 1) * stride];
                for x in 0..w as usize {
                    let pi = x * 3;
                    let out = self.map_pixel([row_in[pi], row_in[pi + 1], row_in[pi + 2]]);
                    row_out[pi..pi + 3].copy_from_slice(&out);
                }
            });

        RgbImage::from_raw(w, h, dst_raw).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_image() -> RgbImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        img.put_pixel(1, 0, Rgb([200, 100, 50]));
        img
    }

    #[test]
    fn test_only_red_zeroes_other_channels() {
        let out = Filter::OnlyRed.apply(&test_image());
        assert_eq!(out.get_pixel(0, 0).0, [10, 0, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [200, 0, 0]);
    }

    #[test]
    fn test_max_contrast_truncates_toward_zero() {
        // 2*10 - 0.5 = 19.5 -> 19 (truncate, not round); 2*200 - 0.5 clamps to 255
        let out = Filter::MaxContrast.apply(&Filter::OnlyRed.apply(&test_image()));
        assert_eq!(out.get_pixel(0, 0).0, [19, 0, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_black_white_uses_integer_mean() {
        // (10+20+30)/3 = 20; (200+100+50)/3 = 116 (integer division)
        let out = Filter::BlackWhite.apply(&test_image());
        assert_eq!(out.get_pixel(0, 0).0, [20, 20, 20]);
        assert_eq!(out.get_pixel(1, 0).0, [116, 116, 116]);
    }

    #[test]
    fn test_black_white_is_idempotent() {
        let once = Filter::BlackWhite.apply(&test_image());
        let twice = Filter::BlackWhite.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sepia_matches_reference_values() {
        // 0.393*10 + 0.769*20 + 0.189*30 = 24.98 -> 24, and so on per channel
        let out = Filter::Sepia.apply(&test_image());
        assert_eq!(out.get_pixel(0, 0).0, [24, 22, 17]);
    }

    #[test]
    fn test_dimensions_and_range_preserved_under_extreme_matrix() {
        let matrix = ColorMatrix::new([
            [40.0, 0.0, 0.0, -3000.0],
            [0.0, -40.0, 0.0, 3000.0],
            [0.0, 0.0, 40.0, 0.5],
        ]);
        let src = test_image();
        let out = Filter::Custom(matrix).apply(&src);
        assert_eq!(out.dimensions(), src.dimensions());
        // 40*10-3000 clamps to 0; -40*20+3000 and 40*30+0.5 clamp to 255
        assert_eq!(out.get_pixel(0, 0).0, [0, 255, 255]);
    }

    #[test]
    fn test_identity_matrix_is_noop() {
        let out = Filter::Custom(ColorMatrix::identity()).apply(&test_image());
        assert_eq!(out, test_image());
    }

    #[test]
    fn test_matrix_rejects_wrong_shape() {
        let two_rows = vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]];
        assert_eq!(
            ColorMatrix::from_rows(&two_rows),
            Err(MatrixError::Shape { rows: 2, cols: 4 })
        );
        let short_row = vec![vec![1.0; 4], vec![1.0; 4], vec![1.0; 3]];
        assert!(matches!(
            ColorMatrix::from_rows(&short_row),
            Err(MatrixError::Shape { .. })
        ));
    }

    #[test]
    fn test_matrix_parse_rejects_non_numeric() {
        let mut cells: Vec<Vec<String>> = (0..3).map(|_| vec!["0".to_string(); 4]).collect();
        cells[1][2] = "abc".to_string();
        assert_eq!(
            ColorMatrix::parse(&cells),
            Err(MatrixError::Parse {
                row: 1,
                col: 2,
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_matrix_parse_accepts_signed_decimals() {
        let cells: Vec<Vec<String>> = vec![
            vec!["-0.5".into(), "0".into(), "0".into(), "10".into()],
            vec!["0".into(), "1.25".into(), "0".into(), " 0 ".into()],
            vec!["0".into(), "0".into(), "2".into(), "-3".into()],
        ];
        assert!(ColorMatrix::parse(&cells).is_ok());
    }

    #[test]
    fn test_empty_image_passes_through() {
        let empty = RgbImage::new(0, 0);
        let out = Filter::Sepia.apply(&empty);
        assert_eq!(out.dimensions(), (0, 0));
    }
}
