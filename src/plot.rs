//! Heatmap rasterization for attention matrices and speech features.
//!
//! Scenes are laid out as SVG (one rect per cell, text labels, colorbar) and
//! rendered to PNG through resvg at a fixed 100 DPI.

use crate::record::Matrix;
use crate::util;
use crate::Result;

use anyhow::{anyhow, Context};
use std::fmt::Write as _;
use std::fs;
use std::io::BufWriter;
use std::path::Path;

const DPI: f32 = 100.0;

/// Attention figures are 8x8 inches.
const ATTENTION_INCHES: f32 = 8.0;

/// Feature strips are 1 inch wide and 8 inches long.
const FEATURE_WIDTH_INCHES: f32 = 1.0;
const FEATURE_LENGTH_INCHES: f32 = 8.0;

/// Write a cell-per-token-pair attention heatmap to `path`.
///
/// Rows are source positions (row 0 at the top), columns are target
/// positions. Row labels are the source words, column labels the target
/// words (placed above the grid). The color scale is fixed to [0, 1];
/// values outside it are clamped. The font shrinks once the label sets grow
/// past 50 total characters and again past 100.
pub fn plot_attention(
    src_words: &[&str],
    trg_words: &[&str],
    matrix: &Matrix,
    path: &Path,
) -> Result<()> {
    let size = (ATTENTION_INCHES * DPI) as u32;
    let svg = attention_svg(src_words, trg_words, matrix, size as f32);
    write_png(&svg, size, size, path)
}

/// Write a speech-feature strip heatmap to `path`.
///
/// Diverging color scale, no axes or labels. With `vertical` the matrix is
/// transposed so frames run along the long edge.
pub fn plot_speech_features(matrix: &Matrix, path: &Path, vertical: bool) -> Result<()> {
    let width = (FEATURE_WIDTH_INCHES * DPI) as u32;
    let height = (FEATURE_LENGTH_INCHES * DPI) as u32;
    let data = if vertical { matrix.transposed() } else { matrix.clone() };
    let svg = features_svg(&data, width as f32, height as f32);
    write_png(&svg, width, height, path)
}

fn label_font_px(src_words: &[&str], trg_words: &[&str]) -> f32 {
    let src_chars: usize = src_words.iter().map(|w| w.chars().count()).sum();
    let trg_chars: usize = trg_words.iter().map(|w| w.chars().count()).sum();
    let points = if src_chars > 100 || trg_chars > 100 {
        4.0
    } else if src_chars > 50 || trg_chars > 50 {
        7.0
    } else {
        10.0
    };
    points * DPI / 72.0
}

fn attention_svg(src_words: &[&str], trg_words: &[&str], matrix: &Matrix, size: f32) -> String {
    let margin_left = 110.0;
    let margin_top = 110.0;
    let margin_right = 80.0; // colorbar
    let margin_bottom = 30.0;

    let grid_w = size - margin_left - margin_right;
    let grid_h = size - margin_top - margin_bottom;
    let rows = matrix.rows();
    let cols = matrix.cols();
    let cell_w = grid_w / cols as f32;
    let cell_h = grid_h / rows as f32;
    let font_px = label_font_px(src_words, trg_words);

    let mut svg = svg_header(size, size);

    // Cells, row 0 at the top.
    for r in 0..rows {
        for c in 0..cols {
            let x = margin_left + c as f32 * cell_w;
            let y = margin_top + r as f32 * cell_h;
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                x,
                y,
                cell_w,
                cell_h,
                rgb_hex(blues(matrix.get(r, c)))
            );
        }
    }

    // Column labels (target words) across the top.
    for (c, word) in trg_words.iter().enumerate().take(cols) {
        let x = margin_left + (c as f32 + 0.5) * cell_w;
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" font-family="sans-serif" text-anchor="middle">{}</text>"#,
            x,
            margin_top - 6.0,
            font_px,
            svg_escape(word)
        );
    }

    // Row labels (source words) down the left side.
    for (r, word) in src_words.iter().enumerate().take(rows) {
        let y = margin_top + (r as f32 + 0.5) * cell_h + font_px / 3.0;
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" font-family="sans-serif" text-anchor="end">{}</text>"#,
            margin_left - 6.0,
            y,
            font_px,
            svg_escape(word)
        );
    }

    // Colorbar, value 1 at the top.
    let bar_x = size - margin_right + 14.0;
    let bar_w = 18.0;
    let steps = 50;
    let step_h = grid_h / steps as f32;
    for i in 0..steps {
        let value = 1.0 - i as f32 / (steps - 1) as f32;
        let _ = writeln!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            bar_x,
            margin_top + i as f32 * step_h,
            bar_w,
            step_h + 0.5,
            rgb_hex(blues(value))
        );
    }
    for (value, y) in [("1.0", margin_top + 10.0), ("0.0", margin_top + grid_h)] {
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-size="10" font-family="sans-serif">{}</text>"#,
            bar_x + bar_w + 4.0,
            y,
            value
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn features_svg(matrix: &Matrix, width: f32, height: f32) -> String {
    let rows = matrix.rows();
    let cols = matrix.cols();
    let cell_w = width / cols as f32;
    let cell_h = height / rows as f32;

    let mut svg = svg_header(width, height);
    // Row 0 at the bottom, matching an uninverted value plot.
    for r in 0..rows {
        for c in 0..cols {
            let x = c as f32 * cell_w;
            let y = height - (r as f32 + 1.0) * cell_h;
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                x,
                y,
                cell_w + 0.5,
                cell_h + 0.5,
                rgb_hex(coolwarm(matrix.get(r, c)))
            );
        }
    }
    svg.push_str("</svg>\n");
    svg
}

fn svg_header(width: f32, height: f32) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" "#,
            r#"viewBox="0 0 {w} {h}">"#,
            "\n",
            r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##,
            "\n"
        ),
        w = width,
        h = height
    )
}

/// Sequential white-to-dark-blue ramp over [0, 1], clamped.
fn blues(t: f32) -> (u8, u8, u8) {
    ramp(t, (247, 251, 255), (107, 174, 214), (8, 48, 107))
}

/// Diverging blue-white-red ramp over [0, 1], clamped.
fn coolwarm(t: f32) -> (u8, u8, u8) {
    ramp(t, (59, 76, 192), (221, 221, 221), (180, 4, 38))
}

fn ramp(t: f32, low: (u8, u8, u8), mid: (u8, u8, u8), high: (u8, u8, u8)) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        lerp(low, mid, t * 2.0)
    } else {
        lerp(mid, high, (t - 0.5) * 2.0)
    }
}

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    (channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

fn rgb_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn svg_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_png(svg: &str, width: u32, height: u32, path: &Path) -> Result<()> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|err| anyhow!("build heatmap scene: {err}"))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("allocate {}x{} pixmap", width, height))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    util::make_parent_dir(path)?;
    let file =
        fs::File::create(path).with_context(|| format!("create image file {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .write_header()
        .and_then(|mut writer| writer.write_image_data(pixmap.data()))
        .with_context(|| format!("encode png {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn uniform(rows: usize, cols: usize, value: f32) -> Matrix {
        Matrix::from_rows(vec![vec![value; cols]; rows]).unwrap()
    }

    #[test]
    fn attention_heatmap_handles_small_and_large_shapes() {
        let dir = tempfile::tempdir().unwrap();
        for (rows, cols) in [(1, 1), (3, 5), (100, 100)] {
            let path = dir.path().join(format!("att.{rows}x{cols}.png"));
            plot_attention(&["a"], &["b"], &uniform(rows, cols, 0.5), &path).unwrap();
            let bytes = fs::read(&path).unwrap();
            assert_eq!(&bytes[..8], &PNG_MAGIC);
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("att.clamped.png");
        let matrix = Matrix::from_rows(vec![vec![-0.5, 1.5], vec![0.0, 1.0]]).unwrap();
        plot_attention(&["x", "y"], &["u", "v"], &matrix, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn feature_strip_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/feat.png");
        plot_speech_features(&uniform(40, 12, 0.3), &path, true).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn color_ramps_stay_in_range() {
        assert_eq!(blues(0.0), (247, 251, 255));
        assert_eq!(blues(1.0), (8, 48, 107));
        assert_eq!(blues(-1.0), blues(0.0));
        assert_eq!(coolwarm(2.0), coolwarm(1.0));
    }

    #[test]
    fn font_shrinks_for_long_label_sets() {
        let short = vec!["ab"; 3];
        let medium = vec!["abcdef"; 10];
        let long = vec!["abcdefghij"; 12];
        assert!(label_font_px(&short, &short) > label_font_px(&medium, &short));
        assert!(label_font_px(&medium, &short) > label_font_px(&long, &short));
    }
}
