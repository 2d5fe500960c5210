//! Binary morphology and line extraction from a label grid.
//!
//! Masks are `u8` images where any non-zero value is foreground; outputs use
//! 0 and [`MASK_ON`]. Structuring elements are stored as one horizontal run
//! per row, so erosion and dilation cost one prefix-sum lookup per element
//! row instead of one per element pixel. Pixels outside the image never
//! constrain erosion and never contribute to dilation.

use crate::image::{ImageView, OwnedImage};
use crate::labels::{LabelGrid, MASK_ON};
use crate::util::{ColorSegError, ColorSegResult};

/// One horizontal run of a structuring element, relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    dy: isize,
    dx_start: isize,
    dx_end: isize,
}

/// Structuring element anchored at its center.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuringElement {
    runs: Vec<Run>,
}

impl StructuringElement {
    /// Filled ellipse inscribed in a `size x size` box; `size` must be odd.
    pub fn ellipse(size: usize) -> ColorSegResult<Self> {
        check_odd(size)?;
        let r = (size / 2) as isize;
        let c = r;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };
        let mut runs = Vec::with_capacity(size);
        for i in 0..size as isize {
            let dy = i - r;
            let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as isize;
            let start = (c - dx).max(0);
            let end = (c + dx + 1).min(size as isize);
            if start < end {
                runs.push(Run {
                    dy,
                    dx_start: start - c,
                    dx_end: end - c,
                });
            }
        }
        Ok(Self { runs })
    }

    /// Returns true if the element covers the offset `(dx, dy)` from its anchor.
    pub fn contains(&self, dx: isize, dy: isize) -> bool {
        self.runs
            .iter()
            .any(|run| run.dy == dy && dx >= run.dx_start && dx < run.dx_end)
    }

    /// Number of pixels covered by the element.
    pub fn area(&self) -> usize {
        self.runs
            .iter()
            .map(|run| (run.dx_end - run.dx_start) as usize)
            .sum()
    }
}

fn check_odd(size: usize) -> ColorSegResult<()> {
    if size == 0 || size % 2 == 0 {
        return Err(ColorSegError::InvalidInput(
            "structuring element size must be odd",
        ));
    }
    Ok(())
}

/// Per-row prefix counts of foreground pixels.
struct RowPrefix {
    width: usize,
    counts: Vec<u32>,
}

impl RowPrefix {
    fn new(mask: ImageView<'_, u8>) -> Self {
        let width = mask.width();
        let mut counts = Vec::with_capacity((width + 1) * mask.height());
        for row in mask.rows() {
            let mut acc = 0u32;
            counts.push(0);
            for &v in row {
                acc += u32::from(v != 0);
                counts.push(acc);
            }
        }
        Self { width, counts }
    }

    /// Foreground count in row `y`, columns `[x0, x1)`.
    #[inline]
    fn count(&self, y: usize, x0: usize, x1: usize) -> u32 {
        let base = y * (self.width + 1);
        self.counts[base + x1] - self.counts[base + x0]
    }
}

#[derive(Clone, Copy)]
enum Op {
    Erode,
    Dilate,
}

fn apply(
    mask: ImageView<'_, u8>,
    element: &StructuringElement,
    op: Op,
) -> ColorSegResult<OwnedImage<u8>> {
    let width = mask.width() as isize;
    let height = mask.height() as isize;
    let prefix = RowPrefix::new(mask);
    let mut out = Vec::with_capacity(mask.len());
    for y in 0..height {
        for x in 0..width {
            let mut keep = matches!(op, Op::Erode);
            for run in &element.runs {
                let sy = y + run.dy;
                if sy < 0 || sy >= height {
                    continue;
                }
                let x0 = (x + run.dx_start).clamp(0, width) as usize;
                let x1 = (x + run.dx_end).clamp(0, width) as usize;
                if x0 >= x1 {
                    continue;
                }
                let set = prefix.count(sy as usize, x0, x1) as usize;
                match op {
                    Op::Erode if set < x1 - x0 => {
                        keep = false;
                        break;
                    }
                    Op::Dilate if set > 0 => {
                        keep = true;
                        break;
                    }
                    _ => {}
                }
            }
            out.push(if keep { MASK_ON } else { 0 });
        }
    }
    OwnedImage::new(out, mask.width(), mask.height())
}

/// Foreground survives where the element fits entirely inside the foreground.
pub fn erode(
    mask: ImageView<'_, u8>,
    element: &StructuringElement,
) -> ColorSegResult<OwnedImage<u8>> {
    apply(mask, element, Op::Erode)
}

/// Foreground grows to every pixel whose element touches the foreground.
pub fn dilate(
    mask: ImageView<'_, u8>,
    element: &StructuringElement,
) -> ColorSegResult<OwnedImage<u8>> {
    apply(mask, element, Op::Dilate)
}

/// Erosion followed by dilation; removes foreground thinner than the element.
pub fn open(
    mask: ImageView<'_, u8>,
    element: &StructuringElement,
) -> ColorSegResult<OwnedImage<u8>> {
    let eroded = erode(mask, element)?;
    dilate(eroded.view(), element)
}

/// Dilation followed by erosion; fills gaps narrower than the element.
pub fn close(
    mask: ImageView<'_, u8>,
    element: &StructuringElement,
) -> ColorSegResult<OwnedImage<u8>> {
    let dilated = dilate(mask, element)?;
    erode(dilated.view(), element)
}

/// Clears every pixel of `a` that is also set in `b`.
pub fn subtract(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> ColorSegResult<OwnedImage<u8>> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(ColorSegError::InvalidInput("mask dimensions differ"));
    }
    let mut out = Vec::with_capacity(a.len());
    for (row_a, row_b) in a.rows().zip(b.rows()) {
        for (&va, &vb) in row_a.iter().zip(row_b) {
            out.push(if va != 0 && vb == 0 { MASK_ON } else { 0 });
        }
    }
    OwnedImage::new(out, a.width(), a.height())
}

/// Element sizes for [`extract_lines`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineExtractConfig {
    /// Ellipse diameter for the opening that isolates large blobs.
    pub opening_size: usize,
    /// Ellipse diameter for the closing that straightens the lines.
    pub closing_size: usize,
}

impl Default for LineExtractConfig {
    fn default() -> Self {
        Self {
            opening_size: 15,
            closing_size: 101,
        }
    }
}

/// Masks produced by each stage of [`extract_lines`].
#[derive(Clone, Debug)]
pub struct LineExtraction {
    /// Pixels carrying the line label.
    pub binarized: OwnedImage<u8>,
    /// Opening of `binarized`: the blobs wider than the opening element.
    pub blobs: OwnedImage<u8>,
    /// `binarized` with the blobs removed.
    pub thin: OwnedImage<u8>,
    /// Closing of `thin`; the final line mask.
    pub lines: OwnedImage<u8>,
}

/// Isolates thin structures of `line_label` and discards large blobs.
pub fn extract_lines(
    labels: &LabelGrid,
    line_label: u8,
    cfg: LineExtractConfig,
) -> ColorSegResult<LineExtraction> {
    let opening = StructuringElement::ellipse(cfg.opening_size)?;
    let closing = StructuringElement::ellipse(cfg.closing_size)?;

    let binarized = labels.mask_for(line_label);
    let blobs = open(binarized.view(), &opening)?;
    let thin = subtract(binarized.view(), blobs.view())?;
    let lines = close(thin.view(), &closing)?;
    Ok(LineExtraction {
        binarized,
        blobs,
        thin,
        lines,
    })
}
