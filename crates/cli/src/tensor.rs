//! FP32 tensors for building requests and checking responses
//!
//! Backed by `ndarray::ArrayD<f32>`. Comparison follows numpy's `allclose`
//! defaults and `Display` mirrors numpy's `str()` so reports read the same
//! way as the server-side test tooling.

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::Rng;
use std::fmt;
use triton_smoke_shared::{Result, SmokeError};

/// Relative tolerance used by [`Tensor::allclose`]
pub const DEFAULT_RTOL: f32 = 1e-5;
/// Absolute tolerance used by [`Tensor::allclose`]
pub const DEFAULT_ATOL: f32 = 1e-8;

/// Arrays larger than this are summarised when displayed
const SUMMARY_THRESHOLD: usize = 1000;
/// Leading/trailing items kept per axis when summarising
const EDGE_ITEMS: usize = 3;
/// Maximum fractional digits when displaying elements
const MAX_PRECISION: usize = 8;
/// Rows are wrapped past this many columns
const LINE_WIDTH: usize = 75;

/// FP32 tensor with a dynamic shape
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    array: ArrayD<f32>,
}

/// Number of elements in `shape`, or a response error if it overflows
pub fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            SmokeError::response(format!(
                "tensor shape {} has too many elements",
                shape_string(shape)
            ))
        })
}

impl Tensor {
    /// Creates a tensor, checking that `data` fills `shape` exactly
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected = element_count(&shape)?;
        if expected != data.len() {
            return Err(SmokeError::response(format!(
                "tensor of shape {} needs {} elements, got {}",
                shape_string(&shape),
                expected,
                data.len()
            )));
        }
        let array = ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
            SmokeError::response(format!(
                "invalid tensor shape {}: {}",
                shape_string(&shape),
                e
            ))
        })?;
        Ok(Self { array })
    }

    /// Uniform random samples in `[0, 1)`
    pub fn random<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        let dist = Uniform::new(0.0f32, 1.0);
        Self {
            array: ArrayD::random_using(IxDyn(shape), dist, rng),
        }
    }

    /// Decodes little-endian FP32 bytes as carried in raw tensor contents
    pub fn from_le_bytes(shape: Vec<usize>, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(SmokeError::response(format!(
                "raw FP32 contents length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let data = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self::new(shape, data)
    }

    /// Encodes the data in row-major order as little-endian FP32 bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.array.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }

    /// Elements in row-major order
    pub fn to_vec(&self) -> Vec<f32> {
        self.array.iter().copied().collect()
    }

    fn check_same_shape(&self, other: &Tensor) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(SmokeError::internal(
                format!(
                    "elementwise operation on mismatched shapes {} and {}",
                    shape_string(self.shape()),
                    shape_string(other.shape())
                ),
                None,
            ));
        }
        Ok(())
    }

    pub fn add(&self, other: &Tensor) -> Result<Self> {
        self.check_same_shape(other)?;
        Ok(Self {
            array: &self.array + &other.array,
        })
    }

    pub fn sub(&self, other: &Tensor) -> Result<Self> {
        self.check_same_shape(other)?;
        Ok(Self {
            array: &self.array - &other.array,
        })
    }

    pub fn add_scalar(&self, value: f32) -> Self {
        Self {
            array: self.array.mapv(|v| v + value),
        }
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self {
            array: self.array.mapv(|v| v * factor),
        }
    }

    /// numpy `allclose` with default tolerances, `other` being the observed
    /// value: `|a - b| <= atol + rtol * |b|` for every element pair.
    ///
    /// Shapes follow numpy broadcasting (`[1, 4]` matches `[4]`); shapes
    /// that do not broadcast never match. NaN never compares close.
    pub fn allclose(&self, other: &Tensor) -> bool {
        let dim = if self.array.ndim() >= other.array.ndim() {
            self.array.raw_dim()
        } else {
            other.array.raw_dim()
        };
        let (Some(expected), Some(observed)) = (
            self.array.broadcast(dim.clone()),
            other.array.broadcast(dim),
        ) else {
            return false;
        };
        Zip::from(expected)
            .and(observed)
            .all(|&a, &b| (a - b).abs() <= DEFAULT_ATOL + DEFAULT_RTOL * b.abs())
    }
}

/// Renders a shape the way Python renders a tuple: `(1, 1000)`, `(4,)`
pub fn shape_string(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [only] => format!("({},)", only),
        dims => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// How the elements of one tensor are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    /// `0.125`, `1.`
    Positional,
    /// `1.5e-05`, all mantissas padded to `digits` fractional digits
    Scientific { digits: usize },
}

impl Notation {
    /// numpy switches to scientific notation when a nonzero magnitude is
    /// below 1e-4 or at least 1e8
    fn for_values(values: &[f32]) -> Self {
        let magnitudes = values
            .iter()
            .map(|v| v.abs())
            .filter(|v| v.is_finite() && *v > 0.0);
        let mut needs_scientific = false;
        for m in magnitudes {
            if !(1e-4..1e8).contains(&m) {
                needs_scientific = true;
                break;
            }
        }
        if !needs_scientific {
            return Notation::Positional;
        }

        let digits = values
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| mantissa_digits(v))
            .max()
            .unwrap_or(0);
        Notation::Scientific { digits }
    }

    fn format(&self, value: f32) -> String {
        if value.is_nan() {
            return "nan".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_string();
        }
        match self {
            Notation::Positional => format_positional(value),
            Notation::Scientific { digits } => format_scientific(value, *digits),
        }
    }
}

/// Shortest round-trip digits capped at eight fractional digits, always
/// with a decimal point (`1.`, `0.25`)
fn format_positional(value: f32) -> String {
    let mut text = value.to_string();
    if let Some(dot) = text.find('.') {
        if text.len() - dot - 1 > MAX_PRECISION {
            text = format!("{:.*}", MAX_PRECISION, value);
            text = text.trim_end_matches('0').to_string();
        }
    } else {
        text.push('.');
    }
    text
}

/// Fractional mantissa digits of the shortest scientific representation
fn mantissa_digits(value: f32) -> usize {
    let text = format!("{:e}", value);
    let mantissa = text.split('e').next().unwrap_or_default();
    mantissa
        .find('.')
        .map_or(0, |dot| mantissa.len() - dot - 1)
        .min(MAX_PRECISION)
}

/// `6.e-08`, `2.50e+03`: numpy-style exponent with sign and two digits
fn format_scientific(value: f32, digits: usize) -> String {
    let text = format!("{:.*e}", digits, value);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent < 0 { '-' } else { '+' };
    let dot = if mantissa.contains('.') { "" } else { "." };
    format!("{}{}e{}{:02}", mantissa, dot, sign, exponent.abs())
}

/// Pads element strings so decimal points line up
struct ElementFormat {
    int_width: usize,
    frac_width: usize,
}

impl ElementFormat {
    fn for_values(values: &[String]) -> Self {
        let mut int_width = 0;
        let mut frac_width = 0;
        for text in values {
            let (int_part, frac_part) = split_decimal(text);
            int_width = int_width.max(int_part.len());
            frac_width = frac_width.max(frac_part.len());
        }
        Self {
            int_width,
            frac_width,
        }
    }

    fn pad(&self, text: &str) -> String {
        let (int_part, frac_part) = split_decimal(text);
        format!(
            "{:>iw$}{:<fw$}",
            int_part,
            frac_part,
            iw = self.int_width,
            fw = self.frac_width
        )
    }
}

/// Splits `"-0.25"` into `("-0", ".25")`; non-numeric text has no fraction
fn split_decimal(text: &str) -> (&str, &str) {
    match text.find('.') {
        Some(dot) => text.split_at(dot),
        None => (text, ""),
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array.ndim() == 0 {
            return match self.array.iter().next() {
                Some(&v) => write!(f, "{}", Notation::for_values(&[v]).format(v)),
                None => write!(f, "[]"),
            };
        }

        let summarize = self.array.len() > SUMMARY_THRESHOLD;
        let mut visible = Vec::new();
        collect_visible(self.array.view(), summarize, &mut visible);

        let notation = Notation::for_values(&visible);
        let strings: Vec<String> = visible.iter().map(|&v| notation.format(v)).collect();
        let format = ElementFormat::for_values(&strings);

        let mut out = String::new();
        let mut elements = strings.iter();
        render(
            self.array.view(),
            0,
            summarize,
            &format,
            &mut elements,
            &mut out,
        );
        f.write_str(&out)
    }
}

/// Positions along one axis that survive summarisation; `None` marks `...`
fn axis_positions(len: usize, summarize: bool) -> Vec<Option<usize>> {
    if summarize && len > 2 * EDGE_ITEMS {
        (0..EDGE_ITEMS)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((len - EDGE_ITEMS..len).map(Some))
            .collect()
    } else {
        (0..len).map(Some).collect()
    }
}

/// Displayed elements, in display order
fn collect_visible(view: ArrayViewD<'_, f32>, summarize: bool, out: &mut Vec<f32>) {
    let len = view.len_of(Axis(0));
    for pos in axis_positions(len, summarize).into_iter().flatten() {
        let sub = view.index_axis(Axis(0), pos);
        if sub.ndim() == 0 {
            out.extend(sub.iter().copied());
        } else {
            collect_visible(sub, summarize, out);
        }
    }
}

/// Current column of the last line in `out`
fn column(out: &str) -> usize {
    out.len() - out.rfind('\n').map_or(0, |i| i + 1)
}

fn render<'a>(
    view: ArrayViewD<'_, f32>,
    depth: usize,
    summarize: bool,
    format: &ElementFormat,
    elements: &mut impl Iterator<Item = &'a String>,
    out: &mut String,
) {
    let positions = axis_positions(view.len_of(Axis(0)), summarize);
    let innermost = view.ndim() == 1;
    out.push('[');

    for (n, position) in positions.iter().enumerate() {
        let word = match position {
            None => "...".to_string(),
            Some(_) if innermost => elements
                .next()
                .map(|text| format.pad(text))
                .unwrap_or_default(),
            Some(_) => String::new(),
        };

        if n > 0 {
            if innermost {
                // Room for the word plus the closing brackets of this row
                let closing = if n + 1 == positions.len() { depth + 1 } else { 0 };
                if column(out) + 1 + word.len() + closing > LINE_WIDTH {
                    out.push('\n');
                    out.push_str(&" ".repeat(depth + 1));
                } else {
                    out.push(' ');
                }
            } else {
                // One blank line per remaining inner axis beyond the first
                out.push_str(&"\n".repeat(view.ndim() - 1));
                out.push_str(&" ".repeat(depth + 1));
            }
        }

        match position {
            Some(pos) if !innermost => render(
                view.index_axis(Axis(0), *pos),
                depth + 1,
                summarize,
                format,
                elements,
                out,
            ),
            _ => out.push_str(&word),
        }
    }

    out.push(']');
}
