//! First-frame ground-truth annotation parsing.
//!
//! Annotation lines hold the four corners of a possibly rotated
//! quadrilateral, `x1,y1,x2,y2,x3,y3,x4,y4`. Only the first line of the file
//! seeds the tracker.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point2;

use crate::error::{Error, Result};
use crate::tracker::Region;

const FIELD_COUNT: usize = 8;

/// Four corner points, in the order they were annotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    pub corners: [Point2<f32>; 4],
}

impl Quadrilateral {
    /// Smallest axis-aligned region containing all four corners.
    ///
    /// Rotation is discarded; trackers only accept axis-aligned regions.
    pub fn bounding_region(&self) -> Region {
        let xs = self.corners.map(|p| p.x);
        let ys = self.corners.map(|p| p.y);
        let x_min = xs.iter().copied().fold(f32::INFINITY, f32::min);
        let y_min = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let x_max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let y_max = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Region::new(x_min, y_min, x_max - x_min, y_max - y_min)
    }
}

/// Parse one annotation line.
///
/// Any run of characters that cannot start a number separates fields, so
/// `10,20,...`, `10 20 ...` and `10;20;...` all parse. Fewer than eight
/// numbers is an error; anything after the eighth is ignored.
pub fn parse_line(line: &str) -> Result<Quadrilateral> {
    let values = numeric_tokens(line)
        .take(FIELD_COUNT)
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|e| Error::Parse(format!("invalid number '{token}': {e}")))
        })
        .collect::<Result<Vec<f32>>>()?;

    if values.len() < FIELD_COUNT {
        return Err(Error::Parse(format!(
            "expected {FIELD_COUNT} numeric fields, found {} in '{}'",
            values.len(),
            line.trim_end()
        )));
    }

    let corners = [0, 2, 4, 6].map(|i| Point2::new(values[i], values[i + 1]));
    Ok(Quadrilateral { corners })
}

/// Parse one annotation line straight into its bounding region.
pub fn parse_region(line: &str) -> Result<Region> {
    Ok(parse_line(line)?.bounding_region())
}

/// Read the first line of an annotation file and derive the seed region.
///
/// A missing or empty file is a parse error, never a zero-sized region.
pub fn parse_first_line<P: AsRef<Path>>(path: P) -> Result<Region> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Parse(format!(
            "cannot read ground truth {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| Error::Parse(format!("cannot read ground truth {}: {}", path.display(), e)))?;

    if first_line.trim().is_empty() {
        return Err(Error::Parse(format!(
            "ground truth {} is empty",
            path.display()
        )));
    }

    parse_region(&first_line)
}

/// Split `line` into the substrings that look like numbers.
fn numeric_tokens(line: &str) -> impl Iterator<Item = &str> {
    let bytes = line.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() && !starts_number(bytes, pos) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }

        let start = pos;
        if matches!(bytes[pos], b'+' | b'-') {
            pos += 1;
        }
        while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
            pos += 1;
        }
        // exponent, only when followed by digits
        if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
            let mut end = pos + 1;
            if end < bytes.len() && matches!(bytes[end], b'+' | b'-') {
                end += 1;
            }
            if end < bytes.len() && bytes[end].is_ascii_digit() {
                pos = end;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
        }
        Some(&line[start..pos])
    })
}

fn starts_number(bytes: &[u8], pos: usize) -> bool {
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    match bytes[pos] {
        b'0'..=b'9' => true,
        b'.' => digit_at(pos + 1),
        b'+' | b'-' => digit_at(pos + 1) || (bytes.get(pos + 1) == Some(&b'.') && digit_at(pos + 2)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_axis_aligned_square() {
        let region = parse_region("10,20,110,20,110,120,10,120").unwrap();
        assert_eq!(region, Region::new(10.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_rotated_quadrilateral_is_enclosed() {
        let quad = parse_line("50,0,100,50,50,100,0,50").unwrap();
        let region = quad.bounding_region();
        assert_eq!(region, Region::new(0.0, 0.0, 100.0, 100.0));
        for corner in quad.corners {
            assert!(corner.x >= region.x && corner.x <= region.x + region.width);
            assert!(corner.y >= region.y && corner.y <= region.y + region.height);
        }
    }

    #[test]
    fn test_winding_order_does_not_matter() {
        let a = parse_region("1.5,2,9,2,9,7.25,1.5,7.25").unwrap();
        let b = parse_region("9,7.25,1.5,7.25,1.5,2,9,2").unwrap();
        assert_eq!(a, b);
        assert!(a.width >= 0.0 && a.height >= 0.0);
    }

    #[test]
    fn test_parsing_is_bit_identical() {
        let line = "198.1,214.3,305.9,201.0,317.7,288.2,210.4,301.6";
        let a = parse_region(line).unwrap();
        let b = parse_region(line).unwrap();
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.width.to_bits(), b.width.to_bits());
        assert_eq!(a.height.to_bits(), b.height.to_bits());
    }

    #[test]
    fn test_tolerates_other_delimiters() {
        let region = parse_region("10 20\t110;20|110,120 , 10,120\r\n").unwrap();
        assert_eq!(region, Region::new(10.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_negative_and_exponent_values() {
        let region = parse_region("-5,-5,1e1,-5,1e1,5,-5,5").unwrap();
        assert_eq!(region, Region::new(-5.0, -5.0, 15.0, 10.0));
    }

    #[test]
    fn test_too_few_fields() {
        let err = parse_line("10,20,110,20,110,120,10").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(matches!(parse_line(""), Err(Error::Parse(_))));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let region = parse_region("0,0,4,0,4,4,0,4,99,99").unwrap();
        assert_eq!(region, Region::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_reads_only_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "10,20,110,20,110,120,10,120").unwrap();
        writeln!(file, "garbage").unwrap();
        let region = parse_first_line(file.path()).unwrap();
        assert_eq!(region, Region::new(10.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_missing_or_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = parse_first_line(dir.path().join("groundtruth_rect.txt"));
        assert!(matches!(missing, Err(Error::Parse(_))));

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(parse_first_line(empty.path()), Err(Error::Parse(_))));
    }
}
