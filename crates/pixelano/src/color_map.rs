//! Class to color range map and its tab-separated text format.
//!
//! Each non-blank line reads `<class>\t<lower>\t<upper>`, where a bound is
//! any text containing exactly three decimal numbers, e.g.
//! `car	220;0;0	255;0;0`.

use std::fs;
use std::path::Path;

use crate::{
    error::{PixelanoError, Result},
    types::{ClassColorRange, Color, ColorRange},
};

/// Ordered class → color range mapping.
///
/// Iteration follows first insertion; re-inserting a class replaces its range
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorRangeMap {
    entries: Vec<ClassColorRange>,
}

impl ColorRangeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: impl Into<String>, range: ColorRange) {
        let class_name = class_name.into();
        match self.entries.iter_mut().find(|e| e.class_name == class_name) {
            Some(entry) => entry.range = range,
            None => self.entries.push(ClassColorRange { class_name, range }),
        }
    }

    pub fn get(&self, class_name: &str) -> Option<&ColorRange> {
        self.entries
            .iter()
            .find(|e| e.class_name == class_name)
            .map(|e| &e.range)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassColorRange> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a class color map file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse class color map text. Any malformed line fails the whole map.
    pub fn parse(content: &str) -> Result<Self> {
        let mut map = Self::new();

        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split('\t');
            let class_name = tokens.next().unwrap_or_default().trim();
            let (Some(lower), Some(upper)) = (tokens.next(), tokens.next()) else {
                return Err(PixelanoError::ColorMap {
                    line: line_number,
                    message: format!(
                        "expected '<class>\\t<lower R;G;B>\\t<upper R;G;B>', got '{}'",
                        line
                    ),
                });
            };

            let lower = parse_rgb(lower, line_number)?;
            let upper = parse_rgb(upper, line_number)?;
            let range = ColorRange::new(lower, upper).ok_or_else(|| PixelanoError::ColorMap {
                line: line_number,
                message: format!(
                    "lower bound {} exceeds upper bound {} for class '{}'",
                    lower, upper, class_name
                ),
            })?;

            map.insert(class_name, range);
        }

        Ok(map)
    }
}

impl<'a> IntoIterator for &'a ColorRangeMap {
    type Item = &'a ClassColorRange;
    type IntoIter = std::slice::Iter<'a, ClassColorRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Scan digit runs out of `text`; every other character separates values.
fn parse_rgb(text: &str, line: usize) -> Result<Color> {
    let values = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| {
            run.parse::<u8>().map_err(|_| PixelanoError::ColorMap {
                line,
                message: format!("channel value {} is outside 0-255", run),
            })
        })
        .collect::<Result<Vec<u8>>>()?;

    match values.as_slice() {
        &[r, g, b] => Ok(Color::new(r, g, b)),
        _ => Err(PixelanoError::ColorMap {
            line,
            message: format!(
                "Color value for class needs to have exactly 3 channels (R, G, B), found {} in '{}'",
                values.len(),
                text
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_file_order() {
        let map = ColorRangeMap::parse("car\t220;0;0\t255;0;0\nperson\t0,200,0\t10,255,10\n")
            .expect("Should parse");

        let names: Vec<&str> = map.iter().map(|e| e.class_name.as_str()).collect();
        assert_eq!(names, ["car", "person"]);
        assert_eq!(
            map.get("car"),
            Some(&ColorRange { lower: Color::new(220, 0, 0), upper: Color::new(255, 0, 0) })
        );
        assert_eq!(map.get("person").unwrap().upper, Color::new(10, 255, 10));
    }

    #[test]
    fn test_any_non_digit_separates_channels() {
        let map = ColorRangeMap::parse("sky\t(0, 0, 200)\trgb[30 30 255]").unwrap();
        let range = map.get("sky").unwrap();
        assert_eq!(range.lower, Color::new(0, 0, 200));
        assert_eq!(range.upper, Color::new(30, 30, 255));
    }

    #[test]
    fn test_wrong_channel_count_is_rejected() {
        let err = ColorRangeMap::parse("car\t220;0\t255;0;0").unwrap_err();
        assert!(matches!(err, PixelanoError::ColorMap { line: 1, .. }));

        let err = ColorRangeMap::parse("ok\t0;0;0\t1;1;1\ncar\t0;0;0\t1;1;1;1").unwrap_err();
        assert!(matches!(err, PixelanoError::ColorMap { line: 2, .. }));
    }

    #[test]
    fn test_out_of_range_channel_is_rejected() {
        let err = ColorRangeMap::parse("car\t0;0;0\t256;0;0").unwrap_err();
        assert!(err.to_string().contains("0-255"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(ColorRangeMap::parse("car\t10;0;0\t5;0;0").is_err());
    }

    #[test]
    fn test_missing_columns_are_rejected() {
        assert!(ColorRangeMap::parse("car\t10;0;0").is_err());
        assert!(ColorRangeMap::parse("car").is_err());
    }

    #[test]
    fn test_blank_lines_and_crlf_are_ignored() {
        let map = ColorRangeMap::parse("\r\ncar\t1;2;3\t4;5;6\r\n\n").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_repeated_class_replaces_in_place() {
        let map = ColorRangeMap::parse(
            "car\t0;0;0\t1;1;1\nperson\t2;2;2\t3;3;3\ncar\t9;9;9\t10;10;10",
        )
        .unwrap();

        let names: Vec<&str> = map.iter().map(|e| e.class_name.as_str()).collect();
        assert_eq!(names, ["car", "person"]);
        assert_eq!(map.get("car").unwrap().lower, Color::new(9, 9, 9));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.txt");
        std::fs::write(&path, "road\t100;100;100\t120;120;120\n").unwrap();

        let map = ColorRangeMap::from_file(&path).unwrap();
        assert_eq!(map.len(), 1);
        assert!(ColorRangeMap::from_file(dir.path().join("missing.txt")).is_err());
    }
}
