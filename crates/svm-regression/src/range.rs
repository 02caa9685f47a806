//! Per-feature rescaling ranges

use crate::ModelError;
use brisque_common::{FeatureVector, FEATURE_COUNT};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const HEADER_LINES: usize = 2;

// Published ranges of the LIVE-trained BRISQUE model
const REFERENCE_MIN: [f32; FEATURE_COUNT] = [
    0.336999, 0.019667, 0.230000, -0.125959, 0.000167, 0.000616, 0.231000, -0.125873, 0.000165,
    0.000600, 0.241000, -0.128814, 0.000179, 0.000386, 0.243000, -0.133080, 0.000182, 0.000421,
    0.436998, 0.016929, 0.247000, -0.200231, 0.000104, 0.000834, 0.257000, -0.200017, 0.000112,
    0.000876, 0.257000, -0.155072, 0.000112, 0.000356, 0.258000, -0.154374, 0.000117, 0.000351,
];
const REFERENCE_MAX: [f32; FEATURE_COUNT] = [
    9.999411, 0.807472, 1.644021, 0.202917, 0.712384, 0.468672, 1.644021, 0.169548, 0.713132,
    0.467896, 1.553016, 0.101368, 0.687324, 0.533087, 1.554016, 0.101000, 0.689177, 0.533133,
    3.639918, 0.800955, 1.096995, 0.175286, 0.755547, 0.399270, 1.095995, 0.155928, 0.751488,
    0.402398, 1.041992, 0.093209, 0.623516, 0.532925, 1.042992, 0.093714, 0.621958, 0.534484,
];

/// (min, max) per feature, stored at the file's single precision
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable {
    min: [f32; FEATURE_COUNT],
    max: [f32; FEATURE_COUNT],
}

impl RangeTable {
    #[must_use]
    pub fn new(min: [f32; FEATURE_COUNT], max: [f32; FEATURE_COUNT]) -> Self {
        Self { min, max }
    }

    /// Ranges that ship with the reference BRISQUE model
    #[must_use]
    pub fn reference() -> Self {
        Self::new(REFERENCE_MIN, REFERENCE_MAX)
    }

    /// Load a range file: two ignored header lines, then 36 rows of
    /// `index min max`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = text.parse()?;
        info!("Loaded BRISQUE range table from {}", path.display());
        Ok(table)
    }

    /// `(min, max)` of feature `index`
    #[must_use]
    pub fn bounds(&self, index: usize) -> (f32, f32) {
        (self.min[index], self.max[index])
    }

    /// Rescale every feature: `-1 + 2 (v - min) / (max - min)`
    #[must_use]
    pub fn scale(&self, features: &FeatureVector) -> Vec<f64> {
        features
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&value, (&min, &max))| {
                let span = f64::from(max - min);
                -1.0 + (2.0 / span * (value - f64::from(min)))
            })
            .collect()
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl FromStr for RangeTable {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, ModelError> {
        let line_count = text.lines().count();
        if line_count < HEADER_LINES {
            return Err(ModelError::parse(
                line_count.max(1),
                "range file is missing its header lines",
            ));
        }

        // Rows are read as a whitespace-separated token stream
        let mut tokens = text
            .lines()
            .enumerate()
            .skip(HEADER_LINES)
            .flat_map(|(n, line)| line.split_whitespace().map(move |tok| (n + 1, tok)));

        let mut min = [0.0f32; FEATURE_COUNT];
        let mut max = [0.0f32; FEATURE_COUNT];

        for row in 0..FEATURE_COUNT {
            let mut values = [0.0f32; 3];
            for value in &mut values {
                let (line, token) = tokens.next().ok_or_else(|| {
                    ModelError::parse(
                        line_count,
                        format!("expected {FEATURE_COUNT} range rows, found {row}"),
                    )
                })?;
                *value = token.parse().map_err(|_| {
                    ModelError::parse(line, format!("invalid number '{token}'"))
                })?;
            }
            min[row] = values[1];
            max[row] = values[2];
        }

        Ok(Self { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn range_text(rows: usize) -> String {
        let mut text = String::from("x\n-1 1\n");
        for i in 0..rows {
            text.push_str(&format!("{} {} {}\n", i + 1, i as f32 * 0.5, i as f32 * 0.5 + 2.0));
        }
        text
    }

    #[test]
    fn test_parse_range_file() {
        let table: RangeTable = range_text(FEATURE_COUNT).parse().unwrap();
        assert_eq!(table.bounds(0), (0.0, 2.0));
        assert_eq!(table.bounds(35), (17.5, 19.5));
    }

    #[test]
    fn test_scale_maps_bounds_to_unit_interval() {
        let table: RangeTable = range_text(FEATURE_COUNT).parse().unwrap();

        let mut values = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64 * 0.5 + if i % 2 == 0 { 0.0 } else { 2.0 };
        }
        let scaled = table.scale(&FeatureVector::from_array(values));

        assert_eq!(scaled.len(), FEATURE_COUNT);
        for (i, s) in scaled.iter().enumerate() {
            let expected = if i % 2 == 0 { -1.0 } else { 1.0 };
            assert!((s - expected).abs() < 1e-12, "feature {i}: {s}");
        }
    }

    #[test]
    fn test_short_file_is_error() {
        let err = range_text(20).parse::<RangeTable>().unwrap_err();
        assert!(matches!(err, ModelError::Parse { .. }));
        assert!(err.to_string().contains("found 20"));

        assert!("only one line".parse::<RangeTable>().is_err());
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = range_text(FEATURE_COUNT).replace("4 1.5 3.5", "4 abc 3.5");
        match text.parse::<RangeTable>().unwrap_err() {
            ModelError::Parse { line, message } => {
                assert_eq!(line, 6);
                assert!(message.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(range_text(FEATURE_COUNT).as_bytes()).unwrap();

        let table = RangeTable::load(file.path()).unwrap();
        assert_eq!(table.bounds(3), (1.5, 3.5));

        let missing = RangeTable::load("/nonexistent/brisque_allrange.dat");
        assert!(matches!(missing, Err(ModelError::Read { .. })));
    }

    #[test]
    fn test_reference_table() {
        let table = RangeTable::reference();
        assert_eq!(table.bounds(0), (0.336999, 9.999411));
        assert_eq!(table.bounds(18), (0.436998, 3.639918));
        for i in 0..FEATURE_COUNT {
            let (min, max) = table.bounds(i);
            assert!(max > min);
        }
    }
}
