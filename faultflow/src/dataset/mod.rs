//! Tabular sensor data: ordered named columns with missing-value support.
//!
//! Sensor exports arrive as plain comma-separated files in which the literal
//! cell `na` (or an empty cell) marks a missing reading. Numeric columns carry
//! missing cells as NaN so that imputation stays a pure array operation.

use crate::errors::DatasetError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// The cell token that marks a missing reading in sensor exports.
pub const MISSING_TOKEN: &str = "na";

/// A single named column of data.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric readings; missing cells are NaN.
    Float(Vec<f64>),
    /// Categorical values; missing cells are None.
    Text(Vec<Option<String>>),
}

impl Column {
    /// Number of rows in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    /// Returns true when the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        match self {
            Self::Float(values) => values.iter().filter(|v| v.is_nan()).count(),
            Self::Text(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// Fraction of missing cells, 0.0 for an empty column.
    #[must_use]
    pub fn missing_ratio(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.missing_count() as f64 / self.len() as f64
        }
    }

    /// Mean over non-missing cells; None for text columns or all-missing ones.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Float(values) => {
                let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                if present.is_empty() {
                    None
                } else {
                    Some(present.iter().sum::<f64>() / present.len() as f64)
                }
            }
            Self::Text(_) => None,
        }
    }

    /// Sample standard deviation over non-missing cells.
    #[must_use]
    pub fn std_dev(&self) -> Option<f64> {
        match self {
            Self::Float(values) => {
                let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                if present.len() < 2 {
                    return None;
                }
                let mean = present.iter().sum::<f64>() / present.len() as f64;
                let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (present.len() - 1) as f64;
                Some(var.sqrt())
            }
            Self::Text(_) => None,
        }
    }

    fn cell_to_string(&self, row: usize) -> String {
        match self {
            Self::Float(values) => {
                if values[row].is_nan() {
                    MISSING_TOKEN.to_string()
                } else {
                    format!("{}", values[row])
                }
            }
            Self::Text(values) => values[row]
                .clone()
                .unwrap_or_else(|| MISSING_TOKEN.to_string()),
        }
    }

    fn select_rows(&self, indices: &[usize]) -> Self {
        match self {
            Self::Float(values) => Self::Float(indices.iter().map(|&i| values[i]).collect()),
            Self::Text(values) => Self::Text(indices.iter().map(|&i| values[i].clone()).collect()),
        }
    }
}

/// An in-memory table of named columns, all sharing one row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
    n_rows: usize,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from named columns, checking row counts agree.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self, DatasetError> {
        let n_rows = columns.first().map_or(0, |(_, col)| col.len());
        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(DatasetError::ColumnLength {
                    name: name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names, in table order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, col)| col)
    }

    /// Returns true when the named column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All column names except the target, in table order.
    #[must_use]
    pub fn feature_names(&self, target: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(name, _)| name != target)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Reads a table from a CSV file, normalizing `na` and empty cells to missing.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_reader(BufReader::new(file), path)
    }

    /// Reads a table from any buffered reader.
    ///
    /// `path` is only used to label errors.
    pub fn from_csv_reader(reader: impl BufRead, path: &Path) -> Result<Self, DatasetError> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line.map_err(|source| DatasetError::Io {
                path: path.to_path_buf(),
                source,
            })?,
            None => {
                return Err(DatasetError::Empty {
                    path: path.to_path_buf(),
                })
            }
        };
        let names: Vec<String> = header
            .split(',')
            .map(|field| field.trim().to_string())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for (row_idx, line) in lines.enumerate() {
            let line = line.map_err(|source| DatasetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != names.len() {
                return Err(DatasetError::RaggedRow {
                    row: row_idx + 1,
                    expected: names.len(),
                    found: fields.len(),
                });
            }
            for (col, field) in fields.iter().enumerate() {
                let cell = if field.is_empty() || field.eq_ignore_ascii_case(MISSING_TOKEN) {
                    None
                } else {
                    Some((*field).to_string())
                };
                cells[col].push(cell);
            }
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| (name, Self::type_column(raw)))
            .collect();
        Self::from_columns(columns)
    }

    /// A column is numeric when every present cell parses as a float.
    fn type_column(raw: Vec<Option<String>>) -> Column {
        let all_numeric = raw
            .iter()
            .flatten()
            .all(|cell| cell.parse::<f64>().is_ok());
        if all_numeric {
            Column::Float(
                raw.into_iter()
                    .map(|cell| {
                        cell.and_then(|c| c.parse::<f64>().ok())
                            .unwrap_or(f64::NAN)
                    })
                    .collect(),
            )
        } else {
            Column::Text(raw)
        }
    }

    /// Writes the table as CSV, rendering missing cells as `na`.
    pub fn to_csv_path(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| DatasetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let io_err = |source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };
        writeln!(writer, "{}", self.column_names().join(",")).map_err(io_err)?;
        for row in 0..self.n_rows {
            let fields: Vec<String> = self
                .columns
                .iter()
                .map(|(_, col)| col.cell_to_string(row))
                .collect();
            writeln!(writer, "{}", fields.join(",")).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)
    }

    /// Splits the target column out, returning remaining features and labels.
    ///
    /// Every row must carry a label; numeric targets are rendered as text so
    /// the encoder sees one label vocabulary regardless of the export's dtype.
    pub fn column_split(&self, target: &str) -> Result<(Self, Vec<String>), DatasetError> {
        let target_col = self
            .column(target)
            .ok_or_else(|| DatasetError::MissingColumn {
                name: target.to_string(),
            })?;

        let mut labels = Vec::with_capacity(self.n_rows);
        for row in 0..self.n_rows {
            let label = match target_col {
                Column::Float(values) if values[row].is_nan() => None,
                Column::Text(values) if values[row].is_none() => None,
                col => Some(col.cell_to_string(row)),
            };
            match label {
                Some(label) => labels.push(label),
                None => {
                    return Err(DatasetError::MissingLabel {
                        row: row + 1,
                        column: target.to_string(),
                    })
                }
            }
        }

        let features = Self {
            columns: self
                .columns
                .iter()
                .filter(|(name, _)| name != target)
                .cloned()
                .collect(),
            n_rows: self.n_rows,
        };
        Ok((features, labels))
    }

    /// Builds a new table from the given row indices.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.select_rows(indices)))
                .collect(),
            n_rows: indices.len(),
        }
    }

    /// Shuffles rows with the given seed and splits off a test fraction.
    ///
    /// Returns `(train, test)`. With the same seed and data the split is
    /// reproducible across runs.
    #[must_use]
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let mut indices: Vec<usize> = (0..self.n_rows).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = ((self.n_rows as f64) * test_fraction).round() as usize;
        let n_test = n_test.clamp(1, self.n_rows.saturating_sub(1).max(1));
        let (test_idx, train_idx) = indices.split_at(n_test.min(self.n_rows));
        (self.select_rows(train_idx), self.select_rows(test_idx))
    }

    /// Appends a text column, checking the row count.
    pub fn push_text_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        if values.len() != self.n_rows {
            return Err(DatasetError::ColumnLength {
                name,
                expected: self.n_rows,
                found: values.len(),
            });
        }
        self.columns
            .push((name, Column::Text(values.into_iter().map(Some).collect())));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn parse(csv: &str) -> Table {
        Table::from_csv_reader(Cursor::new(csv.to_string()), &PathBuf::from("test.csv")).unwrap()
    }

    #[test]
    fn test_csv_parse_types_and_missing() {
        let table = parse("s1,s2,class\n1.5,na,pos\n2.0,3.5,neg\n,4.0,pos\n");

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column_names(), vec!["s1", "s2", "class"]);

        match table.column("s1").unwrap() {
            Column::Float(values) => {
                assert_eq!(values[0], 1.5);
                assert!(values[2].is_nan());
            }
            Column::Text(_) => panic!("s1 should be numeric"),
        }
        match table.column("class").unwrap() {
            Column::Text(values) => assert_eq!(values[0].as_deref(), Some("pos")),
            Column::Float(_) => panic!("class should be text"),
        }
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let result = Table::from_csv_reader(
            Cursor::new("a,b\n1,2\n3\n".to_string()),
            &PathBuf::from("test.csv"),
        );
        assert!(matches!(result, Err(DatasetError::RaggedRow { row: 2, .. })));
    }

    #[test]
    fn test_column_split() {
        let table = parse("s1,class\n1.0,pos\n2.0,neg\n");
        let (features, labels) = table.column_split("class").unwrap();

        assert_eq!(features.column_names(), vec!["s1"]);
        assert_eq!(labels, vec!["pos".to_string(), "neg".to_string()]);
    }

    #[test]
    fn test_column_split_missing_target() {
        let table = parse("s1,class\n1.0,pos\n");
        let result = table.column_split("label");
        assert!(matches!(result, Err(DatasetError::MissingColumn { .. })));
    }

    #[test]
    fn test_column_split_missing_label_cell() {
        let table = parse("s1,class\n1.0,pos\n2.0,na\n");
        let result = table.column_split("class");
        assert!(matches!(
            result,
            Err(DatasetError::MissingLabel { row: 2, .. })
        ));
    }

    #[test]
    fn test_train_test_split_deterministic() {
        let csv: String = std::iter::once("s1,class\n".to_string())
            .chain((0..20).map(|i| format!("{i},pos\n")))
            .collect();
        let table = parse(&csv);

        let (train_a, test_a) = table.train_test_split(0.2, 42);
        let (train_b, test_b) = table.train_test_split(0.2, 42);

        assert_eq!(test_a.n_rows(), 4);
        assert_eq!(train_a.n_rows(), 16);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let (_, test_other_seed) = table.train_test_split(0.2, 7);
        assert_ne!(test_a, test_other_seed);
    }

    #[test]
    fn test_csv_round_trip() {
        let table = parse("s1,s2,class\n1.5,na,pos\n2.25,3.5,neg\n");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        table.to_csv_path(&path).unwrap();
        let back = Table::from_csv_path(&path).unwrap();

        assert_eq!(table.column_names(), back.column_names());
        assert_eq!(back.n_rows(), 2);
        assert_eq!(back.column("s2").unwrap().missing_count(), 1);
    }

    #[test]
    fn test_missing_ratio_and_stats() {
        let table = parse("s1\n1.0\n2.0\n3.0\nna\n");
        let col = table.column("s1").unwrap();

        assert_eq!(col.missing_count(), 1);
        assert!((col.missing_ratio() - 0.25).abs() < 1e-12);
        assert!((col.mean().unwrap() - 2.0).abs() < 1e-12);
        assert!((col.std_dev().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_push_text_column_length_check() {
        let mut table = parse("s1\n1.0\n2.0\n");
        let err = table.push_text_column("prediction", vec!["pos".to_string()]);
        assert!(matches!(err, Err(DatasetError::ColumnLength { .. })));

        table
            .push_text_column("prediction", vec!["pos".to_string(), "neg".to_string()])
            .unwrap();
        assert!(table.has_column("prediction"));
    }
}
