// src/table.rs
//! Column-ordered feature tables with numeric and text columns

use crate::error::SkipReason;

/// Cell values of one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    /// Cell as written to CSV
    pub fn cell(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(values) => format_number(values[row]),
            ColumnData::Text(values) => values[row].clone(),
        }
    }

    fn into_text(self) -> Vec<String> {
        match self {
            ColumnData::Numeric(values) => values.into_iter().map(format_number).collect(),
            ColumnData::Text(values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Numeric when every cell parses as a finite number, text otherwise
    pub fn from_cells(name: impl Into<String>, cells: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = cells.iter().map(|c| parse_number(c)).collect();
        match parsed {
            Some(values) if !cells.is_empty() => Self::numeric(name, values),
            _ => Self::text(name, cells),
        }
    }
}

/// Ordered set of equally long columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    columns: Vec<Column>,
    num_rows: usize,
}

impl FeatureTable {
    pub fn new(columns: Vec<Column>) -> Result<Self, SkipReason> {
        let num_rows = columns.first().map_or(0, |c| c.data.len());
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.data.len() != num_rows)
        {
            return Err(SkipReason::ShapeMismatch {
                channel: index,
                expected: num_rows,
                actual: column.data.len(),
            });
        }
        Ok(Self { columns, num_rows })
    }

    /// Build from a header and row-major string cells
    pub fn from_records(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, SkipReason> {
        if rows.is_empty() {
            return Err(SkipReason::EmptyInput);
        }
        let width = header.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(SkipReason::RaggedRow {
                row,
                expected: width,
                actual: cells.len(),
            });
        }

        let mut cells_by_column: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            for (column, cell) in cells_by_column.iter_mut().zip(row) {
                column.push(cell);
            }
        }

        let columns = header
            .into_iter()
            .zip(cells_by_column)
            .map(|(name, cells)| Column::from_cells(normalize_column_name(&name), cells))
            .collect();
        Self::new(columns)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.data.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Cells of one row in column order
    pub fn row(&self, index: usize) -> Vec<String> {
        self.columns.iter().map(|c| c.data.cell(index)).collect()
    }

    /// Replace the data of every column through `f`, keeping names and order
    pub fn map_columns(&self, mut f: impl FnMut(&Column) -> ColumnData) -> Result<Self, SkipReason> {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                data: f(c),
            })
            .collect();
        Self::new(columns)
    }

    /// Stack tables row-wise; every table must have the same column names
    ///
    /// A column numeric in every input stays numeric, otherwise it becomes text.
    pub fn vstack(tables: &[FeatureTable]) -> Result<FeatureTable, SkipReason> {
        let first = tables.first().ok_or(SkipReason::EmptyInput)?;
        let names = first.column_names();
        for table in &tables[1..] {
            let actual = table.column_names();
            if actual != names {
                return Err(SkipReason::SchemaMismatch {
                    expected: names,
                    actual,
                });
            }
        }

        let columns = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let parts = tables.iter().map(|t| &t.columns[index].data);
                if parts.clone().all(ColumnData::is_numeric) {
                    let values = parts
                        .flat_map(|data| match data {
                            ColumnData::Numeric(values) => values.clone(),
                            ColumnData::Text(_) => Vec::new(),
                        })
                        .collect();
                    Column::numeric(name.clone(), values)
                } else {
                    let values = parts.flat_map(|data| data.clone().into_text()).collect();
                    Column::text(name.clone(), values)
                }
            })
            .collect();

        Self::new(columns)
    }
}

/// Header names use underscores (`ALPHA L` and `ALPHA_L` are the same column)
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Finite number or nothing
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest representation that parses back to the same value
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}
