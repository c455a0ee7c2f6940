//! Catalog providers: where deliverables tables come from.
//!
//! The engine only sees [CatalogProvider]. File-backed catalogs live under a root
//! directory as `<dataset>.csv`, `<dataset>.json`, or `<dataset>.xlsx`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader};
use serde_json::{Map, Value};

use crate::data::catalog::RawTable;
use crate::engine::router::CatalogRoute;
use crate::error::CatalogError;

/// Supplies the raw deliverables table for a routed (friendly, enemy) pair.
/// Must return the same table for the same route within one invocation.
pub trait CatalogProvider {
    fn fetch(&self, route: &CatalogRoute) -> Result<RawTable, CatalogError>;
}

impl<P: CatalogProvider + ?Sized> CatalogProvider for &P {
    fn fetch(&self, route: &CatalogRoute) -> Result<RawTable, CatalogError> {
        (**self).fetch(route)
    }
}

/// Tables held in memory, keyed by dataset name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogProvider {
    tables: HashMap<String, RawTable>,
}

impl InMemoryCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, dataset: impl Into<String>, table: RawTable) -> Self {
        self.insert(dataset, table);
        self
    }

    pub fn insert(&mut self, dataset: impl Into<String>, table: RawTable) {
        self.tables.insert(dataset.into(), table);
    }

    /// Build from `{ "<dataset>": [ {row}, ... ] }`.
    pub fn from_json_map(catalogs: &Map<String, Value>) -> Result<Self, CatalogError> {
        let mut provider = Self::new();
        for (dataset, rows) in catalogs {
            provider.insert(dataset.clone(), table_from_json_value(rows.clone())?);
        }
        Ok(provider)
    }
}

impl CatalogProvider for InMemoryCatalogProvider {
    fn fetch(&self, route: &CatalogRoute) -> Result<RawTable, CatalogError> {
        self.tables
            .get(route.dataset)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(route.dataset.to_string()))
    }
}

/// Catalog files under a root directory.
#[derive(Debug, Clone)]
pub struct FileCatalogProvider {
    root: PathBuf,
}

const FILE_EXTENSIONS: &[&str] = &["csv", "json", "xlsx"];

impl FileCatalogProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, dataset: &str) -> Option<PathBuf> {
        FILE_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{dataset}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl CatalogProvider for FileCatalogProvider {
    fn fetch(&self, route: &CatalogRoute) -> Result<RawTable, CatalogError> {
        let path = self
            .locate(route.dataset)
            .ok_or_else(|| CatalogError::NotFound(route.dataset.to_string()))?;
        tracing::debug!(dataset = route.dataset, path = %path.display(), "loading catalog file");
        load_table(&path)
    }
}

/// Load a catalog file, picking the reader from its extension.
pub fn load_table(path: &Path) -> Result<RawTable, CatalogError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path),
        other => Err(CatalogError::UnsupportedFormat(other.to_string())),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, CatalogError> {
    let content = fs::read_to_string(path)?;
    read_csv_str(&content)
}

/// Parse CSV text with a header row. Every cell stays a string.
pub fn read_csv_str(content: &str) -> Result<RawTable, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = (0..headers.len())
            .map(|index| match record.get(index) {
                Some(cell) if !cell.is_empty() => Value::String(cell.to_string()),
                _ => Value::Null,
            })
            .collect();
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

fn read_json(path: &Path) -> Result<RawTable, CatalogError> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    table_from_json_value(value)
}

/// Accepts an array of row objects or `{ "rows": [...] }`. Non-object rows are dropped.
pub fn table_from_json_value(value: Value) -> Result<RawTable, CatalogError> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut wrapper) => match wrapper.remove("rows") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(CatalogError::UnsupportedFormat(
                    "expected an array of rows or { rows: [...] }".to_string(),
                ))
            }
        },
        _ => {
            return Err(CatalogError::UnsupportedFormat(
                "expected an array of rows".to_string(),
            ))
        }
    };
    let records: Vec<Map<String, Value>> = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    Ok(RawTable::from_records(&records))
}

fn workbook_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(text) if text.trim().is_empty() => Value::Null,
        Data::String(text) => Value::String(text.trim().to_string()),
        Data::Int(number) => Value::from(*number),
        Data::Float(number) => serde_json::Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(flag) => Value::Bool(*flag),
        other => Value::String(other.to_string()),
    }
}

/// First worksheet; first row holds headers.
fn read_workbook(path: &Path) -> Result<RawTable, CatalogError> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|err| CatalogError::Workbook(err.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CatalogError::Workbook("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|err| CatalogError::Workbook(err.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| workbook_cell(cell).as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();
    let rows = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| {
            (0..headers.len())
                .map(|index| row.get(index).map(workbook_cell).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::router::route_for;
    use crate::engine::side::Side;
    use serde_json::json;

    #[test]
    fn csv_text_becomes_string_cells() {
        let table = read_csv_str(
            "weapon,effectiveness_percentage,range_nm\nAIM-120C,40,\nAIM-9X, 55 ,10\n",
        )
        .expect("csv should parse");
        assert_eq!(table.headers, vec!["weapon", "effectiveness_percentage", "range_nm"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], Value::Null);
        assert_eq!(table.rows[1][1], json!("55"));
    }

    #[test]
    fn json_rows_accept_wrapper_object() {
        let table = table_from_json_value(json!({
            "rows": [{"weapon": "AIM-120", "effectiveness_percentage": 40}, 7]
        }))
        .expect("json rows should parse");
        assert_eq!(table.rows.len(), 1);
        assert!(table_from_json_value(json!("nope")).is_err());
    }

    #[test]
    fn in_memory_provider_reports_missing_dataset() {
        let route = route_for(Side::Air, Side::Air).expect("air/air is routed");
        let provider = InMemoryCatalogProvider::new();
        assert!(matches!(provider.fetch(&route), Err(CatalogError::NotFound(_))));

        let provider = provider.with_table(route.dataset, RawTable::default());
        assert!(provider.fetch(&route).is_ok());
    }
}
