use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::data::catalog::{Catalog, RawTable};
use crate::data::source::load_table;
use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_catalog_file(path: &Path) -> Result<ValidationReport, CatalogError> {
    let table = load_table(path)?;
    Ok(validate_catalog_table(&table))
}

/// Check a deliverables table against the column schema the matcher relies on.
pub fn validate_catalog_table(table: &RawTable) -> ValidationReport {
    let mut report = ValidationReport::default();
    let catalog = Catalog::from_table(table);
    let mapping = catalog.mapping;

    if mapping.name.is_none() {
        report.push(
            ValidationSeverity::Error,
            "columns",
            "no deliverable name column found",
        );
    }
    let Some(effectiveness_column) = mapping.effectiveness else {
        report.push(
            ValidationSeverity::Error,
            "columns",
            "no effectiveness column found",
        );
        return report;
    };

    for (index, row) in table.rows.iter().enumerate() {
        let context = format!("row[{index}]");
        match row.get(effectiveness_column) {
            None | Some(serde_json::Value::Null) => report.push(
                ValidationSeverity::Warning,
                context,
                "missing effectiveness; row can match but never reaches the threshold",
            ),
            Some(value) => {
                let raw = value.as_f64().or_else(|| {
                    value
                        .as_str()
                        .and_then(|text| text.trim().trim_end_matches('%').trim().parse().ok())
                });
                match raw {
                    Some(percent) if (0.0..=100.0).contains(&percent) => {}
                    Some(percent) => report.push(
                        ValidationSeverity::Error,
                        context,
                        format!("effectiveness {percent} outside 0-100"),
                    ),
                    None => report.push(
                        ValidationSeverity::Error,
                        context,
                        format!("unparseable effectiveness {value}"),
                    ),
                }
            }
        }
    }

    let mut rows_by_code: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for entry in &catalog.entries {
        if entry.base_codes.is_empty() {
            report.push(
                ValidationSeverity::Warning,
                format!("deliverable '{}'", entry.name),
                "no base code; only substring matching applies",
            );
        }
        for code in &entry.base_codes {
            rows_by_code.entry(code).or_default().push(&entry.name);
        }
    }
    for (code, names) in rows_by_code {
        if names.len() > 1 {
            report.push(
                ValidationSeverity::Info,
                format!("base code {code}"),
                format!(
                    "shared by {} deliverables ({}); tie-break applies",
                    names.len(),
                    names.join(", ")
                ),
            );
        }
    }

    report
}
