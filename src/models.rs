use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding a row's display name.
pub const NAME_FIELD: &str = "";

/// Name of the sentinel row summing a whole table.
pub const TOTAL_ROW_NAME: &str = "Total";

/// Status marker the upstream sends on success.
pub const SUCCESS_STATUS: &str = "sucesso";

/// One spreadsheet row, keyed by column header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CohortRow(pub Map<String, Value>);

impl CohortRow {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(NAME_FIELD).and_then(Value::as_str)
    }

    pub fn is_total(&self) -> bool {
        self.name() == Some(TOTAL_ROW_NAME)
    }

    /// Numeric value of `field`; absent or non-numeric reads as 0.
    pub fn number(&self, field: &str) -> f64 {
        numeric_value(self.0.get(field)).unwrap_or(0.0)
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }
}

/// Reads a JSON value as a finite number, accepting numeric strings.
pub fn numeric_value(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

pub type CohortTable = Vec<CohortRow>;

/// Returns the sentinel Total row of a table, if present.
pub fn total_row(table: &[CohortRow]) -> Option<&CohortRow> {
    table.iter().find(|row| row.is_total())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceData {
    #[serde(default)]
    pub tabela_professores: CohortTable,
    #[serde(default)]
    pub tabela_alunos: CohortTable,
}

impl SourceData {
    pub fn teacher_totals(&self) -> Option<&CohortRow> {
        total_row(&self.tabela_professores)
    }

    pub fn student_totals(&self) -> Option<&CohortRow> {
        total_row(&self.tabela_alunos)
    }
}

/// Envelope returned by the spreadsheet endpoint.
#[derive(Debug, Deserialize)]
pub struct SourcePayload {
    pub status: String,
    #[serde(default)]
    pub data: Option<SourceData>,
}

/// Teacher and student totals merged into one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct ConsolidatedSummary {
    pub total_paid: f64,
    pub total_expected: f64,
    pub total_missing: f64,
    pub confirmed_teachers: f64,
    pub confirmed_students: f64,
    pub confirmed_base: f64,
    pub total_companions: f64,
    pub grand_total_people: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KpiValues {
    pub paid: String,
    pub missing: String,
    pub people_confirmed: String,
    pub companions: String,
}

#[derive(Debug, Serialize)]
pub struct CohortBreakdown {
    pub paid: f64,
    pub missing: f64,
    pub expected: f64,
    pub confirmed: f64,
    pub companions: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Option<ConsolidatedSummary>,
    pub teachers: CohortBreakdown,
    pub students: CohortBreakdown,
}
