use crate::models::{CohortRow, ConsolidatedSummary, SourceData};
use serde::Serialize;
use std::{borrow::Cow, fmt, str::FromStr};

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Teachers,
    Students,
    Consolidated,
}

impl View {
    pub const ALL: [View; 3] = [View::Teachers, View::Students, View::Consolidated];

    pub fn as_str(self) -> &'static str {
        match self {
            View::Teachers => "teachers",
            View::Students => "students",
            View::Consolidated => "consolidated",
        }
    }

    pub fn tab_label(self) -> &'static str {
        match self {
            View::Teachers => "Professores",
            View::Students => "Alunos",
            View::Consolidated => "Total Geral",
        }
    }

    pub fn keys(self) -> &'static KeyMap {
        match self {
            View::Teachers => &TEACHER_KEYS,
            View::Students => &STUDENT_KEYS,
            View::Consolidated => &CONSOLIDATED_KEYS,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownView(pub String);

impl fmt::Display for UnknownView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown view '{}': expected teachers, students or consolidated",
            self.0
        )
    }
}

impl std::error::Error for UnknownView {}

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "teachers" | "professores" => Ok(View::Teachers),
            "students" | "alunos" => Ok(View::Students),
            "consolidated" | "total" => Ok(View::Consolidated),
            _ => Err(UnknownView(value.to_string())),
        }
    }
}

/// Field names and labels the renderers read for one view.
#[derive(Debug, Serialize)]
pub struct KeyMap {
    pub name: &'static str,
    pub paid: &'static str,
    pub missing: &'static str,
    pub expected: &'static str,
    pub people_confirmed: &'static str,
    pub companions: &'static str,
    pub kpi_people_title: &'static str,
    pub kpi_people_label: &'static str,
    pub kpi_companion_label: &'static str,
    pub kpi_money_label: &'static str,
}

pub static TEACHER_KEYS: KeyMap = KeyMap {
    name: "",
    paid: "Pagamentos confirmados",
    missing: "Faltante",
    expected: "Valores Esperados",
    people_confirmed: "Professores confirmados",
    companions: "Acompanhantes confirmados",
    kpi_people_title: "Professores Confirmados",
    kpi_people_label: "(Apenas Professores)",
    kpi_companion_label: "(Acomp. Professores)",
    kpi_money_label: "",
};

pub static STUDENT_KEYS: KeyMap = KeyMap {
    name: "",
    paid: "Valor Pago",
    missing: "Valores Faltante",
    expected: "Valores Esperados",
    people_confirmed: "Alunos confirmados",
    companions: "Acompanhantes confirmados",
    kpi_people_title: "Alunos Confirmados",
    kpi_people_label: "(Apenas Alunos)",
    kpi_companion_label: "(Acomp. Alunos)",
    kpi_money_label: "",
};

pub static CONSOLIDATED_KEYS: KeyMap = KeyMap {
    name: "",
    paid: "Pagamento Consolidado",
    missing: "Faltante Consolidado",
    expected: "Esperado Consolidado",
    people_confirmed: "Total Base (Prof + Aluno)",
    companions: "Total Acompanhantes",
    kpi_people_title: "Pessoas Base Confirmadas",
    kpi_people_label: "(Professores + Alunos)",
    kpi_companion_label: "Total Acompanhantes",
    kpi_money_label: "(Professores + Alunos)",
};

/// What the renderers need for one view.
#[derive(Debug, Serialize)]
pub struct Projection<'a> {
    pub view: View,
    pub line_items: Vec<&'a CohortRow>,
    pub totals: Cow<'a, CohortRow>,
    pub keys: &'static KeyMap,
}

pub fn project<'a>(
    view: View,
    data: &'a SourceData,
    summary: Option<&ConsolidatedSummary>,
) -> Projection<'a> {
    let (line_items, totals) = match view {
        View::Teachers => split_table(&data.tabela_professores),
        View::Students => split_table(&data.tabela_alunos),
        View::Consolidated => {
            let totals = summary.map(ConsolidatedSummary::to_row).unwrap_or_default();
            (Vec::new(), Cow::Owned(totals))
        }
    };

    Projection {
        view,
        line_items,
        totals,
        keys: view.keys(),
    }
}

fn split_table(table: &[CohortRow]) -> (Vec<&CohortRow>, Cow<'_, CohortRow>) {
    let mut totals = None;
    let mut line_items = Vec::with_capacity(table.len().saturating_sub(1));
    for row in table {
        if row.is_total() {
            totals.get_or_insert(row);
        } else {
            line_items.push(row);
        }
    }

    let totals = match totals {
        Some(row) => Cow::Borrowed(row),
        None => Cow::Owned(CohortRow::default()),
    };
    (line_items, totals)
}
