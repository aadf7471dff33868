use crate::models::{CohortBreakdown, CohortRow, ConsolidatedSummary, NAME_FIELD, SummaryResponse};
use crate::view::{CONSOLIDATED_KEYS, KeyMap, STUDENT_KEYS, TEACHER_KEYS};

const SUMMARY_NAME: &str = "Total Consolidado";
const TOTAL_TEACHERS_FIELD: &str = "Total Professores";
const TOTAL_STUDENTS_FIELD: &str = "Total Alunos";
const GRAND_TOTAL_FIELD: &str = "Total Pessoas (Geral)";

/// Merges the teacher and student Total rows. Either row missing means the
/// summary is not available yet.
pub fn consolidate(
    teacher_totals: Option<&CohortRow>,
    student_totals: Option<&CohortRow>,
) -> Option<ConsolidatedSummary> {
    let teachers = teacher_totals?;
    let students = student_totals?;

    let confirmed_teachers = teachers.number(TEACHER_KEYS.people_confirmed);
    let confirmed_students = students.number(STUDENT_KEYS.people_confirmed);
    let confirmed_base = confirmed_teachers + confirmed_students;
    let total_companions =
        teachers.number(TEACHER_KEYS.companions) + students.number(STUDENT_KEYS.companions);

    Some(ConsolidatedSummary {
        total_paid: teachers.number(TEACHER_KEYS.paid) + students.number(STUDENT_KEYS.paid),
        total_expected: teachers.number(TEACHER_KEYS.expected)
            + students.number(STUDENT_KEYS.expected),
        total_missing: teachers.number(TEACHER_KEYS.missing)
            + students.number(STUDENT_KEYS.missing),
        confirmed_teachers,
        confirmed_students,
        confirmed_base,
        total_companions,
        grand_total_people: confirmed_base + total_companions,
    })
}

impl ConsolidatedSummary {
    /// The summary as a row addressable through [`CONSOLIDATED_KEYS`].
    pub fn to_row(&self) -> CohortRow {
        let mut row = CohortRow::default();
        row.insert(NAME_FIELD, SUMMARY_NAME);
        row.insert(CONSOLIDATED_KEYS.paid, self.total_paid);
        row.insert(CONSOLIDATED_KEYS.missing, self.total_missing);
        row.insert(CONSOLIDATED_KEYS.expected, self.total_expected);
        row.insert(CONSOLIDATED_KEYS.people_confirmed, self.confirmed_base);
        row.insert(TOTAL_TEACHERS_FIELD, self.confirmed_teachers);
        row.insert(TOTAL_STUDENTS_FIELD, self.confirmed_students);
        row.insert(CONSOLIDATED_KEYS.companions, self.total_companions);
        row.insert(GRAND_TOTAL_FIELD, self.grand_total_people);
        row
    }
}

pub fn breakdown(totals: Option<&CohortRow>, keys: &KeyMap) -> CohortBreakdown {
    let empty = CohortRow::default();
    let row = totals.unwrap_or(&empty);
    CohortBreakdown {
        paid: row.number(keys.paid),
        missing: row.number(keys.missing),
        expected: row.number(keys.expected),
        confirmed: row.number(keys.people_confirmed),
        companions: row.number(keys.companions),
    }
}

pub fn build_summary(
    teacher_totals: Option<&CohortRow>,
    student_totals: Option<&CohortRow>,
    summary: Option<ConsolidatedSummary>,
) -> SummaryResponse {
    SummaryResponse {
        summary,
        teachers: breakdown(teacher_totals, &TEACHER_KEYS),
        students: breakdown(student_totals, &STUDENT_KEYS),
    }
}
