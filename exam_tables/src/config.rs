// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The name of the sheet holding the per-attempt score rows.
pub const RESULTS_SHEET: &str = "Testergebnisse";

/// The name of the sheet that selects the single-sheet answer-log layout
/// when present in the workbook.
pub const ALL_USERS_SHEET: &str = "Auswertung für alle Benutzer";

/// The literal phrase that opens a new examinee block in the
/// single-sheet answer-log layout.
pub const SEGMENT_MARKER: &str = "Ergebnisse von Testdurchlauf";

/// The question kinds that mark the start of a question block inside an
/// answer log. This set is closed: the export platform only emits these
/// three labels, and an unknown label is treated as an answer row.
pub const QUESTION_KINDS: [&str; 3] = ["Formelfrage", "Single Choice", "Multiple Choice"];

/// A single cell of a sheet, as delivered by the workbook reader.
///
/// Blank cells are kept as [Cell::Empty] because blanks carry meaning in
/// the export: a blank statistics cell repeats the value above it, a
/// blank question score is a zero.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The cell as it appears in delimited-text output. Numbers without a
    /// fractional part print as integers, matching the source export.
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(x) if x.fract() == 0.0 && x.is_finite() => format!("{}", *x as i64),
            Cell::Number(x) => format!("{}", x),
        }
    }
}

/// A named rectangular table: one sheet of the workbook.
///
/// Rows are padded by the reader to the header width, so indexing by a
/// resolved column position is always in bounds.
#[derive(PartialEq, Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// The column names that drive the attempt reconciliation.
///
/// The statistics region of the results sheet runs from the first column
/// up to and including `attempt_column`; everything after it is a
/// question-score column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReconcileRules {
    pub examinee_column: String,
    pub attempt_column: String,
    pub graded_attempt_column: String,
    pub username_column: String,
    pub matriculation_column: String,
}

impl Default for ReconcileRules {
    fn default() -> ReconcileRules {
        ReconcileRules {
            examinee_column: "Name".to_string(),
            attempt_column: "Durchlauf".to_string(),
            graded_attempt_column: "Bewerteter Durchlauf".to_string(),
            username_column: "Benutzername".to_string(),
            matriculation_column: "Matrikelnummer".to_string(),
        }
    }
}

// ******** Output data structures *********

/// The graded row of one examinee, statistics forward-filled and question
/// scores zero-filled. `values` is aligned with [UnifiedResults::columns].
#[derive(PartialEq, Debug, Clone)]
pub struct UnifiedRow {
    pub examinee: String,
    pub values: Vec<Cell>,
}

/// One row per distinct examinee name, in first-seen order of the raw
/// results sheet. The examinee name is the index and is not repeated in
/// `columns`.
#[derive(PartialEq, Debug, Clone)]
pub struct UnifiedResults {
    pub columns: Vec<String>,
    pub rows: Vec<UnifiedRow>,
}

/// The normalized two-column answer log of one examinee.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct AnswerLog {
    pub rows: Vec<(Cell, Cell)>,
}

/// One flattened answer.
///
/// `occurrence` restarts at 0 on every question header and increments
/// once per answer row consumed inside the block, which keeps answers
/// apart when the export does not return unique question identifiers.
#[derive(PartialEq, Debug, Clone)]
pub struct AnswerRecord {
    pub question: String,
    pub occurrence: u32,
    pub examinee: usize,
    pub answer: Cell,
}

/// Faults that abort a run. These are deterministic data-shape problems,
/// never retried.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum UnifyError {
    /// A required column is missing from the results sheet.
    MissingColumn { column: String },
    /// A multi-row attempt group where no attempt number equals the
    /// graded attempt number.
    NoGradedRow { examinee: String },
    /// An answer row appeared before any question header.
    AnswerBeforeHeader { examinee: usize, row: usize },
    /// The single-sheet answer log contains no segment marker.
    MissingMarker { sheet: String },
}

impl Error for UnifyError {}

impl Display for UnifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnifyError::MissingColumn { column } => {
                write!(f, "results sheet is missing the column {:?}", column)
            }
            UnifyError::NoGradedRow { examinee } => write!(
                f,
                "no attempt of examinee {:?} matches the graded attempt number",
                examinee
            ),
            UnifyError::AnswerBeforeHeader { examinee, row } => write!(
                f,
                "answer log of examinee {} has an answer row (row {}) before any question header",
                examinee, row
            ),
            UnifyError::MissingMarker { sheet } => {
                write!(f, "sheet {:?} contains no segment marker row", sheet)
            }
        }
    }
}
