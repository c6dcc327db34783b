pub mod builder;
mod config;
pub mod quick_start;

use log::{debug, info};

use std::collections::HashMap;

use crate::builder::RecordSink;
pub use crate::config::*;

/// Collapses the raw results sheet into one authoritative row per
/// examinee.
///
/// Missing values are repaired first (blank question scores become
/// zeros, blank statistics cells repeat the value above them), then each
/// attempt group is reduced to the row whose attempt number equals the
/// graded attempt number. Groups with a single row are graded by
/// definition.
///
/// Output rows keep the first-seen order of the examinee names in the
/// raw sheet, and the output index is unique.
pub fn reconcile(raw: &Table, rules: &ReconcileRules) -> Result<UnifiedResults, UnifyError> {
    let examinee_idx = require_column(raw, &rules.examinee_column)?;
    let attempt_idx = require_column(raw, &rules.attempt_column)?;
    let graded_idx = require_column(raw, &rules.graded_attempt_column)?;

    info!(
        "reconcile: {} raw rows, statistics region ends at column {}",
        raw.rows.len(),
        attempt_idx
    );

    let filled = fill_missing(raw, attempt_idx);

    // Group the row positions by examinee name, keeping first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in filled.iter().enumerate() {
        let name = row[examinee_idx].render();
        if !groups.contains_key(&name) {
            order.push(name.clone());
        }
        groups.entry(name).or_default().push(idx);
    }

    let mut rows: Vec<UnifiedRow> = Vec::new();
    for name in order {
        let indices = &groups[&name];
        let row_idx = select_graded_row(&filled, indices, attempt_idx, graded_idx).ok_or(
            UnifyError::NoGradedRow {
                examinee: name.clone(),
            },
        )?;
        debug!(
            "reconcile: examinee {:?}: {} attempt rows, keeping row {}",
            name,
            indices.len(),
            row_idx
        );
        let mut values = filled[row_idx].clone();
        values.remove(examinee_idx);
        rows.push(UnifiedRow {
            examinee: name,
            values,
        });
    }

    let mut columns = raw.columns.clone();
    columns.remove(examinee_idx);
    Ok(UnifiedResults { columns, rows })
}

/// The number of question-score columns of the results sheet: everything
/// after the attempt column.
pub fn question_count(raw: &Table, rules: &ReconcileRules) -> Option<usize> {
    raw.column_index(&rules.attempt_column)
        .map(|idx| raw.columns.len() - idx - 1)
}

fn require_column(table: &Table, name: &str) -> Result<usize, UnifyError> {
    table.column_index(name).ok_or(UnifyError::MissingColumn {
        column: name.to_string(),
    })
}

fn fill_missing(raw: &Table, attempt_idx: usize) -> Vec<Vec<Cell>> {
    let width = raw.columns.len();
    let mut rows = raw.rows.clone();
    for row in rows.iter_mut() {
        // Rows shorter than the header are padded by the reader; repeat it
        // here so the column positions resolved above stay in bounds.
        while row.len() < width {
            row.push(Cell::Empty);
        }
        // A blank question score is a zero, not a missing value.
        for cell in row.iter_mut().skip(attempt_idx + 1) {
            if cell.is_empty() {
                *cell = Cell::Number(0.0);
            }
        }
    }
    // A blank statistics cell repeats the value above it. The fill runs
    // over the whole column in file order, not per group; downstream
    // consumers depend on these exact legacy semantics. A cell blank on
    // the very first row has nothing above it and stays blank (it is
    // not zero-filled: zeros are reserved for the question region).
    for col in 0..=attempt_idx {
        let mut last: Option<Cell> = None;
        for row in rows.iter_mut() {
            if row[col].is_empty() {
                if let Some(v) = &last {
                    row[col] = v.clone();
                }
            } else {
                last = Some(row[col].clone());
            }
        }
    }
    rows
}

fn select_graded_row(
    rows: &[Vec<Cell>],
    indices: &[usize],
    attempt_idx: usize,
    graded_idx: usize,
) -> Option<usize> {
    match indices {
        [] => None,
        [single] => Some(*single),
        _ => indices.iter().copied().find(|&i| {
            let attempt = &rows[i][attempt_idx];
            // Rendered comparison so that Text("2") matches Number(2.0).
            // On multiple matches the first one wins (documented tie-break).
            !attempt.is_empty() && attempt.render() == rows[i][graded_idx].render()
        }),
    }
}

/// The two physical answer-log layouts of the export.
///
/// The layout is decided once per run from the sheet names; everything
/// downstream only sees normalized [AnswerLog] tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum LogLayout {
    /// One sheet for all examinees, segmented by marker rows.
    SingleSheet,
    /// One sheet per examinee, everything after the first sheet.
    PerExaminee,
}

pub fn detect_layout(sheet_names: &[String]) -> LogLayout {
    if sheet_names.iter().any(|n| n == ALL_USERS_SHEET) {
        LogLayout::SingleSheet
    } else {
        LogLayout::PerExaminee
    }
}

/// Splits the workbook into one normalized answer log per examinee.
///
/// The emission order is stable and deterministic: it assigns the
/// examinee ids used by [flatten_logs] and the staging file names.
pub fn segment_logs(sheets: &[(String, Table)]) -> Result<Vec<AnswerLog>, UnifyError> {
    let names: Vec<String> = sheets.iter().map(|(n, _)| n.clone()).collect();
    let layout = detect_layout(&names);
    info!("segment_logs: {:?} over {} sheets", layout, sheets.len());
    match layout {
        LogLayout::SingleSheet => {
            let table = sheets
                .iter()
                .find(|(n, _)| n == ALL_USERS_SHEET)
                .map(|(_, t)| t);
            match table {
                Some(t) => segment_single_sheet(t),
                // Unreachable: the layout was detected from the sheet names.
                None => Err(UnifyError::MissingMarker {
                    sheet: ALL_USERS_SHEET.to_string(),
                }),
            }
        }
        LogLayout::PerExaminee => Ok(sheets.iter().skip(1).map(|(_, t)| to_answer_log(t)).collect()),
    }
}

fn to_answer_log(table: &Table) -> AnswerLog {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            (
                row.first().cloned().unwrap_or(Cell::Empty),
                row.get(1).cloned().unwrap_or(Cell::Empty),
            )
        })
        .collect();
    AnswerLog { rows }
}

// Scans the all-users sheet in row order. A marker row closes the block
// accumulated so far: its trailing summary line is dropped, the block is
// emitted with a fresh 0-based index, and the marker row itself opens
// the next block. Rows after the last marker are discarded, so the
// number of emitted logs equals the number of marker rows.
fn segment_single_sheet(table: &Table) -> Result<Vec<AnswerLog>, UnifyError> {
    let mut logs: Vec<AnswerLog> = Vec::new();
    let mut buffer: Vec<(Cell, Cell)> = Vec::new();
    for row in table.rows.iter() {
        let question = row.first().cloned().unwrap_or(Cell::Empty);
        let answer = row.get(1).cloned().unwrap_or(Cell::Empty);
        let is_marker = question
            .as_text()
            .map(|s| s.contains(SEGMENT_MARKER))
            .unwrap_or(false);
        if is_marker {
            buffer.pop();
            let rows = std::mem::take(&mut buffer);
            debug!(
                "segment_single_sheet: block {}: {} rows",
                logs.len(),
                rows.len()
            );
            logs.push(AnswerLog { rows });
        }
        buffer.push((question, answer));
    }
    if logs.is_empty() {
        return Err(UnifyError::MissingMarker {
            sheet: ALL_USERS_SHEET.to_string(),
        });
    }
    Ok(logs)
}

/// Walks every answer log in emission order and appends one
/// [AnswerRecord] per answer row into the sink.
///
/// A row whose answer cell names a question kind is a block header: it
/// sets the current question and resets the occurrence counter without
/// producing a record. Rows with both cells empty are export padding and
/// are dropped without touching the counter, and so are the marker rows
/// that the single-sheet segmenter carries over as the first row of a
/// block. An answer row before any header is a malformed export and
/// aborts the run.
pub fn flatten_logs<S: RecordSink>(logs: &[AnswerLog], sink: &mut S) -> Result<(), UnifyError> {
    for (examinee, log) in logs.iter().enumerate() {
        let mut current_question: Option<String> = None;
        let mut occurrence: u32 = 0;
        for (rowno, (question, answer)) in log.rows.iter().enumerate() {
            if question.is_empty() && answer.is_empty() {
                continue;
            }
            let is_marker = question
                .as_text()
                .map(|s| s.contains(SEGMENT_MARKER))
                .unwrap_or(false);
            if is_marker {
                continue;
            }
            let is_header = answer
                .as_text()
                .map(|s| QUESTION_KINDS.contains(&s))
                .unwrap_or(false);
            if is_header {
                current_question = Some(question.render());
                occurrence = 0;
                continue;
            }
            let question_id =
                current_question
                    .clone()
                    .ok_or(UnifyError::AnswerBeforeHeader {
                        examinee,
                        row: rowno,
                    })?;
            sink.append(AnswerRecord {
                question: question_id,
                occurrence,
                examinee,
                answer: answer.clone(),
            });
            occurrence += 1;
        }
        debug!("flatten_logs: examinee {}: {} rows", examinee, log.rows.len());
    }
    Ok(())
}

/// Replaces the username and matriculation-number columns with a dense
/// 0-based sequence and renumbers the index.
///
/// The columns are created when absent, matching the assignment
/// semantics of the source export tooling. The caller is expected to
/// drop the renumbered index at the output boundary.
pub fn anonymize(results: &UnifiedResults, rules: &ReconcileRules) -> UnifiedResults {
    let mut out = results.clone();
    for column in [&rules.username_column, &rules.matriculation_column] {
        let idx = match out.columns.iter().position(|c| c == column) {
            Some(idx) => idx,
            None => {
                out.columns.push(column.clone());
                for row in out.rows.iter_mut() {
                    row.values.push(Cell::Empty);
                }
                out.columns.len() - 1
            }
        };
        for (i, row) in out.rows.iter_mut().enumerate() {
            row.values[idx] = Cell::Number(i as f64);
        }
    }
    for (i, row) in out.rows.iter_mut().enumerate() {
        row.examinee = i.to_string();
    }
    out
}
