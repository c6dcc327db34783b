// Primitives for writing the CSV outputs.

use std::path::{Path, PathBuf};

use log::debug;
use snafu::prelude::*;

use exam_tables::builder::{RecordSet, RecordSink};
use exam_tables::{AnswerLog, AnswerRecord, ReconcileRules, UnifiedResults};

use crate::unify::{ExportResult, WritingCsvSnafu};

/// One staged answer log, two columns, row-keyed by Question.
pub fn write_answer_log(log: &AnswerLog, path: &Path) -> ExportResult<()> {
    write_answer_log0(log, path).context(WritingCsvSnafu {
        path: path.display().to_string(),
    })
}

fn write_answer_log0(log: &AnswerLog, path: &Path) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["Question", "Answer"])?;
    for (question, answer) in log.rows.iter() {
        wtr.write_record([question.render(), answer.render()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// The unified results table: the examinee-name index first, then the
/// forward-filled statistics and zero-filled question scores.
pub fn write_results(
    results: &UnifiedResults,
    rules: &ReconcileRules,
    path: &Path,
) -> ExportResult<()> {
    write_results0(results, rules, path).context(WritingCsvSnafu {
        path: path.display().to_string(),
    })
}

fn write_results0(
    results: &UnifiedResults,
    rules: &ReconcileRules,
    path: &Path,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    let mut header: Vec<String> = vec![rules.examinee_column.clone()];
    header.extend(results.columns.iter().cloned());
    wtr.write_record(&header)?;
    for row in results.rows.iter() {
        let mut record: Vec<String> = vec![row.examinee.clone()];
        record.extend(row.values.iter().map(|c| c.render()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The anonymized variant: the examinee-name index is dropped and the
/// rows are keyed by an unnamed dense sequence instead.
pub fn write_results_anonymous(results: &UnifiedResults, path: &Path) -> ExportResult<()> {
    write_results_anonymous0(results, path).context(WritingCsvSnafu {
        path: path.display().to_string(),
    })
}

fn write_results_anonymous0(results: &UnifiedResults, path: &Path) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    let mut header: Vec<String> = vec![String::new()];
    header.extend(results.columns.iter().cloned());
    wtr.write_record(&header)?;
    for (idx, row) in results.rows.iter().enumerate() {
        let mut record: Vec<String> = vec![idx.to_string()];
        record.extend(row.values.iter().map(|c| c.render()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The result store: accumulates the flattened answer records and
/// persists them as a single CSV file.
///
/// Append-only during the run; [CsvRecordStore::persist] is called
/// exactly once, after all examinees are processed.
pub struct CsvRecordStore {
    path: PathBuf,
    records: RecordSet,
}

impl CsvRecordStore {
    pub fn new(path: PathBuf) -> CsvRecordStore {
        CsvRecordStore {
            path,
            records: RecordSet::new(),
        }
    }

    pub fn persist(&self) -> ExportResult<()> {
        debug!(
            "persist: {} records to {:?}",
            self.records.len(),
            self.path
        );
        self.persist0().context(WritingCsvSnafu {
            path: self.path.display().to_string(),
        })
    }

    fn persist0(&self) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().from_path(&self.path)?;
        wtr.write_record(["Question", "Occurrence", "Examinee", "Answer"])?;
        for r in self.records.records().iter() {
            wtr.write_record([
                r.question.clone(),
                r.occurrence.to_string(),
                r.examinee.to_string(),
                r.answer.render(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvRecordStore {
    fn append(&mut self, record: AnswerRecord) {
        self.records.append(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_tables::{Cell, UnifiedRow};

    fn txt(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn staged_answer_logs_keep_the_two_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0.csv");
        let log = AnswerLog {
            rows: vec![
                (txt("Q1"), txt("Single Choice")),
                (Cell::Empty, Cell::Number(3.5)),
            ],
        };
        write_answer_log(&log, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Question,Answer\nQ1,Single Choice\n,3.5\n");
    }

    #[test]
    fn the_unified_export_is_indexed_by_examinee_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let results = UnifiedResults {
            columns: vec!["Benutzername".to_string(), "Q1".to_string()],
            rows: vec![UnifiedRow {
                examinee: "Alice".to_string(),
                values: vec![txt("alice"), Cell::Number(2.0)],
            }],
        };
        write_results(&results, &ReconcileRules::default(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Name,Benutzername,Q1\nAlice,alice,2\n");
    }

    #[test]
    fn the_anonymous_export_drops_the_name_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anon.csv");
        let results = UnifiedResults {
            columns: vec!["Benutzername".to_string(), "Matrikelnummer".to_string()],
            rows: vec![
                UnifiedRow {
                    examinee: "0".to_string(),
                    values: vec![Cell::Number(0.0), Cell::Number(0.0)],
                },
                UnifiedRow {
                    examinee: "1".to_string(),
                    values: vec![Cell::Number(1.0), Cell::Number(1.0)],
                },
            ],
        };
        write_results_anonymous(&results, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            ",Benutzername,Matrikelnummer\n0,0,0\n1,1,1\n"
        );
    }

    #[test]
    fn the_record_store_persists_in_append_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer_records.csv");
        let mut store = CsvRecordStore::new(path.clone());
        store.append(AnswerRecord {
            question: "Q1".to_string(),
            occurrence: 0,
            examinee: 0,
            answer: txt("A"),
        });
        store.append(AnswerRecord {
            question: "Q1".to_string(),
            occurrence: 1,
            examinee: 0,
            answer: txt("B"),
        });
        store.persist().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Question,Occurrence,Examinee,Answer\nQ1,0,0,A\nQ1,1,0,B\n"
        );
    }
}
