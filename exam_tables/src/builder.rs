pub use crate::config::*;

/// The input boundary of the result store.
///
/// The flattening step only ever appends; persisting the accumulated
/// records is the concern of the concrete store and happens exactly once
/// per run, after all examinees are processed.
pub trait RecordSink {
    fn append(&mut self, record: AnswerRecord);
}

/// An in-memory, append-only record accumulator.
///
/// ```
/// use exam_tables::builder::{RecordSet, RecordSink};
/// use exam_tables::{AnswerRecord, Cell};
///
/// let mut set = RecordSet::new();
/// set.append(AnswerRecord {
///     question: "Q1".to_string(),
///     occurrence: 0,
///     examinee: 0,
///     answer: Cell::Text("A".to_string()),
/// });
/// assert_eq!(set.records().len(), 1);
/// ```
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<AnswerRecord>,
}

impl RecordSet {
    pub fn new() -> RecordSet {
        RecordSet {
            records: Vec::new(),
        }
    }

    /// The accumulated records, in append order.
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSink for RecordSet {
    fn append(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }
}
