/*!

# Quick start

The export platform writes one workbook per test. The first sheet,
`Testergebnisse`, holds one row per test attempt: a statistics region
(examinee metadata and attempt bookkeeping, ending at the `Durchlauf`
column) followed by one column per question. When an examinee ran the
test several times, the platform leaves the statistics cells of the
extra rows blank.

Reconciling such a sheet down to one authoritative row per examinee:

```
use exam_tables::{reconcile, Cell, ReconcileRules, Table};

let raw = Table {
    columns: ["Name", "Benutzername", "Matrikelnummer", "Bewerteter Durchlauf", "Durchlauf", "Q1"]
        .iter().map(|s| s.to_string()).collect(),
    rows: vec![
        vec![
            Cell::Text("Alice".to_string()),
            Cell::Text("alice".to_string()),
            Cell::Number(111.0),
            Cell::Number(2.0),
            Cell::Number(1.0),
            Cell::Number(1.0),
        ],
        vec![
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Number(2.0),
            Cell::Number(4.0),
        ],
    ],
};

let unified = reconcile(&raw, &ReconcileRules::default())?;
assert_eq!(unified.rows.len(), 1);
// The graded attempt (attempt 2) survives.
assert_eq!(unified.rows[0].values.last().unwrap().render(), "4");
# Ok::<(), exam_tables::UnifyError>(())
```

The remaining sheets are the answer logs. [crate::segment_logs] detects
which of the two export layouts is present and produces one normalized
`(Question, Answer)` table per examinee; [crate::flatten_logs] then
turns those tables into indexed answer records through any
[crate::builder::RecordSink].

The `iliasunify` command line tool wires these steps to the file
formats: it reads the workbook, stages one CSV per examinee, persists
the flattened records and writes the unified (optionally anonymized)
results table.

*/
