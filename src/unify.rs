use log::{debug, info, warn};

use exam_tables::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::unify::config_reader::RunConfig;

pub mod config_reader;
pub mod io_csv;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum ExportError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Error reading sheet {sheet} of workbook {path}"))]
    ReadingSheet {
        source: calamine::XlsxError,
        path: String,
        sheet: String,
    },
    #[snafu(display("Workbook is missing the required sheet {name}"))]
    MissingSheet { name: String },
    #[snafu(display("Could not create the staging directory {path}"))]
    CreatingStagingDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading the run configuration {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the run configuration {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error reading {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Core { source: UnifyError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;

/// The effective options of one export run, after merging the command
/// line with the optional JSON run configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExportOptions {
    pub workbook: String,
    pub output_name: String,
    pub anonymous: bool,
    pub staging_dir: String,
    pub reference: Option<String>,
}

pub fn assemble_options(args: &Args) -> ExportResult<ExportOptions> {
    let file_config: RunConfig = match &args.config {
        Some(path) => config_reader::read_run_config(path)?,
        None => RunConfig::default(),
    };
    debug!("assemble_options: file config: {:?}", file_config);

    let workbook = match args.input.clone().or(file_config.workbook) {
        Some(w) => w,
        None => {
            whatever!("No input workbook provided (use --input or the run configuration)")
        }
    };
    Ok(ExportOptions {
        workbook,
        output_name: args
            .out
            .clone()
            .or(file_config.output_name)
            .unwrap_or_else(|| "results".to_string()),
        anonymous: args.anonymous || file_config.anonymous.unwrap_or(false),
        staging_dir: args
            .staging_dir
            .clone()
            .or(file_config.staging_dir)
            .unwrap_or_else(|| "./answer_sheets".to_string()),
        reference: args.reference.clone().or(file_config.reference),
    })
}

/// One full export run: reconcile the results sheet, stage the
/// per-examinee answer logs, flatten them into the record store and
/// write the unified results table.
///
/// Any fault aborts the run; partial output is never reported as
/// complete.
pub fn run_export(opts: &ExportOptions) -> ExportResult<()> {
    info!("run_export: options: {:?}", opts);
    let sheets = io_xlsx::read_workbook(&opts.workbook)?;
    let rules = ReconcileRules::default();

    let results_table = sheets
        .iter()
        .find(|(name, _)| name == RESULTS_SHEET)
        .map(|(_, t)| t)
        .context(MissingSheetSnafu {
            name: RESULTS_SHEET,
        })?;
    if let Some(n) = question_count(results_table, &rules) {
        info!("run_export: detected {} question columns", n);
    }

    let unified = reconcile(results_table, &rules).context(CoreSnafu)?;
    info!(
        "run_export: unified results for {} examinees",
        unified.rows.len()
    );

    let logs = segment_logs(&sheets).context(CoreSnafu)?;
    debug!("run_export: {} answer logs emitted", logs.len());

    // The staging area is owned by this run.
    fs::create_dir_all(&opts.staging_dir).context(CreatingStagingDirSnafu {
        path: opts.staging_dir.clone(),
    })?;
    for (idx, log) in logs.iter().enumerate() {
        let path: PathBuf = [opts.staging_dir.as_str(), &format!("{}.csv", idx)]
            .iter()
            .collect();
        io_csv::write_answer_log(log, &path)?;
    }

    let records_path: PathBuf = [opts.staging_dir.as_str(), "answer_records.csv"]
        .iter()
        .collect();
    let mut store = io_csv::CsvRecordStore::new(records_path);
    flatten_logs(&logs, &mut store).context(CoreSnafu)?;
    // Persisted exactly once, after all examinees are processed.
    store.persist()?;

    let out_path = format!("{}.csv", opts.output_name);
    if opts.anonymous {
        let anon = anonymize(&unified, &rules);
        io_csv::write_results_anonymous(&anon, Path::new(&out_path))?;
        println!("Anonymous test results saved as {}!", out_path);
    } else {
        io_csv::write_results(&unified, &rules, Path::new(&out_path))?;
        println!("Test results saved as {}!", out_path);
    }

    // The reference export, if provided for comparison
    if let Some(reference) = &opts.reference {
        check_reference(&out_path, reference)?;
    }
    Ok(())
}

fn check_reference(produced_path: &str, reference_path: &str) -> ExportResult<()> {
    let produced =
        fs::read_to_string(produced_path).context(OpeningReferenceSnafu {
            path: produced_path,
        })?;
    let reference =
        fs::read_to_string(reference_path).context(OpeningReferenceSnafu {
            path: reference_path,
        })?;
    if produced != reference {
        warn!("Found differences with the reference file");
        print_diff(reference.as_str(), produced.as_str(), "\n");
        whatever!("Difference detected between the produced export and the reference file")
    }
    Ok(())
}
