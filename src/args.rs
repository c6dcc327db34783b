use clap::Parser;

/// Unifies the spreadsheet exports of an e-learning assessment platform
/// into canonical result tables.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The workbook (.xlsx) exported by the assessment platform.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, optional) A JSON file holding the run options. Explicit command line
    /// flags take precedence over the values in the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (name, default 'results') The name of the unified results export; the file is
    /// written as <name>.csv in the current directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// If passed as an argument, the username and matriculation-number columns are
    /// replaced with a dense 0-based sequence and the examinee-name index is dropped.
    #[clap(long, takes_value = false)]
    pub anonymous: bool,

    /// (directory path, default './answer_sheets') The staging directory receiving one
    /// answer-log CSV per examinee. Owned by the run; concurrent runs against the same
    /// directory are not supported.
    #[clap(long, value_parser)]
    pub staging_dir: Option<String>,

    /// (file path, optional) A reference copy of the unified results. If provided,
    /// iliasunify will check that the produced CSV matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
