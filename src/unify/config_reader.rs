use log::debug;
use snafu::prelude::*;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::unify::{ExportResult, OpeningConfigSnafu, ParsingConfigSnafu};

/// The JSON run configuration. Every field mirrors a command line
/// option; explicit flags take precedence over the file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(rename = "workbook")]
    pub workbook: Option<String>,
    #[serde(rename = "outputName")]
    pub output_name: Option<String>,
    #[serde(rename = "anonymous")]
    pub anonymous: Option<bool>,
    #[serde(rename = "stagingDirectory")]
    pub staging_dir: Option<String>,
    #[serde(rename = "reference")]
    pub reference: Option<String>,
}

pub fn read_run_config(path: &str) -> ExportResult<RunConfig> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    debug!("read_run_config: read content: {:?}", contents);
    let config: RunConfig =
        serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_camel_case_and_optional() {
        let config: RunConfig =
            serde_json::from_str(r#"{"workbook": "a.xlsx", "stagingDirectory": "./staging"}"#)
                .unwrap();
        assert_eq!(config.workbook, Some("a.xlsx".to_string()));
        assert_eq!(config.staging_dir, Some("./staging".to_string()));
        assert_eq!(config.output_name, None);
        assert_eq!(config.anonymous, None);
    }
}
