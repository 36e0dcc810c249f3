use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::model::AssessmentId;

#[derive(Parser, Debug)]
#[command(name = "termexam", version, about = "Terminal client for timed online assessments")]
pub struct Cli {
    /// Config file [default: ./termexam.toml, then the user config dir]
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Base URL of the assessment service
    #[arg(long, value_name = "url")]
    pub base_url: Option<String>,

    /// Bearer token for the assessment service
    #[arg(long, value_name = "token")]
    pub token: Option<String>,

    /// Write the log here instead of the default data dir
    #[arg(long, value_name = "path")]
    pub log_file: Option<PathBuf>,

    /// Print assigned assessments and exit
    #[arg(long, conflicts_with = "result")]
    pub list: bool,

    /// Print the result of a completed assessment and exit
    #[arg(long, value_name = "id")]
    pub result: Option<AssessmentId>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.list && self.result.is_none()
    }

    /// Command-line values win over file and environment.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "termexam",
            "--base-url",
            "http://other:1234",
            "--token",
            "t0k",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.base_url, "http://other:1234");
        assert_eq!(config.token.as_deref(), Some("t0k"));
        assert!(cli.is_interactive());
    }

    #[test]
    fn modes() {
        assert!(!Cli::parse_from(["termexam", "--list"]).is_interactive());
        let cli = Cli::parse_from(["termexam", "--result", "42"]);
        assert_eq!(cli.result, Some(42));
        assert!(Cli::try_parse_from(["termexam", "--list", "--result", "1"]).is_err());
    }
}
