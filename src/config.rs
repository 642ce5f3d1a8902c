use getopts::Options;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::str::FromStr;
use std::{env, fs};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";
pub const DEFAULT_CONFIG_FILE: &str = "petprobe.yaml";

/// Which of the pet-store suites to assemble.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuiteSelection {
    #[default]
    All,
    Positive,
    Negative,
}

impl FromStr for SuiteSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(SuiteSelection::All),
            "positive" => Ok(SuiteSelection::Positive),
            "negative" => Ok(SuiteSelection::Negative),
            _ => Err(ConfigError::UnknownSuite(s.to_owned())),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub suite: SuiteSelection,
    pub filter: Option<String>, // regex matched against unit names
    pub timeout_secs: u64,
    pub image_dir: PathBuf, // where the upload fixtures live
    pub verbose: bool,
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_owned(),
            suite: SuiteSelection::All,
            filter: None,
            timeout_secs: 30,
            image_dir: PathBuf::from("."),
            verbose: false,
            progress: true,
        }
    }
}

impl Config {
    pub fn build_config() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        Self::from_args(&args)
    }

    /// Builds the configuration from a full argv (program name first).
    /// The YAML file is read first and command line options override it.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let opts = build_options();
        let matches = opts.parse(args.iter().skip(1))?;

        if matches.opt_present("h") {
            let program = args.first().map(String::as_str).unwrap_or("petprobe");
            print_usage(program, &opts);
            exit(0);
        }

        // Read from the config file, if any.
        let mut config = match matches.opt_str("c") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };

        // Override with command line arguments if provided
        if let Some(base_url) = matches.opt_str("b") {
            config.base_url = base_url;
        }
        if let Some(suite) = matches.opt_str("s") {
            config.suite = suite.parse()?;
        }
        if let Some(filter) = matches.opt_str("f") {
            config.filter = Some(filter);
        }
        if let Some(timeout) = matches.opt_str("t") {
            config.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                option: String::from("timeout"),
                value: timeout.clone(),
            })?;
        }
        if let Some(image_dir) = matches.opt_str("i") {
            config.image_dir = PathBuf::from(image_dir);
        }
        if matches.opt_present("v") {
            config.verbose = true;
        }
        if matches.opt_present("q") {
            config.progress = false;
        }

        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        // Fail early on a bad pattern rather than when the suite is filtered.
        config.filter_regex()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Parse { path: display, source })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty mapping.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn filter_regex(&self) -> Result<Option<Regex>, ConfigError> {
        match &self.filter {
            Some(pattern) => Ok(Some(Regex::new(pattern)?)),
            None => Ok(None),
        }
    }

    pub fn image_path(&self, file_name: &str) -> PathBuf {
        self.image_dir.join(file_name)
    }
}

fn build_options() -> Options {
    let mut opts = Options::new();
    opts.optopt("c", "config", "Read settings from a YAML file", "FILE");
    opts.optopt("b", "base_url", "Set the base URL of the pet store API", "BASE_URL");
    opts.optopt("s", "suite", "Select the suite: all, positive or negative", "SUITE");
    opts.optopt("f", "filter", "Only run tests whose name matches the pattern", "REGEX");
    opts.optopt("t", "timeout", "Set the HTTP request timeout in seconds", "SECS");
    opts.optopt("i", "images", "Directory holding the image upload fixtures", "DIR");
    opts.optflag("q", "quiet", "Do not show progress spinners");
    opts.optflag("h", "help", "Print this help menu");
    opts.optflag("v", "verbose", "Print verbose information");
    opts
}

fn print_usage(program: &str, opts: &Options) {
    let version = env!("CARGO_PKG_VERSION");
    let program_name = program.split('/').last().unwrap_or(program);
    let description = "Functional checks against the pet store REST API";
    let brief = format!(
        "{} {}  {}\nUsage: {} [options]",
        program_name, version, description, program_name
    );

    print!("{}", opts.usage(&brief));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("petprobe")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.suite, SuiteSelection::All);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.progress);
        assert!(!config.verbose);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_yaml_partial_document_keeps_defaults() {
        let config = Config::from_yaml("suite: negative\nverbose: true\n").unwrap();
        assert_eq!(config.suite, SuiteSelection::Negative);
        assert!(config.verbose);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_yaml_empty_document() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_yaml_unknown_suite_is_rejected() {
        assert!(Config::from_yaml("suite: sideways").is_err());
    }

    #[test]
    fn test_command_line_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://localhost:8080/v2/\ntimeout_secs: 5\nsuite: positive").unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let config = Config::from_args(&args(&["-c", &path, "-t", "12", "-f", "^get_", "-q"])).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v2");
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.suite, SuiteSelection::Positive);
        assert_eq!(config.filter.as_deref(), Some("^get_"));
        assert!(!config.progress);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let err = Config::from_args(&args(&["-c", "/no/such/petprobe.yaml"])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_args(&args(&["-c", "/dev/null", "-t", "soon"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_filter() {
        let err = Config::from_args(&args(&["-c", "/dev/null", "-f", "(unclosed"])).unwrap_err();
        assert!(matches!(err, ConfigError::Filter(_)));
    }

    #[test]
    fn test_unknown_option() {
        let err = Config::from_args(&args(&["--frobnicate"])).unwrap_err();
        assert!(matches!(err, ConfigError::Args(_)));
    }

    #[test]
    fn test_suite_selection_from_str() {
        assert_eq!("Positive".parse::<SuiteSelection>().unwrap(), SuiteSelection::Positive);
        assert_eq!(" all ".parse::<SuiteSelection>().unwrap(), SuiteSelection::All);
        assert!("everything".parse::<SuiteSelection>().is_err());
    }

    #[test]
    fn test_image_path_joins_directory() {
        let config = Config {
            image_dir: PathBuf::from("fixtures"),
            ..Config::default()
        };
        assert_eq!(config.image_path("image.txt"), PathBuf::from("fixtures/image.txt"));
    }
}
