//! Runtime configuration.
//!
//! Built-in defaults, overlaid by an optional TOML file, overlaid by CLI
//! flags. Durations in the file are human strings ("2s", "7d").

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::RunArgs;
use crate::error::{Error, Result};
use crate::extract::pattern::PhraseCount;
use crate::paths;

const DEFAULT_INTEREST_ITEM: &str = "li.pvs-list__paged-list-item.artdeco-list__item.pvs-list__item--line-separated.pvs-list__item--one-column";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub input: InputConfig,
    pub browser: BrowserConfig,
    pub extract: ExtractConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// `None` means the platform data dir.
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct InputConfig {
    pub entities_file: PathBuf,
    pub max_entities: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            entities_file: PathBuf::from("profile_urls.txt"),
            max_entities: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub chrome_binary: Option<String>,
    pub args: Vec<String>,
    pub login_url: String,
    /// Upper bound on a single WebDriver request, page loads included.
    pub request_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            webdriver_url: "http://localhost:9515".to_string(),
            chrome_binary: None,
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-extensions".to_string(),
            ],
            login_url: "https://www.linkedin.com/login".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub pacing_min: Duration,
    pub pacing_max: Duration,
    pub wait_timeout: Duration,
    pub stabilize_attempts: u32,
    pub stabilize_pause: Duration,
    pub skills_phrase: String,
    pub interests_link: String,
    pub interest_item: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            pacing_min: Duration::from_secs(2),
            pacing_max: Duration::from_secs(5),
            wait_timeout: Duration::from_secs(10),
            stabilize_attempts: 10,
            stabilize_pause: Duration::from_secs(2),
            skills_phrase: r"Show all (\d[\d,]*) skills".to_string(),
            interests_link: "#navigation-index-see-all-companies".to_string(),
            interest_item: DEFAULT_INTEREST_ITEM.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub cutoff: Duration,
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            cutoff: Duration::from_secs(7 * 24 * 60 * 60),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    storage: FileStorage,
    input: FileInput,
    browser: FileBrowser,
    extract: FileExtract,
    report: FileReport,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileStorage {
    database: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileInput {
    entities_file: Option<PathBuf>,
    max_entities: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileBrowser {
    webdriver_url: Option<String>,
    chrome_binary: Option<String>,
    args: Option<Vec<String>>,
    login_url: Option<String>,
    request_timeout: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileExtract {
    pacing_min: Option<String>,
    pacing_max: Option<String>,
    wait_timeout: Option<String>,
    stabilize_attempts: Option<u32>,
    stabilize_pause: Option<String>,
    skills_phrase: Option<String>,
    interests_link: Option<String>,
    interest_item: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileReport {
    cutoff: Option<String>,
    output_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `path` if given (it must exist), otherwise the default config
    /// file if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => paths::default_config_path().filter(|p| p.exists()),
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        let origin = path.display().to_string();
        let text = std::fs::read_to_string(&path).map_err(|e| Error::Config {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;
        Config::from_toml_str(&text, &origin)
    }

    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        let invalid = |reason: String| Error::Config { origin: origin.to_string(), reason };

        let file: FileConfig = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let duration = |key: &str, value: Option<String>, default: Duration| match value {
            Some(s) => humantime::parse_duration(&s).map_err(|e| invalid(format!("{key}: {e}"))),
            None => Ok(default),
        };

        let defaults = Config::default();
        let config = Config {
            storage: StorageConfig {
                database: file.storage.database,
            },
            input: InputConfig {
                entities_file: file.input.entities_file.unwrap_or(defaults.input.entities_file),
                max_entities: file.input.max_entities.unwrap_or(defaults.input.max_entities),
            },
            browser: BrowserConfig {
                webdriver_url: file.browser.webdriver_url.unwrap_or(defaults.browser.webdriver_url),
                chrome_binary: file.browser.chrome_binary,
                args: file.browser.args.unwrap_or(defaults.browser.args),
                login_url: file.browser.login_url.unwrap_or(defaults.browser.login_url),
                request_timeout: duration(
                    "browser.request_timeout",
                    file.browser.request_timeout,
                    defaults.browser.request_timeout,
                )?,
            },
            extract: ExtractConfig {
                pacing_min: duration("extract.pacing_min", file.extract.pacing_min, defaults.extract.pacing_min)?,
                pacing_max: duration("extract.pacing_max", file.extract.pacing_max, defaults.extract.pacing_max)?,
                wait_timeout: duration(
                    "extract.wait_timeout",
                    file.extract.wait_timeout,
                    defaults.extract.wait_timeout,
                )?,
                stabilize_attempts: file
                    .extract
                    .stabilize_attempts
                    .unwrap_or(defaults.extract.stabilize_attempts),
                stabilize_pause: duration(
                    "extract.stabilize_pause",
                    file.extract.stabilize_pause,
                    defaults.extract.stabilize_pause,
                )?,
                skills_phrase: file.extract.skills_phrase.unwrap_or(defaults.extract.skills_phrase),
                interests_link: file.extract.interests_link.unwrap_or(defaults.extract.interests_link),
                interest_item: file.extract.interest_item.unwrap_or(defaults.extract.interest_item),
            },
            report: ReportConfig {
                cutoff: duration("report.cutoff", file.report.cutoff, defaults.report.cutoff)?,
                output_dir: file.report.output_dir.unwrap_or(defaults.report.output_dir),
            },
        };

        config.validate().map_err(invalid)?;
        Ok(config)
    }

    pub fn apply_run_args(&mut self, args: &RunArgs) {
        if let Some(entities) = &args.entities {
            self.input.entities_file = entities.clone();
        }
        if let Some(limit) = args.limit {
            self.input.max_entities = limit;
        }
        if let Some(url) = &args.webdriver {
            self.browser.webdriver_url = url.clone();
        }
        if let Some(out) = &args.out {
            self.report.output_dir = out.clone();
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let e = &self.extract;
        if e.pacing_min.is_zero() {
            return Err("extract.pacing_min must be greater than zero".to_string());
        }
        if e.pacing_min > e.pacing_max {
            return Err("extract.pacing_min must not exceed extract.pacing_max".to_string());
        }
        if e.stabilize_attempts == 0 {
            return Err("extract.stabilize_attempts must be at least 1".to_string());
        }
        if self.input.max_entities == 0 {
            return Err("input.max_entities must be at least 1".to_string());
        }
        PhraseCount::new(&e.skills_phrase).map_err(|reason| format!("extract.skills_phrase: {reason}"))?;
        Ok(())
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database {
            Some(path) => Ok(path.clone()),
            None => paths::default_db_path(),
        }
    }
}
