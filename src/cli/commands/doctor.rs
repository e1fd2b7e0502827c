//! Doctor command - verify API keys, storage and configuration.

use crate::cli::preflight::speech_key_env;
use crate::cli::{format_size, Output};
use crate::config::{BucketProvider, Settings};
use crate::http::api_key_from_env;
use crate::storage::LocalStore;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(config_path: Option<&Path>, settings: &Settings) -> anyhow::Result<()> {
    Output::header("Voxdoc Doctor");
    println!();
    println!("Checking API keys, storage and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    let key_checks = vec![
        check_api_key(&settings.qa.api_key_env, "document QA"),
        check_api_key(speech_key_env(settings), "speech synthesis"),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Storage").bold());
    let storage_checks = check_storage(settings);
    for check in &storage_checks {
        check.print();
    }
    checks.extend(storage_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);
    let config_check = check_config_file(&config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Voxdoc.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Voxdoc is ready to use.");
    }

    Ok(())
}

/// Check that an API key is present in the environment.
fn check_api_key(var: &str, purpose: &str) -> CheckResult {
    match api_key_from_env(var) {
        Some(key) => CheckResult::ok(var, &format!("configured for {} ({})", purpose, mask_key(&key))),
        None => CheckResult::error(
            var,
            "not set",
            &format!("Set with: export {}='...'", var),
        ),
    }
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check local upload directories and the bucket configuration.
fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let upload_dir = settings.upload_dir();
    match LocalStore::new(&upload_dir) {
        Ok(store) => match store.usage() {
            Ok(usage) => results.push(CheckResult::ok(
                "Upload directory",
                &format!(
                    "{} ({} PDFs, {}; {} audio clips, {})",
                    upload_dir.display(),
                    usage.pdf_count,
                    format_size(usage.pdf_bytes),
                    usage.audio_count,
                    format_size(usage.audio_bytes),
                ),
            )),
            Err(e) => results.push(CheckResult::warning(
                "Upload directory",
                &format!("{} ({})", upload_dir.display(), e),
                "Check directory permissions",
            )),
        },
        Err(e) => results.push(CheckResult::error(
            "Upload directory",
            &format!("{} ({})", upload_dir.display(), e),
            "Set storage.upload_dir to a writable location",
        )),
    }

    let bucket = &settings.bucket;
    let result = match bucket.provider {
        BucketProvider::Gcs => {
            if gcs_credentials_configured() {
                CheckResult::ok("Bucket", &format!("gs://{}", bucket.name))
            } else {
                CheckResult::warning(
                    "Bucket",
                    &format!("gs://{} (no explicit credentials)", bucket.name),
                    "Set GOOGLE_APPLICATION_CREDENTIALS or GOOGLE_SERVICE_ACCOUNT",
                )
            }
        }
        BucketProvider::Local => CheckResult::ok(
            "Bucket",
            &format!("{} (local directory)", settings.bucket_local_path().display()),
        ),
        BucketProvider::Memory => CheckResult::warning(
            "Bucket",
            "in memory",
            "Uploaded PDFs are lost when the process exits",
        ),
    };
    results.push(result);

    results
}

fn gcs_credentials_configured() -> bool {
    [
        "GOOGLE_APPLICATION_CREDENTIALS",
        "GOOGLE_SERVICE_ACCOUNT",
        "GOOGLE_SERVICE_ACCOUNT_PATH",
        "GOOGLE_SERVICE_ACCOUNT_KEY",
    ]
    .iter()
    .any(|var| api_key_from_env(var).is_some())
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: voxdoc config edit",
        )
    }
}
