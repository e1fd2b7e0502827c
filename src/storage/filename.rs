//! Filename rules for uploaded and generated files.

use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduce a client-supplied filename to a flat, ASCII-only name that is safe to
/// join onto a storage directory.
///
/// The result never contains path separators and never starts or ends with `.`
/// or `_`. It may be empty, which callers must treat as invalid.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let ascii = ascii.replace(['/', '\\'], " ");
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Check the text after the last `.` against `ext`, ignoring case.
pub fn has_extension(name: &str, ext: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, suffix)| suffix.to_lowercase() == ext.to_lowercase())
}

/// Which side of a chat exchange an audio clip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioRole {
    /// The recorded question.
    User,
    /// The synthesized answer.
    Assistant,
}

impl AudioRole {
    pub fn prefix(&self) -> &'static str {
        match self {
            AudioRole::User => "user",
            AudioRole::Assistant => "ai",
        }
    }
}

/// Name of an exchange's audio clip, e.g. `ai_20240501120000.wav`.
pub fn audio_filename(role: AudioRole, stamp: &ExchangeStamp) -> String {
    format!("{}_{}.wav", role.prefix(), stamp)
}

/// Token shared by the two audio files of one chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeStamp(String);

impl ExchangeStamp {
    /// Stamp from the current local time at second granularity. With `unique`,
    /// a short random suffix keeps same-second exchanges apart.
    pub fn now(unique: bool) -> Self {
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        if unique {
            let id = Uuid::new_v4().simple().to_string();
            Self(format!("{}_{}", timestamp, &id[..8]))
        } else {
            Self(timestamp)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExchangeStamp {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ExchangeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename_plain() {
        assert_eq!(secure_filename("report.pdf"), "report.pdf");
        assert_eq!(secure_filename("My Report v2.pdf"), "My_Report_v2.pdf");
    }

    #[test]
    fn test_secure_filename_strips_paths() {
        assert_eq!(secure_filename("../../etc/passwd.pdf"), "etc_passwd.pdf");
        assert_eq!(secure_filename("C:\\docs\\notes.pdf"), "C_docs_notes.pdf");
        assert_eq!(secure_filename("/abs/path/file.wav"), "abs_path_file.wav");
    }

    #[test]
    fn test_secure_filename_unicode() {
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("日本語.pdf"), "pdf");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_secure_filename_drops_unsafe_chars() {
        assert_eq!(secure_filename("a$b%c&.pdf"), "abc.pdf");
        assert_eq!(secure_filename("_hidden_.pdf_"), "hidden_.pdf");
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("report.pdf", "pdf"));
        assert!(has_extension("REPORT.PDF", "pdf"));
        assert!(has_extension("archive.tar.pdf", "pdf"));
        assert!(!has_extension("report", "pdf"));
        assert!(!has_extension("report.pdf.exe", "pdf"));
        assert!(!has_extension("clip.mp3", "wav"));
    }

    #[test]
    fn test_audio_filename() {
        let stamp = ExchangeStamp::from("20240501120000");
        assert_eq!(audio_filename(AudioRole::User, &stamp), "user_20240501120000.wav");
        assert_eq!(audio_filename(AudioRole::Assistant, &stamp), "ai_20240501120000.wav");
    }

    #[test]
    fn test_stamp_format() {
        let stamp = ExchangeStamp::now(false);
        assert_eq!(stamp.as_str().len(), 14);
        assert!(stamp.as_str().chars().all(|c| c.is_ascii_digit()));

        let unique = ExchangeStamp::now(true);
        assert_eq!(unique.as_str().len(), 14 + 1 + 8);
        assert_ne!(ExchangeStamp::now(true), unique);
    }
}
