//! Environment lookup with aliases, plus `.env` support.

use std::env;
use std::fs;

/// Import `./.env` once per process. Variables already present win.
pub fn load_dotenv() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let Ok(content) = fs::read_to_string(".env") else {
            return;
        };
        for (key, value) in parse_dotenv(&content) {
            if env::var_os(&key).is_none() {
                #[allow(unsafe_code)]
                unsafe {
                    env::set_var(key, value);
                }
            }
        }
    });
}

/// `KEY=value` lines. `#` starts a comment line or, after whitespace, a
/// trailing comment on an unquoted value. Matching outer quotes are removed.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .filter(|(k, _)| !k.trim().is_empty())
        .map(|(k, v)| (k.trim().to_string(), unquote(v.trim()).to_string()))
        .collect()
}

fn unquote(raw: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = raw.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end(),
        None => raw,
    }
}

fn lookup(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|k| env::var(k).ok())
}

/// Primary key, else first alias that is set, else `default()`. Empty counts as unset.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Trimmed value of the primary key or an alias; blank is `None`.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary, aliases)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `0`, `false`, `no` and `off` (any case) are false; any other value is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match lookup(primary, aliases) {
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}
