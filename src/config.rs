//! src/config.rs
//!
//! Purpose:
//!   Read the INI config file (spec §6 "Configuration file") and merge it
//!   with the parsed CLI flags (`args.rs`) into one fully-resolved
//!   `Settings` the rest of the crate consumes. A CLI flag always wins
//!   over the config file; the config file always wins over the
//!   hard-coded fallback.
//!
//! Grounded on `original_source/lib/config.py::Config`.

use crate::args::{Args, HttpMethod};
use crate::error::DirhoundError;
use crate::wordlist;
use ini::Ini;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101 Firefox/78.0";
const CONFIG_FILE_NAME: &str = "dirhound.cfg";

/// One target URL as given on the CLI, plus (for `--url-list`) the file
/// name it came from, for the print-config preamble.
pub enum TargetSource {
    Single(String),
    List { file_name: String, urls: Vec<String> },
}

/// Fully-resolved settings: config file defaults merged with CLI overrides.
pub struct Settings {
    pub chunk_size: usize,
    pub follow_redirects: bool,
    pub giveup_timeout: u64,
    pub max_errors: u32,
    pub max_retries: u32,
    pub http_method: HttpMethod,
    pub logs_dir: PathBuf,
    pub targets: TargetSource,
    pub pathlist: Vec<String>,
    pub proxy: Option<String>,
    pub max_connections: usize,
    pub max_connections_per_host: usize,
    pub auth: Option<(String, String)>,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Raw key/value defaults straight from the INI file, before CLI merge.
struct IniDefaults {
    chunk_size: usize,
    pathlist_name: String,
    follow_redirects: bool,
    giveup_timeout: u64,
    max_errors: u32,
    max_retries: u32,
    random_useragent: bool,
    useragent: String,
    proxy: Option<String>,
    max_connections: usize,
    max_connections_per_host: usize,
    timeout: u64,
}

fn safe_get(ini: &Ini, section: &str, key: &str, default: &str) -> String {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .unwrap_or(default)
        .to_string()
}

fn safe_get_int<T: std::str::FromStr>(ini: &Ini, section: &str, key: &str, default: T) -> T {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn safe_get_bool(ini: &Ini, section: &str, key: &str, default: bool) -> bool {
    ini.section(Some(section))
        .and_then(|s| s.get(key))
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

/// Load `<script_dir>/dirhound.cfg`. A missing config file is not fatal:
/// every key falls back to its hard-coded default (spec §6: "missing keys
/// fall back to defaults without error" — extended here to a missing file
/// as a whole, since requiring the file to always exist would make the
/// binary unusable straight out of a fresh checkout).
fn load_ini_defaults(script_dir: &Path) -> IniDefaults {
    let path = script_dir.join(CONFIG_FILE_NAME);
    let ini = Ini::load_from_file(&path).unwrap_or_else(|_| {
        tracing::warn!(path = %path.display(), "config file not found, using built-in defaults");
        Ini::new()
    });

    IniDefaults {
        chunk_size: safe_get_int(&ini, "general", "chunk_size", 65535),
        pathlist_name: safe_get(&ini, "general", "pathlist", "pathlist.txt"),
        follow_redirects: safe_get_bool(&ini, "connection", "follow_redirects", false),
        giveup_timeout: safe_get_int(&ini, "connection", "giveup_timeout", 5),
        max_errors: safe_get_int(&ini, "connection", "max_errors", 5),
        max_retries: safe_get_int(&ini, "connection", "max_retries", 3),
        random_useragent: safe_get_bool(&ini, "connection", "random_useragent", true),
        useragent: safe_get(&ini, "connection", "useragent", DEFAULT_UA),
        proxy: ini
            .section(Some("connection"))
            .and_then(|s| s.get("proxy"))
            .filter(|v| !v.is_empty() && *v != "none")
            .map(str::to_string),
        max_connections: safe_get_int(&ini, "connection", "max_connections", 128),
        max_connections_per_host: safe_get_int(&ini, "connection", "max_connections_per_host", 16),
        timeout: safe_get_int(&ini, "connection", "timeout", 30),
    }
}

/// Pick a random line from `<script_dir>/db/user-agents.txt`.
///
/// Grounded on `Config.pick_user_agent`.
fn pick_user_agent(script_dir: &Path) -> Result<String, DirhoundError> {
    let path = script_dir.join("db").join("user-agents.txt");
    let lines = wordlist::read_lines(&path)?;
    let mut rng = rand::thread_rng();
    lines
        .choose(&mut rng)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| DirhoundError::Config(format!("{} is empty", path.display())))
}

/// Resolve the directory the running executable lives in, falling back to
/// the current working directory (e.g. under `cargo run`).
pub fn script_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Merge the INI defaults with the parsed CLI flags into final `Settings`.
pub fn resolve(args: &Args, script_dir: &Path) -> Result<Settings, DirhoundError> {
    let ini = load_ini_defaults(script_dir);

    let logs_dir = args
        .logs
        .clone()
        .unwrap_or_else(|| script_dir.join("logs"));

    let pathlist_path = args
        .pathlist
        .clone()
        .unwrap_or_else(|| script_dir.join("db").join(&ini.pathlist_name));
    let pathlist = wordlist::read_lines(&pathlist_path)?;

    let targets = match (&args.url, &args.url_list) {
        (Some(url), None) => TargetSource::Single(url.clone()),
        (None, Some(list_path)) => {
            let urls = wordlist::read_lines(list_path)?;
            TargetSource::List {
                file_name: list_path.display().to_string(),
                urls,
            }
        }
        _ => return Err(DirhoundError::MutuallyExclusiveTarget),
    };

    let proxy = args.proxy.clone().or(ini.proxy);

    let user_agent = match &args.user_agent {
        Some(ua) => ua.clone(),
        None => {
            if ini.random_useragent {
                pick_user_agent(script_dir).unwrap_or(ini.useragent)
            } else {
                ini.useragent
            }
        }
    };

    Ok(Settings {
        chunk_size: ini.chunk_size,
        follow_redirects: ini.follow_redirects,
        giveup_timeout: ini.giveup_timeout,
        max_errors: ini.max_errors,
        max_retries: ini.max_retries,
        http_method: args.http_method,
        logs_dir,
        targets,
        pathlist,
        proxy,
        max_connections: args.max_connections.unwrap_or(ini.max_connections),
        max_connections_per_host: args
            .max_connections_per_host
            .unwrap_or(ini.max_connections_per_host),
        auth: args.parse_auth(),
        timeout: Duration::from_secs(args.timeout.unwrap_or(ini.timeout)),
        user_agent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_get_int_falls_back_on_missing_key() {
        let ini = Ini::new();
        let value: usize = safe_get_int(&ini, "general", "chunk_size", 65535);
        assert_eq!(value, 65535);
    }

    #[test]
    fn safe_get_bool_recognizes_common_truthy_strings() {
        let mut ini = Ini::new();
        ini.with_section(Some("connection")).set("follow_redirects", "true");
        assert!(safe_get_bool(&ini, "connection", "follow_redirects", false));
    }

    #[test]
    fn safe_get_falls_back_on_unknown_section() {
        let ini = Ini::new();
        assert_eq!(safe_get(&ini, "nope", "nope", "default"), "default");
    }
}
