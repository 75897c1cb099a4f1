//! src/args.rs
//!
//! Purpose:
//!   Define the command-line interface (CLI) for Dirhound using `clap`'s
//!   derive API (spec §6 External Interfaces). Every flag here is resolved
//!   against `config::Settings` in `config.rs`: a CLI flag wins when given,
//!   otherwise the config file's default applies, otherwise a hard-coded
//!   fallback applies.
//!
//! Notes:
//!   - `--url` and `--url-list` are mutually exclusive and exactly one is
//!     required (spec §6); `clap`'s `ArgGroup` enforces this at parse time.
//!   - `--pathlist` keeps the short form `-p`; `--proxy` uses `-x` (spec
//!     §9 Open Questions: the original's `-p`/`-p` collision is resolved in
//!     the spec's own recommended direction).

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// HTTP method used for every probe. Mirrors spec §6 `--http-method`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
}

/// Top-level CLI configuration for Dirhound.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Concurrent HTTP path brute-force scanner")]
#[command(group(
    clap::ArgGroup::new("target")
        .args(["url", "url_list"])
        .required(true)
        .multiple(false)
))]
pub struct Args {
    /// HTTP method: GET or HEAD.
    #[arg(long, value_enum, default_value_t = HttpMethod::Get)]
    pub http_method: HttpMethod,

    /// Destination directory for the per-target logs. Defaults to
    /// `<binary_dir>/logs` when not given (resolved in `config.rs`).
    #[arg(short, long)]
    pub logs: Option<PathBuf>,

    /// Target URL. Mutually exclusive with `--url-list`.
    #[arg(short, long)]
    pub url: Option<String>,

    /// Target URL list file, one URL per line. Mutually exclusive with `--url`.
    #[arg(short = 'L', long = "url-list")]
    pub url_list: Option<PathBuf>,

    /// Path list file, one path per line. Defaults to
    /// `<binary_dir>/db/<config pathlist>` when not given.
    #[arg(short, long)]
    pub pathlist: Option<PathBuf>,

    /// Proxy address, e.g. `socks5h://127.0.0.1:9050`. `socks5h://` means
    /// remote (proxy-side) DNS resolution; `socks5://` means local DNS.
    #[arg(short = 'x', long)]
    pub proxy: Option<String>,

    /// How many simultaneous connections should we open in total.
    #[arg(short = 'm', long = "max-connections")]
    pub max_connections: Option<usize>,

    /// How many simultaneous connections should we open per host.
    #[arg(short = 'M', long = "max-connections-per-host")]
    pub max_connections_per_host: Option<usize>,

    /// Basic HTTP auth, `user:password`.
    #[arg(short = 'A', long)]
    pub auth: Option<String>,

    /// Per-request timeout in seconds (wall clock, including connect).
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// User-Agent string. Picked randomly from `db/user-agents.txt` when
    /// not given and `connection.random_useragent` is true.
    #[arg(short = 'U', long = "user-agent")]
    pub user_agent: Option<String>,
}

impl Args {
    /// Parse `user:password` into `(user, password)`.
    ///
    /// Grounded on the original's `Config.get_logpass`: only splits on the
    /// first `:`; a value without a `:` is treated as absent.
    pub fn parse_auth(&self) -> Option<(String, String)> {
        let raw = self.auth.as_ref()?;
        raw.split_once(':').map(|(u, p)| (u.to_string(), p.to_string()))
    }
}
