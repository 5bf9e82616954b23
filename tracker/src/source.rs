//! Retrieval of raw element set text from a file, stdin or over HTTP

use std::{
    fmt, fs,
    io::{self, Read},
    path::PathBuf,
    str::FromStr,
    thread,
    time::Duration,
};
use tracing::{debug, info, warn};
use url::Url;

/// CelesTrak's Starlink group in three-line format
pub const DEFAULT_SOURCE_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=starlink&FORMAT=tle";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TleSource {
    File(PathBuf),
    Url(Url),
    Stdin,
}

impl FromStr for TleSource {
    type Err = url::ParseError;

    /// `-` is stdin, `http://` and `https://` are URLs, anything else is a path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(TleSource::Stdin)
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Ok(TleSource::Url(Url::parse(s)?))
        } else {
            Ok(TleSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for TleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TleSource::File(p) => write!(f, "{}", p.display()),
            TleSource::Url(u) => write!(f, "{u}"),
            TleSource::Stdin => f.write_str("stdin"),
        }
    }
}

impl Default for TleSource {
    fn default() -> Self {
        // Constant, always parses
        match Url::parse(DEFAULT_SOURCE_URL) {
            Ok(u) => TleSource::Url(u),
            Err(_) => TleSource::Stdin,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceConfig {
    pub source: TleSource,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra attempts after the first failed request
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source: TleSource::default(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    #[error("Failed to read element sets")]
    Io(#[from] io::Error),

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status} for '{url}'")]
    Status {
        url: Url,
        status: reqwest::StatusCode,
    },

    #[error("Source '{0}' returned no data")]
    Empty(String),
}

impl TransportFailure {
    /// Connection problems, timeouts and server-side errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportFailure::Http(_) => true,
            TransportFailure::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            TransportFailure::Io(_) | TransportFailure::Empty(_) => false,
        }
    }
}

/// A single HTTP GET of a text body
pub trait HttpClient {
    fn get(&self, url: &Url) -> Result<String, TransportFailure>;
}

pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url) -> Result<String, TransportFailure> {
        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportFailure::Status {
                url: url.clone(),
                status,
            });
        }
        Ok(response.text()?)
    }
}

/// Read the configured source in full
pub fn fetch(cfg: &SourceConfig) -> Result<String, TransportFailure> {
    match &cfg.source {
        TleSource::Url(url) => {
            let client = ReqwestClient::with_timeout(cfg.timeout)?;
            fetch_with(&client, url, cfg)
        }
        TleSource::File(path) => {
            let text = fs::read_to_string(path)?;
            non_empty(text, &cfg.source)
        }
        TleSource::Stdin => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            non_empty(text, &cfg.source)
        }
    }
}

/// GET `url` with `client`, retrying transient failures
pub fn fetch_with<C: HttpClient>(
    client: &C,
    url: &Url,
    cfg: &SourceConfig,
) -> Result<String, TransportFailure> {
    let mut attempt = 0;
    loop {
        debug!(%url, attempt, "Requesting element sets");
        match client.get(url) {
            Ok(text) => return non_empty(text, &cfg.source),
            Err(e) if e.is_retryable() && attempt < cfg.retries => {
                attempt += 1;
                warn!(%url, attempt, retries = cfg.retries, err = %e, "Request failed, retrying");
                thread::sleep(cfg.retry_backoff);
            }
            Err(e) => return Err(e),
        }
    }
}

fn non_empty(text: String, source: &TleSource) -> Result<String, TransportFailure> {
    if text.trim().is_empty() {
        return Err(TransportFailure::Empty(source.to_string()));
    }
    info!(%source, bytes = text.len(), "Fetched element sets");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::VecDeque};

    struct ScriptedClient {
        responses: RefCell<VecDeque<Result<String, TransportFailure>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, TransportFailure>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl HttpClient for ScriptedClient {
        fn get(&self, _url: &Url) -> Result<String, TransportFailure> {
            *self.calls.borrow_mut() += 1;
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportFailure::Empty("script".to_owned())))
        }
    }

    fn status(code: u16) -> Result<String, TransportFailure> {
        Err(TransportFailure::Status {
            url: Url::parse(DEFAULT_SOURCE_URL).unwrap(),
            status: reqwest::StatusCode::from_u16(code).unwrap(),
        })
    }

    fn cfg(retries: u32) -> SourceConfig {
        SourceConfig {
            retries,
            retry_backoff: Duration::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn source_kinds() {
        assert_eq!("-".parse::<TleSource>(), Ok(TleSource::Stdin));
        assert_eq!(
            "catalog.txt".parse::<TleSource>(),
            Ok(TleSource::File(PathBuf::from("catalog.txt")))
        );
        assert!(matches!(
            DEFAULT_SOURCE_URL.parse::<TleSource>(),
            Ok(TleSource::Url(_))
        ));
        assert!("https://".parse::<TleSource>().is_err());
        assert_eq!(TleSource::default().to_string(), DEFAULT_SOURCE_URL);
    }

    #[test]
    fn retries_server_errors() {
        let client = ScriptedClient::new(vec![status(503), status(500), Ok("ISS\n".to_owned())]);
        let url = Url::parse(DEFAULT_SOURCE_URL).unwrap();
        assert_eq!(fetch_with(&client, &url, &cfg(3)).unwrap(), "ISS\n");
        assert_eq!(*client.calls.borrow(), 3);
    }

    #[test]
    fn gives_up_after_retries() {
        let client = ScriptedClient::new(vec![status(503), status(503), status(503)]);
        let url = Url::parse(DEFAULT_SOURCE_URL).unwrap();
        let err = fetch_with(&client, &url, &cfg(1)).unwrap_err();
        assert!(matches!(err, TransportFailure::Status { status, .. } if status.as_u16() == 503));
        assert_eq!(*client.calls.borrow(), 2);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let client = ScriptedClient::new(vec![status(404), Ok("ISS\n".to_owned())]);
        let url = Url::parse(DEFAULT_SOURCE_URL).unwrap();
        assert!(fetch_with(&client, &url, &cfg(3)).is_err());
        assert_eq!(*client.calls.borrow(), 1);
    }

    #[test]
    fn empty_body() {
        let client = ScriptedClient::new(vec![Ok(" \n\n".to_owned())]);
        let url = Url::parse(DEFAULT_SOURCE_URL).unwrap();
        assert!(matches!(
            fetch_with(&client, &url, &cfg(0)),
            Err(TransportFailure::Empty(_))
        ));
    }

    #[test]
    fn missing_file() {
        let cfg = SourceConfig {
            source: TleSource::File(PathBuf::from("/nonexistent/catalog.txt")),
            ..Default::default()
        };
        assert!(matches!(fetch(&cfg), Err(TransportFailure::Io(_))));
    }
}
