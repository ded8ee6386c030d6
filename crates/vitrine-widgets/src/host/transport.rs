//! Form submission transport.
//!
//! [`HttpTransport`] is a minimal HTTP/1.1 POST client over
//! `std::net::TcpStream`. `https` actions go through a [`TlsConnector`];
//! without one (the `tls-rustls` feature off) they are reported as a
//! transport error, which the form widget turns into a user-visible message.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Ipv6Addr, TcpStream};
use std::rc::Rc;
use std::time::Duration;

use vitrine_types::error::{Result, VitrineError};

use super::tls::{Connection, TlsConnector};

/// Maximum response size read before giving up.
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// One form POST as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

/// Delivers a form submission and reports the HTTP status code.
pub trait FormTransport {
    fn post(&mut self, action: &str, fields: &[(String, String)]) -> Result<u16>;
}

// -------------------------------------------------------------------
// RecordingTransport
// -------------------------------------------------------------------

/// Shared log of submissions seen by a [`RecordingTransport`].
pub type SubmissionLog = Rc<RefCell<Vec<FormSubmission>>>;

/// Records every submission and answers with a fixed outcome. Used for
/// dry runs and tests.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    log: SubmissionLog,
    outcome: std::result::Result<u16, String>,
}

impl RecordingTransport {
    /// Answer every request with `status`.
    pub fn responding(status: u16) -> Self {
        Self {
            log: Rc::default(),
            outcome: Ok(status),
        }
    }

    /// Fail every request with a transport error.
    pub fn failing(reason: &str) -> Self {
        Self {
            log: Rc::default(),
            outcome: Err(reason.to_string()),
        }
    }

    /// Handle on the submission log, usable after the transport is boxed.
    pub fn log(&self) -> SubmissionLog {
        Rc::clone(&self.log)
    }
}

impl FormTransport for RecordingTransport {
    fn post(&mut self, action: &str, fields: &[(String, String)]) -> Result<u16> {
        self.log.borrow_mut().push(FormSubmission {
            action: action.to_string(),
            fields: fields.to_vec(),
        });
        self.outcome
            .clone()
            .map_err(VitrineError::Transport)
    }
}

// -------------------------------------------------------------------
// HttpTransport
// -------------------------------------------------------------------

/// HTTP/1.1 form poster, with HTTPS when a TLS connector is present.
#[derive(Clone)]
pub struct HttpTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
    tls: Option<Rc<dyn TlsConnector>>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            tls: default_tls(),
        }
    }
}

#[cfg(feature = "tls-rustls")]
fn default_tls() -> Option<Rc<dyn TlsConnector>> {
    match super::tls::RustlsConnector::new() {
        Ok(c) => Some(Rc::new(c)),
        Err(e) => {
            log::warn!("TLS unavailable, https form actions will fail: {e}");
            None
        },
    }
}

#[cfg(not(feature = "tls-rustls"))]
fn default_tls() -> Option<Rc<dyn TlsConnector>> {
    None
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            connect_timeout: connect,
            read_timeout: read,
            ..Self::default()
        }
    }

    /// Use `connector` for `https` actions.
    pub fn with_tls(mut self, connector: impl TlsConnector + 'static) -> Self {
        self.tls = Some(Rc::new(connector));
        self
    }

    /// Plain `http` only.
    pub fn without_tls(mut self) -> Self {
        self.tls = None;
        self
    }

    pub fn supports_tls(&self) -> bool {
        self.tls.is_some()
    }

    fn connect(&self, host: &str, port: u16) -> Result<TcpStream> {
        use std::net::ToSocketAddrs;

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| VitrineError::Transport(format!("DNS resolution failed: {e}")))?
            .next()
            .ok_or_else(|| VitrineError::Transport(format!("no addresses for {host}:{port}")))?;

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)
            .map_err(|e| VitrineError::Transport(format!("TCP connect failed: {e}")))?;
        stream
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|e| VitrineError::Transport(format!("set read timeout: {e}")))?;
        Ok(stream)
    }
}

impl FormTransport for HttpTransport {
    fn post(&mut self, action: &str, fields: &[(String, String)]) -> Result<u16> {
        let url = Url::parse(action)?;
        let tls = match url.scheme.as_str() {
            "http" => None,
            "https" => Some(self.tls.as_ref().ok_or_else(|| {
                VitrineError::Transport("TLS not available for https form action".into())
            })?),
            other => {
                return Err(VitrineError::Transport(format!(
                    "unsupported scheme for form transport: {other}"
                )));
            },
        };
        let stream = self.connect(&url.host, url.port)?;
        let mut conn: Box<dyn Connection> = match tls {
            Some(tls) => tls.connect(stream, &url.host)?,
            None => Box::new(stream),
        };
        send_post(&mut conn, &url, &encode_form(fields))?;
        let raw = read_response(&mut conn)?;
        let status = parse_status(&raw)?;
        log::debug!("POST {action} -> {status}");
        Ok(status)
    }
}

// -------------------------------------------------------------------
// Url
// -------------------------------------------------------------------

/// The parts of an absolute URL the transport needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: String,
    /// Lowercased. IPv6 literals are kept without brackets.
    pub host: String,
    pub port: u16,
    /// Path plus query, always starting with `/`.
    pub target: String,
}

impl Url {
    pub fn parse(s: &str) -> Result<Self> {
        let bad = || VitrineError::Transport(format!("invalid URL: {s}"));
        let bad_port = || VitrineError::Transport(format!("invalid port in URL: {s}"));
        let (scheme, rest) = s.split_once("://").ok_or_else(bad)?;
        let scheme = scheme.to_ascii_lowercase();
        let (authority, target) = match rest.find(['/', '?']) {
            Some(i) if rest[i..].starts_with('/') => (&rest[..i], rest[i..].to_string()),
            Some(i) => (&rest[..i], format!("/{}", &rest[i..])),
            None => (rest, "/".to_string()),
        };
        let target = target.split('#').next().unwrap_or("/").to_string();
        let default_port = default_port(&scheme);

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, after) = bracketed.split_once(']').ok_or_else(bad)?;
            if host.parse::<Ipv6Addr>().is_err() {
                return Err(VitrineError::Transport(format!(
                    "invalid IPv6 address in URL: {s}"
                )));
            }
            let port = match after {
                "" => default_port,
                p => p
                    .strip_prefix(':')
                    .ok_or_else(bad)?
                    .parse()
                    .map_err(|_| bad_port())?,
            };
            (host, port)
        } else {
            match authority.rsplit_once(':') {
                Some((h, _)) if h.contains(':') => {
                    return Err(VitrineError::Transport(format!(
                        "IPv6 host must be in brackets: {s}"
                    )));
                },
                Some((h, p)) => (h, p.parse().map_err(|_| bad_port())?),
                None => (authority, default_port),
            }
        };
        if host.is_empty() {
            return Err(bad());
        }
        Ok(Self {
            scheme,
            host: host.to_ascii_lowercase(),
            port,
            target,
        })
    }

    /// `Host` header value (port omitted when it is the default).
    fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == default_port(&self.scheme) {
            host
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

fn default_port(scheme: &str) -> u16 {
    if scheme == "https" { 443 } else { 80 }
}

// -------------------------------------------------------------------
// Wire helpers
// -------------------------------------------------------------------

/// `application/x-www-form-urlencoded` encoding.
pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(b as char)
            },
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn send_post(stream: &mut impl Write, url: &Url, body: &str) -> Result<()> {
    let request = format!(
        "POST {target} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: Vitrine/0.1\r\n\
         Accept: application/json\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: {len}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        target = url.target,
        host = url.host_header(),
        len = body.len(),
    );
    stream
        .write_all(request.as_bytes())
        .map_err(|e| VitrineError::Transport(format!("send request: {e}")))
}

/// Read until EOF, the read timeout, or the size cap.
fn read_response(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.len() > MAX_RESPONSE_SIZE {
                    return Err(VitrineError::Transport("response too large".into()));
                }
            },
            // TLS peers that close without close_notify end with UnexpectedEof.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock
                        | io::ErrorKind::TimedOut
                        | io::ErrorKind::UnexpectedEof
                ) =>
            {
                break;
            },
            Err(e) => return Err(VitrineError::Transport(format!("read response: {e}"))),
        }
    }
    Ok(buf)
}

/// Extract the status code from a raw response.
pub fn parse_status(data: &[u8]) -> Result<u16> {
    let line_end = data
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(data.len());
    let line = std::str::from_utf8(&data[..line_end])
        .map_err(|_| VitrineError::Transport("non-UTF-8 status line".into()))?;
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(VitrineError::Transport(format!("bad status line: {line:?}")));
    }
    parts
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| VitrineError::Transport(format!("bad status code in: {line:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn url_parse_variants() {
        let u = Url::parse("http://Example.com:8080/f/xyz?a=1#frag").unwrap();
        assert_eq!(u.scheme, "http");
        assert_eq!(u.host, "example.com");
        assert_eq!(u.port, 8080);
        assert_eq!(u.target, "/f/xyz?a=1");

        let u = Url::parse("https://formspree.io").unwrap();
        assert_eq!(u.port, 443);
        assert_eq!(u.target, "/");

        let u = Url::parse("http://h?q=1").unwrap();
        assert_eq!(u.target, "/?q=1");
    }

    #[test]
    fn url_parse_rejects_garbage() {
        assert!(Url::parse("contact.php").is_err());
        assert!(Url::parse("http://:80/").is_err());
        assert!(Url::parse("http://h:notaport/").is_err());
    }

    #[test]
    fn host_header_omits_default_port() {
        assert_eq!(Url::parse("http://a.test/").unwrap().host_header(), "a.test");
        assert_eq!(
            Url::parse("http://a.test:81/").unwrap().host_header(),
            "a.test:81"
        );
    }

    #[test]
    fn form_encoding() {
        let fields = vec![
            ("name".to_string(), "Ada Lovelace".to_string()),
            ("message".to_string(), "a&b=c/✓".to_string()),
        ];
        assert_eq!(
            encode_form(&fields),
            "name=Ada+Lovelace&message=a%26b%3Dc%2F%E2%9C%93"
        );
    }

    #[test]
    fn status_parsing() {
        assert_eq!(parse_status(b"HTTP/1.1 200 OK\r\n\r\n").unwrap(), 200);
        assert_eq!(parse_status(b"HTTP/1.0 422 Unprocessable\r\n").unwrap(), 422);
        assert!(parse_status(b"garbage").is_err());
        assert!(parse_status(b"HTTP/1.1 abc\r\n").is_err());
        assert!(parse_status(b"").is_err());
    }

    #[test]
    fn url_parse_ipv6_hosts() {
        let u = Url::parse("http://[::1]:8080/x").unwrap();
        assert_eq!(u.host, "::1");
        assert_eq!(u.port, 8080);
        assert_eq!(u.target, "/x");
        assert_eq!(u.host_header(), "[::1]:8080");

        let u = Url::parse("https://[2001:DB8::1]/f").unwrap();
        assert_eq!(u.host, "2001:db8::1");
        assert_eq!(u.port, 443);
        assert_eq!(u.host_header(), "[2001:db8::1]");
    }

    #[test]
    fn url_parse_reports_bad_authorities() {
        let msg = |s: &str| format!("{}", Url::parse(s).unwrap_err());
        assert!(msg("http://::1/x").contains("must be in brackets"));
        assert!(msg("http://[::1/x").contains("invalid URL"));
        assert!(msg("http://[::1]8080/x").contains("invalid URL"));
        assert!(msg("http://[nope]/x").contains("invalid IPv6 address"));
        assert!(msg("http://[::1]:http/x").contains("invalid port"));
        assert!(msg("http://h:99999/").contains("invalid port"));
        assert!(msg("http://h:/").contains("invalid port"));
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let mut t = HttpTransport::new();
        let err = t.post("ftp://example.org/f", &[]).unwrap_err();
        assert!(format!("{err}").contains("unsupported scheme"));
    }

    #[test]
    fn https_without_tls_is_reported() {
        let mut t = HttpTransport::new().without_tls();
        assert!(!t.supports_tls());
        let err = t.post("https://formspree.io/f/abc", &[]).unwrap_err();
        assert!(format!("{err}").contains("TLS not available"));
    }

    #[cfg(feature = "tls-rustls")]
    #[test]
    fn default_transport_attempts_https() {
        let mut t = HttpTransport::with_timeouts(Duration::from_secs(2), Duration::from_secs(2));
        assert!(t.supports_tls());
        // Nothing listens on a port freed right after binding.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = t
            .post(&format!("https://127.0.0.1:{port}/f/abc"), &[])
            .unwrap_err();
        let msg = format!("{err}");
        assert!(!msg.contains("scheme"), "{msg}");
        assert!(msg.contains("TCP connect failed"), "{msg}");
    }

    /// Hands the socket back unchanged and remembers the server name.
    struct PassthroughTls(Rc<RefCell<Vec<String>>>);

    impl TlsConnector for PassthroughTls {
        fn connect(&self, stream: TcpStream, server_name: &str) -> Result<Box<dyn Connection>> {
            self.0.borrow_mut().push(server_name.to_string());
            Ok(Box::new(stream))
        }
    }

    #[test]
    fn recording_transport_logs_and_answers() {
        let mut t = RecordingTransport::responding(201);
        let log = t.log();
        let fields = vec![("email".to_string(), "a@b.c".to_string())];
        assert_eq!(t.post("http://x/f", &fields).unwrap(), 201);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].fields, fields);

        let mut t = RecordingTransport::failing("offline");
        assert!(matches!(t.post("http://x/f", &[]), Err(VitrineError::Transport(_))));
    }

    /// Accept one request, answer 200, and return the raw request text.
    fn one_shot_server() -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let mut req = Vec::new();
            // Read headers plus the short body.
            while !String::from_utf8_lossy(&req).contains("name=Ada") {
                let n = sock.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
            }
            sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n{}")
                .unwrap();
            String::from_utf8(req).unwrap()
        });
        (port, server)
    }

    #[test]
    fn posts_to_local_server() {
        let (port, server) = one_shot_server();
        let mut t = HttpTransport::with_timeouts(Duration::from_secs(2), Duration::from_secs(2));
        let fields = vec![("name".to_string(), "Ada".to_string())];
        let status = t
            .post(&format!("http://127.0.0.1:{port}/f/contact"), &fields)
            .unwrap();
        assert_eq!(status, 200);

        let req = server.join().unwrap();
        assert!(req.starts_with("POST /f/contact HTTP/1.1\r\n"));
        assert!(req.contains("Accept: application/json\r\n"));
        assert!(req.contains("Content-Length: 8\r\n"));
        assert!(req.ends_with("\r\n\r\nname=Ada"));
    }

    #[test]
    fn https_action_goes_through_tls_connector() {
        let (port, server) = one_shot_server();
        let names: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut t = HttpTransport::with_timeouts(Duration::from_secs(2), Duration::from_secs(2))
            .with_tls(PassthroughTls(Rc::clone(&names)));
        let fields = vec![("name".to_string(), "Ada".to_string())];
        let status = t
            .post(&format!("https://127.0.0.1:{port}/f/abc"), &fields)
            .unwrap();
        assert_eq!(status, 200);
        assert_eq!(*names.borrow(), vec!["127.0.0.1".to_string()]);

        let req = server.join().unwrap();
        assert!(req.starts_with("POST /f/abc HTTP/1.1\r\n"));
        assert!(req.contains(&format!("Host: 127.0.0.1:{port}\r\n")));
    }
}
