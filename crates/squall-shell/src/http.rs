//! Minimal HTTP/1.1 GET client for the `download` command.
//!
//! Speaks plain HTTP over `std::net::TcpStream`; HTTPS is available
//! when the crate is built with the `tls` feature.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use squall_types::error::{Result, SquallError};

/// Maximum response body size (64 MB).
const MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

/// Headroom for the status line and headers on top of the body cap.
const MAX_HEAD_SIZE: usize = 16 * 1024;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: u8 = 5;

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

// -------------------------------------------------------------------
// URLs
// -------------------------------------------------------------------

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Url {
    /// Parse an absolute URL of the form
    /// `scheme://host[:port][/path][?query][#fragment]`.
    ///
    /// The scheme is lower-cased; an empty path becomes `/`. Returns
    /// `None` when the scheme or host is missing.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let (scheme, rest) = input.split_once("://")?;
        if scheme.is_empty() || rest.is_empty() {
            return None;
        }
        let (rest, fragment) = match rest.split_once('#') {
            Some((r, f)) => (r, Some(f.to_string())),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((r, q)) => (r, Some(q.to_string())),
            None => (rest, None),
        };
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], rest[i..].to_string()),
            None => (rest, "/".to_string()),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((h, p)) => match p.parse::<u16>() {
                Ok(port) => (h.to_string(), Some(port)),
                // Not a port number; treat the whole authority as host.
                Err(_) => (authority.to_string(), None),
            },
            None => (authority.to_string(), None),
        };
        if host.is_empty() {
            return None;
        }
        Some(Self {
            scheme: scheme.to_lowercase(),
            host,
            port,
            path,
            query,
            fragment,
        })
    }

    /// Resolve a redirect target against this URL.
    ///
    /// Accepts absolute URLs, host-relative paths (`/x`), and
    /// path-relative references.
    pub fn resolve(&self, location: &str) -> Option<Url> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }
        if location.contains("://") {
            return Url::parse(location);
        }
        let reference = if location.starts_with('/') {
            location.to_string()
        } else {
            // Relative to the current path's directory.
            let dir = match self.path.rfind('/') {
                Some(i) => &self.path[..=i],
                None => "/",
            };
            format!("{dir}{location}")
        };
        let base = match self.port {
            Some(p) => format!("{}://{}:{p}", self.scheme, self.host),
            None => format!("{}://{}", self.scheme, self.host),
        };
        Url::parse(&format!("{base}{reference}"))
    }

    /// Final path segment, used as the local filename for downloads.
    pub fn filename(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or("");
        if name.is_empty() { "download.bin" } else { name }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "{}", self.path)?;
        if let Some(ref query) = self.query {
            write!(f, "?{query}")?;
        }
        if let Some(ref fragment) = self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

// -------------------------------------------------------------------
// Requests
// -------------------------------------------------------------------

/// A parsed HTTP response.
#[derive(Debug)]
pub struct Response {
    /// HTTP status code (e.g. 200, 404).
    pub status_code: u16,
    /// Response headers as lower-cased (name, value) pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Fetch `url` with a GET request.
///
/// Follows redirects (301/302/307/308) up to [`MAX_REDIRECTS`] hops.
pub fn get(url: &Url) -> Result<Response> {
    let mut current = url.clone();
    for _ in 0..MAX_REDIRECTS {
        let resp = do_request(&current)?;

        if is_redirect(resp.status_code)
            && let Some(location) = find_header(&resp.headers, "location")
        {
            let location = location.to_string();
            current = current
                .resolve(&location)
                .ok_or_else(|| SquallError::Net(format!("bad redirect Location: {location}")))?;
            log::debug!("following redirect to {current}");
            continue;
        }

        return Ok(resp);
    }
    Err(SquallError::Net("too many redirects".to_string()))
}

/// Connect, optionally upgrade to TLS, send GET, read and parse.
fn do_request(url: &Url) -> Result<Response> {
    match url.scheme.as_str() {
        "http" => {},
        "https" if cfg!(feature = "tls") => {},
        "https" => {
            return Err(SquallError::Net(
                "https is not available in this build (enable the 'tls' feature)".to_string(),
            ));
        },
        other => {
            return Err(SquallError::Net(format!("unsupported scheme: {other}")));
        },
    }

    let is_https = url.scheme == "https";
    let port = url.port.unwrap_or(if is_https { 443 } else { 80 });
    let stream = tcp_connect(&url.host, port)?;

    if is_https {
        https_request(stream, url)
    } else {
        request_over(stream, url)
    }
}

#[cfg(feature = "tls")]
fn https_request(stream: TcpStream, url: &Url) -> Result<Response> {
    let tls_stream = crate::tls::connect(stream, &url.host)?;
    request_over(tls_stream, url)
}

#[cfg(not(feature = "tls"))]
fn https_request(_stream: TcpStream, _url: &Url) -> Result<Response> {
    Err(SquallError::Net(
        "https is not available in this build (enable the 'tls' feature)".to_string(),
    ))
}

/// Send the request and parse the reply over an established stream.
fn request_over(mut stream: impl Read + Write, url: &Url) -> Result<Response> {
    send_request(&mut stream, url)?;
    let raw = read_response(&mut stream)?;
    parse_response(&raw)
}

/// Open a TCP connection with connect and read timeouts applied.
fn tcp_connect(host: &str, port: u16) -> Result<TcpStream> {
    use std::net::ToSocketAddrs;

    let addr = format!("{host}:{port}")
        .to_socket_addrs()
        .map_err(|e| SquallError::Net(format!("could not resolve {host}: {e}")))?
        .next()
        .ok_or_else(|| SquallError::Net(format!("no addresses for {host}:{port}")))?;

    let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .map_err(|e| SquallError::Net(format!("connect to {host}:{port}: {e}")))?;
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .map_err(|e| SquallError::Net(format!("set read timeout: {e}")))?;
    Ok(stream)
}

/// Write an HTTP/1.1 GET request with `Connection: close`.
fn send_request(stream: &mut impl Write, url: &Url) -> Result<()> {
    let default_port = if url.scheme == "https" { 443 } else { 80 };
    let host_header = match url.port {
        Some(p) if p != default_port => format!("{}:{p}", url.host),
        _ => url.host.clone(),
    };
    let target = match url.query {
        Some(ref q) => format!("{}?{q}", url.path),
        None => url.path.clone(),
    };

    let request = format!(
        "GET {target} HTTP/1.1\r\n\
         Host: {host_header}\r\n\
         User-Agent: squall/{}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n",
        crate::VERSION,
    );

    stream
        .write_all(request.as_bytes())
        .map_err(|e| SquallError::Net(format!("send request: {e}")))?;
    Ok(())
}

/// Read the whole response until EOF or until the read timeout fires.
fn read_response(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(buf),
            Ok(n) => {
                if buf.len() + n > MAX_BODY_SIZE + MAX_HEAD_SIZE {
                    return Err(SquallError::Net("response too large".to_string()));
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            // With Connection: close, a read timeout ends the
            // response; whatever arrived is all we get.
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                return Ok(buf);
            },
            Err(e) => return Err(SquallError::Net(format!("read response: {e}"))),
        }
    }
}

// -------------------------------------------------------------------
// Response parsing
// -------------------------------------------------------------------

/// Parse raw bytes into status code, headers, and body.
fn parse_response(data: &[u8]) -> Result<Response> {
    let head_end = find_subsequence(data, b"\r\n\r\n").ok_or_else(|| {
        SquallError::Net("malformed response: no header terminator".to_string())
    })?;
    let head = std::str::from_utf8(&data[..head_end])
        .map_err(|_| SquallError::Net("malformed response: non-UTF-8 headers".to_string()))?;
    let raw_body = &data[head_end + 4..];

    let mut lines = head.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| SquallError::Net("empty response".to_string()))?;
    let status_code = parse_status_line(status_line)?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_string()))
        .collect();

    let body = decode_body(&headers, raw_body)?;
    Ok(Response {
        status_code,
        headers,
        body,
    })
}

/// Decode the body per Transfer-Encoding / Content-Length.
fn decode_body(headers: &[(String, String)], raw: &[u8]) -> Result<Vec<u8>> {
    if find_header(headers, "transfer-encoding").is_some_and(|v| v.contains("chunked")) {
        return decode_chunked(raw);
    }
    let body = match find_header(headers, "content-length") {
        Some(cl) => {
            let len: usize = cl
                .parse()
                .map_err(|_| SquallError::Net("bad Content-Length".to_string()))?;
            if len > MAX_BODY_SIZE {
                return Err(SquallError::Net(
                    "response body exceeds the 64 MB limit".to_string(),
                ));
            }
            raw[..raw.len().min(len)].to_vec()
        },
        None => raw.to_vec(),
    };
    if body.len() > MAX_BODY_SIZE {
        return Err(SquallError::Net(
            "response body exceeds the 64 MB limit".to_string(),
        ));
    }
    Ok(body)
}

/// Parse the HTTP status code from the status line.
fn parse_status_line(line: &str) -> Result<u16> {
    // Expected: "HTTP/1.x NNN ..."
    let mut parts = line.splitn(3, ' ');
    let code = parts
        .nth(1)
        .ok_or_else(|| SquallError::Net(format!("bad status line: {line}")))?;
    code.parse()
        .map_err(|_| SquallError::Net(format!("bad status code in: {line}")))
}

/// Case-insensitive header lookup.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name_lower = name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| k == &name_lower)
        .map(|(_, v)| v.as_str())
}

/// Decode a chunked transfer-encoded body.
fn decode_chunked(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(i) = find_subsequence(&data[pos..], b"\r\n") {
        let line = std::str::from_utf8(&data[pos..pos + i])
            .map_err(|_| SquallError::Net("bad chunk size".to_string()))?;
        // Chunk extensions after ';' are ignored.
        let size_field = line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| SquallError::Net("bad chunk size".to_string()))?;
        if size == 0 {
            break;
        }
        if out.len() + size > MAX_BODY_SIZE {
            return Err(SquallError::Net(
                "response body exceeds the 64 MB limit".to_string(),
            ));
        }

        let start = pos + i + 2;
        let end = start + size;
        if end > data.len() {
            // Truncated chunk; keep what arrived.
            out.extend_from_slice(&data[start..]);
            break;
        }
        out.extend_from_slice(&data[start..end]);
        // Skip past chunk data and its trailing \r\n. A body cut off
        // right at a chunk boundary has no trailing pair to skip.
        pos = (end + 2).min(data.len());
    }

    Ok(out)
}

/// Whether a status code is a redirect we should follow.
fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 307 | 308)
}

/// Find the position of a byte subsequence in a slice.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn url_parse_basic() {
        let url = Url::parse("http://example.com/files/data.bin").unwrap();
        assert_eq!(url.scheme, "http");
        assert_eq!(url.host, "example.com");
        assert_eq!(url.port, None);
        assert_eq!(url.path, "/files/data.bin");
        assert_eq!(url.query, None);
        assert_eq!(url.to_string(), "http://example.com/files/data.bin");
    }

    #[test]
    fn url_parse_port_query_fragment() {
        let url = Url::parse("https://host:8443/a?x=1&y=2#top").unwrap();
        assert_eq!(url.port, Some(8443));
        assert_eq!(url.path, "/a");
        assert_eq!(url.query.as_deref(), Some("x=1&y=2"));
        assert_eq!(url.fragment.as_deref(), Some("top"));
        assert_eq!(url.to_string(), "https://host:8443/a?x=1&y=2#top");
    }

    #[test]
    fn url_parse_defaults_empty_path() {
        let url = Url::parse("http://example.com").unwrap();
        assert_eq!(url.path, "/");
    }

    #[test]
    fn url_parse_lowercases_scheme() {
        let url = Url::parse("HTTP://example.com/X").unwrap();
        assert_eq!(url.scheme, "http");
        assert_eq!(url.path, "/X");
    }

    #[test]
    fn url_parse_rejects_malformed() {
        assert!(Url::parse("example.com/no-scheme").is_none());
        assert!(Url::parse("http://").is_none());
        assert!(Url::parse("://host/path").is_none());
        assert!(Url::parse("http://:80/path").is_none());
    }

    #[test]
    fn url_filename_takes_last_segment() {
        let url = Url::parse("http://h/files/report.pdf?session=1").unwrap();
        assert_eq!(url.filename(), "report.pdf");
    }

    #[test]
    fn url_filename_falls_back_for_bare_root() {
        let url = Url::parse("http://h/").unwrap();
        assert_eq!(url.filename(), "download.bin");
        let url = Url::parse("http://h/dir/").unwrap();
        assert_eq!(url.filename(), "download.bin");
    }

    #[test]
    fn url_resolve_variants() {
        let base = Url::parse("http://h:8080/a/b.html").unwrap();
        assert_eq!(
            base.resolve("https://other.example/x").unwrap(),
            Url::parse("https://other.example/x").unwrap(),
        );
        assert_eq!(
            base.resolve("/root.txt").unwrap(),
            Url::parse("http://h:8080/root.txt").unwrap(),
        );
        assert_eq!(
            base.resolve("c.html").unwrap(),
            Url::parse("http://h:8080/a/c.html").unwrap(),
        );
        assert!(base.resolve("").is_none());
    }

    #[test]
    fn parse_simple_response() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Content-Type: application/octet-stream\r\n\
                     Content-Length: 5\r\n\
                     \r\n\
                     hello, extra bytes ignored";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(
            find_header(&resp.headers, "content-type"),
            Some("application/octet-stream"),
        );
        // Body is trimmed to Content-Length.
        assert_eq!(resp.body, b"hello");
    }

    #[test]
    fn parse_response_without_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\neverything to eof";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.body, b"everything to eof");
    }

    #[test]
    fn parse_response_missing_terminator() {
        let err = parse_response(b"HTTP/1.1 200 OK\r\n").unwrap_err();
        assert!(err.to_string().contains("no header terminator"));
    }

    #[test]
    fn parse_chunked_response() {
        let raw = b"HTTP/1.1 200 OK\r\n\
                     Transfer-Encoding: chunked\r\n\
                     \r\n\
                     6\r\nsquall\r\n5\r\n rain\r\n0\r\n\r\n";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.body, b"squall rain");
    }

    #[test]
    fn decode_chunked_skips_extensions() {
        let out = decode_chunked(b"5;ext=val\r\nhello\r\n0\r\n\r\n").unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn decode_chunked_keeps_truncated_tail() {
        let out = decode_chunked(b"a\r\nhello").unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn decode_chunked_tolerates_cut_at_chunk_boundary() {
        // Stream ended exactly after the chunk data, before its \r\n.
        let out = decode_chunked(b"5\r\nhello").unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn status_line_parsing() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK").unwrap(), 200);
        assert_eq!(parse_status_line("HTTP/1.0 301 Moved").unwrap(), 301);
        assert!(parse_status_line("garbage").is_err());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers = vec![
            ("content-length".to_string(), "12".to_string()),
            ("location".to_string(), "/next".to_string()),
        ];
        assert_eq!(find_header(&headers, "Content-Length"), Some("12"));
        assert_eq!(find_header(&headers, "LOCATION"), Some("/next"));
        assert_eq!(find_header(&headers, "etag"), None);
    }

    #[test]
    fn content_length_cap_enforced() {
        let raw = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
            MAX_BODY_SIZE + 1,
        );
        let err = parse_response(raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("64 MB"));
    }

    #[test]
    fn is_redirect_codes() {
        assert!(is_redirect(301));
        assert!(is_redirect(302));
        assert!(is_redirect(307));
        assert!(is_redirect(308));
        assert!(!is_redirect(200));
        assert!(!is_redirect(404));
    }

    #[test]
    fn find_subsequence_works() {
        assert_eq!(find_subsequence(b"head\r\n\r\nbody", b"\r\n\r\n"), Some(4));
        assert_eq!(find_subsequence(b"no boundary", b"\r\n\r\n"), None);
    }

    #[test]
    fn unsupported_scheme_rejected() {
        let url = Url::parse("ftp://example.com/file").unwrap();
        let err = get(&url).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[cfg(not(feature = "tls"))]
    #[test]
    fn https_rejected_without_tls() {
        let url = Url::parse("https://example.com/file").unwrap();
        let err = get(&url).unwrap_err();
        assert!(err.to_string().contains("'tls' feature"));
    }

    #[test]
    fn get_fetches_from_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 15\r\n\r\nsquall download",
            );
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/file.bin")).unwrap();
        let resp = get(&url).unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, b"squall download");
        let _ = handle.join();
    }

    #[test]
    fn get_follows_host_relative_redirect() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = std::thread::spawn(move || {
            let replies = [
                "HTTP/1.1 302 Found\r\nLocation: /final\r\nContent-Length: 0\r\n\r\n",
                "HTTP/1.1 200 OK\r\nContent-Length: 14\r\n\r\nafter redirect",
            ];
            for reply in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(reply.as_bytes());
            }
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/start")).unwrap();
        let resp = get(&url).unwrap();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.body, b"after redirect");
        let _ = handle.join();
    }
}
