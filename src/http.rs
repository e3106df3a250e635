use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const API_HOST: &str = "https://better-admin.org.uk";
pub(crate) const BOOKINGS_ORIGIN: &str = "https://bookings.better.org.uk";

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) fn dates_url(venue: &str, category: &str) -> String {
    format!("{API_HOST}/api/activities/venue/{venue}/activity-category/{category}/dates")
}

pub(crate) fn booking_page_url(venue: &str, category: &str) -> String {
    format!("{BOOKINGS_ORIGIN}/location/{venue}/{category}")
}

// The fixed set the site accepts; anything less tends to draw a 403 from the
// anti-bot layer. `probe` exists to re-check this when it stops working.
pub(crate) fn browser_headers(referer: &str) -> Vec<(&'static str, String)> {
    vec![
        ("User-Agent", USER_AGENT.to_string()),
        ("Accept", "application/json".to_string()),
        ("Accept-Language", "en-US,en;q=0.9".to_string()),
        ("Origin", BOOKINGS_ORIGIN.to_string()),
        ("Referer", referer.to_string()),
        (
            "sec-ch-ua",
            "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\""
                .to_string(),
        ),
        ("sec-ch-ua-mobile", "?0".to_string()),
        ("sec-ch-ua-platform", "\"Windows\"".to_string()),
        ("Sec-Fetch-Dest", "empty".to_string()),
        ("Sec-Fetch-Mode", "cors".to_string()),
        ("Sec-Fetch-Site", "cross-site".to_string()),
    ]
}

/// Single GET, no retry. Non-2xx statuses and transport failures are errors;
/// status errors carry a truncated body snippet for context.
pub(crate) fn get_text(url: &str, headers: &[(&'static str, String)]) -> Result<String, String> {
    let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();

    let mut request = agent.get(url);
    for (key, value) in headers {
        request = request.set(key, value);
    }

    match request.call() {
        Ok(response) => response
            .into_string()
            .map_err(|err| format!("request failed: response decode failed: {err}")),
        Err(ureq::Error::Status(status, response)) => {
            let response_body = response.into_string().ok().unwrap_or_default();
            let body = response_body.trim();
            if body.is_empty() {
                Err(format!("HTTP status {status}"))
            } else {
                let truncated = body.chars().take(240).collect::<String>();
                Err(format!("HTTP status {status} ({truncated})"))
            }
        }
        Err(ureq::Error::Transport(err)) => Err(format!("transport error: {err}")),
    }
}

/// Like `get_text`, but a completed exchange is never an error: returns the
/// status and body length even for non-2xx, so the probe can report blocks.
pub(crate) fn probe_status(
    url: &str,
    headers: &[(&'static str, String)],
) -> Result<(u16, usize), String> {
    let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();

    let mut request = agent.get(url);
    for (key, value) in headers {
        request = request.set(key, value);
    }

    match request.call() {
        Ok(response) => {
            let status = response.status();
            let body = response
                .into_string()
                .map_err(|err| format!("response decode failed: {err}"))?;
            Ok((status, body.len()))
        }
        Err(ureq::Error::Status(status, response)) => {
            let length = response.into_string().map(|body| body.len()).unwrap_or(0);
            Ok((status, length))
        }
        Err(ureq::Error::Transport(err)) => Err(format!("transport error: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    struct TestServer {
        base_url: String,
        requests: Arc<AtomicUsize>,
        captured: Arc<Mutex<Vec<String>>>,
        shutdown_tx: mpsc::Sender<()>,
        join_handle: Option<std::thread::JoinHandle<()>>,
    }

    impl TestServer {
        fn spawn(responses: Vec<(u16, String)>) -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind test server");
            listener.set_nonblocking(true).expect("set nonblocking");
            let addr = listener.local_addr().expect("local addr");

            let requests = Arc::new(AtomicUsize::new(0));
            let requests_clone = Arc::clone(&requests);
            let captured = Arc::new(Mutex::new(Vec::new()));
            let captured_clone = Arc::clone(&captured);
            let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
            let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

            let join_handle = std::thread::spawn(move || {
                loop {
                    if shutdown_rx.try_recv().is_ok() {
                        break;
                    }

                    match listener.accept() {
                        Ok((mut stream, _)) => {
                            requests_clone.fetch_add(1, Ordering::SeqCst);
                            let (status, body) = {
                                let mut queue = queue.lock().expect("lock responses");
                                queue
                                    .pop_front()
                                    .unwrap_or_else(|| (200, "default-ok".to_string()))
                            };
                            if let Ok(head) = read_request_head(&mut stream) {
                                captured_clone.lock().expect("lock captured").push(head);
                            }
                            let _ = write_response(&mut stream, status, &body);
                        }
                        Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                            std::thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            });

            Self {
                base_url: format!("http://{addr}"),
                requests,
                captured,
                shutdown_tx,
                join_handle: Some(join_handle),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn captured_requests(&self) -> Vec<String> {
            self.captured.lock().expect("lock captured").clone()
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            let _ = self.shutdown_tx.send(());
            if let Some(handle) = self.join_handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn read_request_head(stream: &mut TcpStream) -> std::io::Result<String> {
        stream.set_read_timeout(Some(Duration::from_millis(200)))?;
        let mut buf = [0_u8; 1024];
        let mut data = Vec::new();
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => {
                    data.extend_from_slice(&buf[..read]);
                    if data.windows(4).any(|window| window == b"\r\n\r\n") {
                        break;
                    }
                }
                Err(err)
                    if err.kind() == std::io::ErrorKind::WouldBlock
                        || err.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
        let reason = match status {
            200 => "OK",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Status",
        };
        let payload = body.as_bytes();
        write!(
            stream,
            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            payload.len()
        )?;
        stream.write_all(payload)?;
        stream.flush()
    }

    #[test]
    fn get_text_returns_body_and_sends_browser_header_set() {
        let server = TestServer::spawn(vec![(200, "{\"data\":[]}".to_string())]);

        let body = get_text(
            &server.base_url,
            &browser_headers("https://example.test/page"),
        )
        .expect("request should succeed");

        assert_eq!(body, "{\"data\":[]}");
        let captured = server.captured_requests();
        assert_eq!(captured.len(), 1);
        let head = &captured[0];
        assert!(head.contains("User-Agent: Mozilla/5.0"), "missing UA: {head}");
        assert!(
            head.contains(&format!("Origin: {BOOKINGS_ORIGIN}")),
            "missing Origin: {head}"
        );
        assert!(
            head.contains("Referer: https://example.test/page"),
            "missing Referer: {head}"
        );
        assert!(head.contains("Sec-Fetch-Mode: cors"), "missing fetch metadata: {head}");
    }

    #[test]
    fn get_text_fails_on_403_without_retrying() {
        let server = TestServer::spawn(vec![(403, "blocked".to_string())]);

        let err = get_text(&server.base_url, &[]).expect_err("403 should be an error");

        assert!(
            err.contains("HTTP status 403") && err.contains("blocked"),
            "unexpected error message: {err}"
        );
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn get_text_fails_on_500_without_retrying() {
        let server = TestServer::spawn(vec![(500, String::new())]);

        let err = get_text(&server.base_url, &[]).expect_err("500 should be an error");

        assert_eq!(err, "HTTP status 500");
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn probe_status_reports_non_2xx_as_a_completed_exchange() {
        let server = TestServer::spawn(vec![(403, "blocked".to_string())]);

        let (status, length) =
            probe_status(&server.base_url, &[]).expect("exchange completed");

        assert_eq!(status, 403);
        assert_eq!(length, "blocked".len());
    }

    #[test]
    fn dates_url_formats_venue_and_category() {
        assert_eq!(
            dates_url("hough-end-leisure-centre", "fitness-classes"),
            "https://better-admin.org.uk/api/activities/venue/hough-end-leisure-centre/activity-category/fitness-classes/dates"
        );
    }

    #[test]
    fn booking_page_url_points_at_the_public_site() {
        assert_eq!(
            booking_page_url("hough-end-leisure-centre", "fitness-classes"),
            "https://bookings.better.org.uk/location/hough-end-leisure-centre/fitness-classes"
        );
    }
}
