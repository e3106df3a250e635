use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Context, Result};

/// Serves a loopback page and prints the header lines of every request it
/// receives, so the exact headers of a browser that can reach the booking
/// site can be transplanted into the fetch configuration. Runs until
/// interrupted.
pub(crate) fn run_capture_server(port: u16) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .with_context(|| format!("failed to bind capture server on 127.0.0.1:{port}"))?;

    println!("Capture server listening on http://127.0.0.1:{port}");
    println!("Open that address in the browser that can load the booking site.");
    println!("Each request's headers are printed below; stop with Ctrl-C.");
    println!();

    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                eprintln!("Warning: failed to accept connection: {err}");
                continue;
            }
        };

        let head = match read_request_head(&mut stream) {
            Ok(head) => head,
            Err(err) => {
                eprintln!("Warning: failed to read request: {err}");
                continue;
            }
        };

        if request_target(&head) == Some("/favicon.ico") {
            let _ = write_not_found(&mut stream);
            continue;
        }

        let headers = parse_header_lines(&head);
        println!("--- captured request headers ---");
        for (name, value) in &headers {
            println!("{name}: {value}");
        }
        println!();

        if let Err(err) = write_capture_page(&mut stream, &headers) {
            eprintln!("Warning: failed to write response: {err}");
        }
    }
    Ok(())
}

pub(crate) fn request_target(head: &str) -> Option<&str> {
    head.lines().next()?.split_whitespace().nth(1)
}

/// Header lines of a request head, in order. The request line is skipped and
/// malformed lines are ignored.
pub(crate) fn parse_header_lines(head: &str) -> Vec<(String, String)> {
    let mut lines = head.lines();
    let _request_line = lines.next();

    let mut headers = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }
    headers
}

fn read_request_head(stream: &mut TcpStream) -> std::io::Result<String> {
    stream.set_read_timeout(Some(Duration::from_millis(500)))?;
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

fn write_capture_page(stream: &mut TcpStream, headers: &[(String, String)]) -> std::io::Result<()> {
    let mut listing = String::new();
    for (name, value) in headers {
        listing.push_str(name);
        listing.push_str(": ");
        listing.push_str(value);
        listing.push('\n');
    }

    let body = format!(
        "<!DOCTYPE html><html><head><title>classwatch header capture</title></head>\
         <body><h1>Captured request headers</h1>\
         <p>These are the headers this browser just sent. The same lines were \
         printed on the classwatch console.</p>\
         <pre>{}</pre></body></html>",
        escape_html(&listing)
    );

    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )?;
    stream.write_all(body.as_bytes())?;
    stream.flush()
}

fn write_not_found(stream: &mut TcpStream) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )?;
    stream.flush()
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
