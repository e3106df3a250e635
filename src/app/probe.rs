use anyhow::Result;

use crate::http;

pub(crate) struct ProbeCase {
    pub(crate) description: &'static str,
    pub(crate) headers: Vec<(&'static str, String)>,
}

pub(crate) fn probe_cases(referer: &str) -> Vec<ProbeCase> {
    vec![
        ProbeCase {
            description: "bare request (no custom headers)",
            headers: Vec::new(),
        },
        ProbeCase {
            description: "User-Agent only",
            headers: vec![("User-Agent", http::USER_AGENT.to_string())],
        },
        ProbeCase {
            description: "full browser header set",
            headers: http::browser_headers(referer),
        },
    ]
}

/// Tries each header configuration against the public page and the API
/// endpoint and reports what got through. Diagnostic only; always exits 0.
pub(crate) fn run_probe(venue: &str, category: &str) -> Result<()> {
    let page_url = http::booking_page_url(venue, category);
    let api_url = http::dates_url(venue, category);

    let mut working: Vec<String> = Vec::new();
    for url in [page_url.as_str(), api_url.as_str()] {
        println!("== {url}");
        for case in probe_cases(&page_url) {
            match http::probe_status(url, &case.headers) {
                Ok((status, length)) => {
                    println!(
                        "  {:<34} HTTP {status} ({length} bytes)",
                        case.description
                    );
                    if (200..300).contains(&status) {
                        working.push(format!("{} against {url}", case.description));
                    }
                }
                Err(err) => println!("  {:<34} {err}", case.description),
            }
        }
        println!();
    }

    if working.is_empty() {
        println!("No configuration got through.");
        println!("Run `classwatch capture` and open the printed address in a browser");
        println!("that can load the booking site to see the exact headers it sends.");
    } else {
        println!("Working configurations:");
        for entry in working {
            println!("  {entry}");
        }
    }
    Ok(())
}
