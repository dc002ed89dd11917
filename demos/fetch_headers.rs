use urlkit::{get_headers, Fetch, HeaderFormat, Headers, UrlComponents};

/// Stands in for a real HTTP client; answers with a canned redirect chain.
struct CannedClient;

impl Fetch for CannedClient {
    type Error = String;

    fn fetch_head(&mut self, url: &UrlComponents) -> Result<Vec<u8>, Self::Error> {
        match url.host() {
            Some("example.com") => Ok(b"HTTP/1.1 301 Moved Permanently\r\n\
                Location: https://www.example.com/\r\n\r\n\
                HTTP/1.1 200 OK\r\n\
                Content-Type: text/html; charset=UTF-8\r\n\
                Set-Cookie: a=1\r\n\
                Set-Cookie: b=2\r\n\r\n"
                .to_vec()),
            other => Err(format!("no route to {:?}", other)),
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut client = CannedClient;

    match get_headers(&mut client, "http://example.com/", HeaderFormat::Indexed) {
        Ok(Headers::Indexed(lines)) => {
            for (i, line) in lines.iter().enumerate() {
                println!("[{}] {}", i, line);
            }
        }
        Ok(other) => println!("unexpected shape: {:?}", other),
        Err(e) => println!("error: {}", e),
    }

    if let Ok(Headers::Keyed(map)) = get_headers(&mut client, "http://example.com/", HeaderFormat::Keyed) {
        println!("final status: {:?}", map.final_status());
        println!("content-type: {:?}", map.get("Content-Type"));
        println!("cookies:      {:?}", map.get_all("set-cookie"));
    }

    if let Err(e) = get_headers(&mut client, "http://unknown.test/", HeaderFormat::Indexed) {
        println!("error: {}", e);
    }
}
