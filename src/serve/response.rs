//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::mime;
use super::RELOAD_JS_PATH;

/// Respond with a static file, injecting the reload script into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type, ws_port);

    send_body(request, 200, content_type, body)
}

/// Respond with a 404 page (custom `404.html` from the serve root, if any).
pub fn respond_not_found(request: Request, serve_root: &Path, ws_port: Option<u16>) -> Result<()> {
    let custom_404 = serve_root.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head_request(&request) {
        let content_type = if has_custom { mime::types::HTML } else { mime::types::PLAIN };
        return send_head(request, 404, content_type);
    }

    if has_custom
        && let Ok(body) = fs::read(&custom_404)
    {
        let body = maybe_inject_reload(body, mime::types::HTML, ws_port);
        return send_body(request, 404, mime::types::HTML, body);
    }

    send_body(request, 404, mime::types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, mime::types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the reload client script from memory.
pub fn respond_reload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = include_str!("../reload/client.js").replace("{{ws_port}}", &ws_port.to_string());
    send_body(request, 200, mime::types::JAVASCRIPT, body.into_bytes())
}

/// Inject the reload script tag if the content is HTML and live reload is on.
pub fn maybe_inject_reload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    match (content_type.starts_with("text/html"), ws_port) {
        (true, Some(_)) => inject_reload_script(&body),
        _ => body,
    }
}

/// Insert the script tag before `</body>`, or append when the tag is absent.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let script = format!("<script src=\"{RELOAD_JS_PATH}\"></script>");
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + script_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(script_bytes);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    // Static ASCII key/value pairs always parse
    Header::from_bytes(key, value).unwrap_or_else(|_| unreachable!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = maybe_inject_reload(html, mime::types::HTML, Some(35729));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("<script src=\"{RELOAD_JS_PATH}\"></script></body>")));
    }

    #[test]
    fn test_inject_appends_without_body_tag() {
        let html = b"<p>fragment</p>".to_vec();
        let out = maybe_inject_reload(html, mime::types::HTML, Some(35729));
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("</script>"));
    }

    #[test]
    fn test_no_injection_for_non_html() {
        let css = b"body { color: red; }".to_vec();
        let out = maybe_inject_reload(css.clone(), mime::types::CSS, Some(35729));
        assert_eq!(out, css);
    }

    #[test]
    fn test_no_injection_without_ws_port() {
        let html = b"<body></body>".to_vec();
        let out = maybe_inject_reload(html.clone(), mime::types::HTML, None);
        assert_eq!(out, html);
    }
}
