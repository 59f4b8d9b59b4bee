use crate::types::{Parameters, ParsedRequest};

/// Serialize a [`ParsedRequest`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability. The
/// attached session, if any, is not included.
pub fn format_json(request: &ParsedRequest, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a [`ParsedRequest`] in a human-readable debug format.
pub fn format_debug(request: &ParsedRequest) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== HTTP Request ===\n");
    out.push_str(&format!("Method:  {}\n", request.method()));
    out.push_str(&format!("URL:     {}\n", request.url()));
    out.push_str(&format!("Path:    {}\n", request.path()));
    if let Some(session) = request.session() {
        out.push_str(&format!("Session: {}\n", session.id()));
    }

    out.push_str(&format!("\n--- Headers ({}) ---\n", request.headers().len()));
    for header in request.headers() {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    out.push_str(&format!("\n--- Cookies ({}) ---\n", request.cookies().len()));
    for cookie in request.cookies() {
        out.push_str(&format!("  {}={}\n", cookie.name, cookie.value));
    }

    push_parameters(&mut out, "Query", request.query_parameters());
    push_parameters(&mut out, "Form", request.form_parameters());

    out.push_str("====================\n");
    out
}

fn push_parameters(out: &mut String, title: &str, parameters: &Parameters) {
    out.push_str(&format!("\n--- {title} ({}) ---\n", parameters.len()));
    for (name, value) in parameters.iter() {
        out.push_str(&format!("  {name} = {value}\n"));
    }
}

/// Render only the method, URL and headers.
pub fn format_summary(request: &ParsedRequest) -> String {
    let mut out = String::with_capacity(64 + request.headers().len() * 40);

    out.push_str(&format!("{} {}\n", request.method(), request.url()));

    for header in request.headers() {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }

    out
}
