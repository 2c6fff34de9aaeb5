//! Per-request logging side effect.

use axum::{extract::Request, middleware::Next, response::Response};

/// Request line plus headers, one per line.
pub fn describe<B>(request: &Request<B>) -> String {
    let mut out = format!(
        "{} {} {:?}\r\n",
        request.method(),
        request.uri(),
        request.version()
    );
    for (name, value) in request.headers() {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(value.to_str().unwrap_or("<binary>"));
        out.push_str("\r\n");
    }
    out
}

/// Middleware: log the incoming request, then pass it on untouched.
pub async fn log_request(request: Request, next: Next) -> Response {
    tracing::info!(
        target: "bookshelf::request",
        "Request Logged \n~~~~ \n{}~~~~",
        describe(&request)
    );

    next.run(request).await
}
