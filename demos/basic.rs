//! Minimal zonal example — the time-zone resolver wrapped around one handler.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl -b 'dummy.time_zone=Europe/Paris' http://localhost:3000/
//!   curl -b 'dummy.time_zone=Asia/Hong_Kong' http://localhost:3000/

use zonal::middleware::TimeZoneResolver;
use zonal::{Request, Response, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // No .map(...) — the bundled `locale` table resolves the cookie value.
    let app = TimeZoneResolver::builder()
        .default_tz("Etc/UTC")
        .default_display("UTC")
        .wrap(hello);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

async fn hello(req: Request) -> Response {
    let tz = req.context().get("dummy.time_zone").unwrap_or("unknown");
    Response::text(format!("your time zone: {tz}\n"))
}
