//! Host-side helper: `cargo run [port]` builds the wasm package into
//! `static/pkg` and serves `static/` locally.
//!
//! The upload endpoints are provided by a separate server; this one only
//! hosts the page so presets can be tried against a local audio file.

use std::process::{self, Command};
use std::env;

const DEFAULT_PORT: u16 = 8000;

fn main() {
    let port = match env::args().nth(1).map(|p| p.parse::<u16>()) {
        None => DEFAULT_PORT,
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            eprintln!("invalid port: {e}");
            process::exit(2);
        }
    };

    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors");
            process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH; serving whatever is already in static/pkg");
        }
    }

    println!("Serving static/ at http://127.0.0.1:{port} …");
    let status = Command::new("python3")
        .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
        .status();
    match status {
        Ok(st) if st.success() => {}
        Ok(st) => process::exit(st.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            process::exit(1);
        }
    }
}
