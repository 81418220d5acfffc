//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `daymark_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use daymark_core::db::migrations::latest_version;
use daymark_core::db::open_db_in_memory;

fn main() {
    println!("daymark_core version={}", daymark_core::core_version());
    match open_db_in_memory() {
        Ok(_) => println!("daymark_core schema_version={}", latest_version()),
        Err(err) => {
            eprintln!("daymark_core db bootstrap failed: {err}");
            std::process::exit(1);
        }
    }
}
