//! Basic usage example for pimple-container.
//!
//! Demonstrates:
//! - Storing parameters with `set_value()`
//! - Defining services with `set_factory()`
//! - Retrieving values with `get()` (returns `Arc<T>`) and `get_cloned()` (returns `T`)
//! - Checking and removing definitions with `exists()` and `unset()`
//!
//! Run with: `cargo run --example basic_usage`

use pimple_container::Container;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    name: String,
    version: u32,
    debug_mode: bool,
}

fn main() {
    println!("=== pimple-container: Basic Usage ===\n");

    let c = Container::new();

    // -------------------------------------------------------------------------
    // 1. Parameters
    // -------------------------------------------------------------------------
    println!("1. Storing parameters...");

    c.set_value("app.name", "MyApp".to_string());
    c.set_value("app.version", 1u32);
    c.set_value("app.debug", true);

    println!("   Stored: app.name, app.version, app.debug");

    // -------------------------------------------------------------------------
    // 2. A service built from parameters
    // -------------------------------------------------------------------------
    println!("\n2. Defining a service...");

    c.set_factory("app.config", |c| {
        Ok(AppConfig {
            name: c.get_cloned("app.name")?,
            version: c.get_cloned("app.version")?,
            debug_mode: c.get_cloned("app.debug")?,
        })
    });

    println!("   Defined: app.config (built on every get)");

    // -------------------------------------------------------------------------
    // 3. Existence checks
    // -------------------------------------------------------------------------
    println!("\n3. Checking definitions with exists()...");

    println!("   exists(\"app.name\")   = {}", c.exists("app.name"));
    println!("   exists(\"app.config\") = {}", c.exists("app.config"));
    println!("   exists(\"app.db\")     = {}", c.exists("app.db"));

    // -------------------------------------------------------------------------
    // 4. Retrieval
    // -------------------------------------------------------------------------
    println!("\n4. Retrieving values...");

    let name: Arc<String> = c.get("app.name").unwrap();
    let cfg: AppConfig = c.get_cloned("app.config").unwrap();

    println!("   app.name:   {}", name);
    println!("   app.config: {:?}", cfg);

    // -------------------------------------------------------------------------
    // 5. Missing identifiers
    // -------------------------------------------------------------------------
    println!("\n5. Handling missing identifiers...");

    match c.get::<String>("app.db") {
        Ok(value) => println!("   Found app.db: {}", value),
        Err(e) => println!("   Error (expected): {}", e),
    }

    c.unset("app.debug");
    match c.get::<AppConfig>("app.config") {
        Ok(value) => println!("   Found app.config: {:?}", value),
        Err(e) => println!("   Error after unset (expected): {}", e),
    }

    println!("\n=== Example Complete ===");
    println!("Defined identifiers: {:?}", c.keys());
}
