//! Wiring services with shared, protected and extended definitions.
//!
//! Run with: `cargo run --example service_wiring`

use pimple_container::{Container, ContainerError, Factory};
use std::sync::Arc;

struct SessionStorage {
    name: String,
}

struct Session {
    storage: Arc<SessionStorage>,
    flash: Vec<String>,
}

fn main() -> Result<(), ContainerError> {
    println!("=== pimple-container: Service Wiring ===\n");

    let c = Container::new();

    c.set_value("session.storage.name", "SESSION_ID".to_string());

    // One storage per container
    c.set(
        "session.storage",
        c.share(|c| {
            println!("   (building session storage)");
            Ok(SessionStorage {
                name: c.get_cloned("session.storage.name")?,
            })
        }),
    );

    // A fresh session on every get
    c.set_factory("session", |c| {
        Ok(Session {
            storage: c.get("session.storage")?,
            flash: Vec::new(),
        })
    });

    // A callable stored as-is
    c.set("id.generator", c.protect(|_| Ok(0x2au64)));

    println!("1. Resolving the session twice...");
    let first: Arc<Session> = c.get("session")?;
    let second: Arc<Session> = c.get("session")?;
    println!(
        "   same session: {}, same storage: {} ({})",
        Arc::ptr_eq(&first, &second),
        Arc::ptr_eq(&first.storage, &second.storage),
        first.storage.name
    );

    println!("\n2. Extending the session definition...");
    c.extend("session", |session: Arc<Session>, _| {
        let mut flash = session.flash.clone();
        flash.push("welcome back".to_string());
        Ok(Session {
            storage: session.storage.clone(),
            flash,
        })
    })?;
    let session: Arc<Session> = c.get("session")?;
    println!("   flash messages: {:?}", session.flash);

    println!("\n3. Using a protected callable...");
    let generator: Arc<Factory> = c.get("id.generator")?;
    let id = generator.call(&c)?;
    println!("   generated id: {:?}", id.downcast::<u64>().ok());

    println!("\n=== Example Complete ===");
    Ok(())
}
