//! TESSERA - Interactive Shell
//! Stores JSON values in a journaled, quota-constrained file store.

use std::io::{self, BufRead, Write};

use tessera::codec::ZstdBase64Codec;
use tessera::config::Config;
use tessera::manager::SyncManager;
use tessera::store::{FileStore, StoreAdapter};
use tessera::types::{KeySelector, StoredValue};

#[tokio::main]
async fn main() {
    env_logger::init();

    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║              TESSERA Store                ║");
    println!("  ║    Chunked Quota-Constrained Storage      ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!();
    println!("  Commands:");
    println!("    set <key> <json>   - Store a JSON value (clears the store first)");
    println!("    get <key>          - Retrieve a value by key");
    println!("    raw                - List stored segments and count markers");
    println!("    info               - Show quota usage and statistics");
    println!("    exit               - Shutdown");
    println!();

    let config = Config::default();
    let store = match FileStore::open(&config) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("[ERROR] Failed to open store: {}", err);
            std::process::exit(1);
        }
    };
    let manager = match SyncManager::new(store, ZstdBase64Codec::from_config(&config)) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("[ERROR] {}", err);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("tessera> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0].to_lowercase().as_str() {
            "set" | "put" => {
                if parts.len() < 3 {
                    println!("  Usage: set <key> <json>");
                    continue;
                }
                let raw = parts[2..].join(" ");
                let value: serde_json::Value = match serde_json::from_str(&raw) {
                    Ok(v) => v,
                    // Bare words are stored as JSON strings.
                    Err(_) => serde_json::Value::String(raw),
                };
                match manager.set(parts[1], &value).await {
                    Ok(()) => println!("  OK"),
                    Err(e) => println!("  ERROR: {}", e),
                }
            }
            "get" => {
                if parts.len() < 2 {
                    println!("  Usage: get <key>");
                    continue;
                }
                match manager.get::<serde_json::Value>(parts[1]).await {
                    Ok(Some(value)) => println!("  {}", value),
                    Ok(None) => println!("  (nil)"),
                    Err(e) => println!("  ERROR: {}", e),
                }
            }
            "raw" | "scan" => match manager.store().get(KeySelector::All).await {
                Ok(entries) if entries.is_empty() => println!("  (empty)"),
                Ok(entries) => {
                    for (key, value) in &entries {
                        match value {
                            StoredValue::Count(n) => println!("  {} -> count {}", key, n),
                            StoredValue::Segment(s) => {
                                println!("  {} -> {} bytes", key, s.len())
                            }
                        }
                    }
                    println!("  ({} items)", entries.len());
                }
                Err(e) => println!("  ERROR: {}", e),
            },
            "info" | "stats" => {
                let quota = manager.store().quota();
                match manager.store().bytes_in_use().await {
                    Ok(used) => println!("  Bytes in use:  {} / {}", used, quota.total_bytes),
                    Err(e) => println!("  ERROR: {}", e),
                }
                println!("  Items:         {} / {}", manager.store().len(), quota.max_items);
                println!("  Per item:      {} bytes", quota.bytes_per_item);
                println!("{}", manager.metrics().report());
            }
            "exit" | "quit" | "q" => {
                println!("  Shutting down TESSERA...");
                break;
            }
            _ => {
                println!("  Unknown command: '{}'. Type 'exit' to quit.", parts[0]);
            }
        }
    }
}
