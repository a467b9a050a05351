use std::io::{self, Write};

use crate::models::{CLIConfig, KeyListing, NotifyStats, SendResponse};

pub fn banner(cfg: &CLIConfig) {
    println!("Key Rotator Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Type a message to send it, /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                 Show commands");
    println!("  /exit | /quit          Exit");
    println!("  /keys                  List keys");
    println!("  /add <key>             Add a key");
    println!("  /remove <index>        Remove the key at index");
    println!("  /enable [on|off]       Toggle auto rotation");
    println!("  /stats                 Show connect notification stats");
    println!("  /config                Show current config");
    println!("  /base <url>            Update base URL");
}

pub fn keys(listing: &KeyListing) {
    println!("rotation: {}", if listing.enabled { "on" } else { "off" });
    if listing.keys.is_empty() {
        println!("no keys");
        return;
    }
    for (idx, key) in listing.keys.iter().enumerate() {
        let marker = if idx == listing.current_index { "*" } else { " " };
        println!("{} [{}] {}", marker, idx, key);
    }
}

pub fn send(resp: &SendResponse, debug: bool) {
    if let Some(err) = &resp.error {
        println!("error: {}", err);
        return;
    }
    if let Some(outcome) = &resp.outcome {
        let status = if resp.success && outcome.delivered { "sent" } else { "not sent" };
        match &outcome.active_key {
            Some(key) => println!("{}> {} (key: {})", status, outcome.message, key),
            None => println!("{}> {}", status, outcome.message),
        }
        if debug {
            println!("at: {}", outcome.sent_at);
        }
    }
}

pub fn stats(stats: &NotifyStats) {
    println!("connect notifications:");
    println!("  succeeded: {}", stats.succeeded);
    println!("  failed: {}", stats.failed);
    if let Some(key) = &stats.last_key {
        println!("  last key: {}", key);
    }
    if let Some(at) = &stats.last_outcome_at {
        println!("  last at: {}", at);
    }
    if let Some(err) = &stats.last_error {
        println!("  last error: {}", err);
    }
}

pub fn config(cfg: &CLIConfig, sent: usize) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  debug: {}", cfg.debug);
    println!("  sent this session: {}", sent);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
