use std::io;

use crate::client::HTTPClient;
use crate::models::CLIConfig;
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
    pub sent: usize,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self {
            config,
            client,
            sent: 0,
        }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('/') {
                if self.handle_command(&line) {
                    break;
                }
                continue;
            }
            self.send(&line);
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        match parse_command(line) {
            Command::Exit => return true,
            Command::Help => render::help(),
            Command::Keys => self.show(self.client.list_keys()),
            Command::Add(key) => self.show(self.client.add_key(&key)),
            Command::Remove(Some(index)) => self.show(self.client.remove_key(index)),
            Command::Remove(None) => render::error("usage: /remove <index>"),
            Command::Enable(Some(flag)) => self.show(self.client.set_enabled(flag)),
            Command::Enable(None) => match self.client.list_keys() {
                Ok(listing) => self.show(self.client.set_enabled(!listing.enabled)),
                Err(err) => render::error(&err),
            },
            Command::Stats => match self.client.stats() {
                Ok(stats) => render::stats(&stats),
                Err(err) => render::error(&err),
            },
            Command::Config => render::config(&self.config, self.sent),
            Command::Base(None) => render::info(&format!("base: {}", self.config.base_url)),
            Command::Base(Some(url)) => {
                self.config.base_url = url;
                self.client = HTTPClient::new(&self.config.base_url);
                render::info("base url updated");
            }
            Command::Invalid(msg) => render::error(&msg),
            Command::Unknown => render::info("unknown command, type /help"),
        }
        false
    }

    fn show(&self, result: Result<crate::models::KeyListing, String>) {
        match result {
            Ok(listing) => render::keys(&listing),
            Err(err) => render::error(&err),
        }
    }

    fn send(&mut self, line: &str) {
        match self.client.send(line) {
            Ok(resp) => {
                self.sent += 1;
                render::send(&resp, self.config.debug);
            }
            Err(err) => render::error(&err),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Exit,
    Help,
    Keys,
    Add(String),
    Remove(Option<i64>),
    Enable(Option<bool>),
    Stats,
    Config,
    Base(Option<String>),
    Invalid(String),
    Unknown,
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("").trim_start_matches('/');
    let rest = parts.next().unwrap_or("").trim();
    match cmd {
        "exit" | "quit" => Command::Exit,
        "help" => Command::Help,
        "keys" | "list" => Command::Keys,
        "add" if rest.is_empty() => Command::Invalid("usage: /add <key>".to_string()),
        "add" => Command::Add(rest.to_string()),
        "remove" | "rm" => Command::Remove(rest.parse::<i64>().ok()),
        "enable" if rest.is_empty() => Command::Enable(None),
        "enable" => match parse_on_off(rest) {
            Some(flag) => Command::Enable(Some(flag)),
            None => Command::Invalid("invalid enable flag".to_string()),
        },
        "stats" => Command::Stats,
        "config" => Command::Config,
        "base" if rest.is_empty() => Command::Base(None),
        "base" => Command::Base(Some(rest.to_string())),
        _ => Command::Unknown,
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
