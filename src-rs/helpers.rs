use std::env;
use std::str::FromStr;

fn load_keys_from_env(primary: &str, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Ok(raw) = env::var(primary) {
        for item in raw.split(',') {
            let trimmed = item.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    for idx in 2..=10 {
        let key = format!("{}_{}", prefix, idx);
        if let Ok(value) = env::var(&key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                keys.push(trimmed.to_string());
            }
        }
    }
    keys
}

/// Seed keys from `ROTATOR_API_KEY` (comma separated) and `ROTATOR_API_KEY_2..=10`.
pub fn load_seed_keys() -> Vec<String> {
    load_keys_from_env("ROTATOR_API_KEY", "ROTATOR_API_KEY")
}

pub fn env_or(key: &str, fallback: String) -> String {
    env_opt(key).unwrap_or(fallback)
}

pub fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

pub fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.trim().parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

pub fn env_parse<T: FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

/// Shortens a key for log output: first four and last two characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}…{}", head, tail)
}
