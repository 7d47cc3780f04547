use serde::{Serialize, de::DeserializeOwned};
use sieve::config::SieveConfig;
use std::{fs, path::Path};

pub fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn load_config_or_exit(path: Option<&Path>) -> SieveConfig {
    SieveConfig::load_or_default(path).unwrap_or_else(|e| exit_with(e))
}

pub fn read_json_or_exit<T: DeserializeOwned>(path: &Path) -> T {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with(format!("failed to read '{}': {e}", path.display())));

    serde_json::from_str(&text)
        .unwrap_or_else(|e| exit_with(format!("invalid JSON in '{}': {e}", path.display())))
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => exit_with(e),
    }
}
