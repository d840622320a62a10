pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed JSON input from `--input <file>` or piped stdin.
pub fn read_typed<T: DeserializeOwned>(
    path: Option<&str>,
    context: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_json(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json> or stdin required for {context}").into())
    }
}
