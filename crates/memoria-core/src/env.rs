//! Environment variable handling.

use std::env;
use std::path::Path;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Load `KEY=value` pairs from a dotenv file without overriding variables
/// that are already set. Missing files are ignored.
pub fn load_dotenv(path: &Path) -> Result<usize, std::io::Error> {
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let mut loaded = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(&key, value);
            loaded += 1;
        }
    }
    Ok(loaded)
}

/// Parse dotenv content into key/value pairs.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Environment variable names Memoria reads.
pub mod vars {
    /// Memoria home directory override.
    pub const MEMORIA_HOME: &str = "MEMORIA_HOME";

    /// Memoria config file override.
    pub const MEMORIA_CONFIG: &str = "MEMORIA_CONFIG";

    /// Memoria log filter.
    pub const MEMORIA_LOG: &str = "MEMORIA_LOG";

    /// Pinecone API key.
    pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";

    /// Pinecone index host (full URL).
    pub const PINECONE_HOST: &str = "PINECONE_HOST";

    /// Pinecone index name.
    pub const PINECONE_INDEX: &str = "PINECONE_INDEX";

    /// Pinecone environment (e.g. `us-east-1-aws`).
    pub const PINECONE_ENVIRONMENT: &str = "PINECONE_ENVIRONMENT";

    /// API key for OpenAI.
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// Ollama server URL.
    pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";

    /// Ollama model.
    pub const OLLAMA_MODEL: &str = "OLLAMA_MODEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv() {
        let pairs = parse_dotenv(
            "# comment\n\nPINECONE_API_KEY=\"abc\"\nexport OLLAMA_MODEL='llama2'\nBARE=value\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("PINECONE_API_KEY".to_string(), "abc".to_string()),
                ("OLLAMA_MODEL".to_string(), "llama2".to_string()),
                ("BARE".to_string(), "value".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_dotenv_does_not_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "MEMORIA_TEST_DOTENV_KEEP=file\nMEMORIA_TEST_DOTENV_NEW=file\n")
            .unwrap();
        env::set_var("MEMORIA_TEST_DOTENV_KEEP", "process");

        let loaded = load_dotenv(&path).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(get_var("MEMORIA_TEST_DOTENV_KEEP").unwrap(), "process");
        assert_eq!(get_var("MEMORIA_TEST_DOTENV_NEW").unwrap(), "file");
    }

    #[test]
    fn test_load_dotenv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv(&dir.path().join("absent.env")).unwrap(), 0);
    }
}
