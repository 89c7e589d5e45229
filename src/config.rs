use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub github: GithubConfig,
  /// Number of items requested per page
  #[serde(default = "default_page_size")]
  pub page_size: u32,
  /// Repository opened at startup, as `owner/name`
  pub default_repository: Option<String>,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
  /// GraphQL endpoint
  #[serde(default = "default_endpoint")]
  pub url: String,
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      url: default_endpoint(),
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      github: GithubConfig::default(),
      page_size: DEFAULT_PAGE_SIZE,
      default_repository: None,
      title: None,
    }
  }
}

fn default_endpoint() -> String {
  DEFAULT_ENDPOINT.to_string()
}

fn default_page_size() -> u32 {
  DEFAULT_PAGE_SIZE
}

impl GithubConfig {
  pub fn endpoint(&self) -> Result<Url> {
    Url::parse(&self.url).map_err(|e| eyre!("Invalid GitHub endpoint '{}': {}", self.url, e))
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./gh9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/gh9s/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("gh9s.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("gh9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is valid YAML null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    if config.page_size == 0 {
      return Err(eyre!("page_size must be at least 1"));
    }
    Ok(config)
  }

  /// Split `default_repository` into owner and name.
  pub fn default_repository(&self) -> Option<Result<(String, String)>> {
    self.default_repository.as_deref().map(parse_repository)
  }

  /// Get the GitHub token from environment variables.
  ///
  /// Checks GH9S_GITHUB_TOKEN first, then GITHUB_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    token_from(|name| std::env::var(name).ok())
  }
}

fn token_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
  ["GH9S_GITHUB_TOKEN", "GITHUB_TOKEN"]
    .into_iter()
    .filter_map(|name| lookup(name))
    .find(|token| !token.trim().is_empty())
    .ok_or_else(|| {
      eyre!("GitHub token not found. Set GH9S_GITHUB_TOKEN or GITHUB_TOKEN environment variable.")
    })
}

/// Parse `owner/name`.
pub fn parse_repository(input: &str) -> Result<(String, String)> {
  match input.trim().split_once('/') {
    Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
      Ok((owner.to_string(), name.to_string()))
    }
    _ => Err(eyre!("Expected a repository as OWNER/NAME, got '{}'", input)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn test_defaults_from_empty_file() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.github.url, DEFAULT_ENDPOINT);
    assert_eq!(config.page_size, 5);
    assert!(config.default_repository.is_none());
  }

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(
      "github:\n  url: https://ghe.example.com/api/graphql\npage_size: 20\ndefault_repository: rust-lang/rust\ntitle: Work\n",
    )
    .unwrap();
    assert_eq!(config.page_size, 20);
    assert_eq!(config.title.as_deref(), Some("Work"));
    assert_eq!(
      config.github.endpoint().unwrap().host_str(),
      Some("ghe.example.com")
    );
    let (owner, name) = config.default_repository().unwrap().unwrap();
    assert_eq!((owner.as_str(), name.as_str()), ("rust-lang", "rust"));
  }

  #[test]
  fn test_zero_page_size_rejected() {
    assert!(Config::parse("page_size: 0\n").is_err());
  }

  #[test]
  fn test_invalid_endpoint() {
    let config = Config::parse("github:\n  url: not a url\n").unwrap();
    assert!(config.github.endpoint().is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/gh9s.yaml"))).is_err());
  }

  #[test]
  fn test_token_lookup_order() {
    let env: HashMap<&str, String> = [
      ("GH9S_GITHUB_TOKEN", "primary".to_string()),
      ("GITHUB_TOKEN", "fallback".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(token_from(|n| env.get(n).cloned()).unwrap(), "primary");

    let fallback_only = |n: &str| (n == "GITHUB_TOKEN").then(|| "fallback".to_string());
    assert_eq!(token_from(fallback_only).unwrap(), "fallback");

    let blank = |n: &str| (n == "GH9S_GITHUB_TOKEN").then(String::new);
    assert!(token_from(blank).is_err());
  }

  #[test]
  fn test_parse_repository() {
    assert_eq!(
      parse_repository("octo/hello").unwrap(),
      ("octo".to_string(), "hello".to_string())
    );
    assert!(parse_repository("octo").is_err());
    assert!(parse_repository("/hello").is_err());
    assert!(parse_repository("a/b/c").is_err());
  }
}
