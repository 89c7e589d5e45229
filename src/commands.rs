/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "repos",
    aliases: &["r", "repo", "repositories"],
    description: "Your repositories",
  },
  Command {
    name: "issues",
    aliases: &["i", "issue"],
    description: "Issues of OWNER/NAME",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit gh9s",
  },
];

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
  Repositories,
  Issues { owner: String, name: String },
  Quit,
}

/// Get autocomplete suggestions for a given input
///
/// Only the first word is matched; arguments are ignored.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input
    .split_whitespace()
    .next()
    .unwrap_or("")
    .to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0));
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve a submitted line to an invocation.
///
/// `default_repository` is used by `issues` without an argument.
pub fn parse(line: &str, default_repository: Option<&str>) -> Result<Invocation, String> {
  let mut words = line.split_whitespace();
  let Some(head) = words.next() else {
    return Err("empty command".to_string());
  };
  let cmd = get_suggestions(head)
    .into_iter()
    .next()
    .ok_or_else(|| format!("unknown command: {}", head))?;

  match cmd.name {
    "repos" => Ok(Invocation::Repositories),
    "quit" => Ok(Invocation::Quit),
    "issues" => {
      let target = words
        .next()
        .or(default_repository)
        .ok_or_else(|| "usage: issues OWNER/NAME".to_string())?;
      let (owner, name) = crate::config::parse_repository(target).map_err(|e| e.to_string())?;
      Ok(Invocation::Issues { owner, name })
    }
    other => Err(format!("unknown command: {}", other)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("issues");
    assert_eq!(suggestions[0].name, "issues");
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(get_suggestions("i")[0].name, "issues");
    assert_eq!(get_suggestions("r")[0].name, "repos");
  }

  #[test]
  fn test_prefix_match() {
    assert_eq!(get_suggestions("iss")[0].name, "issues");
  }

  #[test]
  fn test_fuzzy_match() {
    assert_eq!(get_suggestions("sue")[0].name, "issues");
  }

  #[test]
  fn test_arguments_do_not_affect_suggestions() {
    assert_eq!(get_suggestions("issues rust-lang/rust")[0].name, "issues");
  }

  #[test]
  fn test_parse_issues_with_argument() {
    assert_eq!(
      parse("issues rust-lang/rust", None),
      Ok(Invocation::Issues {
        owner: "rust-lang".to_string(),
        name: "rust".to_string()
      })
    );
  }

  #[test]
  fn test_parse_issues_falls_back_to_default() {
    assert_eq!(
      parse("i", Some("octo/hello")),
      Ok(Invocation::Issues {
        owner: "octo".to_string(),
        name: "hello".to_string()
      })
    );
    assert!(parse("issues", None).is_err());
    assert!(parse("issues nope", None).is_err());
  }

  #[test]
  fn test_parse_other_commands() {
    assert_eq!(parse("repos", None), Ok(Invocation::Repositories));
    assert_eq!(parse("exit", None), Ok(Invocation::Quit));
    assert!(parse("zzz", None).is_err());
    assert!(parse("  ", None).is_err());
  }
}
