// Command abbreviation matching for the leadpipe CLI

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands.iter()
        .filter(|cmd| cmd.to_lowercase().starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match.
/// Exact matches take precedence over prefix matches.
pub fn find_unique_command<'a>(prefix: &str, commands: &'a [&str]) -> Result<&'a str, Vec<&'a str>> {
    let prefix_lower = prefix.to_lowercase();
    if let Some(cmd) = commands.iter().find(|cmd| cmd.to_lowercase() == prefix_lower) {
        return Ok(*cmd);
    }

    let matches = find_matching_commands(prefix, commands);
    if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

pub const TOP_LEVEL_COMMANDS: &[&str] = &[
    "add", "list", "board", "show", "move", "edit", "delete", "select",
    "assign", "agents", "stats", "leaderboard",
];

pub const AGENTS_COMMANDS: &[&str] = &["add", "list"];

/// Subcommands accepted in lead-first form: `leadpipe <id> <subcommand>`
pub const LEAD_SUBCOMMANDS: &[&str] = &["show", "move", "edit", "delete"];

/// Get subcommands for a given top-level command
pub fn get_subcommands(command: &str) -> Option<&'static [&'static str]> {
    match command {
        "agents" => Some(AGENTS_COMMANDS),
        _ => None,
    }
}

fn is_word(arg: &str) -> bool {
    !arg.starts_with('-') && arg.parse::<i64>().is_err()
}

fn ambiguous(kind: &str, arg: &str, matches: &[&str]) -> String {
    format!("Ambiguous {} '{}'. Did you mean one of: {}?", kind, arg, matches.join(", "))
}

/// Expand command abbreviations in argument list.
///
/// Also normalizes the lead-first form `<id> <subcommand> ...` into
/// `<subcommand> <id> ...`. Anything that does not look like a command is
/// passed through for clap to judge.
pub fn expand_command_abbreviations(args: Vec<String>) -> Result<Vec<String>, String> {
    let Some(first) = args.first() else {
        return Ok(args);
    };

    if is_word(first) {
        let full_cmd = match find_unique_command(first, TOP_LEVEL_COMMANDS) {
            Ok(cmd) => cmd,
            Err(matches) if matches.is_empty() => return Ok(args),
            Err(matches) => return Err(ambiguous("command", first, &matches)),
        };

        let mut expanded = vec![full_cmd.to_string()];
        let mut rest = args[1..].iter();
        if let (Some(subcommands), Some(next)) = (get_subcommands(full_cmd), args.get(1)) {
            if is_word(next) {
                match find_unique_command(next, subcommands) {
                    Ok(sub) => expanded.push(sub.to_string()),
                    Err(matches) if matches.is_empty() => expanded.push(next.clone()),
                    Err(matches) => return Err(ambiguous("subcommand", next, &matches)),
                }
                rest.next();
            }
        }
        expanded.extend(rest.cloned());
        return Ok(expanded);
    }

    if first.parse::<i64>().is_ok() {
        if let Some(next) = args.get(1).filter(|a| !a.starts_with('-')) {
            match find_unique_command(next, LEAD_SUBCOMMANDS) {
                Ok(sub) => {
                    let mut expanded = vec![sub.to_string(), first.clone()];
                    expanded.extend(args[2..].iter().cloned());
                    return Ok(expanded);
                }
                Err(matches) if !matches.is_empty() => {
                    return Err(ambiguous("lead subcommand", next, &matches));
                }
                Err(_) => {}
            }
        }
    }

    Ok(args)
}
