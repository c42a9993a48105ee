use std::sync::OnceLock;

use regex::Regex;

/// `{{ env.VAR }}` or `{{ env.VAR | default("fallback") }}`
const PLACEHOLDER: &str = r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#;

fn placeholder() -> Result<&'static Regex, String> {
    static RE: OnceLock<Result<Regex, String>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Expand `{{ env.VAR }}` placeholders in raw config text
///
/// A `| default("...")` suffix supplies the value for an unset variable.
/// Comment lines are passed through untouched so a commented-out key never
/// requires its variable to be set.
pub fn expand_env(input: &str) -> Result<String, String> {
    let re = placeholder()?;

    let mut lines = Vec::new();
    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
        } else {
            lines.push(expand_line(re, line)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(re: &Regex, line: &str) -> Result<String, String> {
    let mut result = String::with_capacity(line.len());
    let mut last_end = 0;

    for captures in re.captures_iter(line) {
        let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        result.push_str(&line[last_end..whole.start()]);
        result.push_str(&resolve(key.as_str(), captures.get(2).map(|m| m.as_str()))?);
        last_end = whole.end();
    }

    result.push_str(&line[last_end..]);
    Ok(result)
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}
