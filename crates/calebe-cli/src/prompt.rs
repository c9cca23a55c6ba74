//! Interactive terminal prompts.

use std::io::{self, BufRead, Write};

use anyhow::Result;

/// Ask for a line of input, offering `default` when the answer is empty
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(resolve_answer(&input, default))
}

fn resolve_answer(input: &str, default: Option<&str>) -> String {
    let input = input.trim();
    match default {
        Some(default) if input.is_empty() => default.to_string(),
        _ => input.to_string(),
    }
}

pub fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

/// Ask a yes/no question, `no` unless the answer starts with y
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} [y/N]", question), None)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
}
