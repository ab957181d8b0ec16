#![deny(clippy::all, clippy::pedantic)]

use serde::Serialize;

use hottake_api_types::Post;

use crate::client::CliError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Server(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}

pub fn post_line(post: &Post) -> String {
    format!(
        "{}  ▲{:<4} ▼{:<4} {}",
        post.date.date(),
        post.agree.len(),
        post.disagree.len(),
        post.title
    )
}
