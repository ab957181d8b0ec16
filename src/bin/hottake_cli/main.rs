//! hottake-cli: terminal client for the hottake feed.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod controller;
mod print;
mod session;
#[cfg(test)]
mod tests;

use std::io::{self, BufRead, Write};

use clap::Parser;

use args::{Cli, Commands, FeedCmd};
use client::{ApiClient, CliError, build_client_from_cli};
use controller::FeedController;
use hottake_api_types::SortMode;
use session::Session;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let api = build_client_from_cli(&cli)?;

    match cli.command {
        Commands::Post(cmd) => {
            let post = api.create_post(&cmd.title).await?;
            print::print_json(&post)?;
        }
        Commands::Show(cmd) => {
            let post = api.get_post(&cmd.id).await?;
            print::print_json(&post)?;
        }
        Commands::Feed(cmd) => {
            let session = Session::load_or_create(cli.session_file.clone())?;
            run_feed(api, session, &cmd).await?;
        }
    }

    Ok(())
}

async fn run_feed(api: ApiClient, session: Session, cmd: &FeedCmd) -> Result<(), CliError> {
    // Page 0 of the default sort stands in for the server-rendered initial
    // payload; mount reconciles it with the persisted preference.
    let initial = match api.list_posts(SortMode::default(), 0, None).await {
        Ok(page) => page,
        Err(err) => {
            notice(&err);
            Vec::new()
        }
    };

    let mut controller = FeedController::new(api, session);
    if let Err(err) = controller.mount(initial).await {
        notice(&err);
    }

    println!("sort by {}", controller.sort());
    render(&controller, cmd.json, 0)?;

    if let Some(pages) = cmd.pages {
        for _ in 1..pages {
            if !controller.has_more() {
                break;
            }
            let before = controller.posts().len();
            match controller.load_more().await {
                Ok(true) => render(&controller, cmd.json, before)?,
                Ok(false) => break,
                Err(err) => {
                    notice(&err);
                    break;
                }
            }
        }
        return Ok(());
    }

    let stdin = io::stdin();
    loop {
        print!("[enter] more · [s]ort · [q]uit > ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "q" => break,
            "s" => match controller.cycle_sort().await {
                Ok(mode) => {
                    // The feed started over; redraw from the top.
                    println!("sort by {mode}");
                    render(&controller, cmd.json, 0)?;
                }
                Err(err) => notice(&err),
            },
            "" => {
                let before = controller.posts().len();
                match controller.load_more().await {
                    Ok(true) => render(&controller, cmd.json, before)?,
                    Ok(false) => println!("(end of feed)"),
                    Err(err) => notice(&err),
                }
            }
            _ => println!("commands: enter = load more, s = cycle sort, q = quit"),
        }
    }

    Ok(())
}

fn render(controller: &FeedController, json: bool, from: usize) -> Result<(), CliError> {
    let posts = &controller.posts()[from..];
    if json {
        print::print_json(&posts)?;
    } else {
        for post in posts {
            println!("{}", print::post_line(post));
        }
    }
    Ok(())
}

/// Fetch failures surface as a non-blocking notice; the feed state is left
/// as it was.
fn notice(err: &CliError) {
    eprintln!("warning: {err}");
}
