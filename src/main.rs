mod cli;
mod config;
mod error;
mod hosts;
mod picker;
mod ssh;
mod wizard;

use std::process::exit;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Args;
use config::{EnvDefaults, Profile, Settings};
use error::Result;
use picker::{Choosable, FuzzyFinder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(Args::parse()).await {
        Ok(code) => exit(code),
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    }
}

async fn run(args: Args) -> Result<i32> {
    let tool_dir = config::tool_dir()?;

    if args.init {
        wizard::run(&FuzzyFinder, &tool_dir)?;
        println!("saved sshpick config.");
        return Ok(0);
    }

    let profile = Profile::load(&tool_dir)?;
    let settings = Settings::resolve(&args, &profile.default, &EnvDefaults::from_env())?;
    settings.validate()?;

    // "user@web" in the query picks the login name and seeds the filter.
    let (query_user, filter) = cli::split_user_query(&args.query.join(" "));

    let candidates = hosts::load_choosables(&settings, &tool_dir).await?;
    let target = picker::choose(
        &FuzzyFinder,
        "which server to connect with ssh?",
        &filter,
        &candidates,
    )?;

    let ssh_args = ssh::build_args(&settings, &query_user, &target.value());

    if args.show_command {
        println!("{}", ssh::command_line(&ssh_args));
        return Ok(0);
    }
    ssh::run(&ssh_args)
}
