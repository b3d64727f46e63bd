use crate::cli::actions::Action;
use crate::cli::commands::gate::Options;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        options: Options::parse(matches)?,
    })
}
