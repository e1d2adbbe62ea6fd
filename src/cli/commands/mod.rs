pub mod clerk;
pub mod firebase;
pub mod integrations;
pub mod logging;
pub mod sentry;
pub mod upstash;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgMatches, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const CMD_CHECK_CACHE: &str = "check-cache";
pub const CMD_CHECK_STORY: &str = "check-story";

/// Fetch a string argument, treating empty values (e.g. `FOO=""`) as unset.
pub(crate) fn non_empty(matches: &ArgMatches, id: &str) -> Option<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .filter(|v| !v.is_empty())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("taleweaver")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("3000")
                .env("PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .subcommand(
            Command::new(CMD_CHECK_CACHE)
                .about("Write, read back and delete a test key in the configured cache"),
        )
        .subcommand(
            Command::new(CMD_CHECK_STORY)
                .about("Generate a story for the built-in sample child through the engine"),
        );

    let command = clerk::with_args(command);
    let command = upstash::with_args(command);
    let command = firebase::with_args(command);
    let command = sentry::with_args(command);
    let command = integrations::with_args(command);
    logging::with_args(command)
}
