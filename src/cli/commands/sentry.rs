use crate::config::{DEFAULT_TRACES_SAMPLE_RATE, SentrySettings};
use clap::{Arg, ArgMatches, Command};

pub const ARG_SENTRY_DSN: &str = "sentry-dsn";
pub const ARG_SENTRY_TRACES_SAMPLE_RATE: &str = "sentry-traces-sample-rate";
pub const ARG_NODE_ENV: &str = "node-env";

#[must_use]
pub fn parse(matches: &ArgMatches) -> SentrySettings {
    SentrySettings {
        dsn: super::non_empty(matches, ARG_SENTRY_DSN),
        traces_sample_rate: matches
            .get_one::<f32>(ARG_SENTRY_TRACES_SAMPLE_RATE)
            .copied()
            .unwrap_or(DEFAULT_TRACES_SAMPLE_RATE),
    }
}

#[must_use]
pub fn node_env(matches: &ArgMatches) -> Option<String> {
    super::non_empty(matches, ARG_NODE_ENV)
}

fn validator_sample_rate(rate: &str) -> Result<f32, String> {
    let parsed = rate
        .parse::<f32>()
        .map_err(|e| format!("invalid sample rate: {e}"))?;
    if (0.0..=1.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err("sample rate must be between 0.0 and 1.0".to_string())
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_NODE_ENV)
                .long(ARG_NODE_ENV)
                .help("Runtime environment name; `production` disables debug telemetry")
                .env("NODE_ENV")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SENTRY_DSN)
                .long(ARG_SENTRY_DSN)
                .help("Sentry DSN; error reporting is disabled when unset")
                .env("SENTRY_DSN")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SENTRY_TRACES_SAMPLE_RATE)
                .long(ARG_SENTRY_TRACES_SAMPLE_RATE)
                .help("Fraction of transactions sent to Sentry (0.0 - 1.0)")
                .env("SENTRY_TRACES_SAMPLE_RATE")
                .default_value("1.0")
                .global(true)
                .value_parser(validator_sample_rate),
        )
}

#[cfg(test)]
mod tests {
    use super::validator_sample_rate;

    #[test]
    fn sample_rate_bounds() {
        assert_eq!(validator_sample_rate("0.25"), Ok(0.25));
        assert_eq!(validator_sample_rate("1"), Ok(1.0));
        assert!(validator_sample_rate("1.5").is_err());
        assert!(validator_sample_rate("-0.1").is_err());
        assert!(validator_sample_rate("half").is_err());
    }
}
