pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "agrimall",
    about = "Agrimall recommendation operator CLI",
    long_about = "Prepare the storefront database and inspect recommendation output from the command line.",
    after_help = "Examples:\n  agrimall migrate\n  agrimall seed\n  agrimall recommend --user 1 --size 6\n  agrimall popular --page 1\n  agrimall doctor --human"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the demo storefront catalog and verify the seeded rows")]
    Seed,
    #[command(about = "Print personalised recommendations for a shopper as JSON")]
    Recommend {
        #[arg(long, help = "Shopper id; omit to get the popular list")]
        user: Option<i64>,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Number of products; 0 or less uses the configured default")]
        size: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Page index; negative values clamp to 0")]
        page: i64,
    },
    #[command(about = "Print the best-selling products as JSON")]
    Popular {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Number of products; 0 or less uses the configured default")]
        size: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, help = "Page index; negative values clamp to 0")]
        page: i64,
    },
    #[command(about = "Validate config, recommendation settings, and DB readiness")]
    Doctor {
        #[arg(long, help = "Print a plain checklist instead of the JSON outcome")]
        human: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Recommend { user, size, page } => commands::recommend::run(user, size, page),
        Command::Popular { size, page } => commands::recommend::run_popular(size, page),
        Command::Doctor { human } => commands::doctor::run(human),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn recommend_accepts_negative_paging_values() {
        let cli = Cli::try_parse_from(["agrimall", "recommend", "--user", "3", "--size", "-1", "--page", "-2"])
            .expect("arguments should parse");

        match cli.command {
            Command::Recommend { user, size, page } => {
                assert_eq!(user, Some(3));
                assert_eq!(size, -1);
                assert_eq!(page, -2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn popular_defaults_size_and_page_to_zero() {
        let cli = Cli::try_parse_from(["agrimall", "popular"]).expect("arguments should parse");
        assert!(matches!(cli.command, Command::Popular { size: 0, page: 0 }));
    }

    #[test]
    fn doctor_defaults_to_json_outcome() {
        let cli = Cli::try_parse_from(["agrimall", "doctor"]).expect("arguments should parse");
        assert!(matches!(cli.command, Command::Doctor { human: false }));

        let cli = Cli::try_parse_from(["agrimall", "doctor", "--human"]).expect("arguments should parse");
        assert!(matches!(cli.command, Command::Doctor { human: true }));
    }
}
