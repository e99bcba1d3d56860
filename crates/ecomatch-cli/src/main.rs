mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ecomatch_core::{
    load_roster, parse_default_radius_km, Anchor, Coordinate, RadiusPolicy, Roster,
    DEFAULT_RADIUS_KM,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ecomatch-cli")]
#[command(about = "Match volunteers to nearby tasks")]
struct Cli {
    /// Roster file with users and tasks.
    #[arg(
        long,
        global = true,
        env = "ECOMATCH_ROSTER_PATH",
        default_value = "./config/roster.yaml"
    )]
    roster: PathBuf,

    /// What to do with a missing or non-positive radius.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "ECOMATCH_RADIUS_POLICY",
        default_value = "reject"
    )]
    radius_policy: PolicyArg,

    /// Substitute radius in kilometers under `--radius-policy fallback`.
    #[arg(
        long,
        global = true,
        env = "ECOMATCH_DEFAULT_RADIUS_KM",
        default_value_t = DEFAULT_RADIUS_KM,
        value_parser = parse_radius_arg
    )]
    default_radius: f64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Fail on a missing or non-positive radius.
    Reject,
    /// Use `--default-radius` instead.
    Fallback,
}

fn parse_radius_arg(raw: &str) -> Result<f64, String> {
    parse_default_radius_km(raw).map_err(|e| e.to_string())
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find roster users near an arbitrary point.
    Match {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Catchment radius in kilometers.
        #[arg(long, allow_negative_numbers = true)]
        radius: Option<f64>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Inspect tasks and the users near them.
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Roster file maintenance.
    Roster {
        #[command(subcommand)]
        command: RosterCommands,
    },
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    /// List every task with its anchor.
    List,
    /// Users within a task's radius, nearest first.
    Matches {
        task_id: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
enum RosterCommands {
    /// Validate the roster file and print a summary.
    Check,
}

impl Cli {
    fn radius_policy(&self) -> RadiusPolicy {
        match self.radius_policy {
            PolicyArg::Reject => RadiusPolicy::Reject,
            PolicyArg::Fallback => RadiusPolicy::Fallback(self.default_radius),
        }
    }

    fn load_roster(&self) -> anyhow::Result<Roster> {
        load_roster(&self.roster, self.radius_policy())
            .with_context(|| format!("loading roster from {}", self.roster.display()))
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Some(Commands::Match {
            lat,
            lon,
            radius,
            json,
        }) => {
            let roster = cli.load_roster()?;
            let center = Coordinate::new(*lat, *lon).context("invalid --lat/--lon")?;
            let anchor =
                Anchor::resolve(center, *radius, cli.radius_policy()).context("invalid --radius")?;
            let matches = roster.matches_for_anchor(&anchor);
            tracing::debug!(anchor = %center, matched = matches.len(), "ad-hoc match");
            print_matches(&matches, *json)?;
        }
        Some(Commands::Task {
            command: TaskCommands::List,
        }) => {
            let roster = cli.load_roster()?;
            print!("{}", report::render_tasks(roster.tasks()));
        }
        Some(Commands::Task {
            command: TaskCommands::Matches { task_id, json },
        }) => {
            let roster = cli.load_roster()?;
            let matches = roster
                .matches_for_task(task_id)
                .with_context(|| format!("unknown task '{task_id}'"))?;
            print_matches(&matches, *json)?;
        }
        Some(Commands::Roster {
            command: RosterCommands::Check,
        }) => {
            let roster = cli.load_roster()?;
            println!(
                "{}: {} users, {} tasks; ok",
                cli.roster.display(),
                roster.users().len(),
                roster.tasks().len()
            );
        }
        None => println!("ecomatch-cli: run with --help for commands"),
    }

    Ok(())
}

fn print_matches(
    matches: &[ecomatch_core::Match<&ecomatch_core::RosterUser>],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", report::matches_json(matches)?);
    } else {
        print!("{}", report::render_matches(matches));
    }
    Ok(())
}
