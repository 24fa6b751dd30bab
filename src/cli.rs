use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::models::TaskId;
use crate::planner::{Planner, PlannerError};
use crate::ratings::{MAX_RATING, MIN_RATING};
use crate::scheduler::FocusTicker;
use crate::storage::KeyValueStore;
use crate::time::{self, TimeOfDay, TimeParseError};

#[derive(Parser)]
#[command(name = "dayblock")]
#[command(about = "Plan today in time blocks, then focus on one at a time")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Keep state in memory only; nothing is read from or written to disk
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a block to today's schedule
    Add {
        /// Block title
        title: String,
        /// Start time (HH:MM, 24-hour)
        #[arg(long)]
        start: String,
        /// End time (HH:MM, 24-hour)
        #[arg(long)]
        end: String,
    },
    /// Print today's schedule
    List,
    /// Show what should be happening right now
    Now,
    /// Remove a block by id
    Remove {
        /// Block id as printed by `list`
        id: String,
    },
    /// Remove every block from today's schedule
    Clear,
    /// Rate today (1-10) and start over with an empty schedule
    Rate {
        #[arg(value_parser = clap::value_parser!(u8).range(MIN_RATING as i64..=MAX_RATING as i64))]
        rating: u8,
    },
    /// Show recent day ratings, newest first
    History {
        /// How many days to show (defaults to the configured history length)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("Invalid {field} time '{value}': {source}")]
    TimeParse {
        field: &'static str,
        value: String,
        #[source]
        source: TimeParseError,
    },
    #[error("No block with id '{0}'")]
    UnknownTask(String),
}

fn parse_time_arg(field: &'static str, value: &str) -> Result<TimeOfDay, CliError> {
    value.parse().map_err(|source| CliError::TimeParse {
        field,
        value: value.to_string(),
        source,
    })
}

/// Handle the add command
pub fn handle_add<S: KeyValueStore>(
    title: String,
    start: String,
    end: String,
    planner: &mut Planner<S>,
) -> Result<(), CliError> {
    let start = parse_time_arg("start", &start)?;
    let end = parse_time_arg("end", &end)?;

    let task = planner.add_task(&title, Some(start), Some(end))?;
    println!(
        "Added \"{}\" {} - {} (ID: {})",
        task.title,
        time::format_clock_display(task.start_time),
        time::format_clock_display(task.end_time),
        task.id
    );

    Ok(())
}

/// Handle the list command
pub fn handle_list<S: KeyValueStore>(planner: &Planner<S>) -> Result<(), CliError> {
    let tasks = planner.tasks();
    if tasks.is_empty() {
        println!("Nothing scheduled for {}.", time::date_string(planner.session_date()));
        return Ok(());
    }

    println!("Schedule for {} ({}):", time::date_string(planner.session_date()), planner.view());
    for task in tasks {
        println!(
            "  {:>8} - {:<8} {:<24} {:>7}  [{}] {}",
            time::format_clock_display(task.start_time),
            time::format_clock_display(task.end_time),
            task.title,
            time::format_duration(u32::from(task.duration_minutes())),
            task.color.name(),
            task.id
        );
    }

    Ok(())
}

/// Handle the now command: one evaluation against the current schedule
pub fn handle_now<S: KeyValueStore>(planner: &Planner<S>) -> Result<(), CliError> {
    let now = time::now_minutes();
    // A throwaway ticker: a single look has no previous block, so nothing rings
    let snapshot = FocusTicker::new().tick(now, planner.tasks(), &mut crate::notify::Silent);

    if let Some(active) = snapshot.active {
        println!(
            "Right now: {} ({}% done, {} left, until {})",
            active.task.title,
            active.progress_percent.round(),
            time::format_duration(u32::from(active.remaining_minutes)),
            time::format_clock_display(active.task.end_time)
        );
    } else if let Some(next) = snapshot.next {
        println!(
            "Nothing scheduled. Up next in {}: {}",
            time::format_duration(u32::from(next.minutes_until)),
            next.task.title
        );
    } else {
        println!("Nothing scheduled. You are free for the rest of the day.");
    }

    Ok(())
}

/// Handle the remove command
pub fn handle_remove<S: KeyValueStore>(id: String, planner: &mut Planner<S>) -> Result<(), CliError> {
    match planner.remove_task(&TaskId::from(id.as_str()))? {
        Some(task) => {
            println!("Removed \"{}\"", task.title);
            Ok(())
        }
        None => Err(CliError::UnknownTask(id)),
    }
}

/// Handle the clear command
pub fn handle_clear<S: KeyValueStore>(planner: &mut Planner<S>) -> Result<(), CliError> {
    let count = planner.tasks().len();
    planner.clear_all()?;
    println!("Cleared {} block(s)", count);
    Ok(())
}

/// Handle the rate command
pub fn handle_rate<S: KeyValueStore>(rating: u8, planner: &mut Planner<S>) -> Result<(), CliError> {
    let date = planner.session_date();
    planner.save_rating(rating, date)?;
    println!("Rated {} a {}/{}", time::date_string(date), rating, MAX_RATING);
    Ok(())
}

/// Handle the history command
pub fn handle_history<S: KeyValueStore>(limit: usize, planner: &Planner<S>) -> Result<(), CliError> {
    let ratings = planner.ratings();
    if ratings.is_empty() {
        println!("No days rated yet.");
        return Ok(());
    }

    for entry in ratings.recent(limit) {
        println!("  {}  {:>2}/{}  {}", time::date_string(entry.date), entry.rating, MAX_RATING, rating_bar(entry.rating));
    }
    if let Some(average) = ratings.average() {
        println!("Average over {} day(s): {:.1}", ratings.len(), average);
    }

    Ok(())
}

fn rating_bar(rating: u8) -> String {
    "#".repeat(usize::from(rating))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Silent;
    use crate::storage::MemoryStore;

    fn planner() -> Planner<MemoryStore> {
        Planner::open(MemoryStore::new(), Box::new(Silent), time::parse_date("2024-03-01").unwrap())
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["dayblock", "--dev", "add", "Work", "--start", "09:00", "--end", "10:00"]).unwrap();
        assert!(cli.dev);
        assert!(matches!(cli.command, Some(Commands::Add { ref title, .. }) if title == "Work"));

        let cli = Cli::try_parse_from(["dayblock"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn rate_is_range_checked_by_clap() {
        assert!(Cli::try_parse_from(["dayblock", "rate", "0"]).is_err());
        assert!(Cli::try_parse_from(["dayblock", "rate", "11"]).is_err());
        assert!(Cli::try_parse_from(["dayblock", "rate", "10"]).is_ok());
    }

    #[test]
    fn add_rejects_bad_time() {
        let mut planner = planner();
        let err = handle_add("Work".into(), "9am".into(), "10:00".into(), &mut planner).unwrap_err();
        assert!(matches!(err, CliError::TimeParse { field: "start", .. }));
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn add_then_remove() {
        let mut planner = planner();
        handle_add("Work".into(), "09:00".into(), "10:00".into(), &mut planner).unwrap();
        let id = planner.tasks()[0].id.to_string();

        assert!(matches!(
            handle_remove("nope".into(), &mut planner),
            Err(CliError::UnknownTask(_))
        ));
        handle_remove(id, &mut planner).unwrap();
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn rate_records_session_date() {
        let mut planner = planner();
        handle_rate(8, &mut planner).unwrap();
        let date = time::parse_date("2024-03-01").unwrap();
        assert_eq!(planner.ratings().get(date).map(|e| e.rating), Some(8));
    }
}
