use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use matchday_alerts::board::{self, Board, BoardRow};
use matchday_alerts::features::Side;
use matchday_alerts::logging;
use matchday_alerts::stats::Statistic;

/// Prints the alert board for one match, narrowing by date, league and kickoff.
///
/// Leave a filter out to list the options available for it.
#[derive(Parser, Debug)]
#[command(name = "matchday_board", version, about)]
struct Args {
    #[arg(long, env = "MATCHDAY_OUT", default_value = "predictions.csv")]
    table: PathBuf,

    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    league: Option<String>,

    /// Kickoff as shown on the board, e.g. `14:00`.
    #[arg(long)]
    kickoff: Option<String>,

    /// Match label, e.g. `Arsenal x Chelsea`.
    #[arg(long = "match")]
    match_label: Option<String>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let board = board::load_board(&args.table)?;

    let Some(date) = args.date.as_deref() else {
        return list("dates", board.dates());
    };
    let Some(league) = args.league.as_deref() else {
        return list("leagues", board.leagues(date));
    };
    let Some(kickoff) = args.kickoff.as_deref() else {
        return list("kickoff times", board.kickoffs(date, league));
    };
    let Some(label) = args.match_label.as_deref() else {
        return list("matches", board.matches(date, league, kickoff));
    };

    let row = board
        .find(label)
        .ok_or_else(|| anyhow!("no match '{label}' in {}", args.table.display()))?;
    print_card(&board, row);
    Ok(())
}

fn list(what: &str, values: Vec<String>) -> Result<()> {
    if values.is_empty() {
        println!("No {what} available for this selection");
    } else {
        println!("Available {what}:");
        for v in values {
            println!("  {v}");
        }
    }
    Ok(())
}

fn print_card(board: &Board, row: &BoardRow) {
    println!("{}  ({} {}, {})", row.match_label, row.date, row.kickoff, row.league);
    println!("Alert: {}", row.alert);
    println!();

    let header = board
        .windows
        .iter()
        .map(|w| format!("{:>8}", format!("avg{w}")))
        .collect::<String>();
    println!("{:<22}{header}  trend  predicted", "");

    for stat in Statistic::ALL {
        for side in [Side::Home, Side::Away] {
            let means = row.window_means(stat, side, &board.windows);
            if means.is_empty() {
                continue;
            }
            let cells = means
                .iter()
                .map(|v| {
                    let mark = if board::is_highlighted(stat, *v) { "*" } else { " " };
                    format!("{:>7.2}{mark}", v)
                })
                .collect::<String>();
            let predicted = row
                .prediction(stat, side)
                .map(|p| format!("{p:.2}"))
                .unwrap_or_else(|| "-".to_string());
            let name = format!("{} {}", stat.label(), side_name(side));
            println!(
                "{name:<22}{cells}  {:^5}  {predicted}",
                board::trend(&means).arrow()
            );
        }
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Home => "(home)",
        Side::Away => "(away)",
    }
}
