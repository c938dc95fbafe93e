//! Command line tool for driving an itinerary server.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

use itinerary_cli::{ItineraryClient, Outcome, View};
use itinerary_core::{length_duration_text, ClearAction, PointRole, WaypointRole};

/// Edit the itinerary of a running itinerary server
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Itinerary server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set the departure point
    Start { lat: f64, lon: f64 },
    /// Set the destination
    Destination { lat: f64, lon: f64 },
    /// Append a via point
    Via { lat: f64, lon: f64 },
    /// Remove a waypoint (start, destination or via-N)
    Remove { role: WaypointRole },
    /// Remove every waypoint
    Reset,
    /// List the clear actions currently offered
    Options,
    /// Run a clear action (clear_route_nodes_only, clear_route_only, clear_all)
    Clear {
        #[arg(value_parser = parse_action)]
        action: ClearAction,
    },
    /// Print waypoints and the current route
    Scene {
        /// Wait for a pending route first
        #[arg(long)]
        wait: bool,

        /// Seconds to wait for a pending route
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

fn parse_action(value: &str) -> Result<ClearAction, String> {
    serde_json::from_value(serde_json::Value::String(value.replace('-', "_")))
        .map_err(|_| format!("unknown clear action: {}", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = ItineraryClient::new(&args.url);

    match args.command {
        Command::Start { lat, lon } => {
            print_outcome(&client.select_point(PointRole::Start, lat, lon).await?)
        }
        Command::Destination { lat, lon } => {
            print_outcome(&client.select_point(PointRole::Destination, lat, lon).await?)
        }
        Command::Via { lat, lon } => {
            print_outcome(&client.select_point(PointRole::Via, lat, lon).await?)
        }
        Command::Remove { role } => print_outcome(&client.remove(role).await?),
        Command::Reset => print_outcome(&client.reset().await?),
        Command::Options => {
            for option in client.clear_options().await? {
                println!("{:<24} {}", format!("{:?}", option.action), option.label);
            }
        }
        Command::Clear { action } => print_outcome(&client.clear(action).await?),
        Command::Scene { wait, timeout } => {
            let view = if wait {
                client.wait_for_route(Duration::from_secs(timeout)).await?
            } else {
                client.view().await?
            };
            print_view(&view);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    for waypoint in &outcome.waypoints {
        println!("  {:<12} {}", waypoint.role.to_string(), waypoint.position);
    }
    if outcome.route_pending {
        println!("Route request {} pending", outcome.route_sequence);
    }
}

fn print_view(view: &View) {
    println!("Waypoints:");
    for waypoint in &view.waypoints {
        println!("  {:<12} {}", waypoint.role.to_string(), waypoint.position);
    }

    if view.route_pending {
        println!("Route request {} pending", view.route_sequence);
    } else if view.route.is_failed() {
        println!("Route {}: unavailable", view.route_sequence);
    } else if view.route.has_path() {
        println!(
            "Route {}: {}",
            view.route_sequence,
            length_duration_text(view.route.length_km, view.route.duration_s)
        );
        for (index, step) in view.route.steps.iter().enumerate() {
            println!(
                "  {:>3}. {} ({})",
                index + 1,
                step.instruction,
                step.sub_description()
            );
        }
    } else {
        println!("No route");
    }

    let actions: Vec<&str> = view.clear_options.iter().map(|action| action.label()).collect();
    println!("Clear menu: {}", actions.join(", "));
}
