use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

mod api {
    pub mod auth;
    pub mod client;
    pub mod drivers;
    pub mod leagues;
    pub mod picks;
    pub mod races;
    pub mod stats;
}

mod dto {
    pub mod api_response_dto;
    pub mod claims_dto;
    pub mod driver_dto;
    pub mod league_dto;
    pub mod pick_dto;
    pub mod race_dto;
    pub mod stats_dto;
    pub mod user_dto;
}

mod services {
    pub mod data_loader;
    pub mod pick_flow;
    pub mod session;
}

mod config;
mod error;

use crate::api::client::ApiClient;
use crate::api::{leagues, stats};
use crate::config::ClientConfig;
use crate::dto::driver_dto::Driver;
use crate::dto::league_dto::CreateLeague;
use crate::dto::race_dto::{EventType, Race};
use crate::dto::user_dto::CreateUser;
use crate::error::ClientError;
use crate::services::data_loader;
use crate::services::pick_flow::PickFlow;
use crate::services::session::SessionManager;

#[derive(Parser, Debug)]
#[command(version, about = "Client for the F1 race prediction game")]
struct Args {
    /// Base URL of the prediction game API.
    #[arg(long, env = "PITWALL_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Directory for local session storage.
    #[arg(long, env = "PITWALL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session on this device.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in.
    Signup {
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the currently stored user.
    Whoami,
    /// List your leagues, or browse public ones.
    Leagues {
        #[arg(long)]
        public: bool,
    },
    /// Create a league.
    CreateLeague {
        name: String,
        /// Grid positions the league requires picks for, e.g. 1,10,20.
        #[arg(long, value_delimiter = ',', required = true)]
        positions: Vec<u8>,
        #[arg(long)]
        public: bool,
    },
    /// Show the current race event.
    Race,
    /// List the driver grid.
    Drivers,
    /// Show or change your picks for a league.
    Picks {
        #[arg(long)]
        league: i64,
        /// Target the sprint pick sheet instead of the race.
        #[arg(long)]
        sprint: bool,
        #[command(subcommand)]
        action: PickAction,
    },
    /// Personal or platform statistics.
    Stats {
        #[arg(long)]
        global: bool,
        /// Ask the server to recompute before showing.
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PickAction {
    /// Current pick board.
    Show,
    /// Pick a driver for a grid position.
    Set { position: u8, driver_id: i64 },
    /// Remove the pick at a grid position.
    Remove { position: u8 },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("Command failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let config = ClientConfig::resolve(args.api_url, args.data_dir)?;
    let client = Arc::new(ApiClient::new(config.api_url.clone()));
    let session = SessionManager::open(client.clone(), &config.session_db).await?;

    match args.command {
        Commands::Login { username, password } => {
            let user = session.login(&username, &password).await?;
            println!("Logged in as {} ({}).", user.username, user.name);
        }
        Commands::Signup {
            username,
            name,
            email,
            password,
        } => {
            let user = session
                .signup(&CreateUser {
                    name,
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Welcome, {}.", user.name);
        }
        Commands::Logout => {
            session.logout().await?;
            println!("Logged out.");
        }
        Commands::Whoami => match session.current_user().await? {
            Some(user) => println!("{} ({})", user.username, user.email),
            None => println!("Not logged in."),
        },
        Commands::Leagues { public } => {
            session.require_user().await?;
            let leagues = if public {
                leagues::get_public_leagues(&client).await?
            } else {
                leagues::get_leagues(&client).await?
            };
            if leagues.is_empty() {
                println!("No leagues found.");
            }
            for league in leagues {
                println!(
                    "#{:<4} {:<24} positions: {}{}",
                    league.id,
                    league.name,
                    format_positions(&league.required_positions),
                    if league.is_public { "  [public]" } else { "" }
                );
            }
        }
        Commands::CreateLeague {
            name,
            positions,
            public,
        } => {
            session.require_user().await?;
            let league = leagues::create_league(
                &client,
                &CreateLeague {
                    name,
                    required_positions: positions,
                    is_public: public,
                },
            )
            .await?;
            println!("Created league #{} \"{}\".", league.id, league.name);
        }
        Commands::Race => {
            session.require_user().await?;
            let weekend = data_loader::load_race_weekend(&client).await?;
            print_race(&weekend.race);
        }
        Commands::Drivers => {
            session.require_user().await?;
            let weekend = data_loader::load_race_weekend(&client).await?;
            for driver in weekend.drivers {
                println!(
                    "#{:<3} {:<24} {} ({})",
                    driver.driver_number, driver.name, driver.team, driver.country
                );
            }
        }
        Commands::Picks {
            league,
            sprint,
            action,
        } => {
            session.require_user().await?;
            let event = if sprint {
                EventType::Sprint
            } else {
                EventType::Race
            };

            let weekend = data_loader::load_race_weekend(&client).await?;
            let board = data_loader::load_league_board(&client, league, event).await?;
            let mut flow = PickFlow::for_race(
                client.clone(),
                league,
                event,
                board.required_positions,
                &weekend.race,
            )?;
            flow.load_confirmed_picks().await?;

            match action {
                PickAction::Show => print_board(&flow, &weekend.drivers),
                PickAction::Set {
                    position,
                    driver_id,
                } => {
                    flow.select_driver(position, driver_id).await?;
                    println!("P{} -> driver {}.", position, driver_id);
                    print_board(&flow, &weekend.drivers);
                }
                PickAction::Remove { position } => {
                    flow.remove_pick(position).await?;
                    println!("Removed pick at P{}.", position);
                    print_board(&flow, &weekend.drivers);
                }
            }
        }
        Commands::Stats { global, refresh } => {
            session.require_user().await?;
            if global {
                let stats = stats::get_global_stats(&client).await?;
                println!("Players:         {}", stats.total_users);
                println!("Picks submitted: {}", stats.total_picks);
                println!("Average points:  {:.1}", stats.average_points);
                if let Some(driver) = stats.most_picked_driver {
                    println!("Most picked:     {}", driver);
                }
            } else {
                let stats = if refresh {
                    stats::refresh_user_stats(&client).await?
                } else {
                    stats::get_user_stats(&client).await?
                };
                println!("Total points:  {}", stats.total_points);
                println!("Races played:  {}", stats.races_played);
                println!(
                    "Correct picks: {}/{}",
                    stats.correct_picks, stats.total_picks
                );
                println!("Best week:     {}", stats.best_week_points);
            }
        }
    }

    Ok(())
}

fn format_positions(positions: &[u8]) -> String {
    positions
        .iter()
        .map(|p| format!("P{}", p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_race(race: &Race) {
    println!("{} (week {})", race.race_name, race.week_number);
    if let Some(country) = &race.country {
        println!("  country:   {}", country);
    }
    println!("  race date: {}", race.race_date);
    if let Some(lock_time) = race.lock_time {
        println!("  locks at:  {}", lock_time);
    }
    println!(
        "  picks:     {}",
        if race.picks_locked { "locked" } else { "open" }
    );
    if race.has_sprint {
        println!("  sprint weekend");
    }
}

fn print_board(flow: &PickFlow, drivers: &[Driver]) {
    if flow.picks_locked() {
        println!("Picks are locked for this race.");
    }
    for &position in flow.required_positions() {
        let status = if flow.is_position_locked(position) {
            "  [locked]"
        } else if flow.confirmed_pick(position).is_some() {
            "  [submitted]"
        } else {
            ""
        };
        match flow.driver_at(position) {
            Some(driver_id) => {
                let name = drivers
                    .iter()
                    .find(|d| d.id == driver_id)
                    .map(|d| d.name.as_str())
                    .unwrap_or("unknown driver");
                println!("  P{:<2} {}{}", position, name, status);
            }
            None => println!("  P{:<2} -{}", position, status),
        }
    }
    let open = flow.open_positions();
    if !open.is_empty() && !flow.picks_locked() {
        println!("Still open: {}", format_positions(&open));
    }
}
