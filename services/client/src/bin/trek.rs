//! services/client/src/bin/trek.rs

use clap::{Parser, Subcommand};
use client_lib::{config::Config, error::ClientError, state::AppState};
use tracing::info;
use trek_sync_core::onboarding::{InterestSelection, INTEREST_CATEGORIES};
use trek_sync_core::Trek;

#[derive(Parser)]
#[command(name = "trek", about = "Browse treks and manage your favorites")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login { username: String, password: String },
    /// Create an account and sign into it
    Register {
        username: String,
        email: String,
        password: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List the catalog with its featured and popular picks
    Treks,
    /// Show one trek in detail
    Trek { id: u64 },
    /// Show personalized recommendations
    Recommended,
    /// List your favorite treks
    Favorites,
    /// Add or remove a favorite
    Toggle { id: u64 },
    /// Answer the onboarding survey
    Interests { options: Vec<String> },
    /// List the survey options
    Categories,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let config = Config::from_env()?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    // --- 3. Build the Shared AppState ---
    info!("Using backend at {}", config.api_base_url);
    let app = AppState::from_config(config)?;
    app.session.init_auth().await;

    // --- 4. Run the Command ---
    run(&app, cli.command).await
}

async fn run(app: &AppState, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Login { username, password } => {
            app.session.login(&username, &password).await?;
            let state = app.session.snapshot();
            println!("{}", state.success_message.clone().unwrap_or_default());
            if state.interests().is_empty() {
                println!("Tell us what you like with `trek interests <options...>`.");
            }
        }
        Command::Register {
            username,
            email,
            password,
            display_name,
            photo_url,
        } => {
            let display_name = display_name.unwrap_or_else(|| username.clone());
            app.session
                .register(&username, &email, &password, &display_name, photo_url.as_deref())
                .await?;
            println!("{}", app.session.snapshot().success_message.unwrap_or_default());
        }
        Command::Logout => {
            app.session.logout().await?;
            println!("Logged out successfully");
        }
        Command::Whoami => match app.session.user() {
            Some(user) => {
                println!("{} ({}) <{}>", user.display_name, user.username, user.email);
                let state = app.session.snapshot();
                if state.interests().is_empty() {
                    println!("interests: none");
                } else {
                    println!("interests: {}", state.interests().join(", "));
                }
            }
            None => println!("Not logged in"),
        },
        Command::Treks => {
            app.catalog.fetch_treks().await;
            let state = app.catalog.snapshot();
            if let Some(err) = state.error {
                return Err(ClientError::Fetch(err));
            }
            print_section("Featured", &state.featured);
            print_section("Popular", &state.popular);
            print_section("All treks", &state.treks);
        }
        Command::Trek { id } => {
            app.detail.fetch_trek_by_id(id).await;
            let state = app.detail.snapshot();
            app.detail.clear_current_trek();
            match (state.current_trek, state.error) {
                (Some(trek), _) => print_detail(&trek),
                (None, Some(err)) => return Err(ClientError::Fetch(err)),
                (None, None) => println!("Trek {} not found", id),
            }
        }
        Command::Recommended => {
            app.catalog.fetch_recommended_treks().await;
            print_section("Recommended for you", &app.catalog.recommended());
        }
        Command::Favorites => {
            app.sync_favorites().await?;
            print_section(
                &format!("Favorites ({})", app.favorites.favorite_count()),
                &app.favorites.favorite_treks(),
            );
        }
        Command::Toggle { id } => {
            if app.toggle_favorite(id).await? {
                println!("Added trek {} to favorites", id);
            } else {
                println!("Removed trek {} from favorites", id);
            }
        }
        Command::Interests { options } => {
            let selection = InterestSelection::from_options(&options)?;
            if app.session.update_interests(selection.as_slice()).await {
                println!("Saved {} interests", selection.as_slice().len());
            } else {
                println!(
                    "Could not save interests: {}",
                    app.session.error().unwrap_or_default()
                );
            }
        }
        Command::Categories => {
            for category in INTEREST_CATEGORIES {
                println!("{} {}", category.emoji, category.title);
                for option in category.options {
                    println!("    {}", option);
                }
            }
        }
    }
    Ok(())
}

fn print_section(title: &str, treks: &[Trek]) {
    println!("== {} ==", title);
    if treks.is_empty() {
        println!("    (none)");
    }
    for trek in treks {
        println!(
            "  #{:<4} {} [{}, {}] {}",
            trek.id, trek.name, trek.region, trek.difficulty, trek.duration
        );
    }
}

fn print_detail(trek: &Trek) {
    println!("{} (#{})", trek.name, trek.id);
    println!("  {} / {}", trek.district, trek.region);
    println!("  difficulty: {}  duration: {}", trek.difficulty, trek.duration);
    println!(
        "  elevation: {} - {}",
        trek.elevation_profile.min_elevation, trek.elevation_profile.max_elevation
    );
    if !trek.best_seasons.is_empty() {
        println!("  best seasons: {}", trek.best_seasons.join(", "));
    }
    if !trek.description.is_empty() {
        println!("\n{}\n", trek.description);
    }
    for (day, step) in trek.itinerary.iter().enumerate() {
        println!("  day {}: {}", day + 1, step);
    }
    if !trek.required_permits.is_empty() {
        println!("  permits: {}", trek.required_permits.join(", "));
    }
    if !trek.safety_info.altitude_sickness_risk.is_empty() {
        println!("  altitude sickness risk: {}", trek.safety_info.altitude_sickness_risk);
    }
}
