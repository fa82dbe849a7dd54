//! Movie Catalog - command line
//!
//! Runs one catalog query against Neo4j and prints the records as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use movie_catalog::{Config, MovieListParams, MovieRepository, Pagination};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "movie-catalog")]
#[command(about = "Query the movie catalog graph")]
struct Cli {
    /// Path to a YAML config file (defaults to ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as this user for `favorite` annotations
    #[arg(long, global = true, env = "USER_ID")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Ordering and paging flags shared by list commands
#[derive(Args)]
struct ListArgs {
    /// Movie property to sort by (title, released, imdbRating, year, runtime)
    #[arg(long, default_value = "title")]
    sort: String,

    /// ASC or DESC
    #[arg(long, default_value = "ASC")]
    order: String,

    #[arg(long, default_value_t = 6, allow_hyphen_values = true)]
    limit: i64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    skip: i64,
}

impl ListArgs {
    fn params(&self) -> Result<MovieListParams> {
        Ok(MovieListParams::parse(
            &self.sort,
            &self.order,
            self.limit,
            self.skip,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List movies
    Movies(ListArgs),

    /// List movies in a genre
    Genre {
        name: String,
        #[command(flatten)]
        list: ListArgs,
    },

    /// List movies a person acted in
    Actor {
        id: String,
        #[command(flatten)]
        list: ListArgs,
    },

    /// List movies a person directed
    Director {
        id: String,
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one movie with cast, directors and genres
    Movie { id: String },

    /// List movies similar to a movie
    Similar {
        id: String,
        #[arg(long, default_value_t = 6, allow_hyphen_values = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        skip: i64,
    },

    /// List genres with movie counts and posters
    Genres,

    /// List the user's favorite movie ids
    Favorites,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,movie_catalog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let repo = movie_catalog::connect(&config).await?;

    run(&repo, cli.command, cli.user.as_deref()).await
}

async fn run(repo: &MovieRepository, command: Commands, user: Option<&str>) -> Result<()> {
    match command {
        Commands::Movies(list) => print_json(&repo.all(list.params()?, user).await?),
        Commands::Genre { name, list } => {
            print_json(&repo.get_by_genre(&name, list.params()?, user).await?)
        }
        Commands::Actor { id, list } => {
            print_json(&repo.get_for_actor(&id, list.params()?, user).await?)
        }
        Commands::Director { id, list } => {
            print_json(&repo.get_for_director(&id, list.params()?, user).await?)
        }
        Commands::Movie { id } => print_json(&repo.find_by_id(&id, user).await?),
        Commands::Similar { id, limit, skip } => {
            let page = Pagination::new(limit, skip)?;
            print_json(&repo.get_similar_movies(&id, page, user).await?)
        }
        Commands::Genres => print_json(&repo.list_genres().await?),
        Commands::Favorites => {
            let mut ids: Vec<String> = repo.get_user_favorites(user).await?.into_iter().collect();
            ids.sort();
            print_json(&ids)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", out);
    Ok(())
}
