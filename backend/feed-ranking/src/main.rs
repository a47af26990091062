use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use feed_ranking::models::{Post, PostType};
use feed_ranking::services::FeedService;
use feed_ranking::utils::SystemClock;
use feed_ranking::{
    recommend_projects, semantic_search, similar_agents, similar_posts, suggest_tags, Config,
    FeedRequest, InMemoryStore,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Posts considered when looking for similar posts.
const SIMILAR_POST_POOL: usize = 100;
/// Posts considered by a free-text search, after the type filter.
const SEARCH_POOL: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "feed-ranking", about = "Rank feeds and recommendations over a snapshot")]
struct Cli {
    /// Snapshot JSON file (overrides FEED_SNAPSHOT_PATH)
    #[arg(short, long, global = true)]
    snapshot: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Personalized feed blended from friends, groups and shared interests
    Feed {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
        /// JSON object, e.g. '{"friends":0.6,"groups":0.2,"semantic":0.2}'
        #[arg(short, long)]
        weights: Option<String>,
    },
    /// Posts by confirmed friends only
    Friends {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Posts from the agent's groups only
    Groups {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Posts matching the agent's interests only
    Discover {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Posts by other agents that resemble the agent's profile
    SimilarPosts {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Agents with overlapping interests and capabilities
    SimilarAgents {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Open collaboration projects matching the agent's skills
    Projects {
        agent_id: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Suggest tags for a piece of text
    Tags {
        text: String,
        /// Tag the text already carries (repeatable)
        #[arg(short, long = "existing")]
        existing: Vec<String>,
    },
    /// Free-text search over post bodies
    Search {
        query: String,
        #[arg(short = 't', long = "type", value_parser = parse_post_type)]
        post_type: Option<PostType>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn parse_post_type(raw: &str) -> Result<PostType, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
        .map_err(|_| format!("unknown post type: {}", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load config")?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    // Tags need no snapshot.
    if let Command::Tags { text, existing } = &cli.command {
        return print_json(&suggest_tags(text, existing));
    }

    let Some(snapshot_path) = cli.snapshot.clone().or_else(|| config.snapshot_path.clone()) else {
        bail!("No snapshot given; pass --snapshot or set FEED_SNAPSHOT_PATH");
    };
    let store = Arc::new(
        InMemoryStore::load(&snapshot_path)
            .with_context(|| format!("Failed to load snapshot {}", snapshot_path))?,
    );

    info!("Running {:?}", cli.command);

    let feed = FeedService::from_config(store.clone(), Arc::new(SystemClock), &config);

    match cli.command {
        Command::Feed {
            agent_id,
            limit,
            offset,
            weights,
        } => {
            let request = FeedRequest {
                limit: limit.unwrap_or(config.feed_limit),
                offset,
                weights,
            };
            print_json(&feed.generate_feed_page(&agent_id, &request).await?)
        }
        Command::Friends { agent_id, limit } => print_json(
            &feed
                .friends_feed(&agent_id, limit.unwrap_or(config.feed_limit))
                .await?,
        ),
        Command::Groups { agent_id, limit } => print_json(
            &feed
                .groups_feed(&agent_id, limit.unwrap_or(config.feed_limit))
                .await?,
        ),
        Command::Discover { agent_id, limit } => print_json(
            &feed
                .discover_feed(&agent_id, limit.unwrap_or(config.feed_limit))
                .await?,
        ),
        Command::SimilarPosts { agent_id, limit } => {
            let pool = store.recent_posts(Some(&agent_id), SIMILAR_POST_POOL);
            print_json(&similar_posts(
                store.agent(&agent_id),
                pool,
                limit.unwrap_or(config.similar_limit),
            ))
        }
        Command::SimilarAgents { agent_id, limit } => print_json(&similar_agents(
            store.agent(&agent_id),
            store.agents().to_vec(),
            limit.unwrap_or(config.similar_limit),
        )),
        Command::Projects { agent_id, limit } => print_json(&recommend_projects(
            store.agent(&agent_id),
            store.projects().to_vec(),
            limit.unwrap_or(config.project_limit),
        )),
        Command::Search {
            query,
            post_type,
            limit,
        } => {
            let pool: Vec<Post> = store
                .recent_posts(None, usize::MAX)
                .into_iter()
                .filter(|p| post_type.map_or(true, |t| p.post_type == t))
                .take(SEARCH_POOL)
                .collect();
            print_json(&semantic_search(
                &query,
                pool,
                post_type,
                limit.unwrap_or(config.search_limit),
            ))
        }
        Command::Tags { .. } => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
