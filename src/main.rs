use chocorec::config::PipelineConfig;
use chocorec::pipeline::{clean_catalog, recommend_query, train_model};
use chocorec::{ChocolateQuery, RecommendationTable};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Chocolate bar recommendations from k-means clusters
#[derive(Parser, Debug)]
#[command(name = "chocorec")]
#[command(about = "Recommend chocolate bars similar to a description", long_about = None)]
struct Args {
    /// Path to a JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode and project the raw catalog
    Clean,
    /// Fit the cluster model on the cleaned catalog
    Train,
    /// Recommend catalog entries similar to the described bar
    Recommend(QueryArgs),
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    #[arg(long)]
    cocoa_percent: f64,
    #[arg(long)]
    rating: f64,
    #[arg(long, default_value = "Yes")]
    beans: String,
    #[arg(long, default_value = "No")]
    cocoa_butter: String,
    #[arg(long, default_value = "No")]
    vanilla: String,
    #[arg(long, default_value = "No")]
    lecithin: String,
    #[arg(long, default_value = "No")]
    salt: String,
    #[arg(long, default_value = "Yes")]
    sugar: String,
    #[arg(long, default_value = "No")]
    sweetener_without_sugar: String,
}

impl From<QueryArgs> for ChocolateQuery {
    fn from(args: QueryArgs) -> Self {
        ChocolateQuery {
            cocoa_percent: args.cocoa_percent,
            rating: args.rating,
            beans: args.beans,
            cocoa_butter: args.cocoa_butter,
            vanilla: args.vanilla,
            lecithin: args.lecithin,
            salt: args.salt,
            sugar: args.sugar,
            sweetener_without_sugar: args.sweetener_without_sugar,
        }
    }
}

fn print_recommendations(result: &RecommendationTable) {
    println!("{}", result.columns().join("\t"));
    for rec in result.rows() {
        let attributes: Vec<String> = rec.attributes.iter().map(ToString::to_string).collect();
        println!("{}\t{}\t{}", rec.rank, rec.product, attributes.join("\t"));
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting chocorec v{}", env!("CARGO_PKG_VERSION"));
    let config = PipelineConfig::load(args.config.as_deref())?;
    if let Some(path) = &args.config {
        info!("Configuration file loaded from {:?}", path);
    }

    match args.command {
        Command::Clean => {
            clean_catalog(&config.clean)?;
        }
        Command::Train => {
            let outcome = train_model(&config.clean.output_path, &config.model)?;
            info!(
                "Fitted {} clusters in {} iterations, inertia {:.4}",
                outcome.model.n_clusters(),
                outcome.model.n_iter(),
                outcome.model.inertia()
            );
        }
        Command::Recommend(query) => {
            let query = ChocolateQuery::from(query);
            let result = recommend_query(&config, &query.values())?;
            print_recommendations(&result);
        }
    }

    Ok(())
}
