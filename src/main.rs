use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Starhouse: rebuild a star-schema warehouse from event logs and song metadata in object storage
#[derive(Parser)]
#[command(name = "starhouse", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source configuration from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: drop, create, load, transform
    Run,

    /// Drop and recreate all warehouse tables, leaving them empty
    Reset,

    /// Bulk-load the staging tables from object storage
    Load,

    /// Populate the dimension and fact tables from staging
    Transform,

    /// Print the SQL statements the pipeline would execute, in run order
    Sql,

    /// Print the jsonpaths mapping document for the event staging load
    Jsonpaths,

    /// Test connectivity and authorization to the warehouse
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing dotenv file is fine when the environment is already set up
    // (CI, container); a malformed one is not.
    match dotenvy::from_filename(&cli.env) {
        Ok(_) | Err(dotenvy::Error::Io(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Run => starhouse::cli::run_pipeline().await?,
        Commands::Reset => starhouse::cli::reset_schema().await?,
        Commands::Load => starhouse::cli::load_staging().await?,
        Commands::Transform => starhouse::cli::run_transforms().await?,
        Commands::Sql => starhouse::cli::print_sql(),
        Commands::Jsonpaths => starhouse::cli::print_jsonpaths()?,
        Commands::Ping => starhouse::cli::ping().await?,
    }

    Ok(())
}
