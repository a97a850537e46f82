use anyhow::Result;
use clap::Parser;
use smart_rag::config::{AgentConfig, DEFAULT_DB_PATH, DEFAULT_MODEL};
use smart_rag::{run_interactive, RagAgent};
use std::path::PathBuf;

/// Smart RAG Agent for Software Design Documents
#[derive(Parser, Debug)]
#[command(name = "smart-rag-agent")]
#[command(version)]
struct Cli {
    /// Path to the software design document PDF
    #[arg(long)]
    pdf: PathBuf,

    /// Google Generative AI model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Save the vector database for future use
    #[arg(long, alias = "save_db")]
    save_db: bool,

    /// Load a previously saved vector database
    #[arg(long, alias = "load_db", value_name = "DIR")]
    load_db: Option<PathBuf>,

    /// Directory --save-db writes the vector database to
    #[arg(long, default_value = DEFAULT_DB_PATH, value_name = "DIR")]
    db_path: PathBuf,

    /// Maximum characters per chunk
    #[arg(long, default_value_t = 1000)]
    chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, default_value_t = 200)]
    chunk_overlap: usize,

    /// Number of chunks retrieved per query
    #[arg(long, default_value_t = 5)]
    top_k: usize,
}

impl Cli {
    fn agent_config(&self) -> Result<AgentConfig> {
        let mut config = AgentConfig::new(&self.pdf, &self.model)?;
        config.chunk_size = self.chunk_size;
        config.chunk_overlap = self.chunk_overlap;
        config.top_k = self.top_k;
        Ok(config)
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.agent_config()?;

    let agent = match &cli.load_db {
        Some(path) => {
            if cli.save_db {
                log::warn!("--save-db is ignored when loading a saved vector database");
            }
            RagAgent::load_from_saved(config, path).await?
        }
        None => {
            let agent = RagAgent::setup(config).await?;
            if cli.save_db {
                agent.save_vector_db(&cli.db_path)?;
            }
            agent
        }
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_interactive(&agent, stdin, &mut stdout).await
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
