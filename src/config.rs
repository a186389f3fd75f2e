use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobmatch", about = "Resume-driven job search and ranking service")]
pub struct Config {
    /// SerpAPI key for the Google Jobs source (source is skipped when unset)
    #[arg(long, env = "SERPAPI_KEY")]
    pub serpapi_key: Option<String>,

    /// Base URL of the local Ollama server
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Chat model used for summarization and role inference
    #[arg(long, env = "CHAT_MODEL", default_value = "mistral")]
    pub chat_model: String,

    /// Embedding backend: "ollama" or "openai"
    #[arg(long, env = "EMBEDDING_BACKEND", default_value = "ollama")]
    pub embedding_backend: String,

    /// Embedding model name for the selected backend
    #[arg(long, env = "EMBED_MODEL", default_value = "nomic-embed-text")]
    pub embed_model: String,

    /// OpenAI-compatible API key (required for the openai embedding backend)
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Number of ranked jobs returned to the caller
    #[arg(long, env = "TOP_K", default_value = "10")]
    pub top_k: usize,

    /// Maximum records requested from each job source
    #[arg(long, env = "SOURCE_LIMIT", default_value = "15")]
    pub source_limit: usize,

    /// Ignore postings older than this many days (sources that report dates)
    #[arg(long, env = "MAX_AGE_DAYS", default_value = "30")]
    pub max_age_days: i64,

    /// Per-source and per-embedding call timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "15")]
    pub request_timeout: u64,

    /// RSS feed URLs queried as fallback sources (comma separated)
    #[arg(
        long,
        env = "RSS_FEEDS",
        value_delimiter = ',',
        default_value = "https://weworkremotely.com/remote-programming-jobs.rss,https://himalayas.app/jobs.rss"
    )]
    pub rss_feeds: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP service (default when no subcommand given)
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
    /// Run a single match against a local resume PDF and print the results
    Match {
        /// Path to the resume PDF
        #[arg(long)]
        resume: std::path::PathBuf,

        /// Preferred location (empty means no geographic filter)
        #[arg(long, default_value = "")]
        location: String,

        /// Manual search keywords, used when role inference is unavailable
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
    },
}

impl Config {
    /// Resolve the command, defaulting to Serve if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        })
    }
}
