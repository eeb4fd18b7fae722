use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chordal_core::dht::Chord;
use chordal_core::dht::PeerInfo;
use chordal_core::dht::RingBuilder;
use chordal_core::dht::Stabilizer;
use chordal_node::client::HttpClient;
use chordal_node::config::Config;
use chordal_node::endpoint;
use chordal_node::logging::init_logging;
use chordal_node::logging::LogLevel;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(about, version, author)]
struct Cli {
    #[arg(long, value_enum, default_value_t = LogLevel::Info, env = "CHORDAL_LOG_LEVEL")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    Run(RunArgs),
    NewConfig(NewConfigArgs),
}

#[derive(Args, Debug)]
#[command(about = "Write a default config file to edit and run with")]
struct NewConfigArgs {
    #[arg(long, short = 'o', default_value = "chordal.yaml")]
    output: PathBuf,
}

#[derive(Args, Debug)]
#[command(about = "Run a ring node")]
struct RunArgs {
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[arg(long, env = "CHORDAL_IP")]
    ip: Option<String>,

    #[arg(long, short = 'p', env = "CHORDAL_PORT")]
    port: Option<u16>,

    #[arg(
        long,
        short = 'b',
        env = "CHORDAL_BOOTSTRAP",
        help = "ip:port of a live ring member; omit to form a new ring"
    )]
    bootstrap: Option<String>,

    #[arg(long, env = "CHORDAL_STABILIZE_INTERVAL")]
    stabilize_interval: Option<u64>,

    #[arg(long)]
    slist_size: Option<usize>,
}

impl RunArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(ip) = self.ip {
            config.ip = ip;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bootstrap) = self.bootstrap {
            config.bootstrap = Some(bootstrap);
        }
        if let Some(interval) = self.stabilize_interval {
            config.stabilize_interval = interval;
        }
        if let Some(size) = self.slist_size {
            config.slist_size = size;
        }
        Ok(config)
    }
}

fn bootstrap_uri(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let info = PeerInfo::new(config.ip.clone(), config.port, config.uri());
    tracing::info!("node {} starting", info);

    let client = Arc::new(HttpClient::new(Duration::from_millis(config.rpc_timeout_ms))?);
    let ring = Arc::new(
        RingBuilder::new(info, client)
            .succ_max(config.slist_size)
            .build(),
    );

    // Bind before joining so the bootstrap's callbacks can reach us; a
    // taken port or a dead bootstrap are both fatal here.
    let (_, server) = endpoint::bind(addr, ring.clone())?;
    let server = tokio::spawn(server);

    let bootstrap = config.bootstrap.as_deref().map(bootstrap_uri);
    ring.join(bootstrap.as_deref()).await?;

    let stabilizer = Arc::new(Stabilizer::new(
        ring.clone(),
        Duration::from_secs(config.stabilize_interval),
    ));
    let _maintenance = tokio::spawn(stabilizer.wait());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, leaving the ring");
        }
        result = server => {
            anyhow::bail!("rpc endpoint stopped unexpectedly: {result:?}");
        }
    }

    if let Err(e) = ring.leave().await {
        tracing::warn!("leave failed: {}", e);
    }
    Ok(())
}

fn new_config(args: NewConfigArgs) -> anyhow::Result<()> {
    Config::write_template(&args.output)?;
    println!("wrote config template to {}", args.output.display());
    println!("edit it, then: chordal run -c {}", args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Run(args) => run(args.into_config()?).await,
        Command::NewConfig(args) => new_config(args),
    }
}
