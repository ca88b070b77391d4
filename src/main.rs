use clap::Parser;
use std::sync::Arc;

use static_server::config::{AppState, Config, ConfigOverrides, DEFAULT_CONFIG_PATH};
use static_server::logger;
use static_server::server::{self, SignalHandler};

#[derive(Parser, Debug)]
#[command(name = "static-server", about = "Static file server", version)]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Directory to serve
    #[arg(short = 'r', long)]
    root: Option<String>,

    #[arg(long)]
    host: Option<String>,

    /// Preferred port; the next free one is used when taken
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// File served for a directory request
    #[arg(long)]
    default_page: Option<String>,

    /// List directories instead of serving the default page
    #[arg(long)]
    view_dir: bool,

    #[arg(long)]
    no_cache: bool,

    #[arg(long)]
    no_compress: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            workspace: self.root.clone(),
            host: self.host.clone(),
            port: self.port,
            default_page: self.default_page.clone(),
            view_dir: self.view_dir.then_some(true),
            use_cache: self.no_cache.then_some(false),
            use_compress: self.no_compress.then_some(false),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config, &cli.overrides())?;
    logger::init(&cfg)?;

    // Worker count follows the config, defaulting to one per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(cfg)?);
    let server_cfg = &state.config.server;

    let listener =
        server::bind_available(&server_cfg.host, server_cfg.port, server_cfg.max_port_attempts)?;
    logger::log_server_start(&listener.local_addr()?, &state.config);

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            Arc::clone(&signals.shutdown),
        ))
        .await;

    Ok(())
}
