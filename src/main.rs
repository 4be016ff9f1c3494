use std::path::PathBuf;

use arcaea_scraping::{
    config::{Endpoints, TargetIdentifier},
    runner::{run, Config, Mode},
};
use arcaea_scraping_utils::{credentials::Credentials, fs_json_util::read_json};
use clap::Parser;
use log::info;

#[derive(Parser)]
struct Opts {
    /// JSON file with `email` and `password`.
    credentials_path: PathBuf,
    #[arg(value_enum)]
    mode: Mode,
    #[command(flatten)]
    target: TargetIdentifier,
    /// TOML file overriding `base_url` and `song_list_url`.
    #[arg(long)]
    endpoints_path: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts = Opts::parse();
    let credentials: Credentials = read_json(&opts.credentials_path)?;
    let config = Config {
        endpoints: Endpoints::load(opts.endpoints_path.as_deref())?,
        strategy: opts.target.strategy()?,
        mode: opts.mode,
        output_path: opts.output,
    };
    match run(&config, &credentials).await? {
        Some(path) => info!("Done. The result is in {path:?}."),
        None => info!("Done. Nothing was saved."),
    }
    Ok(())
}
