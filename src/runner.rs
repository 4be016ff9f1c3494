use std::path::PathBuf;

use arcaea_scraping_utils::{credentials::Credentials, fs_json_util::write_json_pretty};
use clap::ValueEnum;
use log::{info, warn};
use serde::Serialize;
use typed_builder::TypedBuilder;

use crate::{
    api::{ArcaeaApi, ArcaeaClient},
    config::Endpoints,
    data_collector::{fetch_all, fetch_recent, RecentRecord, ResultMap},
    friend::{resolve_target, ResolveError, TargetStrategy},
    song_list::{fetch_song_list, SongList},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum Mode {
    /// Best score of every chart in the song list.
    All,
    /// The latest play only.
    Recent,
}

impl Mode {
    pub fn default_output_path(self, strategy: &TargetStrategy) -> PathBuf {
        let stem = match strategy {
            TargetStrategy::Identifier(friend_code) => friend_code.to_string(),
            TargetStrategy::NameFilter(name) => name.to_string(),
        };
        match self {
            Mode::All => format!("{stem}.json"),
            Mode::Recent => format!("{stem}_r1.json"),
        }
        .into()
    }
}

#[derive(Debug, TypedBuilder)]
pub struct Config {
    #[builder(default)]
    pub endpoints: Endpoints,
    pub strategy: TargetStrategy,
    pub mode: Mode,
    #[builder(default, setter(strip_option))]
    pub output_path: Option<PathBuf>,
}

impl Config {
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.mode.default_output_path(&self.strategy))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    All(ResultMap),
    Recent(RecentRecord),
}

/// Runs one session and saves the result.
/// Returns the path of the written file, or `None` if there was nothing to save.
pub async fn run(config: &Config, credentials: &Credentials) -> anyhow::Result<Option<PathBuf>> {
    let client = ArcaeaClient::new(config.endpoints.base_url.clone())?;
    let song_list_client = reqwest::Client::new();
    let (client, songs) = tokio::try_join!(
        client.login(credentials),
        fetch_song_list(&song_list_client, config.endpoints.song_list_url.clone()),
    )?;
    let client = client.ok_or(ResolveError::LoginFailed)?;

    let output = collect(&client, &songs, config).await;
    client.close();
    let Some(output) = output? else {
        warn!("Nothing matched the target, so no file is written.");
        return Ok(None);
    };

    let path = config.output_path();
    write_json_pretty(&path, &output)?;
    info!("Successfully saved data to {path:?}.");
    Ok(Some(path))
}

async fn collect(
    api: &impl ArcaeaApi,
    songs: &SongList,
    config: &Config,
) -> anyhow::Result<Option<Output>> {
    let target = resolve_target(api, &config.strategy).await?;
    Ok(match config.mode {
        Mode::All => Some(Output::All(fetch_all(api, songs, &target).await)),
        Mode::Recent => fetch_recent(api, songs, &target).await?.map(Output::Recent),
    })
}
