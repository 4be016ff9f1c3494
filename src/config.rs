use std::path::Path;

use arcaea_scraping_utils::fs_json_util::read_toml;
use log::info;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use url::Url;

use crate::{
    api::DEFAULT_BASE_URL,
    friend::TargetStrategy,
    schema::{FriendCode, UserName},
    song_list::DEFAULT_SONG_LIST_URL,
};

/// Where the web API and the song list are served.
#[derive(Clone, Debug, TypedBuilder, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_base_url")]
    #[builder(default = default_base_url())]
    pub base_url: Url,
    #[serde(default = "default_song_list_url")]
    #[builder(default = default_song_list_url())]
    pub song_list_url: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Endpoints {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let endpoints: Self = read_toml(path)?;
                info!("Loaded endpoints from {path:?}: {endpoints:?}");
                Ok(endpoints)
            }
            None => Ok(Self::default()),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).unwrap()
}

fn default_song_list_url() -> Url {
    Url::parse(DEFAULT_SONG_LIST_URL).unwrap()
}

#[derive(Clone, Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub struct TargetIdentifier {
    /// Friend code of the player.  The friend list of the account is replaced with this player.
    #[arg(long)]
    pub friend_code: Option<FriendCode>,
    /// Display name of the player, who must already be a friend of the account.
    #[arg(long)]
    pub user_name: Option<UserName>,
}

impl TargetIdentifier {
    pub fn strategy(&self) -> anyhow::Result<TargetStrategy> {
        match (&self.friend_code, &self.user_name) {
            (Some(friend_code), None) => Ok(TargetStrategy::Identifier(friend_code.clone())),
            (None, Some(user_name)) => Ok(TargetStrategy::NameFilter(user_name.clone())),
            _ => anyhow::bail!("Specify exactly one of friend code or user name"),
        }
    }
}
