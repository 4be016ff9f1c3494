use std::collections::{btree_map::Entry, BTreeMap};

use anyhow::Context;
use getset::{CopyGetters, Getters};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use url::Url;

use crate::schema::{ChartConstant, Difficulty, SongId};

pub const DEFAULT_SONG_LIST_URL: &str = "https://www.chinosk6.cn/arcscore/get_slst";

/// A chart of the catalog with its chart constant.
#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder, CopyGetters, Getters, Serialize, Deserialize)]
pub struct SongDescriptor {
    #[serde(rename = "sid")]
    #[builder(setter(into))]
    #[getset(get = "pub")]
    song_id: SongId,
    #[getset(get_copy = "pub")]
    difficulty: Difficulty,
    #[builder(setter(into))]
    #[getset(get_copy = "pub")]
    rating: ChartConstant,
}

/// Catalog of charts, ordered by song id and then by difficulty.
#[derive(Clone, Debug, Default)]
pub struct SongList(BTreeMap<(SongId, Difficulty), SongDescriptor>);

impl SongList {
    pub fn new(songs: impl IntoIterator<Item = SongDescriptor>) -> Self {
        let mut map = BTreeMap::new();
        for song in songs {
            match map.entry((song.song_id.clone(), song.difficulty)) {
                Entry::Vacant(entry) => {
                    entry.insert(song);
                }
                Entry::Occupied(mut entry) => {
                    warn!("Duplicating chart in the song list, the later one wins: {song:?}");
                    entry.insert(song);
                }
            }
        }
        Self(map)
    }

    pub fn get(&self, song_id: &SongId, difficulty: Difficulty) -> Option<&SongDescriptor> {
        self.0.get(&(song_id.clone(), difficulty))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongDescriptor> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Downloads the whole catalog.  The service requires no authentication,
/// so any client will do.
pub async fn fetch_song_list(client: &reqwest::Client, url: Url) -> anyhow::Result<SongList> {
    info!("Downloading the song list from {url}");
    let songs: Vec<SongDescriptor> = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
        .with_context(|| format!("While parsing the song list from {url}"))?;
    let songs = SongList::new(songs);
    info!("The song list has {} charts.", songs.len());
    Ok(songs)
}
