use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use getset::{CopyGetters, Getters};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    api::ArcaeaApi,
    friend::Target,
    rating::{play_point_for_chart, PlayPoint},
    schema::{ChartConstant, ClearType, Difficulty, Score, ScoreEntry, SongId},
    song_list::{SongDescriptor, SongList},
};

/// Best scores of the target, by song id and then by difficulty.
pub type ResultMap = BTreeMap<SongId, BTreeMap<Difficulty, PlayRecord>>;

#[derive(Clone, Debug, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct PlayRecord {
    score: Score,
    play_point: PlayPoint,
    clear_type: ClearType,
    shiny_perfect_count: u32,
    perfect_count: u32,
    near_count: u32,
    miss_count: u32,
    rating: ChartConstant,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    time_played: DateTime<Utc>,
}

impl PlayRecord {
    pub fn new(entry: &ScoreEntry, song: &SongDescriptor) -> Self {
        Self {
            score: entry.score(),
            play_point: play_point_for_chart(entry.score(), song.rating()),
            clear_type: entry.best_clear_type().unwrap_or(entry.clear_type()),
            shiny_perfect_count: entry.shiny_perfect_count(),
            perfect_count: entry.perfect_count(),
            near_count: entry.near_count(),
            miss_count: entry.miss_count(),
            rating: song.rating(),
            time_played: entry.time_played(),
        }
    }
}

/// The latest play of the target.
#[derive(Clone, Debug, CopyGetters, Getters, Serialize, Deserialize)]
pub struct RecentRecord {
    #[getset(get = "pub")]
    song_id: SongId,
    #[getset(get_copy = "pub")]
    difficulty: Difficulty,
    #[getset(get_copy = "pub")]
    score: Score,
    /// `None` only if the chart is not in the catalog and the server did not rate the play.
    #[getset(get_copy = "pub")]
    play_point: Option<PlayPoint>,
    #[getset(get_copy = "pub")]
    clear_type: ClearType,
    #[getset(get_copy = "pub")]
    shiny_perfect_count: u32,
    #[getset(get_copy = "pub")]
    perfect_count: u32,
    #[getset(get_copy = "pub")]
    near_count: u32,
    #[getset(get_copy = "pub")]
    miss_count: u32,
    /// Chart constant from the catalog.
    #[getset(get_copy = "pub")]
    rating: Option<ChartConstant>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[getset(get_copy = "pub")]
    time_played: DateTime<Utc>,
}

impl RecentRecord {
    pub fn new(entry: &ScoreEntry, song: Option<&SongDescriptor>) -> Self {
        let play_point = match song {
            Some(song) => Some(play_point_for_chart(entry.score(), song.rating())),
            None => entry.rating().map(PlayPoint::from),
        };
        Self {
            song_id: entry.song_id().clone(),
            difficulty: entry.difficulty(),
            score: entry.score(),
            play_point,
            clear_type: entry.clear_type(),
            shiny_perfect_count: entry.shiny_perfect_count(),
            perfect_count: entry.perfect_count(),
            near_count: entry.near_count(),
            miss_count: entry.miss_count(),
            rating: song.map(|song| song.rating()),
            time_played: entry.time_played(),
        }
    }
}

/// Fetches the friend ranking of every chart in the catalog at once
/// and picks out the entry of the target.
///
/// A chart whose ranking could not be fetched, or which the target has not played,
/// is absent from the result.
pub async fn fetch_all(api: &impl ArcaeaApi, songs: &SongList, target: &Target) -> ResultMap {
    info!("Fetching scores of {} charts.", songs.len());
    let responses = join_all(songs.iter().map(|song| async move {
        let response = api
            .fetch_friend_scores(song.song_id(), song.difficulty())
            .await;
        (song, response)
    }))
    .await;

    let mut ret = ResultMap::new();
    let mut failures = 0;
    for (song, response) in responses {
        let entries = match response {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to fetch scores of {} ({}): {e:#}",
                    song.song_id(),
                    song.difficulty()
                );
                failures += 1;
                continue;
            }
        };
        let Some(entry) = entries.iter().find(|entry| target.matches_entry(entry)) else {
            debug!("No score on {} ({})", song.song_id(), song.difficulty());
            continue;
        };
        let record = PlayRecord::new(entry, song);
        debug!(
            "{} ({} {}): {} {}",
            song.song_id(),
            song.difficulty(),
            song.rating(),
            record.score(),
            record.clear_type()
        );
        ret.entry(song.song_id().clone())
            .or_default()
            .insert(song.difficulty(), record);
    }
    let found: usize = ret.values().map(|x| x.len()).sum();
    info!(
        "Found {found} score(s) out of {} charts ({failures} failed).",
        songs.len()
    );
    ret
}

/// Returns `Ok(None)` if the target is not on the friend list or has no recent play.
pub async fn fetch_recent(
    api: &impl ArcaeaApi,
    songs: &SongList,
    target: &Target,
) -> anyhow::Result<Option<RecentRecord>> {
    let profile = api.fetch_profile().await?;
    let Some(friend) = profile
        .friends()
        .iter()
        .find(|friend| target.matches_friend(friend))
    else {
        warn!("The target is not on the friend list: {target:?}");
        return Ok(None);
    };
    let Some(entry) = friend.recent_score().first() else {
        warn!("{} has no recent play.", friend.name());
        return Ok(None);
    };
    let song = songs.get(entry.song_id(), entry.difficulty());
    if song.is_none() {
        warn!(
            "{} ({}) is not in the song list, keeping the rating from the server.",
            entry.song_id(),
            entry.difficulty()
        );
    }
    let record = RecentRecord::new(entry, song);
    info!(
        "Latest play of {}: {} ({}) {} {}",
        friend.name(),
        record.song_id(),
        record.difficulty(),
        record.score(),
        record.clear_type()
    );
    Ok(Some(record))
}
