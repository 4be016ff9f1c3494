//! In-memory stand-in for the web API, for tests of the workflows.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
};

use anyhow::bail;

use crate::{
    api::{ArcaeaApi, SCORE_PAGE_SIZE},
    schema::{
        ApiResponse, Difficulty, ErrorCode, Friend, FriendCode, FriendList, Profile, ScoreEntry,
        SongId, UserId,
    },
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Call {
    FetchFriendScores(SongId, Difficulty),
    FetchProfile,
    AddFriend(FriendCode),
    RemoveFriend(UserId),
}

#[derive(Default)]
pub struct FakeApi {
    players: BTreeMap<FriendCode, Friend>,
    friends: Mutex<Vec<UserId>>,
    undeletable: BTreeSet<UserId>,
    rankings: BTreeMap<(SongId, Difficulty), Vec<ScoreEntry>>,
    failing: BTreeSet<(SongId, Difficulty)>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn with_player(mut self, code: FriendCode, user_id: u64, name: &str) -> Self {
        let friend = Friend::builder()
            .user_id(user_id.into())
            .name(name.to_owned())
            .build();
        self.players.insert(code, friend);
        self
    }

    pub fn with_recent_play(mut self, user_id: u64, entry: ScoreEntry) -> Self {
        let friend = self
            .players
            .values_mut()
            .find(|friend| friend.user_id() == user_id.into())
            .expect("unknown player");
        *friend = Friend::builder()
            .user_id(friend.user_id())
            .name(friend.name().clone())
            .recent_score([vec![entry], friend.recent_score().clone()].concat())
            .build();
        self
    }

    pub fn with_friend(self, user_id: u64) -> Self {
        self.friends.lock().unwrap().push(user_id.into());
        self
    }

    pub fn with_undeletable(mut self, user_id: u64) -> Self {
        self.undeletable.insert(user_id.into());
        self
    }

    pub fn with_ranking(
        mut self,
        song_id: &str,
        difficulty: Difficulty,
        entries: Vec<ScoreEntry>,
    ) -> Self {
        self.rankings.insert((song_id.into(), difficulty), entries);
        self
    }

    pub fn with_failing(mut self, song_id: &str, difficulty: Difficulty) -> Self {
        self.failing.insert((song_id.into(), difficulty));
        self
    }

    pub fn friend_ids(&self) -> Vec<UserId> {
        self.friends.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn current_friends(&self) -> Vec<Friend> {
        let friends = self.friends.lock().unwrap();
        friends
            .iter()
            .filter_map(|&user_id| {
                self.players
                    .values()
                    .find(|friend| friend.user_id() == user_id)
                    .cloned()
            })
            .collect()
    }
}

impl ArcaeaApi for FakeApi {
    async fn fetch_friend_scores(
        &self,
        song_id: &SongId,
        difficulty: Difficulty,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        self.record(Call::FetchFriendScores(song_id.clone(), difficulty));
        let key = (song_id.clone(), difficulty);
        if self.failing.contains(&key) {
            bail!("Connection reset while fetching {song_id} ({difficulty})");
        }
        Ok(self
            .rankings
            .get(&key)
            .map(|entries| entries.iter().take(SCORE_PAGE_SIZE).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_profile(&self) -> anyhow::Result<Profile> {
        self.record(Call::FetchProfile);
        Ok(Profile::builder().friends(self.current_friends()).build())
    }

    async fn add_friend(
        &self,
        friend_code: &FriendCode,
    ) -> anyhow::Result<ApiResponse<FriendList>> {
        self.record(Call::AddFriend(friend_code.clone()));
        let Some(player) = self.players.get(friend_code) else {
            return Ok(ApiResponse::err(ErrorCode::USER_NOT_FOUND));
        };
        {
            let mut friends = self.friends.lock().unwrap();
            if !friends.contains(&player.user_id()) {
                friends.push(player.user_id());
            }
        }
        Ok(ApiResponse::ok(self.current_friends().into()))
    }

    async fn remove_friend(&self, user_id: UserId) -> anyhow::Result<()> {
        self.record(Call::RemoveFriend(user_id));
        if self.undeletable.contains(&user_id) {
            bail!("The server refused to remove {user_id}");
        }
        self.friends.lock().unwrap().retain(|&id| id != user_id);
        Ok(())
    }
}
