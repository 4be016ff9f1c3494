use futures::future::try_join_all;
use itertools::Itertools;
use log::{info, warn};
use thiserror::Error;

use crate::{
    api::ArcaeaApi,
    schema::{ErrorCode, Friend, FriendCode, ScoreEntry, UserId, UserName},
};

/// How the player whose scores are collected is identified.
#[derive(Clone, Debug)]
pub enum TargetStrategy {
    /// Make the player the only friend of the account, then match by user id.
    Identifier(FriendCode),
    /// Leave the friend list as is and match by display name.
    /// Only the first page of each ranking is inspected, so players outside it are missed.
    NameFilter(UserName),
}

/// The resolved player, used to pick entries out of responses.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Target {
    UserId(UserId),
    Name(UserName),
}

impl Target {
    pub fn matches_entry(&self, entry: &ScoreEntry) -> bool {
        match self {
            Target::UserId(user_id) => entry.user_id() == Some(*user_id),
            Target::Name(name) => entry.name().as_ref() == Some(name),
        }
    }

    pub fn matches_friend(&self, friend: &Friend) -> bool {
        match self {
            Target::UserId(user_id) => friend.user_id() == *user_id,
            Target::Name(name) => friend.name() == name,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Login failed.")]
    LoginFailed,
    #[error("User not found: no player has friend code {0}.")]
    TargetNotFound(FriendCode),
}

pub async fn resolve_target(
    api: &impl ArcaeaApi,
    strategy: &TargetStrategy,
) -> anyhow::Result<Target> {
    match strategy {
        TargetStrategy::Identifier(friend_code) => {
            remove_all_friends(api).await?;
            let user_id = add_target(api, friend_code).await?;
            info!("Friend code {friend_code} belongs to user {user_id}.");
            Ok(Target::UserId(user_id))
        }
        TargetStrategy::NameFilter(name) => Ok(Target::Name(name.clone())),
    }
}

/// Empties the friend list.  Returns the number of removed friends.
pub async fn remove_all_friends(api: &impl ArcaeaApi) -> anyhow::Result<usize> {
    let profile = api.fetch_profile().await?;
    let friends = profile.friends();
    info!(
        "Removing {} friend(s): [{}]",
        friends.len(),
        friends.iter().map(|friend| friend.name()).join(", ")
    );
    try_join_all(
        friends
            .iter()
            .map(|friend| api.remove_friend(friend.user_id())),
    )
    .await?;
    Ok(friends.len())
}

async fn add_target(api: &impl ArcaeaApi, friend_code: &FriendCode) -> anyhow::Result<UserId> {
    let response = api.add_friend(friend_code).await?;
    if response.error_code() == Some(ErrorCode::USER_NOT_FOUND) {
        return Err(ResolveError::TargetNotFound(friend_code.clone()).into());
    }
    let friend_list = response.into_value()?;
    let friends = friend_list.friends();
    if friends.len() != 1 {
        warn!(
            "Expected exactly one friend after adding {friend_code}, found {}.",
            friends.len()
        );
    }
    let friend = friends
        .first()
        .ok_or_else(|| anyhow::anyhow!("The friend list was empty after adding {friend_code}"))?;
    Ok(friend.user_id())
}
