use std::marker::PhantomData;

use anyhow::Context;
use arcaea_scraping_utils::credentials::{Credentials, Email, Password};
use log::{debug, info};
use reqwest::multipart;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::schema::{
    ApiResponse, Difficulty, FriendCode, FriendList, LoginResponse, Profile, ScoreEntry, SongId,
    UserId,
};

pub const DEFAULT_BASE_URL: &str = "https://webapi.lowiro.com/";

/// Number of entries requested from the friend ranking of a chart.
/// Only the first page is ever fetched.
pub const SCORE_PAGE_SIZE: usize = 30;

pub struct MayNotBeLoggedIn;
pub struct LoggedIn;

pub struct ArcaeaClient<T> {
    _phantom: PhantomData<fn() -> T>,
    base_url: Url,
    reqwest: reqwest::Client,
}

/// Operations that require a logged-in session.
#[allow(async_fn_in_trait)]
pub trait ArcaeaApi {
    async fn fetch_friend_scores(
        &self,
        song_id: &SongId,
        difficulty: Difficulty,
    ) -> anyhow::Result<Vec<ScoreEntry>>;

    async fn fetch_profile(&self) -> anyhow::Result<Profile>;

    /// The raw envelope is returned so that the caller can tell an unknown code apart.
    async fn add_friend(&self, friend_code: &FriendCode)
        -> anyhow::Result<ApiResponse<FriendList>>;

    async fn remove_friend(&self, user_id: UserId) -> anyhow::Result<()>;
}

impl ArcaeaClient<MayNotBeLoggedIn> {
    pub fn new(base_url: Url) -> anyhow::Result<Self> {
        let reqwest = reqwest::Client::builder()
            .cookie_store(true)
            .connection_verbose(true)
            .build()?;
        Ok(Self {
            _phantom: PhantomData,
            base_url,
            reqwest,
        })
    }

    /// Returns `Ok(None)` if the server rejected the credentials.
    pub async fn login(
        self,
        credentials: &Credentials,
    ) -> anyhow::Result<Option<ArcaeaClient<LoggedIn>>> {
        #[derive(Debug, Serialize)]
        struct LoginForm<'a> {
            email: &'a Email,
            password: &'a Password,
        }

        info!("Trying to log in as {}.", credentials.email);
        let response = self
            .reqwest
            .post(self.endpoint("auth/login")?)
            .form(&LoginForm {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await?;
        let response: LoginResponse = read_json(response).await?;
        if !response.is_logged_in {
            info!("The server rejected the credentials.");
            return Ok(None);
        }
        info!("Successfully logged in.");
        Ok(Some(ArcaeaClient {
            _phantom: PhantomData,
            base_url: self.base_url,
            reqwest: self.reqwest,
        }))
    }
}

impl ArcaeaApi for ArcaeaClient<LoggedIn> {
    async fn fetch_friend_scores(
        &self,
        song_id: &SongId,
        difficulty: Difficulty,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        #[derive(Serialize)]
        struct ScoreQuery<'a> {
            song_id: &'a SongId,
            difficulty: Difficulty,
            start: usize,
            limit: usize,
        }

        debug!("Fetching friend scores of {song_id} ({difficulty})");
        let response = self
            .reqwest
            .get(self.endpoint("webapi/score/song/friend")?)
            .query(&ScoreQuery {
                song_id,
                difficulty,
                start: 0,
                limit: SCORE_PAGE_SIZE,
            })
            .send()
            .await?;
        let response: ApiResponse<Vec<ScoreEntry>> = read_json(response).await?;
        response
            .into_value()
            .with_context(|| format!("While fetching scores of {song_id} ({difficulty})"))
    }

    async fn fetch_profile(&self) -> anyhow::Result<Profile> {
        let response = self
            .reqwest
            .get(self.endpoint("webapi/user/me")?)
            .send()
            .await?;
        let response: ApiResponse<Profile> = read_json(response).await?;
        response.into_value().context("While fetching the profile")
    }

    async fn add_friend(
        &self,
        friend_code: &FriendCode,
    ) -> anyhow::Result<ApiResponse<FriendList>> {
        debug!("Adding friend {friend_code}");
        self.post_multipart("webapi/friend/me/add", "friend_code", friend_code.to_string())
            .await
    }

    async fn remove_friend(&self, user_id: UserId) -> anyhow::Result<()> {
        debug!("Removing friend {user_id}");
        let response: ApiResponse<FriendList> = self
            .post_multipart("webapi/friend/me/delete", "friend_id", user_id.to_string())
            .await?;
        response
            .into_value()
            .with_context(|| format!("While removing friend {user_id}"))?;
        Ok(())
    }
}

impl ArcaeaClient<LoggedIn> {
    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        name: &'static str,
        value: String,
    ) -> anyhow::Result<ApiResponse<T>> {
        let form = multipart::Form::new().text(name, value);
        let response = self
            .reqwest
            .post(self.endpoint(path)?)
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }
}

impl<T> ArcaeaClient<T> {
    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint {path:?} for {}", self.base_url))
    }

    /// Releases the connection pool.  Dropping the client has the same effect;
    /// this only makes the end of the session explicit.
    pub fn close(self) {
        debug!("Closing the session to {}", self.base_url);
    }
}

/// Parses the body as JSON regardless of the status code,
/// since failures are reported inside the body as well.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await?;
    serde_json::from_str(&body)
        .with_context(|| format!("Unexpected response from {url} (status {status}): {body:?}"))
}
