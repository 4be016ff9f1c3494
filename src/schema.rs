use std::fmt::Display;

use chrono::{DateTime, Utc};
use derive_more::{AsRef, From, FromStr, Into};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;

#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    From,
    AsRef,
    FromStr,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[as_ref(forward)]
pub struct SongId(String);

impl From<&str> for SongId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Into, Serialize, Deserialize,
)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const PRESENT: Self = Self(1);
    pub const FUTURE: Self = Self(2);
    pub const BEYOND: Self = Self(3);

    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "PST",
            1 => "PRS",
            2 => "FTR",
            3 => "BYD",
            4 => "ETR",
            _ => return None,
        })
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.pad(name),
            None => write!(f, "Difficulty({})", self.0),
        }
    }
}

/// Numeric identifier assigned by the server once a player is on the friend list.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    From,
    Into,
    FromStr,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct UserId(u64);

/// The 9-digit code a player hands out to be added as a friend.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    From,
    AsRef,
    FromStr,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[as_ref(forward)]
pub struct FriendCode(String);

#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    From,
    AsRef,
    FromStr,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
#[as_ref(forward)]
pub struct UserName(String);

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    From,
    Into,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct Score(u32);

impl Score {
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Chart constant in tenths, e.g. `105` stands for 10.5.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Into, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "i16")]
pub struct ChartConstant(i16);

impl ChartConstant {
    pub fn get(self) -> f64 {
        self.0 as f64 / 10.
    }
}

impl TryFrom<f64> for ChartConstant {
    type Error = anyhow::Error;

    fn try_from(value: f64) -> anyhow::Result<Self> {
        if !value.is_finite() || value.abs() > i16::MAX as f64 {
            anyhow::bail!("Chart constant out of range: {value}");
        }
        let tenths = value.round();
        if (tenths - value).abs() > 1e-6 {
            anyhow::bail!("Chart constant is not given in tenths: {value}");
        }
        Ok(Self(tenths as i16))
    }
}

impl Display for ChartConstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{}", abs / 10, abs % 10))
    }
}

#[derive(
    Clone, Copy, Default, PartialEq, Eq, Debug, From, Into, Serialize, Deserialize,
)]
pub struct ClearType(u8);

impl Display for ClearType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            0 => "Track Lost",
            1 => "Normal Clear",
            2 => "Full Recall",
            3 => "Pure Memory",
            4 => "Easy Clear",
            5 => "Hard Clear",
            x => return write!(f, "ClearType({x})"),
        };
        f.pad(name)
    }
}

/// One row of a score list, either from the friend ranking of a chart
/// or from the recent plays of a friend.
#[derive(Clone, Debug, TypedBuilder, CopyGetters, Getters, Serialize, Deserialize)]
pub struct ScoreEntry {
    // Absent in `recent_score`
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub")]
    user_id: Option<UserId>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    #[getset(get = "pub")]
    name: Option<UserName>,
    #[builder(setter(into))]
    #[getset(get = "pub")]
    song_id: SongId,
    #[getset(get_copy = "pub")]
    difficulty: Difficulty,
    #[builder(setter(into))]
    #[getset(get_copy = "pub")]
    score: Score,
    #[serde(default)]
    #[builder(default)]
    #[getset(get_copy = "pub")]
    shiny_perfect_count: u32,
    #[serde(default)]
    #[builder(default)]
    #[getset(get_copy = "pub")]
    perfect_count: u32,
    #[serde(default)]
    #[builder(default)]
    #[getset(get_copy = "pub")]
    near_count: u32,
    #[serde(default)]
    #[builder(default)]
    #[getset(get_copy = "pub")]
    miss_count: u32,
    #[serde(default)]
    #[builder(default)]
    #[getset(get_copy = "pub")]
    clear_type: ClearType,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub")]
    best_clear_type: Option<ClearType>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[getset(get_copy = "pub")]
    time_played: DateTime<Utc>,
    /// Play rating as computed by the server, if reported.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    #[getset(get_copy = "pub")]
    rating: Option<f64>,
}

#[derive(Clone, Debug, TypedBuilder, CopyGetters, Getters, Serialize, Deserialize)]
pub struct Friend {
    #[getset(get_copy = "pub")]
    user_id: UserId,
    #[builder(setter(into))]
    #[getset(get = "pub")]
    name: UserName,
    /// Newest first.
    #[serde(default)]
    #[builder(default)]
    #[getset(get = "pub")]
    recent_score: Vec<ScoreEntry>,
}

#[derive(Clone, Debug, Default, TypedBuilder, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Profile {
    #[serde(default)]
    #[builder(default)]
    friends: Vec<Friend>,
}

/// Value of a successful friend mutation: the friend list after the change.
#[derive(Clone, Debug, Default, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct FriendList {
    #[serde(default)]
    friends: Vec<Friend>,
}

impl From<Vec<Friend>> for FriendList {
    fn from(friends: Vec<Friend>) -> Self {
        Self { friends }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "isLoggedIn", default)]
    pub is_logged_in: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, From, derive_more::Display, Serialize, Deserialize)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// Reported by the add-friend endpoint for an unknown friend code.
    pub const USER_NOT_FOUND: Self = Self(401);
}

/// The `{ success, value, error_code }` envelope shared by the web API endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    success: bool,
    value: Option<T>,
    error_code: Option<ErrorCode>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The server reported a failure (error code: {0:?})")]
    Remote(Option<ErrorCode>),
    #[error("The server reported success, but the value was missing")]
    MissingValue,
}

impl<T> ApiResponse<T> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            error_code: None,
        }
    }

    pub fn err(error_code: impl Into<Option<ErrorCode>>) -> Self {
        Self {
            success: false,
            value: None,
            error_code: error_code.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error_code
    }

    pub fn into_value(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Remote(self.error_code));
        }
        self.value.ok_or(ApiError::MissingValue)
    }
}

#[cfg(test)]
mod tests {
    use serde::de::DeserializeOwned;

    use super::{
        ApiError, ApiResponse, ChartConstant, ClearType, Difficulty, ErrorCode, FriendList,
        Profile, ScoreEntry, UserId,
    };

    #[test]
    fn parse_friend_score_entry() {
        let json = r#"{
            "user_id": 1234567,
            "name": "Hikari",
            "song_id": "grievouslady",
            "difficulty": 2,
            "score": 9876543,
            "shiny_perfect_count": 1111,
            "perfect_count": 1400,
            "near_count": 12,
            "miss_count": 3,
            "health": 100,
            "modifier": 0,
            "clear_type": 1,
            "best_clear_type": 5,
            "time_played": 1650000000000,
            "rating": 12.38
        }"#;
        let entry: ScoreEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.user_id(), Some(UserId::from(1234567)));
        assert_eq!(entry.name().as_ref().unwrap().to_string(), "Hikari");
        assert_eq!(entry.song_id().to_string(), "grievouslady");
        assert_eq!(entry.difficulty(), Difficulty::FUTURE);
        assert_eq!(entry.score().get(), 9876543);
        assert_eq!(entry.best_clear_type(), Some(ClearType::from(5)));
        assert_eq!(entry.time_played().timestamp_millis(), 1650000000000);
    }

    #[test]
    fn parse_recent_score_without_user_id() {
        let json = r#"{
            "friends": [{
                "user_id": 42,
                "name": "Tairitsu",
                "recent_score": [{
                    "song_id": "fractureray",
                    "difficulty": 2,
                    "score": 9500000,
                    "clear_type": 4,
                    "time_played": 1650000000000,
                    "rating": 11.2
                }]
            }]
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        let friend = &profile.friends()[0];
        assert_eq!(friend.user_id(), UserId::from(42));
        let recent = &friend.recent_score()[0];
        assert_eq!(recent.user_id(), None);
        assert_eq!(recent.clear_type(), ClearType::from(4));
        assert_eq!(recent.rating(), Some(11.2));
    }

    #[test]
    fn envelope_failure_carries_error_code() {
        let response: ApiResponse<FriendList> =
            serde_json::from_str(r#"{"success": false, "error_code": 401}"#).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.error_code(), Some(ErrorCode::USER_NOT_FOUND));
        assert!(matches!(
            response.into_value(),
            Err(ApiError::Remote(Some(ErrorCode::USER_NOT_FOUND)))
        ));

        let response: ApiResponse<FriendList> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(response.into_value(), Err(ApiError::MissingValue)));
    }

    fn parse_envelope<T: DeserializeOwned>(json: &str) -> ApiResponse<T> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn envelope_value_needs_no_default() {
        let response: ApiResponse<UserId> = parse_envelope(r#"{"success": true, "value": 7}"#);
        assert_eq!(response.into_value().unwrap(), UserId::from(7));

        let response: ApiResponse<UserId> = parse_envelope(r#"{"success": false}"#);
        assert!(matches!(response.into_value(), Err(ApiError::Remote(None))));
    }

    #[test]
    fn chart_constant_from_tenths() {
        let constant: ChartConstant = serde_json::from_str("105").unwrap();
        assert_eq!(constant, ChartConstant::from(105));
        assert_eq!(constant.get(), 10.5);
        assert_eq!(constant.to_string(), "10.5");
        assert_eq!(serde_json::to_string(&constant).unwrap(), "105");

        let constant: ChartConstant = serde_json::from_str("-1").unwrap();
        assert_eq!(constant.to_string(), "-0.1");
        assert!(serde_json::from_str::<ChartConstant>("10.55").is_err());
    }

    #[test]
    fn difficulty_display() {
        assert_eq!(Difficulty::BEYOND.to_string(), "BYD");
        assert_eq!(Difficulty::from(9).to_string(), "Difficulty(9)");
    }
}
