use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Login information for the web API, loaded once per run.
#[derive(Debug, TypedBuilder, Serialize, Deserialize)]
pub struct Credentials {
    pub email: Email,
    pub password: Password,
}

#[derive(Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Email(String);

// No `Display`; `Debug` is redacted.
#[derive(From, AsRef, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Password(String);

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}
