pub mod api;
pub mod config;
pub mod data_collector;
pub mod friend;
pub mod rating;
pub mod runner;
pub mod schema;
pub mod song_list;

#[cfg(test)]
mod fake_api;
