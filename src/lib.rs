pub mod auction;
pub mod auth;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod general;
pub mod handlers;
pub mod mailer;
pub mod media;
pub mod query;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod watchlist;

#[cfg(test)]
mod testing;
