pub mod config;
pub mod http_client;
pub mod injuries;
pub mod lineup;
pub mod notify;
pub mod player_stats;
pub mod power;
pub mod predict;
pub mod reconcile;
pub mod result_sets;
pub mod roster;
pub mod schedule;
pub mod store;
pub mod teams;
