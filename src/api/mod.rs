pub mod cfbd_api;
pub mod odds_api;
