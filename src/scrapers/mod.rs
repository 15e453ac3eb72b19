pub mod espn_schedule;
