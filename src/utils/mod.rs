pub mod data;
pub mod edge;
pub mod features;
pub mod matchup;
pub mod normalize;
pub mod pipeline;
pub mod predictor;
pub mod season;
pub mod team_mapper;
