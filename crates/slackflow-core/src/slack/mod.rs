pub mod web_api;

pub use web_api::{ChannelSummary, SLACK_API_BASE, SlackWebClient};
