pub mod catalog;
pub mod category;
pub mod credentials;
pub mod settings;

pub use catalog::{CATEGORY_CATALOG, CategoryInfo, find_category};
pub use category::{Category, CategoryKind, ReactionKind, WireListener, channel_type_for_scope};
pub use credentials::SlackCredentials;
pub use settings::{
    ChannelRef, ChannelRefMode, ConnectionSettings, DEFAULT_REGEX_FLAGS, RecordShape,
    TriggerMode, TriggerSettings,
};
