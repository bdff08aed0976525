pub mod apply;
pub mod document;
pub mod host;
pub mod messages;
pub mod selection;
pub mod session;

pub use document::SceneDocument;
pub use host::{Host, Materializer};
pub use messages::{Notification, PluginMessage, SelectedItemInfo, UiMessage};
pub use session::{PluginSession, Response};
