//! State machine behind a to-do list widget:
//! the task store, the header, filter tabs and
//! list controllers that keep the view in sync
//! with it, and debounced persistence into an
//! external key-value store.

pub mod config;
pub mod events;
pub mod header;
pub mod layout;
pub mod list;
pub mod logging;
pub mod persist;
pub mod store;
pub mod tabs;
pub mod task;
pub mod widget;

pub use config::WidgetConfig;
pub use list::{
  ClickOutcome,
  ClickTarget,
  ListClick
};
pub use persist::{
  BlobStore,
  MemoryBlobStore
};
pub use store::{
  Counts,
  TaskStore
};
pub use tabs::{
  TabId,
  TabRect
};
pub use task::{
  Status,
  Task,
  TaskId
};
pub use widget::TodoWidget;
