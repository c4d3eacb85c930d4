mod header_bar;
mod task_list;
mod task_list_row;
mod task_tabs;

pub use header_bar::HeaderBar;
pub use task_list::TaskList;
pub use task_tabs::TaskTabs;
