use ticklist_core::list::EditSession;
use ticklist_core::{
  ListClick,
  TabId,
  Task,
  TaskId
};
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  function_component,
  html
};

use super::task_list_row::TaskListRow;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub tasks:           Vec<Task>,
  pub filter:          TabId,
  pub edit_mode:       bool,
  pub editing:         Option<EditSession>,
  pub max_height:      Option<f64>,
  pub list_ref:        NodeRef,
  /// Returns whether the default action
  /// should be suppressed.
  pub on_click:        Callback<ListClick, bool>,
  pub on_editor_input: Callback<String>,
  pub on_editor_key:   Callback<String>,
  pub on_editor_blur:  Callback<TaskId>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  let style = props
    .max_height
    .map(|h| format!("max-height:{h}px;"))
    .unwrap_or_default();

  html! {
      <ul
          class="task-list"
          ref={props.list_ref.clone()}
          style={style}
          data-filter={props.filter.as_str()}
          data-edit={props.edit_mode.then_some("1")}
      >
          {
              for props.tasks.iter().cloned().map(|task| {
                  let draft = props
                      .editing
                      .as_ref()
                      .filter(|s| s.task_id == task.id)
                      .map(|s| s.draft.clone());
                  html! {
                      <TaskListRow
                          key={task.id.to_string()}
                          task={task.clone()}
                          edit_mode={props.edit_mode}
                          draft={draft}
                          on_click={props.on_click.clone()}
                          on_editor_input={props.on_editor_input.clone()}
                          on_editor_key={props.on_editor_key.clone()}
                          on_editor_blur={props.on_editor_blur.clone()}
                      />
                  }
              })
          }
      </ul>
  }
}
