use ticklist_core::{
  ClickTarget,
  ListClick,
  Task,
  TaskId
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_node_ref
};

#[derive(Properties, PartialEq)]
pub struct TaskListRowProps {
  pub task:            Task,
  pub edit_mode:       bool,
  /// Present while the shared editor is bound
  /// to this row.
  pub draft:           Option<String>,
  pub on_click:        Callback<ListClick, bool>,
  pub on_editor_input: Callback<String>,
  pub on_editor_key:   Callback<String>,
  pub on_editor_blur:  Callback<TaskId>
}

#[function_component(TaskListRow)]
pub fn task_list_row(
  props: &TaskListRowProps
) -> Html {
  let id = props.task.id;
  let done = props.task.status.is_done();
  let editing = props.draft.is_some();
  let editor_ref = use_node_ref();

  {
    let editor_ref = editor_ref.clone();
    use_effect_with(editing, move |editing| {
      if *editing
        && let Some(input) = editor_ref
          .cast::<web_sys::HtmlInputElement>()
        && let Err(err) = input.focus()
      {
        tracing::warn!(?err, "failed focusing task editor");
      }
    });
  }

  let on_check = {
    let on_click = props.on_click.clone();
    move |e: web_sys::MouseEvent| {
      let input: web_sys::HtmlInputElement =
        e.target_unchecked_into();
      let click = ListClick::on(
        id,
        ClickTarget::Checkbox {
          checked: input.checked()
        }
      );
      if on_click.emit(click) {
        e.prevent_default();
      }
    }
  };
  let on_text = {
    let on_click = props.on_click.clone();
    move |e: web_sys::MouseEvent| {
      if on_click.emit(ListClick::on(
        id,
        ClickTarget::TaskText
      )) {
        e.prevent_default();
      }
    }
  };
  // In edit mode the press must not blur an
  // open editor: switching rows goes through the
  // click, which detaches without committing.
  let on_text_press = {
    let edit_mode = props.edit_mode;
    move |e: web_sys::MouseEvent| {
      if edit_mode {
        e.prevent_default();
      }
    }
  };
  let on_delete = {
    let on_click = props.on_click.clone();
    move |e: web_sys::MouseEvent| {
      if on_click.emit(ListClick::on(
        id,
        ClickTarget::DeleteIcon
      )) {
        e.prevent_default();
      }
    }
  };
  let on_editor_input = {
    let cb = props.on_editor_input.clone();
    move |e: web_sys::InputEvent| {
      let input: web_sys::HtmlInputElement =
        e.target_unchecked_into();
      cb.emit(input.value());
    }
  };
  let on_editor_key = {
    let cb = props.on_editor_key.clone();
    move |e: web_sys::KeyboardEvent| {
      cb.emit(e.key())
    }
  };
  let on_editor_blur = {
    let cb = props.on_editor_blur.clone();
    move |_: web_sys::FocusEvent| cb.emit(id)
  };

  let text_style = if editing {
    "display:none;"
  } else {
    "display:block;"
  };

  html! {
      <li
          id={id.to_string()}
          class="task"
          data-type={props.task.status.as_str()}
      >
          <label>
              <input type="checkbox" checked={done} onclick={on_check} />
              <span></span>
              <span class="task-text" style={text_style}
                  onmousedown={on_text_press} onclick={on_text}>
                  { props.task.text.clone() }
              </span>
          </label>
          {
              if let Some(draft) = props.draft.clone() {
                  html! {
                      <input
                          type="text"
                          class="task-editor"
                          ref={editor_ref.clone()}
                          value={draft}
                          oninput={on_editor_input}
                          onkeydown={on_editor_key}
                          onblur={on_editor_blur}
                      />
                  }
              } else {
                  html! {}
              }
          }
          <span class="icon-delete" onclick={on_delete}>
              <i class="fa-regular fa-trash-can"></i>
          </span>
      </li>
  }
}
