use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct HeaderBarProps {
  pub input:          String,
  pub can_append:     bool,
  pub edit_mode:      bool,
  pub on_input:       Callback<String>,
  pub on_key_down:    Callback<String>,
  pub on_add:         Callback<()>,
  pub on_toggle_edit: Callback<()>
}

#[function_component(HeaderBar)]
pub fn header_bar(
  props: &HeaderBarProps
) -> Html {
  let on_input = props.on_input.clone();
  let on_key_down =
    props.on_key_down.clone();
  let on_add = props.on_add.clone();
  let on_toggle_edit =
    props.on_toggle_edit.clone();

  html! {
      <div class="task-header">
          <div class="task-add">
              <input
                  type="text"
                  placeholder="New task"
                  value={props.input.clone()}
                  oninput={move |e: web_sys::InputEvent| {
                      let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                      on_input.emit(input.value());
                  }}
                  onkeydown={move |e: web_sys::KeyboardEvent| on_key_down.emit(e.key())}
              />
              <span
                  class={classes!("icon-add", (!props.can_append).then_some("disabled"))}
                  onclick={move |_| on_add.emit(())}
              >
                  { "+" }
              </span>
          </div>
          <span
              class={classes!("icon-edit", props.edit_mode.then_some("active"))}
              title="Edit tasks"
              onclick={move |_| on_toggle_edit.emit(())}
          >
              { "✎" }
          </span>
      </div>
  }
}
