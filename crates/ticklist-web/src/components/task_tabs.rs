use ticklist_core::Counts;
use ticklist_core::TabId;
use ticklist_core::tabs::SliderGeometry;
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskTabsProps {
  pub active:    TabId,
  pub counts:    Counts,
  pub slider:    Option<SliderGeometry>,
  /// One ref per tab, in `TabId::ORDER`.
  pub tab_refs:  [NodeRef; 3],
  pub on_select: Callback<TabId>
}

#[function_component(TaskTabs)]
pub fn task_tabs(
  props: &TaskTabsProps
) -> Html {
  let slider_style = props
    .slider
    .map(|s| {
      format!(
        "left:{}px;width:{}px;",
        s.left, s.width
      )
    })
    .unwrap_or_default();

  html! {
      <div class="task-controls">
          <div class="task-tabs">
              {
                  for TabId::ORDER.into_iter().zip(props.tab_refs.iter().cloned()).map(|(tab, node_ref)| {
                      let on_select = props.on_select.clone();
                      let count = props.counts.get(tab);
                      html! {
                          <div
                              id={tab.as_str()}
                              ref={node_ref}
                              class={classes!("task-tab", (props.active == tab).then_some("active"))}
                              onclick={move |_| on_select.emit(tab)}
                          >
                              <span class="badge" data-value={count.to_string()}>
                                  { count.to_string() }
                              </span>
                              { tab.label() }
                          </div>
                      }
                  })
              }
          </div>
          <div class="task-slider" style={slider_style}></div>
      </div>
  }
}
