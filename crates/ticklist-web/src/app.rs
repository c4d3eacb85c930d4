use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use ticklist_core::layout::ViewportMetrics;
use ticklist_core::{
  ListClick,
  TabId,
  TabRect,
  TaskId,
  TodoWidget,
  WidgetConfig
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  UseForceUpdateHandle,
  function_component,
  html,
  use_effect,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_node_ref
};

use crate::components::{
  HeaderBar,
  TaskList,
  TaskTabs
};
use crate::storage::LocalStorage;

type Widget = TodoWidget<LocalStorage>;
type SharedWidget = Rc<RefCell<Widget>>;

/// The one pending debounce timer. Replacing
/// `handle` drops, and so cancels, the old one.
#[derive(Default)]
struct SaveTimer {
  armed_for: Option<u64>,
  handle:    Option<Timeout>
}

type SharedTimer = Rc<RefCell<SaveTimer>>;

fn now_ms() -> u64 {
  js_sys::Date::now() as u64
}

fn build_widget(
  config: WidgetConfig
) -> Widget {
  let mut widget =
    TodoWidget::new(config, LocalStorage);
  widget.list_mut().subscribe(|event| {
    tracing::debug!(?event, "list event");
  });
  widget.tabs_mut().subscribe(|event| {
    tracing::trace!(?event, "tab event");
  });
  widget.mount();
  widget
}

/// Keeps the browser timer in step with the
/// gateway's pending deadline.
fn arm_save_timer(
  widget: &SharedWidget,
  timer: &SharedTimer
) {
  let deadline =
    widget.borrow().pending_save_deadline();
  let mut slot = timer.borrow_mut();
  if slot.armed_for == deadline {
    return;
  }
  slot.armed_for = deadline;
  slot.handle = deadline.map(|due| {
    let delay = due.saturating_sub(now_ms());
    let widget = Rc::clone(widget);
    let timer = Rc::clone(timer);
    Timeout::new(
      u32::try_from(delay)
        .unwrap_or(u32::MAX),
      move || {
        timer.borrow_mut().armed_for = None;
        // The timer was armed for `due`, so the
        // deadline has been reached.
        let now = now_ms().max(due);
        match widget
          .borrow_mut()
          .timer_fired(now)
        {
          | Ok(true) => {
            tracing::debug!("saved task list")
          }
          | Ok(false) => {}
          | Err(error) => {
            tracing::error!(
              error = %format!("{error:#}"),
              "failed saving task list"
            );
          }
        }
      }
    )
  });
}

fn measure_tabs(
  widget: &SharedWidget,
  tab_refs: &[NodeRef; 3]
) -> bool {
  let mut widget = widget.borrow_mut();
  let before = widget.tabs().slider();
  for (tab, node_ref) in
    TabId::ORDER.into_iter().zip(tab_refs)
  {
    if let Some(el) =
      node_ref.cast::<web_sys::Element>()
    {
      let rect = el.get_bounding_client_rect();
      widget.tab_resized(tab, TabRect {
        left:  rect.left(),
        width: rect.width()
      });
    }
  }
  widget.tabs().slider() != before
}

fn viewport_metrics(
  list_ref: &NodeRef
) -> Option<ViewportMetrics> {
  let document = web_sys::window()?
    .document()?;
  let body = document.body()?;
  let root = document.document_element()?;
  let list =
    list_ref.cast::<web_sys::Element>()?;

  let scroll_height = [
    body.scroll_height(),
    body.offset_height(),
    root.scroll_height(),
    body.client_height(),
    root.client_height()
  ]
  .into_iter()
  .max()
  .unwrap_or_default();

  Some(ViewportMetrics {
    document_width: f64::from(
      root.client_width()
    ),
    scroll_height: f64::from(
      scroll_height
    ),
    list_top: list
      .get_bounding_client_rect()
      .top()
  })
}

/// Watches each tab element so the slider
/// follows size changes that no window resize
/// reports.
fn observe_tabs(
  widget: &SharedWidget,
  tab_refs: &[NodeRef; 3],
  force_update: &UseForceUpdateHandle
) -> Option<(
  web_sys::ResizeObserver,
  Closure<dyn FnMut()>
)> {
  let callback = {
    let widget = Rc::clone(widget);
    let tab_refs = tab_refs.clone();
    let force_update = force_update.clone();
    Closure::<dyn FnMut()>::new(move || {
      if measure_tabs(&widget, &tab_refs) {
        force_update.force_update();
      }
    })
  };
  let observer =
    match web_sys::ResizeObserver::new(
      callback.as_ref().unchecked_ref()
    ) {
      | Ok(observer) => observer,
      | Err(err) => {
        tracing::warn!(
          ?err,
          "ResizeObserver unavailable; \
           tabs follow window resizes only"
        );
        return None;
      }
    };
  for node_ref in tab_refs {
    if let Some(el) =
      node_ref.cast::<web_sys::Element>()
    {
      observer.observe(&el);
    }
  }
  Some((observer, callback))
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
  pub config: WidgetConfig
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
  let widget: SharedWidget = {
    let config = props.config.clone();
    use_mut_ref(move || build_widget(config))
  };
  let timer: SharedTimer =
    use_mut_ref(SaveTimer::default);
  let relayout_list = use_mut_ref(|| false);
  let force_update = use_force_update();
  let list_ref = use_node_ref();
  let tab_refs = [
    use_node_ref(),
    use_node_ref(),
    use_node_ref()
  ];

  // Geometry is read back after every render;
  // only an actual change re-renders.
  {
    let widget = widget.clone();
    let tab_refs = tab_refs.clone();
    let list_ref = list_ref.clone();
    let relayout_list = relayout_list.clone();
    let force_update = force_update.clone();
    use_effect(move || {
      let mut changed =
        measure_tabs(&widget, &tab_refs);
      let relayout = std::mem::take(
        &mut *relayout_list.borrow_mut()
      );
      if relayout
        && let Some(metrics) =
          viewport_metrics(&list_ref)
      {
        let before =
          widget.borrow().list_max_height();
        let after = widget
          .borrow_mut()
          .viewport_changed(metrics);
        changed |= before != after;
      }
      if changed {
        force_update.force_update();
      }
    });
  }

  {
    let widget = widget.clone();
    let tab_refs = tab_refs.clone();
    let force_update = force_update.clone();
    use_effect_with((), move |_| {
      let window = web_sys::window();
      let on_resize =
        window.as_ref().map(|window| {
          let widget = widget.clone();
          let tab_refs = tab_refs.clone();
          let force_update =
            force_update.clone();
          EventListener::new(
            window,
            "resize",
            move |_| {
              if measure_tabs(&widget, &tab_refs)
              {
                force_update.force_update();
              }
            }
          )
        });
      let on_hide =
        window.as_ref().map(|window| {
          let widget = widget.clone();
          EventListener::new(
            window,
            "pagehide",
            move |_| {
              if let Err(error) =
                widget.borrow_mut().page_hidden()
              {
                tracing::error!(
                  error = %format!("{error:#}"),
                  "failed flushing task list"
                );
              }
            }
          )
        });
      let tab_observer = observe_tabs(
        &widget,
        &tab_refs,
        &force_update
      );
      move || {
        drop(on_resize);
        drop(on_hide);
        if let Some((observer, _callback)) =
          tab_observer
        {
          observer.disconnect();
        }
      }
    });
  }

  let on_input = {
    let widget = widget.clone();
    let force_update = force_update.clone();
    Callback::from(move |value: String| {
      widget.borrow_mut().input_changed(&value);
      force_update.force_update();
    })
  };

  let on_append = {
    let widget = widget.clone();
    let timer = timer.clone();
    let relayout_list = relayout_list.clone();
    let force_update = force_update.clone();
    move |appended: bool| {
      if appended {
        *relayout_list.borrow_mut() = true;
        arm_save_timer(&widget, &timer);
      }
      force_update.force_update();
    }
  };

  let on_key_down = {
    let widget = widget.clone();
    let on_append = on_append.clone();
    Callback::from(move |key: String| {
      let appended = widget
        .borrow_mut()
        .input_key_down(&key, now_ms())
        .is_some();
      on_append(appended);
    })
  };

  let on_add = {
    let widget = widget.clone();
    Callback::from(move |()| {
      let appended = widget
        .borrow_mut()
        .add_clicked(now_ms())
        .is_some();
      on_append(appended);
    })
  };

  let on_toggle_edit = {
    let widget = widget.clone();
    let timer = timer.clone();
    let force_update = force_update.clone();
    Callback::from(move |()| {
      widget
        .borrow_mut()
        .edit_icon_clicked(now_ms());
      arm_save_timer(&widget, &timer);
      force_update.force_update();
    })
  };

  let on_select_tab = {
    let widget = widget.clone();
    let force_update = force_update.clone();
    Callback::from(move |tab: TabId| {
      widget.borrow_mut().tab_clicked(tab);
      force_update.force_update();
    })
  };

  let on_list_click = {
    let widget = widget.clone();
    let timer = timer.clone();
    let force_update = force_update.clone();
    Callback::from(move |click: ListClick| {
      let outcome = widget
        .borrow_mut()
        .list_clicked(&click, now_ms());
      arm_save_timer(&widget, &timer);
      force_update.force_update();
      outcome.is_some_and(|o| o.prevent_default)
    })
  };

  let on_editor_input = {
    let widget = widget.clone();
    Callback::from(move |value: String| {
      widget.borrow_mut().editor_input(&value);
    })
  };

  let on_editor_key = {
    let widget = widget.clone();
    let timer = timer.clone();
    let force_update = force_update.clone();
    Callback::from(move |key: String| {
      if widget
        .borrow_mut()
        .editor_key_down(&key, now_ms())
      {
        arm_save_timer(&widget, &timer);
      }
      force_update.force_update();
    })
  };

  let on_editor_blur = {
    let widget = widget.clone();
    let timer = timer.clone();
    let force_update = force_update.clone();
    Callback::from(move |id: TaskId| {
      let mut w = widget.borrow_mut();
      let bound = w
        .list()
        .active_edit()
        .is_some_and(|edit| edit.task_id == id);
      w.editor_blur(id, now_ms());
      drop(w);
      if !bound {
        return;
      }
      arm_save_timer(&widget, &timer);
      force_update.force_update();
    })
  };

  let view = widget.borrow();
  let tasks = view
    .visible_tasks()
    .into_iter()
    .cloned()
    .collect::<Vec<_>>();

  html! {
      <div class="todo">
          <HeaderBar
              input={view.header().input().to_string()}
              can_append={view.header().can_append()}
              edit_mode={view.list().edit_mode()}
              on_input={on_input}
              on_key_down={on_key_down}
              on_add={on_add}
              on_toggle_edit={on_toggle_edit}
          />
          <TaskTabs
              active={view.tabs().active()}
              counts={view.tabs().counters()}
              slider={view.tabs().slider()}
              tab_refs={tab_refs}
              on_select={on_select_tab}
          />
          <TaskList
              tasks={tasks}
              filter={view.tabs().active()}
              edit_mode={view.list().edit_mode()}
              editing={view.list().active_edit().cloned()}
              max_height={view.list_max_height()}
              list_ref={list_ref}
              on_click={on_list_click}
              on_editor_input={on_editor_input}
              on_editor_key={on_editor_key}
              on_editor_blur={on_editor_blur}
          />
      </div>
  }
}
