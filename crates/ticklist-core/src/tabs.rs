use tracing::{
  debug,
  trace
};

use crate::events::{
  SubscriptionId,
  Subscribers
};
use crate::store::Counts;
use crate::task::Status;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum TabId {
  #[default]
  All,
  Todo,
  Done
}

impl TabId {
  /// Display order, left to right.
  pub const ORDER: [TabId; 3] = [
    TabId::All,
    TabId::Todo,
    TabId::Done
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TabId::All => "all",
      | TabId::Todo => "todo",
      | TabId::Done => "done"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | TabId::All => "All",
      | TabId::Todo => "To do",
      | TabId::Done => "Done"
    }
  }

  pub fn admits(
    self,
    status: Status
  ) -> bool {
    match self {
      | TabId::All => true,
      | TabId::Todo => {
        status == Status::Todo
      }
      | TabId::Done => {
        status == Status::Done
      }
    }
  }

  fn index(self) -> usize {
    match self {
      | TabId::All => 0,
      | TabId::Todo => 1,
      | TabId::Done => 2
    }
  }
}

/// Horizontal bounding box of a tab, as
/// reported by the host's geometry source.
#[derive(
  Debug, Clone, Copy, PartialEq, Default,
)]
pub struct TabRect {
  pub left:  f64,
  pub width: f64
}

/// Slider offset relative to the first tab.
#[derive(
  Debug, Clone, Copy, PartialEq, Default,
)]
pub struct SliderGeometry {
  pub left:  f64,
  pub width: f64
}

#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
  ActiveChanged(TabId),
  CountersChanged(Counts),
  SliderMoved(SliderGeometry)
}

#[derive(Debug, Default)]
pub struct TabController {
  active:      TabId,
  counters:    Counts,
  rects:       [Option<TabRect>; 3],
  slider:      Option<SliderGeometry>,
  subscribers: Subscribers<TabEvent>
}

impl TabController {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn active(&self) -> TabId {
    self.active
  }

  pub fn is_active(
    &self,
    tab: TabId
  ) -> bool {
    self.active == tab
  }

  pub fn counter(
    &self,
    tab: TabId
  ) -> usize {
    self.counters.get(tab)
  }

  pub fn counters(&self) -> Counts {
    self.counters
  }

  pub fn slider(
    &self
  ) -> Option<SliderGeometry> {
    self.slider
  }

  pub fn subscribe<F>(
    &mut self,
    handler: F
  ) -> SubscriptionId
  where
    F: FnMut(&TabEvent) + 'static
  {
    self.subscribers.subscribe(handler)
  }

  #[tracing::instrument(skip(self))]
  pub fn set_active(&mut self, tab: TabId) {
    debug!(tab = tab.as_str(), "activating tab");
    self.active = tab;
    self
      .subscribers
      .emit(&TabEvent::ActiveChanged(tab));
    self.sync_slider();
  }

  /// Counters only ever move together, from a
  /// store-derived record.
  pub fn update_counters(
    &mut self,
    counts: Counts
  ) {
    if self.counters == counts {
      return;
    }
    trace!(?counts, "updating tab counters");
    self.counters = counts;
    self.subscribers.emit(
      &TabEvent::CountersChanged(counts)
    );
  }

  pub fn tab_resized(
    &mut self,
    tab: TabId,
    rect: TabRect
  ) {
    trace!(tab = tab.as_str(), ?rect, "tab geometry changed");
    self.rects[tab.index()] = Some(rect);
    self.sync_slider();
  }

  fn sync_slider(&mut self) {
    let first = self.rects[0];
    let active =
      self.rects[self.active.index()];
    let (Some(first), Some(active)) =
      (first, active)
    else {
      return;
    };

    let slider = SliderGeometry {
      left:  active.left - first.left,
      width: active.width
    };
    if self.slider == Some(slider) {
      return;
    }
    self.slider = Some(slider);
    self.subscribers.emit(
      &TabEvent::SliderMoved(slider)
    );
  }
}
