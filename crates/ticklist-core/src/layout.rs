use tracing::trace;

pub const DEFAULT_MIN_WIDTH: f64 = 500.0;

/// Document measurements taken by the host
/// right after the list changed.
#[derive(
  Debug, Clone, Copy, PartialEq, Default,
)]
pub struct ViewportMetrics {
  pub document_width:  f64,
  /// Largest of the body/document scroll,
  /// offset and client heights.
  pub scroll_height:   f64,
  pub list_top:        f64
}

/// Max-height rule for the task list. Below
/// the width threshold the last value stays
/// in place; it is not re-checked on resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLayout {
  min_width:  f64,
  max_height: Option<f64>
}

impl Default for ListLayout {
  fn default() -> Self {
    Self::new(DEFAULT_MIN_WIDTH)
  }
}

impl ListLayout {
  pub fn new(min_width: f64) -> Self {
    Self {
      min_width,
      max_height: None
    }
  }

  pub fn max_height(&self) -> Option<f64> {
    self.max_height
  }

  pub fn recompute(
    &mut self,
    metrics: ViewportMetrics
  ) -> Option<f64> {
    if metrics.document_width
      >= self.min_width
    {
      let height = metrics.scroll_height
        - metrics.list_top;
      trace!(height, "recomputed list max height");
      self.max_height = Some(height);
    }
    self.max_height
  }
}
