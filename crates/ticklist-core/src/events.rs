use std::fmt;

type Handler<E> = Box<dyn FnMut(&E)>;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct SubscriptionId(u64);

/// Observer list. Handlers run in
/// subscription order on every emit.
pub struct Subscribers<E> {
  next_id:  u64,
  handlers: Vec<(SubscriptionId, Handler<E>)>
}

impl<E> Default for Subscribers<E> {
  fn default() -> Self {
    Self {
      next_id:  0,
      handlers: Vec::new()
    }
  }
}

impl<E> fmt::Debug for Subscribers<E> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("Subscribers")
      .field("count", &self.handlers.len())
      .finish()
  }
}

impl<E> Subscribers<E> {
  pub fn subscribe<F>(
    &mut self,
    handler: F
  ) -> SubscriptionId
  where
    F: FnMut(&E) + 'static
  {
    let id = SubscriptionId(self.next_id);
    self.next_id += 1;
    self
      .handlers
      .push((id, Box::new(handler)));
    id
  }

  pub fn unsubscribe(
    &mut self,
    id: SubscriptionId
  ) -> bool {
    let before = self.handlers.len();
    self
      .handlers
      .retain(|(sid, _)| *sid != id);
    self.handlers.len() != before
  }

  pub fn emit(&mut self, event: &E) {
    for (_, handler) in
      self.handlers.iter_mut()
    {
      handler(event);
    }
  }
}
