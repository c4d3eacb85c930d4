use anyhow::anyhow;
use ticklist_core::BlobStore;
use wasm_bindgen::JsValue;

/// `window.localStorage` as the widget's blob
/// store.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
  fn storage(
    &self
  ) -> anyhow::Result<web_sys::Storage> {
    web_sys::window()
      .ok_or_else(|| anyhow!("no window"))?
      .local_storage()
      .map_err(js_error)?
      .ok_or_else(|| {
        anyhow!("local storage unavailable")
      })
  }
}

impl BlobStore for LocalStorage {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    self
      .storage()?
      .get_item(key)
      .map_err(js_error)
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .storage()?
      .set_item(key, value)
      .map_err(js_error)
  }
}

fn js_error(err: JsValue) -> anyhow::Error {
  anyhow!("{err:?}")
}
