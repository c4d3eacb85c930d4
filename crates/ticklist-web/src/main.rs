mod app;
mod components;
mod storage;

use ticklist_core::WidgetConfig;

const CONFIG_TOML: &str =
  include_str!("../ticklist.toml");

fn main() {
  console_error_panic_hook::set_once();

  let (config, config_error) =
    match WidgetConfig::from_toml_str(
      CONFIG_TOML
    ) {
      | Ok(config) => (config, None),
      | Err(error) => {
        (WidgetConfig::default(), Some(error))
      }
    };

  let mut tracing_config =
    wasm_tracing::WasmLayerConfig::new();
  if let Ok(level) = config.log.max_level() {
    tracing_config.set_max_level(level);
  }
  if let Err(err) =
    wasm_tracing::set_as_global_default_with_config(
      tracing_config
    )
  {
    web_sys::console::warn_1(
      &format!("tracing already set: {err}")
        .into()
    );
  }

  if let Some(error) = config_error {
    tracing::error!(
      error = %format!("{error:#}"),
      "invalid embedded config; using defaults"
    );
  }
  tracing::info!(
    "starting ticklist frontend"
  );

  let mount = web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .and_then(|document| {
      document.get_element_by_id("root")
    })
    .expect(
      "missing #root mount element"
    );

  yew::Renderer::<app::App>::with_root_and_props(
    mount,
    app::AppProps { config }
  )
  .render();
}
