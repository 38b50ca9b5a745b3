use wasm_bindgen::prelude::*;

mod app;
mod storage;

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::document;

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger init failed: {err}").into());
    }

    let root = document()
        .get_element_by_id("tashbets")
        .expect("Could not find id=\"tashbets\" element");

    log::debug!("App started");
    yew::Renderer::<app::App>::with_root(root).render();
}
