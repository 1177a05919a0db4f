#[cfg(not(target_arch = "wasm32"))]
mod tui;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    tui::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
