mod app;
mod audio;
mod catalog;
mod config;
mod filter;
mod gateway;
mod player;
mod runtime;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
