mod app;
mod config;
mod hint;
mod icons;
mod keys;
mod library;
mod media;
mod runtime;
mod theme;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
