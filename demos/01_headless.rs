//! Headless hosts skip the panel; software drivers render anyway.
//!
//! Run with `cargo run --example 01_headless`.

use halyard::logging::LogSink;
use halyard::{DisplayConfig, DisplayManager, Frame, MockDisplay};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The application document usually lives on disk; only the display slice
    // matters here and missing fields fall back to defaults.
    let doc = r#"{
        "headless": true,
        "lock": {"timeout_secs": 5}
    }"#;
    let config: DisplayConfig = serde_json::from_str(doc)?;
    println!(
        "config: headless={} lock_timeout={:?}",
        config.headless,
        config.lock.timeout()
    );

    // No driver attached: nothing to render, the session reports a skip.
    let bare: DisplayManager<LogSink, LogSink> =
        DisplayManager::new(LogSink, LogSink, config.clone());
    let frame = Frame::solid(800, 480, 0x00);
    println!("no driver     -> {}", bare.render(&frame).label());

    // A software panel ignores the headless flag: it renders into memory.
    let mock = MockDisplay::new();
    let preview = mock.frame_handle();
    let mgr = DisplayManager::new(LogSink, LogSink, config).with_driver(Box::new(mock));
    println!("mock driver   -> {}", mgr.render(&frame).label());
    println!(
        "preview holds -> {} bytes",
        preview.latest().map_or(0, |f| f.pixels.len())
    );

    mgr.close();
    Ok(())
}
