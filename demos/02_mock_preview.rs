//! Render a flag-like frame to the software panel and read it back.
//!
//! Run with `cargo run --example 02_mock_preview`.

use halyard::logging::JsonlSink;
use halyard::{DisplayConfig, DisplayManager, Frame, MockDisplay, UpdateOutcome};

/// Three vertical bands, one byte per pixel.
fn tricolor(width: u32, height: u32, bands: [u8; 3]) -> Frame {
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for _ in 0..height {
        for x in 0..width {
            let band = (x * 3 / width).min(2) as usize;
            pixels.push(bands[band]);
        }
    }
    Frame::new(width, height, pixels)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockDisplay::new();
    let preview = mock.frame_handle();
    let mgr = DisplayManager::new(JsonlSink, JsonlSink, DisplayConfig::default())
        .with_driver(Box::new(mock));

    let (width, height) = mgr.panel_size();
    let frame = tricolor(width, height, [0x01, 0x02, 0x03]);
    let outcome = mgr.render(&frame);
    assert_eq!(outcome, UpdateOutcome::Rendered);
    println!("session outcome: {}", outcome.label());

    // What a web preview endpoint would serve.
    let shown = preview.latest().ok_or("no frame rendered")?;
    println!("panel shows {}x{} ({} bytes)", shown.width, shown.height, shown.pixels.len());
    let row_start = shown.pixels[0];
    let row_mid = shown.pixels[(shown.width / 2) as usize];
    let row_end = shown.pixels[(shown.width - 1) as usize];
    println!("first row bands: {:#04x} {:#04x} {:#04x}", row_start, row_mid, row_end);

    mgr.close();
    Ok(())
}
