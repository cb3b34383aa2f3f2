//! Image file writers.
//!
//! The native output is binary PPM, written by hand. A path ending in
//! `.png` selects PNG encoding of the same tone-mapped bytes through the
//! `image` crate instead. Every flush rewrites the whole file, so the
//! newest flush is always the one on disk.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use image::{ImageBuffer, Rgb};
use log::debug;

use crate::image::RenderImage;

/// Should the accumulation be flushed after `frame` of `total`?
///
/// Flushes happen on power-of-two frames and on the final frame, so
/// early results appear quickly while late writes stay rare.
pub fn should_flush(frame: u32, total: u32) -> bool {
    frame == total || frame.is_power_of_two()
}

/// Write the accumulated image to `path`, dispatching on its extension.
pub fn save(render: &RenderImage, iteration: u32, path: &Path) -> io::Result<()> {
    debug!("writing {} after frame {}", path.display(), iteration);
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("png")) {
        save_png(render, iteration, path)
    } else {
        save_ppm(render, iteration, path)
    }
}

fn save_ppm(render: &RenderImage, iteration: u32, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    render.write_ppm(&mut out, iteration)
}

fn save_png(render: &RenderImage, iteration: u32, path: &Path) -> io::Result<()> {
    let bytes = render.tone_mapped_bytes(iteration);
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(render.width(), render.height(), bytes)
            .expect("buffer length always matches the image dimensions");
    buffer
        .save(path)
        .map_err(|e| io::Error::other(format!("PNG encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_cadence_is_powers_of_two_plus_final() {
        let flushed: Vec<u32> = (1..=5).filter(|&f| should_flush(f, 5)).collect();
        assert_eq!(flushed, vec![1, 2, 4, 5]);
        assert!(!should_flush(3, 5));
        assert!(!should_flush(6, 7));
        assert!(should_flush(7, 7));
    }
}
