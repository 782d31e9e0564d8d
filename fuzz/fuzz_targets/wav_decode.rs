//! Fuzz target for WAV decoding.
//!
//! Malformed WAV data must produce a typed error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let _ = talskrift::audio::wav::load_from_reader(Cursor::new(data.to_vec()));
});
