//! Object keys for captured images and their metadata.

use chrono::{Local, NaiveDateTime};

use crate::constants::{IMAGE_EXTENSION, KEY_SUFFIX_LENGTH, METADATA_EXTENSION};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A fresh image key, `YYYYMMDD-HHMMSS-XXX.png` in local time.
///
/// Two captures in the same second can draw the same suffix; nothing checks for that.
pub fn new_image_key() -> String {
    image_key_at(Local::now().naive_local(), &random_suffix())
}

/// The image key for a capture taken at `at` with the given suffix.
pub fn image_key_at(at: NaiveDateTime, suffix: &str) -> String {
    format!(
        "{}-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        suffix,
        IMAGE_EXTENSION
    )
}

fn random_suffix() -> String {
    (0..KEY_SUFFIX_LENGTH)
        .map(|_| char::from(LETTERS[rand::random_range(0..LETTERS.len())]))
        .collect()
}

/// Key of the metadata sidecar for `image_key`: the extension is swapped for `.json`.
pub fn metadata_key_for(image_key: &str) -> String {
    let base = match image_key.rsplit_once('.') {
        Some((base, ext)) if !ext.contains('/') => base,
        _ => image_key,
    };
    format!("{base}.{METADATA_EXTENSION}")
}
