// SPDX-License-Identifier: GPL-3.0-only

//! Byte formatting shared by log messages and console output

use num_format::{Locale, ToFormattedString};

/// Convert bytes to a human-readable size (e.g., "1.50 GiB"), optionally
/// followed by the exact byte count.
pub fn bytes_to_pretty(bytes: u64, add_bytes: bool) -> String {
    let mut steps = 0;
    let mut val: f64 = bytes as f64;

    while val > 1024. && steps < 8 {
        val /= 1024.;
        steps += 1;
    }

    let unit = match steps {
        0 => "B",
        1 => "KiB",
        2 => "MiB",
        3 => "GiB",
        4 => "TiB",
        5 => "PiB",
        6 => "EiB",
        7 => "ZiB",
        _ => "YiB",
    };

    if add_bytes {
        let bytes_str = bytes.to_formatted_string(&Locale::en);
        format!("{:.2} {} ({} bytes)", val, unit, bytes_str)
    } else {
        format!("{:.2} {}", val, unit)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut unit_index = 0;
    let mut value = bytes as f64;

    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{value:.1} {}", UNITS[unit_index])
    }
}
