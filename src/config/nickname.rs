//! Default nickname generator.
//!
//! Produces nicknames in the format `nodebotNN` (e.g. `nodebot42`), which fit
//! within IRC's typical 9-character nickname limit.

use rand::RngExt;

const BASE: &str = "nodebot";

/// Generate a nickname like `nodebot07`.
pub fn generate_nickname() -> String {
    let mut rng = rand::rng();
    let num: u8 = rng.random_range(0..100);
    format!("{}{:02}", BASE, num)
}
