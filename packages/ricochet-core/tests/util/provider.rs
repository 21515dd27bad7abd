use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Iterator;
use std::path::Path;

pub const NESTEST_GOLD_LOG_PATH: &str = "./tests/data/nestest.log";
pub const NESTEST_ROM_PATH: &str = "./tests/data/nestest.nes";

/// ROM binaries are not committed; callers skip when they're missing.
pub fn fixtures_present() -> bool {
    Path::new(NESTEST_ROM_PATH).exists() && Path::new(NESTEST_GOLD_LOG_PATH).exists()
}

pub fn load_gold_standard_log() -> impl Iterator<Item = String> {
    let path = Path::new(NESTEST_GOLD_LOG_PATH);
    let file = File::open(path).expect("Failed to read nestest gold log");
    let file = BufReader::new(file);
    file.lines().map(|line| String::from(line.unwrap().trim_end()))
}
