//! `batchdl version`

pub fn run_version() {
    println!("batchdl {}", env!("CARGO_PKG_VERSION"));
}
