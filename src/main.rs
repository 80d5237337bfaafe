//! # Voxel Viewer Entry Point
//!
//! Calls into the library's `run()` and turns a startup failure into exit status 1.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_viewer::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
