mod bam_utils;
mod io_utils;
mod readers;
mod region;
mod util;

pub use bam_utils::get_sample_name;
pub use io_utils::create_writer;
pub use readers::open_text_reader;
pub use region::GenomicRegion;
pub use util::{handle_error_and_exit, Result};
