mod ffprobe_info;
mod path_validator;

pub use ffprobe_info::{FfprobeProbe, FrameProbe, SourceFrameInfo, flatten_stderr};
pub use path_validator::{ensure_directory_exists, validate_file_exists};
