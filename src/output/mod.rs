mod json_output;

pub use json_output::{DEFAULT_INDENT, DEFAULT_OUTPUT_FILE_NAME, JsonOutput, SerializeError};
