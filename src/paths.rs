use std::path::PathBuf;

// The state file deliberately lives in the working directory so each
// scheduled invocation finds it next to the script that launched it.
pub fn default_state_file_path() -> PathBuf {
    PathBuf::from("last_class_date.txt")
}
