//! Options file access through the caller's env.

use std::path::Path;

use crate::env::SharedEnv;
use crate::loader::LoadError;

/// Read the whole options file. One blocking read, no retry.
pub fn read_options_file(path: &Path, env: &SharedEnv) -> Result<String, LoadError> {
    tracing::debug!(path = %path.display(), env = env.name(), "Reading options file");
    env.read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemEnv;
    use std::io;

    #[test]
    fn test_reads_through_env() {
        let mem = MemEnv::new();
        mem.write_file("/db/OPTIONS-1", "[DBOptions]\n");
        let env = SharedEnv::new(mem);
        let text = read_options_file(Path::new("/db/OPTIONS-1"), &env).unwrap();
        assert_eq!(text, "[DBOptions]\n");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let env = SharedEnv::new(MemEnv::new());
        let err = read_options_file(Path::new("/db/OPTIONS-404"), &env).unwrap_err();
        match err {
            LoadError::Io { path, source } => {
                assert_eq!(path, Path::new("/db/OPTIONS-404"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
