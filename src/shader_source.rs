//! Shader source files loaded from disk.
//!
//! The lit pass compiles its shading stage from a WGSL file at runtime, so it
//! can be edited without rebuilding. [`ShaderFile`] reads the file in full,
//! refuses anything above a size limit instead of silently truncating, and
//! watches the modification time for hot reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Default upper bound on a shader file, in bytes.
pub const DEFAULT_MAX_SHADER_BYTES: usize = 16 * 1024;

/// Errors that can occur when loading or compiling a shader.
#[derive(Debug)]
pub enum ShaderError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is larger than the configured limit.
    TooLarge { len: usize, max: usize },
    /// The backend rejected the source.
    Compile(String),
}

impl std::fmt::Display for ShaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderError::Io(e) => write!(f, "IO error: {}", e),
            ShaderError::TooLarge { len, max } => {
                write!(f, "shader is {} bytes, limit is {}", len, max)
            }
            ShaderError::Compile(msg) => write!(f, "compile error: {}", msg),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShaderError {
    fn from(e: std::io::Error) -> Self {
        ShaderError::Io(e)
    }
}

/// Reads a whole shader file, rejecting files over `max_len` bytes.
pub fn read_source(path: &Path, max_len: usize) -> Result<String, ShaderError> {
    let len = fs::metadata(path)?.len() as usize;
    if len > max_len {
        return Err(ShaderError::TooLarge { len, max: max_len });
    }
    let source = fs::read_to_string(path)?;
    // The file may have grown between the two calls.
    if source.len() > max_len {
        return Err(ShaderError::TooLarge {
            len: source.len(),
            max: max_len,
        });
    }
    Ok(source)
}

/// A shader source that can be hot-reloaded from disk.
#[derive(Debug)]
pub struct ShaderFile {
    path: PathBuf,
    max_len: usize,
    last_modified: SystemTime,
    source: String,
}

impl ShaderFile {
    /// Load a shader from the given file path.
    pub fn load(path: impl AsRef<Path>, max_len: usize) -> Result<Self, ShaderError> {
        let path = path.as_ref().to_path_buf();
        let source = read_source(&path, max_len)?;
        let last_modified = fs::metadata(&path)?.modified()?;

        Ok(Self {
            path,
            max_len,
            last_modified,
            source,
        })
    }

    /// Check if the shader file has been modified and reload if so.
    /// Returns `true` if the source changed.
    pub fn check_reload(&mut self) -> bool {
        let Ok(modified) = fs::metadata(&self.path).and_then(|m| m.modified()) else {
            return false;
        };

        if modified <= self.last_modified {
            return false;
        }
        // Don't retry a broken file every frame.
        self.last_modified = modified;

        match read_source(&self.path, self.max_len) {
            Ok(source) => {
                self.source = source;
                true
            }
            Err(e) => {
                log::warn!("couldn't reload {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Get the current shader source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the shader file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
