use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const WORKOUTS_KEY: &str = "workouts";
pub const LAST_DATE_KEY: &str = "lastDate";
pub const NOTES_KEY: &str = "notes";
pub const USER_NAME_KEY: &str = "userName";

/// String-valued key-value persistence. A missing key reads as `None`.
pub trait Backend {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

pub fn resolve_data_dir() -> Result<PathBuf, io::Error> {
    if let Ok(path) = env::var("APP_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data"))
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key);
        atomic_write(&path, value)?;
        debug!(key, path = %path.display(), "persisted");
        Ok(())
    }
}

fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp_path, contents.as_bytes())?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FlakyBackend {
    pub inner: MemoryBackend,
    failures: usize,
}

#[cfg(test)]
impl FlakyBackend {
    pub fn failing(failures: usize) -> Self {
        Self {
            inner: MemoryBackend::new(),
            failures,
        }
    }
}

#[cfg(test)]
impl Backend for FlakyBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(io::Error::other("disk unavailable"));
        }
        self.inner.write(key, value)
    }
}
