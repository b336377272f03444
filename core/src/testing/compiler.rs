use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::bail;
use rand::{distributions::Alphanumeric, Rng as _};
use tokio::{process::Command, time::Instant};

/// Temporary directory for build artifacts, removed on drop.
#[derive(Debug)]
pub struct TempArtifactDir {
    path: PathBuf,
}

impl TempArtifactDir {
    const PREFIX: &'static str = "acsb-";
    const MAX_ATTEMPTS: usize = 16;

    #[cfg(not(windows))]
    const EXE_NAME: &'static str = "main";
    #[cfg(windows)]
    const EXE_NAME: &'static str = "main.exe";

    pub fn create() -> io::Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    /// `create_dir` fails on an existing path, so a name is never shared
    /// with another judge.
    pub fn create_in(parent: impl AsRef<Path>) -> io::Result<Self> {
        let parent = parent.as_ref();
        for _ in 0..Self::MAX_ATTEMPTS {
            let path = parent.join(Self::random_name());
            match fs::create_dir(&path) {
                Ok(()) => return Ok(Self { path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Cannot find a free temporary dir name in {:?}", parent),
        ))
    }

    fn random_name() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        format!("{}{}", Self::PREFIX, suffix)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn executable_path(&self) -> PathBuf {
        self.path.join(Self::EXE_NAME)
    }

    /// Safe to call more than once.
    pub fn remove(&self) {
        if !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed {:?}", self.path),
            Err(e) => log::warn!("Failed to remove {:?}: {}", self.path, e),
        }
    }
}

impl Drop for TempArtifactDir {
    fn drop(&mut self) {
        self.remove();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub success: bool,
    /// Captured stderr of the compiler, kept even on success (warnings).
    pub diagnostics: String,
    pub elapsed: Duration,
}

/// Runs the compile command. No time limit is applied.
///
/// A compiler that cannot be spawned is reported as a failed compilation.
pub async fn compile(cmd: &[String]) -> anyhow::Result<Compilation> {
    let Some((program, args)) = cmd.split_first() else {
        bail!("Empty compile command")
    };

    let start_at = Instant::now();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;
    let elapsed = start_at.elapsed();

    let compilation = match output {
        Ok(output) => Compilation {
            success: output.status.success(),
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed,
        },
        Err(e) => Compilation {
            success: false,
            diagnostics: format!("Failed to spawn '{}': {}", cmd.join(" "), e),
            elapsed,
        },
    };
    Ok(compilation)
}
