use std::{
    collections::HashMap,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use maplit::hashmap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::error::JudgeError;
use crate::str_interp::{self, InterpError};

/// Placeholder names usable in command templates, e.g. `#{source}`.
pub mod placeholder {
    /// Path of the source file
    pub const SOURCE: &str = "source";
    /// File name of the source without extension (e.g. `Main` for `Main.java`)
    pub const SOURCE_STEM: &str = "sourceStem";
    /// Temporary directory holding build artifacts (compiled languages only)
    pub const OUT_DIR: &str = "outDir";
    /// Path of the executable produced by the compiler (compiled languages only)
    pub const EXE: &str = "exe";
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Language {
    C,
    #[strum(serialize = "C++")]
    Cpp,
    Rust,
    Go,
    Java,
    Python,
    JavaScript,
    Ruby,
}

/// A command line as argument tokens. Tokens may contain `#{...}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandTemplate(Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toolchain {
    Interpreted {
        run: CommandTemplate,
    },
    Compiled {
        compile: CommandTemplate,
        run: CommandTemplate,
    },
}

pub type CommandVars<'a> = HashMap<&'static str, &'a OsStr>;

impl Language {
    pub const fn extension(&self) -> &'static str {
        use Language::*;
        match self {
            C => "c",
            Cpp => "cpp",
            Rust => "rs",
            Go => "go",
            Java => "java",
            Python => "py",
            JavaScript => "js",
            Ruby => "rb",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::iter().find(|lang| lang.extension() == ext)
    }

    /// Detects the language from the extension of `path`.
    pub fn detect(path: impl AsRef<Path>) -> Result<Self, JudgeError> {
        let path = path.as_ref();
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
        ext.as_deref()
            .and_then(Self::from_extension)
            .ok_or_else(|| JudgeError::LanguageNotSupported {
                path: path.to_owned(),
                ext,
            })
    }

    pub fn default_toolchain(&self) -> Toolchain {
        use Language::*;
        let compiled = |compile: &[&str], run: &[&str]| Toolchain::Compiled {
            compile: CommandTemplate::from(compile),
            run: CommandTemplate::from(run),
        };
        let interpreted = |run: &[&str]| Toolchain::Interpreted {
            run: CommandTemplate::from(run),
        };
        match self {
            C => compiled(&["gcc", "#{source}", "-o", "#{exe}"], &["#{exe}"]),
            Cpp => compiled(&["g++", "#{source}", "-o", "#{exe}"], &["#{exe}"]),
            Rust => compiled(&["rustc", "#{source}", "-o", "#{exe}"], &["#{exe}"]),
            Go => compiled(&["go", "build", "-o", "#{exe}", "#{source}"], &["#{exe}"]),
            Java => compiled(
                &["javac", "-d", "#{outDir}", "#{source}"],
                &["java", "-cp", "#{outDir}", "#{sourceStem}"],
            ),
            Python => interpreted(&["python3", "#{source}"]),
            JavaScript => interpreted(&["node", "#{source}"]),
            Ruby => interpreted(&["ruby", "#{source}"]),
        }
    }
}

impl CommandTemplate {
    pub fn new<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn bind(&self, vars: &CommandVars) -> Result<Vec<String>, InterpError> {
        str_interp::interp_args(&self.0, vars)
    }
}

impl From<&[&str]> for CommandTemplate {
    fn from(tokens: &[&str]) -> Self {
        Self::new(tokens.iter().copied())
    }
}

impl std::fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl Toolchain {
    pub fn is_compiled(&self) -> bool {
        matches!(self, Toolchain::Compiled { .. })
    }

    pub fn compile_template(&self) -> Option<&CommandTemplate> {
        match self {
            Toolchain::Interpreted { .. } => None,
            Toolchain::Compiled { compile, .. } => Some(compile),
        }
    }

    pub fn run_template(&self) -> &CommandTemplate {
        match self {
            Toolchain::Interpreted { run } | Toolchain::Compiled { run, .. } => run,
        }
    }

    /// Checks that every placeholder is available for this kind of toolchain,
    /// without touching the file system.
    pub fn validate(&self) -> Result<(), InterpError> {
        let dummy_source = PathBuf::from("Main.src");
        let dummy_out_dir = PathBuf::from("out");
        let out_dir = self.is_compiled().then_some(dummy_out_dir.as_path());
        let exe = out_dir.map(|d| d.join("main"));
        let vars = self::command_vars(&dummy_source, out_dir, exe.as_deref());

        if let Some(compile) = self.compile_template() {
            compile.bind(&vars)?;
        }
        self.run_template().bind(&vars)?;
        Ok(())
    }
}

/// Builds the placeholder table. `out_dir` and `exe` exist only for compiled languages.
pub fn command_vars<'a>(
    source: &'a Path,
    out_dir: Option<&'a Path>,
    exe: Option<&'a Path>,
) -> CommandVars<'a> {
    let mut vars = hashmap! {
        placeholder::SOURCE => source.as_os_str(),
        placeholder::SOURCE_STEM => source.file_stem().unwrap_or(source.as_os_str()),
    };
    if let Some(dir) = out_dir {
        vars.insert(placeholder::OUT_DIR, dir.as_os_str());
    }
    if let Some(exe) = exe {
        vars.insert(placeholder::EXE, exe.as_os_str());
    }
    vars
}
