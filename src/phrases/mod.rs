use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::{Deserialize, Serialize};

static PHRASE_DIR: Dir = include_dir!("src/phrases");

/// Pools compiled into the binary.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinPool {
    #[default]
    Motivational,
    Pangrams,
}

#[derive(Deserialize)]
struct PoolFile {
    name: String,
    phrases: Vec<String>,
}

/// Non-empty, read-only set of candidate phrases.
#[derive(Debug, Clone, PartialEq)]
pub struct PhrasePool {
    name: String,
    phrases: Vec<String>,
}

impl PhrasePool {
    /// Builds a pool, dropping blank phrases. Fails if nothing is left.
    pub fn new(name: impl Into<String>, phrases: Vec<String>) -> Result<Self> {
        let name = name.into();
        let phrases = phrases
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<String>>();

        if phrases.is_empty() {
            bail!("phrase pool '{name}' has no phrases");
        }

        Ok(Self { name, phrases })
    }

    pub fn builtin(pool: BuiltinPool) -> Result<Self> {
        let file_name = format!("{pool}.json");
        let file = PHRASE_DIR
            .get_file(&file_name)
            .ok_or_else(|| anyhow!("built-in pool {file_name} is missing"))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| anyhow!("built-in pool {file_name} is not utf-8"))?;
        Self::from_json(contents).with_context(|| format!("reading built-in pool {file_name}"))
    }

    /// Loads `.json` files in the `{ "name", "phrases" }` shape; anything else
    /// is read as one phrase per line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading phrase file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            return Self::from_json(&contents)
                .with_context(|| format!("parsing phrase file {}", path.display()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::new(name, contents.lines().map(str::to_string).collect())
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: PoolFile = serde_json::from_str(contents)?;
        Self::new(file.name, file.phrases)
    }

    /// Pool holding just one prompt, used for `--prompt`.
    pub fn single(prompt: impl Into<String>) -> Result<Self> {
        Self::new("custom", vec![prompt.into()])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Uniform pick; phrases may repeat between sessions.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.phrases[rng.gen_range(0..self.phrases.len())]
    }
}
