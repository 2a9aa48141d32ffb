use crate::collect::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORE_DIR: &str = "votes";
pub const DEFAULT_TITLE: &str = "Class Vote Results";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    pub title: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub provider: String,
    pub url: Option<String>,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "storeDir")]
    pub store_dir: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
}

impl SourceSettings {
    /// Checks the fields required by the provider. Relative paths are taken from `root`.
    pub fn resolve(&self, root: &Path) -> VmResult<SourceSpec> {
        match self.provider.as_str() {
            "remote" => Ok(SourceSpec::Remote {
                url: self.url.clone(),
                timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            }),
            "local" => Ok(SourceSpec::Local {
                store_dir: resolve_path(
                    root,
                    self.store_dir.as_deref().unwrap_or(DEFAULT_STORE_DIR),
                ),
            }),
            "csv" => {
                let file_path = self.file_path.as_deref().context(MissingSourceFieldSnafu {
                    provider: self.provider.clone(),
                    field: "filePath",
                })?;
                Ok(SourceSpec::Csv {
                    path: resolve_path(root, file_path),
                })
            }
            _ => UnknownProviderSnafu {
                provider: self.provider.clone(),
            }
            .fail(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TopicSettings {
    pub id: String,
    pub title: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoteConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
    #[serde(default)]
    pub topics: Vec<TopicSettings>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SourceSpec {
    Remote {
        url: Option<String>,
        timeout: Duration,
    },
    Local {
        store_dir: PathBuf,
    },
    Csv {
        path: PathBuf,
    },
}

/// Everything a command needs, after the configuration file and the command
/// line have been combined.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub title: String,
    pub output_path: Option<String>,
    /// In order of precedence.
    pub sources: Vec<SourceSpec>,
    pub topics: Vec<TopicSettings>,
    /// Where `submit` and `clear` operate.
    pub store_dir: PathBuf,
}

pub fn default_topics() -> Vec<TopicSettings> {
    [
        ("mental-health", "AI & Mental Health"),
        ("defenses", "AI Defenses"),
        ("personal-info", "Personal Information & AI"),
        ("politics", "AI & Politics"),
        ("education", "AI in Education"),
        ("creativity", "AI & Creativity"),
    ]
    .iter()
    .map(|(id, title)| TopicSettings {
        id: id.to_string(),
        title: title.to_string(),
    })
    .collect()
}

fn resolve_path(root: &Path, p: &str) -> PathBuf {
    let path = Path::new(p);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub fn read_config(path: &str) -> VmResult<VoteConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: VoteConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

/// Combines the configuration file, if any, with the overrides of the command line.
///
/// Without a configuration file the sources are the collection endpoint, then
/// the local store in `votes`. The `--input` paths always come last.
pub fn load_settings(
    config_path: Option<&str>,
    store_dir: Option<&str>,
    endpoint: Option<&str>,
    inputs: &[String],
) -> VmResult<RunSettings> {
    let (config, root): (VoteConfig, PathBuf) = match config_path {
        Some(p) => {
            let config = read_config(p)?;
            info!("load_settings: config: {:?}", config);
            let root = Path::new(p)
                .parent()
                .map(|x| x.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (VoteConfig::default(), PathBuf::new()),
    };

    let mut sources: Vec<SourceSpec> = if config_path.is_some() {
        config
            .sources
            .iter()
            .map(|s| s.resolve(&root))
            .collect::<VmResult<Vec<SourceSpec>>>()?
    } else {
        vec![
            SourceSpec::Remote {
                url: None,
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            SourceSpec::Local {
                store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            },
        ]
    };

    if let Some(url) = endpoint {
        let mut found = false;
        for s in sources.iter_mut() {
            if let SourceSpec::Remote { url: u, .. } = s {
                *u = Some(url.to_string());
                found = true;
            }
        }
        if !found {
            sources.insert(
                0,
                SourceSpec::Remote {
                    url: Some(url.to_string()),
                    timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                },
            );
        }
    }

    if let Some(dir) = store_dir {
        let mut found = false;
        for s in sources.iter_mut() {
            if let SourceSpec::Local { store_dir: d } = s {
                *d = PathBuf::from(dir);
                found = true;
            }
        }
        if !found {
            let pos = sources
                .iter()
                .take_while(|s| matches!(s, SourceSpec::Remote { .. }))
                .count();
            sources.insert(
                pos,
                SourceSpec::Local {
                    store_dir: PathBuf::from(dir),
                },
            );
        }
    }

    for input in inputs.iter() {
        sources.push(SourceSpec::Csv {
            path: PathBuf::from(input),
        });
    }

    let local_dir: PathBuf = match store_dir {
        Some(dir) => PathBuf::from(dir),
        None => sources
            .iter()
            .find_map(|s| match s {
                SourceSpec::Local { store_dir } => Some(store_dir.clone()),
                _ => None,
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
    };

    let topics = if config.topics.is_empty() {
        default_topics()
    } else {
        config.topics.clone()
    };

    let settings = RunSettings {
        title: config
            .output_settings
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        output_path: config
            .output_settings
            .output_path
            .as_deref()
            .map(|p| {
                if p == "stdout" {
                    p.to_string()
                } else {
                    resolve_path(&root, p).display().to_string()
                }
            }),
        sources,
        topics,
        store_dir: local_dir,
    };
    debug!("load_settings: {:?}", settings);
    Ok(settings)
}
