use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";
pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Chunks handed to the model per question.
    pub top_k: usize,
    /// Chunks returned by the document listing endpoint.
    pub list_limit: usize,
    /// Character budget for the prompt context; lower-ranked chunks past it are dropped.
    pub max_context_chars: Option<usize>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
            list_limit: 5,
            max_context_chars: Some(12_000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    /// Where uploads are staged while parsed. Defaults to the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 20 * 1024 * 1024,
            scratch_dir: None,
        }
    }
}

impl UploadConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub qa: QaPrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub system: String,
    /// Must contain `{context}` and `{question}`.
    pub template: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: "You are a careful legal assistant. Answer only from the supplied \
                     document excerpts."
                .to_string(),
            template: "Use the following pieces of context to answer the question at the end. \
                       If you don't know the answer, just say that you don't know, don't try \
                       to make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
                .to_string(),
        }
    }
}

impl QaPrompts {
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .replace("{context}", context)
            .replace("{question}", question)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Loads `CONFIG_PATH` / `PROMPTS_PATH` (or the defaults), then applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("PROMPTS_PATH").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut app = Self::from_files(Path::new(&config_path), Path::new(&prompts_path))?;
        app.apply_env_overrides()?;
        Ok(app)
    }

    /// Missing files fall back to built-in defaults; malformed files are errors.
    pub fn from_files(config_path: &Path, prompts_path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            config: read_yaml_or_default(config_path)?,
            prompts: read_yaml_or_default(prompts_path)?,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.config.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.config.server.port = port.parse().map_err(|_| ConfigError::Env {
                key: "SERVER_PORT",
                value: port,
            })?;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.config.llm.model = model;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            self.config.embedding.model = model;
        }
        Ok(())
    }
}

fn read_yaml_or_default<T>(path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned + Default,
{
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(T::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppConfig::from_files(&dir.path().join("nope.yaml"), &dir.path().join("nope2.yaml"))
            .unwrap();

        assert_eq!(app.config.rag.chunk_size, 1000);
        assert_eq!(app.config.rag.chunk_overlap, 200);
        assert_eq!(app.config.rag.list_limit, 5);
        assert!(app.prompts.qa.template.contains("{context}"));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "rag:\n  top_k: 7\nserver:\n  port: 9090").unwrap();

        let app = AppConfig::from_files(&path, &dir.path().join("prompts.yaml")).unwrap();

        assert_eq!(app.config.rag.top_k, 7);
        assert_eq!(app.config.rag.chunk_size, 1000);
        assert_eq!(app.config.server.port, 9090);
        assert_eq!(app.config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "rag: [not, a, map").unwrap();

        let err = AppConfig::from_files(&path, &dir.path().join("prompts.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn test_render_fills_placeholders() {
        let prompts = QaPrompts {
            system: String::new(),
            template: "C={context};Q={question}".to_string(),
        };
        assert_eq!(prompts.render("ctx", "why?"), "C=ctx;Q=why?");
    }
}
