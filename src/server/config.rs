use std::path::PathBuf;

/// Process configuration, read once at startup from the environment
/// (`.env` supported via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port.
    pub port: u16,
    /// Host or IP used when building absolute voice-asset URLs.
    pub public_host: String,
    pub database_url: String,
    /// Root of the statically served files namespace.
    pub files_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?;

        let public_host = std::env::var("PUBLIC_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://pairchat.db?mode=rwc".to_string());

        let files_dir = std::env::var("FILES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./files"));

        Ok(Self {
            port,
            public_host,
            database_url,
            files_dir,
        })
    }

    /// Base for absolute URLs handed to clients.
    pub fn public_base_url(&self) -> String {
        format!("http://{}:{}", self.public_host, self.port)
    }

    pub fn voice_messages_dir(&self) -> PathBuf {
        self.files_dir.join("voice_messages")
    }
}

#[cfg(test)]
impl Config {
    /// Config pointing at a throwaway files directory, for tests.
    pub fn for_tests(files_dir: PathBuf) -> Self {
        Self {
            port: 4000,
            public_host: "127.0.0.1".to_string(),
            database_url: "sqlite::memory:".to_string(),
            files_dir,
        }
    }
}
