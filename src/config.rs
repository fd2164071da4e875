use eyre::{Context, Result};
use gear::backend::ShellConfig;
use gear::planner::PlannerConfig;
use gear::runner::AgentLoopConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub goal_file: PathBuf,
    pub todo_file: PathBuf,
    pub agent: AgentSection,
    pub memory: MemorySection,
    pub shell: ShellSection,
    pub web: WebSection,
    pub planner: PlannerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub max_iterations: u32,
    pub iteration_delay_ms: u64,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            iteration_delay_ms: 2000,
        }
    }
}

impl AgentSection {
    pub fn loop_config(&self) -> AgentLoopConfig {
        AgentLoopConfig {
            max_iterations: self.max_iterations,
            iteration_delay: Duration::from_millis(self.iteration_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySection {
    pub knowledge_path: PathBuf,
    pub episodic_path: PathBuf,
    pub summarize_on_exit: bool,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            knowledge_path: PathBuf::from("assets/knowledge.jsonl"),
            episodic_path: PathBuf::from("assets/episodic.jsonl"),
            summarize_on_exit: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    pub program: String,
    pub timeout_ms: u64,
    pub working_dir: Option<PathBuf>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            timeout_ms: 120000,
            working_dir: None,
        }
    }
}

impl ShellSection {
    pub fn shell_config(&self) -> ShellConfig {
        ShellConfig {
            program: self.program.clone(),
            timeout_ms: self.timeout_ms,
            working_dir: self.working_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSection {
    /// How long element lookups wait before giving up
    pub timeout_ms: u64,
}

impl Default for WebSection {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    pub search_url: String,
    pub query_selector: String,
    pub submit_selector: String,
    pub headless: bool,
}

impl Default for PlannerSection {
    fn default() -> Self {
        let defaults = PlannerConfig::default();
        Self {
            search_url: defaults.search_url,
            query_selector: defaults.query_selector,
            submit_selector: defaults.submit_selector,
            headless: defaults.headless,
        }
    }
}

impl PlannerSection {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            search_url: self.search_url.clone(),
            query_selector: self.query_selector.clone(),
            submit_selector: self.submit_selector.clone(),
            headless: self.headless,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            goal_file: PathBuf::from("goal.txt"),
            todo_file: PathBuf::from("ToDo.md"),
            agent: AgentSection::default(),
            memory: MemorySection::default(),
            shell: ShellSection::default(),
            web: WebSection::default(),
            planner: PlannerSection::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.agent.loop_config().iteration_delay, Duration::from_secs(2));
        assert_eq!(config.memory.knowledge_path, PathBuf::from("assets/knowledge.jsonl"));
        assert!(config.memory.summarize_on_exit);
        assert_eq!(config.shell.shell_config().program, "sh");
        assert!(!config.planner.headless);
        assert_eq!(config.goal_file, PathBuf::from("goal.txt"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "agent:\n  max_iterations: 3\nplanner:\n  headless: true\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.agent.max_iterations, 3);
        assert_eq!(config.agent.iteration_delay_ms, 2000);
        assert!(config.planner.planner_config().headless);
        assert_eq!(config.planner.search_url, "https://www.google.com");
        assert_eq!(config.shell.timeout_ms, 120000);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gear.yml");
        fs::write(&path, "memory:\n  knowledge_path: /tmp/k.jsonl\n  summarize_on_exit: false\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.memory.knowledge_path, PathBuf::from("/tmp/k.jsonl"));
        assert!(!config.memory.summarize_on_exit);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("missing.yml"))).is_err());
    }
}
