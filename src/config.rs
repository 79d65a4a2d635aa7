use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::error::{PlanError, PlanResult};

/// Crew definition shipped with the binary.
const DEFAULT_CREW_JSON: &str = include_str!("../config/crew.json");

/// Declarative definition of the workers and the tasks they carry out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewConfig {
    pub workers: Vec<WorkerConfig>,
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub id: String,
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub allow_delegation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub id: String,
    pub worker: String,
    /// Task text; `{message}` and `{timestamp}` are filled in per run.
    pub description: String,
    pub expected_output: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub output_schema: Option<OutputSchema>,
}

/// Structured contract a unit's output must be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    TravelPlan,
}

impl CrewConfig {
    /// The built-in crew: flight researcher, hotel researcher, travel planner.
    pub fn builtin() -> PlanResult<Self> {
        Self::from_json_str(DEFAULT_CREW_JSON)
    }

    pub fn from_json_str(raw: &str) -> PlanResult<Self> {
        let cfg: CrewConfig = serde_json::from_str(raw)
            .map_err(|e| PlanError::Config(format!("invalid crew config: {}", e)))?;
        Ok(cfg.expanded())
    }

    fn expanded(mut self) -> Self {
        for worker in &mut self.workers {
            worker.role = expand_env_vars(&worker.role);
            worker.goal = expand_env_vars(&worker.goal);
            worker.backstory = expand_env_vars(&worker.backstory);
        }
        for task in &mut self.tasks {
            task.description = expand_env_vars(&task.description);
            task.expected_output = expand_env_vars(&task.expected_output);
        }
        self
    }
}

/// Locate an external crew file: `TRAVEL_CREW_CONFIG`, then `./crew.json`.
pub fn resolve_crew_config_path() -> PlanResult<Option<PathBuf>> {
    if let Ok(p) = env::var("TRAVEL_CREW_CONFIG") {
        let path = PathBuf::from(p);
        if !path.exists() {
            return Err(PlanError::Config(format!(
                "TRAVEL_CREW_CONFIG points to missing file {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let candidate = PathBuf::from("crew.json");
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

pub fn load_crew_config_from(path: &PathBuf) -> PlanResult<CrewConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|e| PlanError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    CrewConfig::from_json_str(&raw)
}

/// Load the crew definition, falling back to the built-in one.
pub fn load_crew_config() -> PlanResult<CrewConfig> {
    match resolve_crew_config_path()? {
        Some(path) => {
            tracing::info!("Loading crew config from {}", path.display());
            load_crew_config_from(&path)
        }
        None => {
            tracing::info!("Using built-in crew config");
            CrewConfig::builtin()
        }
    }
}

/// Replace `${NAME}` with the value of the environment variable, leaving
/// unknown references untouched. Single-brace `{message}` placeholders are
/// not affected.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}
