//! Model construction and loading
//!
//! A [`Model`] is the validated, immutable form of the two configuration
//! documents. It is built once and shared read-only between invocations.

use crate::config::{ActionCatalogDocument, ContextRulesConfig, TuningDocument};
use crate::error::ComputeError;
use crate::types::{ActionDefinition, TraitVector};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the catalog path
pub const BASE_PATH_ENV: &str = "SETTINGS_BASE";
/// Environment variable overriding the tuning path
pub const TUNING_PATH_ENV: &str = "SETTINGS_TUNING";
/// Default catalog file name
pub const DEFAULT_BASE_FILE: &str = "setting.base.json";
/// Older catalog file name, tried when the default is absent
pub const LEGACY_BASE_FILE: &str = "settings.base.json";
/// Default tuning file name
pub const DEFAULT_TUNING_FILE: &str = "settings.tuning.json";

const BASE_LABEL: &str = "setting.base";
const TUNING_LABEL: &str = "settings.tuning";

/// Read-only action catalog indexed by id and by alias
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<Arc<ActionDefinition>>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl ActionCatalog {
    /// Build the catalog; ids must be unique
    pub fn new(actions: Vec<ActionDefinition>) -> Result<Self, ComputeError> {
        let mut by_id = HashMap::with_capacity(actions.len());
        let mut by_alias = HashMap::new();

        for (idx, action) in actions.iter().enumerate() {
            if by_id.insert(action.id.clone(), idx).is_some() {
                return Err(ComputeError::config(format!(
                    "{BASE_LABEL}: duplicate action id `{}`",
                    action.id
                )));
            }
            if let Some(alias) = &action.alias {
                by_alias.insert(alias.clone(), idx);
            }
        }

        Ok(Self {
            actions: actions.into_iter().map(Arc::new).collect(),
            by_id,
            by_alias,
        })
    }

    /// Look up a key by alias first, then by id
    pub fn lookup(&self, key: &str) -> Option<&Arc<ActionDefinition>> {
        self.by_alias
            .get(key)
            .or_else(|| self.by_id.get(key))
            .map(|&idx| &self.actions[idx])
    }

    /// Look up by id only
    pub fn get(&self, id: &str) -> Option<&Arc<ActionDefinition>> {
        self.by_id.get(id).map(|&idx| &self.actions[idx])
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActionDefinition>> {
        self.actions.iter()
    }
}

/// Scenario with its pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub name: Option<String>,
    pub pattern: Regex,
    pub total_minutes_limit: Option<f64>,
    pub bonus: TraitVector,
}

/// Validated rule configuration
#[derive(Debug, Clone)]
pub struct Model {
    pub version: String,
    /// Minutes that count as one unit of scale in the accumulator
    pub time_base_min: f64,
    pub matrix: HashMap<String, TraitVector>,
    pub catalog: ActionCatalog,
    pub scenes: Map<String, Value>,
    pub context_rules: ContextRulesConfig,
    pub scenarios: Vec<CompiledScenario>,
}

impl Model {
    /// Build a model from the catalog and tuning documents
    pub fn from_documents(base: &Value, tuning: &Value) -> Result<Self, ComputeError> {
        if !base.get("actions").is_some_and(Value::is_array) {
            return Err(ComputeError::config(format!(
                "{BASE_LABEL}: actions must be array"
            )));
        }
        if tuning.get("matrix").map_or(true, Value::is_null) {
            return Err(ComputeError::config(format!(
                "{TUNING_LABEL}: matrix is required"
            )));
        }
        if !tuning.get("time_base_min").is_some_and(Value::is_number) {
            return Err(ComputeError::config(format!(
                "{TUNING_LABEL}: time_base_min must be number"
            )));
        }

        let base_doc: ActionCatalogDocument = serde_json::from_value(base.clone())
            .map_err(|e| ComputeError::config(format!("{BASE_LABEL}: {e}")))?;
        let tuning_doc: TuningDocument = serde_json::from_value(tuning.clone())
            .map_err(|e| ComputeError::config(format!("{TUNING_LABEL}: {e}")))?;

        Self::from_parsed(base_doc, tuning_doc)
    }

    /// Build a model from the two documents given as JSON text
    pub fn from_json(base_json: &str, tuning_json: &str) -> Result<Self, ComputeError> {
        let base: Value = serde_json::from_str(base_json)
            .map_err(|e| ComputeError::config(format!("{BASE_LABEL}: invalid JSON: {e}")))?;
        let tuning: Value = serde_json::from_str(tuning_json)
            .map_err(|e| ComputeError::config(format!("{TUNING_LABEL}: invalid JSON: {e}")))?;
        Self::from_documents(&base, &tuning)
    }

    /// Build a model from already-typed documents
    pub fn from_parsed(
        base: ActionCatalogDocument,
        tuning: TuningDocument,
    ) -> Result<Self, ComputeError> {
        if !tuning.time_base_min.is_finite() || tuning.time_base_min <= 0.0 {
            return Err(ComputeError::config(format!(
                "{TUNING_LABEL}: time_base_min must be a positive number, got {}",
                tuning.time_base_min
            )));
        }

        let fixed_by_id: HashMap<&str, TraitVector> = tuning
            .actions_fixed
            .iter()
            .map(|r| (r.id.as_str(), r.fixed_deltas))
            .collect();

        let mut actions = Vec::with_capacity(base.actions.len());
        for spec in base.actions {
            if !spec.duration_min.is_finite() || spec.duration_min < 0.0 {
                return Err(ComputeError::config(format!(
                    "{BASE_LABEL}: action `{}` has invalid duration_min {}",
                    spec.id, spec.duration_min
                )));
            }
            if !(spec.duration_min / tuning.time_base_min).is_finite() {
                return Err(ComputeError::config(format!(
                    "{BASE_LABEL}: action `{}` duration_min {} overflows time_base_min {}",
                    spec.id, spec.duration_min, tuning.time_base_min
                )));
            }
            let fixed_deltas = fixed_by_id
                .get(spec.id.as_str())
                .copied()
                .or(spec.fixed_deltas)
                .unwrap_or_default();

            actions.push(ActionDefinition {
                id: spec.id,
                alias: spec.alias,
                scene: spec.scene,
                duration_min: spec.duration_min,
                tags: spec.tags,
                is_break: spec.is_break,
                fixed_deltas,
            });
        }
        let catalog = ActionCatalog::new(actions)?;

        let mut scenarios = Vec::with_capacity(tuning.scenarios.len());
        for sc in tuning.scenarios {
            if sc.kind != "regex" {
                tracing::debug!(kind = %sc.kind, "ignoring scenario with unsupported type");
                continue;
            }
            let pattern = Regex::new(&sc.expr).map_err(|source| ComputeError::Pattern {
                expr: sc.expr.clone(),
                source,
            })?;
            scenarios.push(CompiledScenario {
                name: sc.name,
                pattern,
                total_minutes_limit: sc.time_limits.and_then(|t| t.total_minutes),
                bonus: sc.base_bonus,
            });
        }

        Ok(Self {
            version: tuning.version,
            time_base_min: tuning.time_base_min,
            matrix: tuning.matrix,
            catalog,
            scenes: base.scenes,
            context_rules: tuning.context_rules,
            scenarios,
        })
    }

    /// Matrix row for a tag; missing rows contribute nothing
    pub fn matrix_row(&self, tag: &str) -> TraitVector {
        self.matrix.get(tag).copied().unwrap_or_default()
    }
}

/// Locates and reads the two configuration documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLoader {
    base_path: PathBuf,
    tuning_path: PathBuf,
}

impl ModelLoader {
    /// Use explicit paths, resolved against the current directory if relative
    pub fn new(base_path: impl AsRef<Path>, tuning_path: impl AsRef<Path>) -> Self {
        let cwd = current_dir();
        Self {
            base_path: resolve_path(base_path.as_ref(), &cwd),
            tuning_path: resolve_path(tuning_path.as_ref(), &cwd),
        }
    }

    /// Resolve paths from `SETTINGS_BASE` / `SETTINGS_TUNING` and defaults
    pub fn from_env() -> Self {
        Self::with_overrides(None, None)
    }

    /// Explicit paths win; missing ones fall back to the environment
    pub fn with_overrides(base: Option<PathBuf>, tuning: Option<PathBuf>) -> Self {
        let cwd = current_dir();
        let base_path = match base {
            Some(p) => resolve_path(&p, &cwd),
            None => resolve_base_path(std::env::var(BASE_PATH_ENV).ok(), &cwd),
        };
        let tuning_path = match tuning {
            Some(p) => resolve_path(&p, &cwd),
            None => resolve_path(
                Path::new(
                    &std::env::var(TUNING_PATH_ENV)
                        .unwrap_or_else(|_| DEFAULT_TUNING_FILE.to_string()),
                ),
                &cwd,
            ),
        };
        Self {
            base_path,
            tuning_path,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn tuning_path(&self) -> &Path {
        &self.tuning_path
    }

    /// Read both documents and build the model
    pub fn load(&self) -> Result<Model, ComputeError> {
        let base = load_json(&self.base_path)?;
        let tuning = load_json(&self.tuning_path)?;
        let model = Model::from_documents(&base, &tuning)?;

        tracing::info!(
            version = %model.version,
            actions = model.catalog.len(),
            scenarios = model.scenarios.len(),
            base = %self.base_path.display(),
            tuning = %self.tuning_path.display(),
            "loaded scoring model"
        );
        Ok(model)
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Catalog path: env override or default name, falling back to the legacy
/// name only when the default does not exist but the legacy file does.
fn resolve_base_path(env_value: Option<String>, cwd: &Path) -> PathBuf {
    let candidate = env_value.unwrap_or_else(|| DEFAULT_BASE_FILE.to_string());
    let primary = resolve_path(Path::new(&candidate), cwd);
    if primary.exists() {
        return primary;
    }
    let legacy = resolve_path(Path::new(LEGACY_BASE_FILE), cwd);
    if legacy.exists() {
        legacy
    } else {
        primary
    }
}

fn load_json(path: &Path) -> Result<Value, ComputeError> {
    if !path.exists() {
        return Err(ComputeError::config(format!(
            "Config not found: {}",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ComputeError::config(format!("{}: invalid JSON: {e}", path.display())))
}
