//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in order: files and inline YAML as they are added, then
//! `PROWL__`-prefixed environment variables on top (`PROWL__SITE__MAX_PAGES=3`
//! overrides `site.max_pages`). String values may reference `${VAR}`, which
//! is expanded after merging. Every section has defaults, so an empty
//! document is a valid configuration.
use config::{Config, ConfigError, Environment, File};
use prowl_common::settings::{BrowserSettings, SessionSettings, SiteSettings};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "PROWL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProwlConfig {
    pub version: Option<String>,
    pub browser: BrowserSettings,
    pub session: SessionSettings,
    pub site: SiteSettings,
}

impl ProwlConfig {
    /// Session directory with a leading `~` expanded.
    pub fn session_dir(&self) -> PathBuf {
        match self.session.dir.to_str() {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => self.session.dir.clone(),
        }
    }
}

/// `~/.config/prowl/prowl.yaml` (platform equivalent), if a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prowl").join("prowl.yaml"))
}

/// Expand `${VAR}` / `$VAR` references until the string stops changing or
/// the depth cap is hit. Unknown variables are left as written.
fn expand_str(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let Ok(next) = shellexpand::env(&current) else {
            break;
        };
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

fn expand_env_in_value(value: &mut Value) {
    match value {
        Value::String(s) if s.contains('$') => *s = expand_str(s),
        Value::Array(items) => items.iter_mut().for_each(expand_env_in_value),
        Value::Object(map) => map.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ProwlConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ProwlConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProwlConfigLoader {
    /// Start with no file sources; `PROWL__` env overrides are applied at load.
    ///
    /// ```
    /// use prowl_config::ProwlConfigLoader;
    ///
    /// let config = ProwlConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.browser.headless);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so env-only deployments still load.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use prowl_config::ProwlConfigLoader;
    ///
    /// let cfg = ProwlConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// site:
    ///   base_url: "https://example.test"
    ///   timeouts:
    ///     login_settle: 100
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.site.base_url, "https://example.test");
    /// assert_eq!(cfg.site.timeouts.login_settle, 100);
    /// assert_eq!(cfg.site.timeouts.field_wait, 1000);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge every source, env last, and deserialize into [`ProwlConfig`].
    pub fn load(self) -> Result<ProwlConfig, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true);
        let merged = self.builder.add_source(env).build()?;

        let mut tree = match merged.try_deserialize::<Value>()? {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        expand_env_in_value(&mut tree);

        serde_json::from_value(tree).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("PROWL_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${PROWL_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("PROWL_TEST_CITY", Some("Milan")), ("PROWL_TEST_REGION", Some("MI"))],
            || {
                let mut v = json!([
                    "jobs-$PROWL_TEST_CITY",
                    { "loc": "${PROWL_TEST_CITY}-${PROWL_TEST_REGION}" },
                    42,
                    true,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["jobs-Milan", { "loc": "Milan-MI" }, 42, true, null])
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("PROWL_TEST_BAZ", Some("qux")),
                ("PROWL_TEST_BAR", Some("mid-${PROWL_TEST_BAZ}")),
                ("PROWL_TEST_TOP", Some("start-${PROWL_TEST_BAR}-end")),
            ],
            || {
                let mut v = json!("X=${PROWL_TEST_TOP}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars(
            [("PROWL_TEST_A", Some("${PROWL_TEST_B}")), ("PROWL_TEST_B", Some("${PROWL_TEST_A}"))],
            || {
                let mut v = json!("x=${PROWL_TEST_A}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${PROWL_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${PROWL_TEST_DOES_NOT_EXIST}"));
    }

    #[test]
    fn session_dir_expands_home() {
        temp_env::with_var("HOME", Some("/home/prowl"), || {
            let mut cfg = ProwlConfig::default();
            cfg.session.dir = PathBuf::from("~/sessions");
            assert_eq!(cfg.session_dir(), PathBuf::from("/home/prowl/sessions"));
        });
    }
}
