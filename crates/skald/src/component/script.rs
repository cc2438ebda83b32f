use serde::{Deserialize, Serialize};

/// A named behavior script attached to an entity.
///
/// Only the source text is stored; compilation happens when simulation
/// starts (or when a spawned entity enters the running scene).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Script {
    pub name: String,
    pub source: String,
}

impl Script {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// A script pre-filled with [`default_script_template`].
    pub fn templated(name: impl Into<String>, entity_name: &str) -> Self {
        Self::new(name, default_script_template(entity_name))
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new("NewScript", "")
    }
}

/// Starter source for a freshly added script.
pub fn default_script_template(entity_name: &str) -> String {
    format!(
        r#"// Script for entity: {entity_name}

fn onStart() {{
    // Called once when the scene starts
}}

fn onUpdate(deltaTime) {{
    // Called every frame
    // transform.x += 100.0 * deltaTime;
}}

fn onDestroy() {{
    // Called when the entity is destroyed
}}
"#
    )
}
