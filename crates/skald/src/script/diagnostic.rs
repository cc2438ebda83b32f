use std::fmt;

use crate::entity::EntityId;

/// Lifecycle hooks a script may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    Start,
    Update,
    Destroy,
    Collision,
}

impl Hook {
    pub const ALL: [Hook; 4] = [Hook::Start, Hook::Update, Hook::Destroy, Hook::Collision];

    /// Function name in script source.
    pub fn name(self) -> &'static str {
        match self {
            Hook::Start => "onStart",
            Hook::Update => "onUpdate",
            Hook::Destroy => "onDestroy",
            Hook::Collision => "onCollision",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Hook::Start | Hook::Destroy => 0,
            Hook::Update | Hook::Collision => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The script failed to compile and is disabled for the session.
    Compile,
    /// A hook raised an error. Other scripts kept running.
    Runtime { hook: Hook },
    /// A proxy call was rejected (unknown component kind, missing prefab, ...).
    Api,
}

/// A script problem, attributed to a script and its entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDiagnostic {
    pub kind: DiagnosticKind,
    pub script: String,
    pub entity: String,
    pub entity_id: EntityId,
    pub message: String,
}

impl fmt::Display for ScriptDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.kind {
            DiagnosticKind::Compile => "compile",
            DiagnosticKind::Runtime { hook } => hook.name(),
            DiagnosticKind::Api => "api",
        };
        write!(
            f,
            "[{stage}] \"{}\" on \"{}\": {}",
            self.script, self.entity, self.message
        )
    }
}
