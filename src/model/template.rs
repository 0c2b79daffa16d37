use serde::{Deserialize, Serialize};

/// Reusable message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTemplate {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub content: Option<String>,
}

impl MessageTemplate {
    pub fn from_new(id: String, new: NewTemplate) -> Self {
        MessageTemplate {
            id,
            name: new.name,
            content: new.content,
        }
    }

    pub fn apply(&mut self, patch: TemplatePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}
