use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Common supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// A workflow state. `kind` is the state category (`started`, `completed`...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Hex color with `#` prefix, as returned by the Linear API.
    #[serde(default)]
    pub color: String,
}

/// Human-readable name for a Linear priority value.
pub fn priority_label(priority: i32) -> &'static str {
    match priority {
        0 => "None",
        1 => "Urgent",
        2 => "High",
        3 => "Normal",
        4 => "Low",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_labels() {
        assert_eq!(priority_label(0), "None");
        assert_eq!(priority_label(1), "Urgent");
        assert_eq!(priority_label(4), "Low");
        assert_eq!(priority_label(7), "Unknown");
    }
}
