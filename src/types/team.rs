use serde::{Deserialize, Serialize};

use super::common::{Team, User};

/// A team with the fields `team list` and `team get` show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    #[serde(default)]
    pub description: String,
    pub private: bool,
    pub issue_count: u32,
}

/// A workspace user together with their account flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(flatten)]
    pub user: User,
    pub active: bool,
    pub admin: bool,
    #[serde(default)]
    pub is_me: bool,
}

impl Member {
    pub fn role(&self) -> &'static str {
        if self.admin { "Admin" } else { "Member" }
    }

    pub fn status(&self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_flags_read_as_words() {
        let member = Member {
            user: User {
                id: "u1".to_owned(),
                name: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                display_name: String::new(),
            },
            active: false,
            admin: true,
            is_me: false,
        };
        assert_eq!(member.role(), "Admin");
        assert_eq!(member.status(), "Inactive");
    }
}
