use thiserror::Error;

/// Time expression forms listed in `InvalidTimeExpression` diagnostics.
pub const ACCEPTED_TIME_FORMS: &[&str] = &[
    "all_time",
    "N_minutes_ago / N_hours_ago / N_days_ago / N_weeks_ago / N_months_ago / N_years_ago",
    "YYYY-MM-DD",
    "RFC 3339 timestamp (e.g. 2024-01-15T09:30:00Z)",
];

/// Errors raised while turning raw flag values into a query filter.
///
/// Both variants are terminal for the current command: nothing falls back
/// to a default filter when one of them is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error(
        "invalid time expression \"{expression}\"; accepted forms: {}",
        .accepted.join(", ")
    )]
    InvalidTimeExpression {
        expression: String,
        accepted: &'static [&'static str],
    },
    #[error("invalid sort option \"{option}\"; valid options are: linear, created, updated")]
    InvalidSortOption { option: String },
}

impl FilterError {
    pub(crate) fn invalid_time(expression: &str) -> Self {
        Self::InvalidTimeExpression {
            expression: expression.to_owned(),
            accepted: ACCEPTED_TIME_FORMS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_error_lists_accepted_forms() {
        let msg = FilterError::invalid_time("soon").to_string();
        assert!(msg.contains("\"soon\""));
        assert!(msg.contains("all_time"));
        assert!(msg.contains("YYYY-MM-DD"));
    }

    #[test]
    fn sort_error_names_valid_options() {
        let err = FilterError::InvalidSortOption {
            option: "priority".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid sort option \"priority\"; valid options are: linear, created, updated"
        );
    }
}
