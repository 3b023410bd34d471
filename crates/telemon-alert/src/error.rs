/// Errors raised by the alert crate.
///
/// Evaluation itself never fails: a missing signal, a cold trend window or an
/// active cooldown simply produce no alert. These variants cover rule
/// authoring mistakes caught by the validating entry points
/// ([`AlertRule::validate`](crate::rule::AlertRule::validate),
/// [`AlertEngine::try_add_rule`](crate::engine::AlertEngine::try_add_rule))
/// and rule-set parsing.
///
/// # Examples
///
/// ```rust
/// use telemon_alert::error::AlertError;
///
/// let err = AlertError::InvalidRule {
///     rule_id: "temp-high".to_string(),
///     reason: "composite condition has no children".to_string(),
/// };
/// assert!(err.to_string().contains("temp-high"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// A rule definition violates a structural constraint.
    #[error("Alert: rule '{rule_id}' is invalid: {reason}")]
    InvalidRule { rule_id: String, reason: String },

    /// A rule set document could not be parsed.
    #[error("Alert: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` alias for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;
