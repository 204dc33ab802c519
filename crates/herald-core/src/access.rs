//! Operator access control.

/// Restricts all wizard interaction to the single authorized operator.
///
/// Unauthorized events are dropped before any other processing: no reply,
/// no state change.
#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    operator_id: i64,
}

impl AccessGate {
    pub fn new(operator_id: i64) -> Self {
        Self { operator_id }
    }

    /// True iff `sender` is the configured operator.
    pub fn authorize(&self, sender: i64) -> bool {
        sender == self.operator_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_operator_only() {
        let gate = AccessGate::new(42);
        assert!(gate.authorize(42));
        for other in [0, 1, -42, 43, i64::MAX, i64::MIN] {
            assert!(!gate.authorize(other), "id {other} must be rejected");
        }
    }
}
