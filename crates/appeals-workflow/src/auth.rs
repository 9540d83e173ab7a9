use std::collections::BTreeSet;

use crate::error::{AppealError, AppealResult};

/// Chat identities allowed to review appeals.
#[derive(Debug, Clone, Default)]
pub struct AdminSet {
    ids: BTreeSet<i64>,
}

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn require(&self, user_id: i64) -> AppealResult<()> {
        if self.contains(user_id) {
            Ok(())
        } else {
            Err(AppealError::Unauthorized)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let admins = AdminSet::new([10, 20, 10]);
        assert_eq!(admins.len(), 2);
        assert!(admins.require(20).is_ok());
        assert!(matches!(admins.require(30), Err(AppealError::Unauthorized)));
    }

    #[test]
    fn test_empty_set_denies_everyone() {
        let admins = AdminSet::default();
        assert!(admins.is_empty());
        assert!(!admins.contains(0));
    }
}
