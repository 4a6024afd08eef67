//! Scope locator: opener/closer/owning-condition relations for a token
//! stream.
//!
//! The table is filled by a host (see [`crate::parser`] for the
//! reference one) and only read by the checkers. Several conditions may
//! share one closer, e.g. fallthrough `case`s ending at the same
//! `break`; exactly one of them is the *canonical owner* of that closer.

use std::collections::{BTreeMap, HashMap};

/// A matched opener/closer span and the condition token owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    /// Keyword the scope belongs to (`switch`, `case`, `if`, ...).
    pub condition: usize,
    /// Token opening the body (`{`, or `:` for a `case`).
    pub opener: usize,
    /// Token closing the body (`}`, or a terminator for a `case`).
    pub closer: usize,
}

/// Invariant violations of a host-supplied scope table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("scope closer {closer} does not come after its opener {opener}")]
    CloserBeforeOpener { opener: usize, closer: usize },
    #[error("scope condition {condition} comes after its opener {opener}")]
    ConditionAfterOpener { condition: usize, opener: usize },
    #[error("condition {0} already owns a scope")]
    DuplicateCondition(usize),
    #[error("condition {condition} has no scope ending at {closer}")]
    ForeignOwner { condition: usize, closer: usize },
    #[error("position {position} is outside a stream of {len} tokens")]
    OutOfBounds { position: usize, len: usize },
}

/// Precomputed scope relations for one token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTable {
    scopes: BTreeMap<usize, Scope>,
    openers: HashMap<usize, usize>,
    owners: HashMap<usize, usize>,
}

impl ScopeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope. The first condition registered for a closer
    /// becomes its owner until [`ScopeTable::set_owner`] says otherwise.
    ///
    /// # Errors
    ///
    /// Rejects scopes whose closer does not follow the opener, whose
    /// condition follows the opener, or whose condition already has a
    /// scope.
    pub fn insert(&mut self, scope: Scope) -> Result<(), ScopeError> {
        if scope.closer <= scope.opener {
            return Err(ScopeError::CloserBeforeOpener {
                opener: scope.opener,
                closer: scope.closer,
            });
        }
        if scope.condition > scope.opener {
            return Err(ScopeError::ConditionAfterOpener {
                condition: scope.condition,
                opener: scope.opener,
            });
        }
        if self.scopes.contains_key(&scope.condition) {
            return Err(ScopeError::DuplicateCondition(scope.condition));
        }

        self.scopes.insert(scope.condition, scope);
        self.openers.entry(scope.opener).or_insert(scope.condition);
        self.owners.entry(scope.closer).or_insert(scope.condition);
        Ok(())
    }

    /// Make `condition` the canonical owner of `closer`.
    ///
    /// # Errors
    ///
    /// `condition` must own a scope that ends at `closer`.
    pub fn set_owner(&mut self, closer: usize, condition: usize) -> Result<(), ScopeError> {
        match self.scopes.get(&condition) {
            Some(scope) if scope.closer == closer => {
                self.owners.insert(closer, condition);
                Ok(())
            }
            _ => Err(ScopeError::ForeignOwner { condition, closer }),
        }
    }

    /// Scope owned by the condition at `condition`.
    #[must_use]
    pub fn scope_of(&self, condition: usize) -> Option<&Scope> {
        self.scopes.get(&condition)
    }

    /// Closer for a condition or opener position.
    #[must_use]
    pub fn closer_of(&self, position: usize) -> Option<usize> {
        self.scope_of(position)
            .or_else(|| self.openers.get(&position).and_then(|c| self.scopes.get(c)))
            .map(|scope| scope.closer)
    }

    /// Opener for a condition position, or for a closer position via
    /// its owning condition.
    #[must_use]
    pub fn opener_of(&self, position: usize) -> Option<usize> {
        self.scope_of(position)
            .or_else(|| self.owners.get(&position).and_then(|c| self.scopes.get(c)))
            .map(|scope| scope.opener)
    }

    /// Condition that `closer` logically terminates.
    #[must_use]
    pub fn owning_condition_of(&self, closer: usize) -> Option<usize> {
        self.owners.get(&closer).copied()
    }

    /// Whether `condition` is the one condition responsible for `closer`.
    #[must_use]
    pub fn is_canonical_owner(&self, condition: usize, closer: usize) -> bool {
        self.owning_condition_of(closer) == Some(condition)
    }

    /// Check that every recorded position lies inside a stream of `len`
    /// tokens.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range position found.
    pub fn check_bounds(&self, len: usize) -> Result<(), ScopeError> {
        // closer is the largest position of every scope
        match self.scopes.values().map(|s| s.closer).find(|&c| c >= len) {
            Some(position) => Err(ScopeError::OutOfBounds { position, len }),
            None => Ok(()),
        }
    }

    /// Scopes in condition order.
    ///
    /// Re-inserting these alone does not restore shared-closer
    /// ownership; replay [`ScopeTable::owners`] with `set_owner` too.
    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    /// `(closer, owning condition)` pairs in closer order.
    #[must_use]
    pub fn owners(&self) -> Vec<(usize, usize)> {
        let mut owners: Vec<_> = self.owners.iter().map(|(&c, &o)| (c, o)).collect();
        owners.sort_unstable();
        owners
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn scope(condition: usize, opener: usize, closer: usize) -> Scope {
        Scope {
            condition,
            opener,
            closer,
        }
    }

    #[test]
    fn lookups() {
        let mut table = ScopeTable::new();
        table.insert(scope(0, 4, 20)).unwrap();
        assert_eq!(table.closer_of(0), Some(20));
        assert_eq!(table.closer_of(4), Some(20));
        assert_eq!(table.opener_of(0), Some(4));
        assert_eq!(table.opener_of(20), Some(4));
        assert_eq!(table.owning_condition_of(20), Some(0));
        assert!(table.is_canonical_owner(0, 20));
        assert_eq!(table.closer_of(7), None);
    }

    #[test]
    fn shared_closer_keeps_first_owner_until_reassigned() {
        let mut table = ScopeTable::new();
        table.insert(scope(6, 8, 30)).unwrap();
        table.insert(scope(12, 14, 30)).unwrap();
        assert!(table.is_canonical_owner(6, 30));
        assert!(!table.is_canonical_owner(12, 30));

        table.set_owner(30, 12).unwrap();
        assert!(table.is_canonical_owner(12, 30));
        assert!(!table.is_canonical_owner(6, 30));
    }

    #[test]
    fn rebuilt_table_keeps_owners() {
        let mut table = ScopeTable::new();
        // inserted last branch first, the way fallthrough scopes are built
        table.insert(scope(12, 14, 30)).unwrap();
        table.insert(scope(6, 8, 30)).unwrap();
        assert_eq!(table.owners(), [(30, 12)]);

        let mut rebuilt = ScopeTable::new();
        for scope in table.iter() {
            rebuilt.insert(*scope).unwrap();
        }
        for (closer, owner) in table.owners() {
            rebuilt.set_owner(closer, owner).unwrap();
        }
        assert_eq!(rebuilt, table);
        assert!(rebuilt.is_canonical_owner(12, 30));
    }

    #[test]
    fn foreign_owner_rejected() {
        let mut table = ScopeTable::new();
        table.insert(scope(0, 2, 9)).unwrap();
        assert_eq!(
            table.set_owner(8, 0),
            Err(ScopeError::ForeignOwner {
                condition: 0,
                closer: 8
            })
        );
        assert!(table.set_owner(9, 5).is_err());
    }

    #[test]
    fn invariants_enforced() {
        let mut table = ScopeTable::new();
        assert_eq!(
            table.insert(scope(0, 5, 5)),
            Err(ScopeError::CloserBeforeOpener {
                opener: 5,
                closer: 5
            })
        );
        assert_eq!(
            table.insert(scope(6, 5, 9)),
            Err(ScopeError::ConditionAfterOpener {
                condition: 6,
                opener: 5
            })
        );
        table.insert(scope(1, 2, 3)).unwrap();
        assert_eq!(
            table.insert(scope(1, 4, 5)),
            Err(ScopeError::DuplicateCondition(1))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn bounds() {
        let mut table = ScopeTable::new();
        table.insert(scope(0, 1, 10)).unwrap();
        assert!(table.check_bounds(11).is_ok());
        assert_eq!(
            table.check_bounds(10),
            Err(ScopeError::OutOfBounds {
                position: 10,
                len: 10
            })
        );
    }
}
