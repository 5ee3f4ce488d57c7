/// Translation of failed writes into domain errors
///
/// A failed write is first handed to a [`ConflictClassifier`], which extracts a
/// [`UniqueViolation`] from the driver error if there is one. The violation is
/// then looked up in a table of [`ConstraintRule`]s. A matching rule yields a
/// [`ConflictKind`]; everything else becomes a [`StoreError::Write`].
///
/// Adding a new unique constraint means adding a row to [`POSTGRES_RULES`],
/// not touching repository code.
///
/// # Example
///
/// ```
/// use habitforge_store::constraint::{ConflictKind, POSTGRES_RULES, lookup};
///
/// assert_eq!(
///     lookup(POSTGRES_RULES, Some("users"), "users_email_key"),
///     Some(ConflictKind::EmailTaken)
/// );
/// ```

use crate::error::{is_connection_error, StoreError};

/// SQLSTATE for `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

/// Store-independent category of a uniqueness conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    UsernameTaken,
    EmailTaken,
}

impl From<ConflictKind> for StoreError {
    fn from(kind: ConflictKind) -> Self {
        match kind {
            ConflictKind::UsernameTaken => StoreError::UsernameTaken,
            ConflictKind::EmailTaken => StoreError::EmailTaken,
        }
    }
}

/// Maps one named constraint on one table to a conflict category
#[derive(Debug, Clone, Copy)]
pub struct ConstraintRule {
    pub table: &'static str,
    pub constraint: &'static str,
    pub kind: ConflictKind,
}

/// Unique constraints created by the schema bootstrapper
///
/// PostgreSQL names inline `UNIQUE` column constraints `{table}_{column}_key`.
pub const POSTGRES_RULES: &[ConstraintRule] = &[
    ConstraintRule {
        table: "users",
        constraint: "users_username_key",
        kind: ConflictKind::UsernameTaken,
    },
    ConstraintRule {
        table: "users",
        constraint: "users_email_key",
        kind: ConflictKind::EmailTaken,
    },
    ConstraintRule {
        table: "passwords",
        constraint: "passwords_username_key",
        kind: ConflictKind::UsernameTaken,
    },
];

/// A uniqueness violation extracted from a driver error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueViolation {
    /// Table reported by the store, when it reports one
    pub table: Option<String>,

    /// Name of the violated constraint
    pub constraint: String,
}

/// Recognizes uniqueness violations in driver errors
///
/// Invoked once per failed write. Implementations must not inspect anything
/// but the error itself, so they can be swapped for fakes in tests.
pub trait ConflictClassifier: Send + Sync {
    fn unique_violation(&self, err: &sqlx::Error) -> Option<UniqueViolation>;
}

/// Classifier for PostgreSQL: SQLSTATE 23505 plus the reported constraint name
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConflictClassifier;

impl ConflictClassifier for PgConflictClassifier {
    fn unique_violation(&self, err: &sqlx::Error) -> Option<UniqueViolation> {
        let sqlx::Error::Database(db_err) = err else {
            return None;
        };

        if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
            return None;
        }

        Some(UniqueViolation {
            table: db_err.table().map(str::to_owned),
            constraint: db_err.constraint()?.to_owned(),
        })
    }
}

/// Finds the conflict category for a constraint
///
/// When the store does not report a table, the constraint name alone decides.
pub fn lookup(
    rules: &[ConstraintRule],
    table: Option<&str>,
    constraint: &str,
) -> Option<ConflictKind> {
    rules
        .iter()
        .find(|rule| {
            rule.constraint == constraint && table.map_or(true, |table| rule.table == table)
        })
        .map(|rule| rule.kind)
}

/// Rule table paired with the classifier that feeds it
#[derive(Debug, Clone, Copy)]
pub struct ConstraintTranslator<C> {
    rules: &'static [ConstraintRule],
    classifier: C,
}

/// Translator used by every repository
pub static POSTGRES: ConstraintTranslator<PgConflictClassifier> =
    ConstraintTranslator::new(POSTGRES_RULES, PgConflictClassifier);

impl<C: ConflictClassifier> ConstraintTranslator<C> {
    pub const fn new(rules: &'static [ConstraintRule], classifier: C) -> Self {
        Self { rules, classifier }
    }

    /// Classifies a failed write
    ///
    /// Connection failures map to [`StoreError::Connection`], recognized unique
    /// violations to their conflict category, and the rest to
    /// [`StoreError::Write`] carrying `err` as its source.
    pub fn translate(&self, operation: &'static str, err: sqlx::Error) -> StoreError {
        if is_connection_error(&err) {
            return StoreError::Connection(err);
        }

        let kind = self.classifier.unique_violation(&err).and_then(|violation| {
            lookup(self.rules, violation.table.as_deref(), &violation.constraint)
        });

        match kind {
            Some(kind) => kind.into(),
            None => StoreError::Write {
                operation,
                source: err,
            },
        }
    }
}

/// Classifies a failed write with the PostgreSQL rules
pub fn translate(operation: &'static str, err: sqlx::Error) -> StoreError {
    POSTGRES.translate(operation, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Treats `Protocol` messages of the form `table.constraint` as unique violations
    struct FakeClassifier;

    impl ConflictClassifier for FakeClassifier {
        fn unique_violation(&self, err: &sqlx::Error) -> Option<UniqueViolation> {
            let sqlx::Error::Protocol(message) = err else {
                return None;
            };
            let (table, constraint) = message.split_once('.')?;
            Some(UniqueViolation {
                table: Some(table.to_string()),
                constraint: constraint.to_string(),
            })
        }
    }

    const FAKE: ConstraintTranslator<FakeClassifier> =
        ConstraintTranslator::new(POSTGRES_RULES, FakeClassifier);

    fn violation(table: &str, constraint: &str) -> sqlx::Error {
        sqlx::Error::Protocol(format!("{}.{}", table, constraint))
    }

    #[test]
    fn test_lookup_known_constraints() {
        assert_eq!(
            lookup(POSTGRES_RULES, Some("users"), "users_username_key"),
            Some(ConflictKind::UsernameTaken)
        );
        assert_eq!(
            lookup(POSTGRES_RULES, Some("users"), "users_email_key"),
            Some(ConflictKind::EmailTaken)
        );
        assert_eq!(
            lookup(POSTGRES_RULES, Some("passwords"), "passwords_username_key"),
            Some(ConflictKind::UsernameTaken)
        );
    }

    #[test]
    fn test_lookup_requires_matching_table() {
        assert_eq!(lookup(POSTGRES_RULES, Some("habits"), "users_email_key"), None);
        assert_eq!(lookup(POSTGRES_RULES, Some("users"), "users_phone_key"), None);
    }

    #[test]
    fn test_lookup_without_table_uses_constraint_name() {
        assert_eq!(
            lookup(POSTGRES_RULES, None, "passwords_username_key"),
            Some(ConflictKind::UsernameTaken)
        );
    }

    #[test]
    fn test_translate_username_conflicts() {
        let err = FAKE.translate("insert user", violation("users", "users_username_key"));
        assert!(matches!(err, StoreError::UsernameTaken));

        let err = FAKE.translate("insert credential", violation("passwords", "passwords_username_key"));
        assert!(matches!(err, StoreError::UsernameTaken));
    }

    #[test]
    fn test_translate_email_conflict() {
        let err = FAKE.translate("update email", violation("users", "users_email_key"));
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[test]
    fn test_translate_unknown_constraint_is_write_error() {
        let err = FAKE.translate("insert habit", violation("habits", "habits_difficulty_check"));
        match err {
            StoreError::Write { operation, source } => {
                assert_eq!(operation, "insert habit");
                assert!(matches!(source, sqlx::Error::Protocol(_)));
            }
            other => panic!("expected write error, got {:?}", other),
        }
    }

    #[test]
    fn test_translate_connection_failures() {
        let err = FAKE.translate("insert habit", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Connection(_)));

        let err = FAKE.translate("insert habit", sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn test_postgres_classifier_ignores_non_database_errors() {
        assert_eq!(PgConflictClassifier.unique_violation(&sqlx::Error::RowNotFound), None);
        assert!(matches!(
            translate("insert task", sqlx::Error::RowNotFound),
            StoreError::Write { operation: "insert task", .. }
        ));
    }
}
