//! Declarative resource lifecycle.
//!
//! The hosting framework drives create/read/update/delete/import through this trait.
//! Desired state comes in as a typed record, observed state goes back out together
//! with the identifier string the framework persists between runs.

use crate::Result;
use async_trait::async_trait;

/// Observed state of a resource: the identifier the framework stores and the record
/// projected from the appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState<S> {
    /// Identifier persisted by the framework
    pub id: String,
    /// Record as observed on the appliance
    pub record: S,
}

impl<S> ResourceState<S> {
    /// Pair an identifier with a record.
    #[must_use]
    pub fn new(id: impl Into<String>, record: S) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}

/// Lifecycle callbacks of one declarative resource type.
///
/// Errors for which [`crate::Error::clears_identifier`] is true tell the framework the
/// stored identifier no longer addresses anything.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Desired-state record.
    type Record: Send + Sync;

    /// Resource type name as registered with the framework.
    fn type_name(&self) -> &'static str;

    /// Create the object and return its observed state.
    async fn create(&self, desired: &Self::Record) -> Result<ResourceState<Self::Record>>;

    /// Refresh observed state for a stored identifier.
    async fn read(&self, id: &str) -> Result<ResourceState<Self::Record>>;

    /// Converge the object addressed by `id` to `desired`.
    async fn update(
        &self,
        id: &str,
        desired: &Self::Record,
    ) -> Result<ResourceState<Self::Record>>;

    /// Remove the object addressed by `id`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Adopt an existing object from an externally supplied identifier.
    async fn import(&self, id: &str) -> Result<ResourceState<Self::Record>> {
        self.read(id).await
    }
}
