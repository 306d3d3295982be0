use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable local key for a managed resource.
///
/// The cluster front end supplies namespace + name; the plan front end
/// supplies a module path + address. Either way the pair renders as
/// `"{scope}/{name}"`, which doubles as the external-id convention for
/// resource kinds correlated by external id rather than a remote-native id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub scope: String,
    pub name: String,
}

impl ResourceIdentity {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let scope = scope.into();
        let name = name.into();
        if scope.is_empty() || name.is_empty() {
            return Err(CoreError::invalid_identity(format!("{scope}/{name}")));
        }
        if scope.contains('/') || name.contains('/') {
            return Err(CoreError::invalid_identity(format!("{scope}/{name}")));
        }
        Ok(Self { scope, name })
    }

    /// External-id rendering, `"{scope}/{name}"`.
    pub fn external_id(&self) -> String {
        format!("{}/{}", self.scope, self.name)
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}

impl std::str::FromStr for ResourceIdentity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((scope, name)) => Self::new(scope, name),
            None => Err(CoreError::invalid_identity(s)),
        }
    }
}
