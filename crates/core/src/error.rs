#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by a persistence collaborator.
///
/// Callers never retry; mutations roll back and bulk loads surface an error
/// screen. Only [`StoreError::Unsupported`] may be papered over (by the
/// owner-listing fallback).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store's access rules rejected the call.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The store cannot serve this query shape (e.g. a missing index).
    #[error("Unsupported query: {0}")]
    Unsupported(String),

    /// Network, configuration or otherwise unclassified failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

/// Failure reported by the identity collaborator, or caught locally before
/// contacting it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Password is too weak")]
    WeakSecret,

    #[error("Sign-in provider is disabled")]
    ProviderDisabled,

    /// A required field was empty; raised before any network call.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Other(String),
}

impl AuthError {
    /// Localized message shown to the viewer for this failure class.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredential => "帳號或密碼錯誤，請再試一次。".to_string(),
            Self::DuplicateAccount => "這個 Email 已經註冊過了，請直接登入。".to_string(),
            Self::WeakSecret => "密碼強度不足，請使用更長的密碼。".to_string(),
            Self::ProviderDisabled => "目前未開放此登入方式，請聯絡網站管理員。".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Other(msg) => format!("登入時發生錯誤：{msg}"),
        }
    }
}

/// Failure of a Mutation Coordinator operation.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("No artist is signed in")]
    NotSignedIn,

    #[error("Mutations are only available in admin mode")]
    NotAdmin,

    #[error("Commission {0} is not in the local list")]
    NotFound(String),

    #[error("Commission {0} belongs to another artist")]
    NotOwner(String),

    #[error("No creation form is open")]
    FormNotOpen,

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
