mod credential_store;
mod credentials;
mod error;

pub use credential_store::{CredentialStore, FileCredentialStore, StoredSource};
pub use credentials::{
    CredentialProvider, CredentialSource, EnvCredentials, StaticCredentials, StoredCredentials,
};
pub use error::AuthError;
