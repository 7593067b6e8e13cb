/*!
 * Error types for the locweave application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

use crate::store::EntryId;

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur when talking to the content store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error when making a store request fails
    #[error("Store request failed: {0}")]
    RequestFailed(String),

    /// Error when the store returned an unparseable response
    #[error("Failed to parse store response: {0}")]
    ParseError(String),

    /// Error returned by the store API itself
    #[error("Store responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the store
        message: String
    },

    /// A collection the caller asked for does not exist
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A write operation was rejected or returned no record
    #[error("Store write failed: {0}")]
    WriteFailed(String),

    /// A created record does not match what was requested.
    /// This is a structural fault in the store's cross-locale identity,
    /// not a translation issue.
    #[error("Integrity fault: {0}")]
    Integrity(String),
}

/// Errors that can occur while replicating content across locales
#[derive(Error, Debug)]
pub enum ReplicationError {
    /// The requested target locale is not configured in the store.
    /// Fatal to the whole run, raised before any writes occur.
    #[error("Locale '{0}' is not available. Add it to the store's configured locales first.")]
    UnconfiguredLocale(String),

    /// A source entry has no stable document identity to attach a variant to
    #[error("Entry {entry_id} is missing documentId - cannot create locale variant")]
    MissingIdentity {
        /// Store-assigned id of the offending entry
        entry_id: EntryId
    },

    /// An entry the caller addressed directly does not exist
    #[error("Entry {0} not found")]
    EntryNotFound(EntryId),

    /// Error from the content store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a translation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the content store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from replication
    #[error("Replication error: {0}")]
    Replication(#[from] ReplicationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
