//! This library lets a relying-party application ask a user to prove possession of a verifiable
//! credential, or to log in, with a mobile identity wallet.
//!
//! The application shows a QR code; the user scans it with their wallet, which submits a proof to
//! the verification backend. The backend reports its progress over a persistent session channel,
//! and the application receives a single boolean result.
//!
//! # Usage
//!
//! ```ignore
//! use wallet_verifier::{config::Config, verifier::VerificationSession};
//!
//! let config: Config = serde_json::from_str(include_str!("verifier.json"))?;
//!
//! let session = VerificationSession::builder()
//!     .with_config(config)
//!     .secure(true)
//!     .with_credential_type("KYCAgeCredential")
//!     .with_issuer_or_how_to_link("https://issuer.example.com/kyc")
//!     .on_verification_result(|verified| grant_access(verified))
//!     .connect()
//!     .await?;
//!
//! // Draw the QR code and progress with whatever UI the application uses.
//! let mut snapshots = session.subscribe();
//! tokio::spawn(async move {
//!     while snapshots.changed().await.is_ok() {
//!         render(&snapshots.borrow_and_update());
//!     }
//! });
//!
//! let verified = session.run().await?;
//! ```
//!
//! # Protocol Overview
//!
//! 1. *Session*: the application opens the session channel, and the backend answers with an
//!    `id` frame carrying the session identifier. See [`channel`].
//! 2. *QR payload*: the application fetches the proof request for that session from
//!    `api/get-auth-qr`, or from `api/get-login-qr` for a login. See [`fetcher`].
//! 3. *Proof*: the wallet scans the QR code and submits its proof to the backend, which pushes
//!    `event` frames from `handleVerification` (or `handleLogin`) with status `IN_PROGRESS`, then
//!    `DONE` or `ERROR`.
//! 4. *Result*: the session reports `true` after a short delay, so the user can see the
//!    confirmation, or `false` immediately. See [`verifier`].
//!
//! The transitions themselves live in [`verifier::machine`], which performs no I/O.
//!
//! [`channel`]: crate::channel
//! [`fetcher`]: crate::fetcher
//! [`verifier`]: crate::verifier
//! [`verifier::machine`]: crate::verifier::machine

pub mod channel;
pub mod config;
pub mod core;
pub mod fetcher;
pub mod verifier;

pub use wallet_verifier_frontend as frontend;
