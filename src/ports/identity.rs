use crate::models::CallerIdentity;
use anyhow::Result;
use async_trait::async_trait;

/// The identity hook (spec §6): `verify(bearer) -> caller_id | null | internal`.
/// An external auth provider issues the bearer tokens; this trait only
/// verifies them. Returns `Ok(None)` for a bearer that does not verify.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, bearer: &str) -> Result<Option<CallerIdentity>>;
}
