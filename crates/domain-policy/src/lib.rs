//! Identity-to-domain authorization shared by the backend and the frontend.
//!
//! - [`claims`]: read-only view over a validated token's claims
//! - [`resolver`]: picks the canonical email-like identifier out of the claims
//! - [`policy`]: authoritative domain decision (case-insensitive containment)
//! - [`advisory`]: client-side mirror (strict, case-sensitive suffix)
//! - [`api`]: wire types exchanged between the two halves
//!
//! The server policy and the advisory check intentionally disagree on what
//! "belongs to the domain" means. `policy` is the security boundary and
//! accepts the suffix anywhere in the identifier; `advisory` only shortens
//! the feedback loop in the browser and requires a literal suffix. Do not
//! unify them without deciding which posture is wanted.

pub mod advisory;
pub mod api;
pub mod claims;
pub mod policy;
pub mod resolver;

pub use advisory::{AdvisoryCheck, AdvisoryOutcome, AuthenticatedAccount, Evaluation};
pub use claims::IdentityClaims;
pub use policy::{AllowedDomainSuffix, DenyReason, DomainPolicy, Verdict};
pub use resolver::{CanonicalIdentifier, ClaimResolver, DEFAULT_CLAIM_PROBES};
