//! Issued API code to organisation bindings.
//!
//! The bindings arrive as one base64 value whose decoded form is a
//! comma-separated list of `apiCode=organisationId` pairs, for example
//! `qwe=org-1,asd=org-2`. The registry is built once at startup and shared
//! read-only by every request.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

use crate::error::{ConfigurationError, Error};
use crate::types::{ApiCode, OrganisationId};

/// A single credential to organisation binding.
#[derive(Clone, PartialEq, Eq)]
pub struct OrgApiCode {
    api_code: ApiCode,
    organisation_id: OrganisationId,
}

impl OrgApiCode {
    /// Create a new binding.
    pub fn new(api_code: ApiCode, organisation_id: OrganisationId) -> Self {
        Self {
            api_code,
            organisation_id,
        }
    }

    /// Returns the issued API code.
    pub fn api_code(&self) -> &ApiCode {
        &self.api_code
    }

    /// Returns the organisation the code is bound to.
    pub fn organisation_id(&self) -> &OrganisationId {
        &self.organisation_id
    }
}

impl fmt::Debug for OrgApiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgApiCode")
            .field("api_code", &self.api_code)
            .field("organisation_id", &self.organisation_id)
            .finish()
    }
}

/// Ordered, immutable list of API code bindings.
///
/// Lookups are first-match: if the same API code was issued twice, the
/// earlier binding wins.
///
/// # Example
///
/// ```
/// use waste_core::{ApiCode, CredentialRegistry};
///
/// // base64 of "qwe=qwe,asd=asd,zxc=zxc"
/// let registry = CredentialRegistry::load("cXdlPXF3ZSxhc2Q9YXNkLHp4Yz16eGM=").unwrap();
/// assert_eq!(registry.len(), 3);
///
/// let org = registry.resolve_organisation(&ApiCode::new("asd")).unwrap();
/// assert_eq!(org.as_str(), "asd");
/// assert!(registry.resolve_organisation(&ApiCode::new("invalid")).is_none());
/// ```
#[derive(Clone, Default)]
pub struct CredentialRegistry {
    bindings: Vec<OrgApiCode>,
}

impl CredentialRegistry {
    /// Build a registry from an already decoded list of bindings.
    pub fn from_bindings(bindings: Vec<OrgApiCode>) -> Self {
        Self { bindings }
    }

    /// Decode a base64 encoded `apiCode=organisationId,...` list.
    ///
    /// Surrounding whitespace around the encoded value is ignored. Every
    /// comma-separated segment must be exactly one pair with a non-empty
    /// code and a non-empty organisation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the value is not base64, does not
    /// decode to UTF-8, is empty, or contains a malformed segment.
    pub fn load(encoded: &str) -> Result<Self, Error> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigurationError::Encoding {
                reason: e.to_string(),
            })?;
        let decoded = String::from_utf8(bytes).map_err(|_| ConfigurationError::Utf8)?;

        let registry = Self::parse(&decoded)?;

        info!(
            bindings = registry.len(),
            "Loaded organisation api code bindings"
        );

        Ok(registry)
    }

    fn parse(decoded: &str) -> Result<Self, ConfigurationError> {
        if decoded.is_empty() {
            return Err(ConfigurationError::Empty);
        }

        let mut bindings = Vec::new();
        let mut seen = HashSet::new();

        for (index, segment) in decoded.split(',').enumerate() {
            let position = index + 1;
            let malformed = |reason: &str| ConfigurationError::MalformedPair {
                position,
                reason: reason.to_string(),
            };

            if segment.is_empty() {
                return Err(malformed("entry is empty"));
            }

            let (code, organisation) = segment
                .split_once('=')
                .ok_or_else(|| malformed("expected 'apiCode=organisationId'"))?;

            if organisation.contains('=') {
                return Err(malformed("entry contains more than one '='"));
            }
            if code.is_empty() {
                return Err(malformed("api code is empty"));
            }
            let organisation_id = OrganisationId::new(organisation)
                .map_err(|_| malformed("organisation id is empty"))?;

            if !seen.insert(code) {
                warn!(position, "Duplicate api code; the earlier binding wins");
            }

            bindings.push(OrgApiCode::new(ApiCode::new(code), organisation_id));
        }

        Ok(Self { bindings })
    }

    /// Resolve the organisation an API code is bound to.
    pub fn resolve_organisation(&self, api_code: &ApiCode) -> Option<&OrganisationId> {
        self.bindings
            .iter()
            .find(|binding| binding.api_code == *api_code)
            .map(OrgApiCode::organisation_id)
    }

    /// Returns the bindings in load order.
    pub fn bindings(&self) -> &[OrgApiCode] {
        &self.bindings
    }

    /// Number of bindings, duplicates included.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no bindings were loaded.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromStr for CredentialRegistry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::load(s)
    }
}

// Only organisations are listed; the codes are credentials.
impl fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRegistry")
            .field(
                "organisations",
                &self
                    .bindings
                    .iter()
                    .map(|b| b.organisation_id.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
