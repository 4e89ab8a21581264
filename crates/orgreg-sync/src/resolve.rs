//! Identity resolution for directory payloads.
//!
//! Identity drifts across email, directory GUID and distinguished name over
//! time, so resolution tries an explicit ordered list of keys and stops at
//! the first hit. Results are never merged across keys.

use orgreg_core::{
  person::{DirectoryRecord, Person},
  store::PersonStore,
};

use crate::{Error, Result};

/// One lookup key in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKey {
  /// Exact, case-insensitive email comparison.
  Email,
  /// Directory-identifier suffix comparison.
  GuidSuffix,
  /// Exact distinguished-name comparison.
  DistinguishedName,
}

/// Evaluation order. Short-circuit: the first key that matches wins and
/// later keys are not consulted.
pub const RESOLUTION_ORDER: [ResolveKey; 3] = [
  ResolveKey::Email,
  ResolveKey::GuidSuffix,
  ResolveKey::DistinguishedName,
];

/// Resolve `record` against the store. Returns the matched person and the
/// key that matched, or `None` when no key resolves.
///
/// Keys whose probe value is empty are skipped: an empty suffix comparator
/// would match every record in the store.
pub async fn resolve<S: PersonStore>(
  store: &S,
  record: &DirectoryRecord,
) -> Result<Option<(ResolveKey, Person)>, S::Error> {
  for key in RESOLUTION_ORDER {
    let probe = match key {
      ResolveKey::Email => record.email.as_str(),
      ResolveKey::GuidSuffix => record.object_guid.as_str(),
      ResolveKey::DistinguishedName => record.distinguished_name.as_str(),
    };
    if probe.is_empty() {
      continue;
    }

    let hit = match key {
      ResolveKey::Email => store.find_by_email(probe).await,
      ResolveKey::GuidSuffix => store.find_by_guid_suffix(probe).await,
      ResolveKey::DistinguishedName => store.find_by_dn(probe).await,
    }
    .map_err(Error::Store)?;

    if let Some(person) = hit {
      return Ok(Some((key, person)));
    }
  }

  Ok(None)
}
