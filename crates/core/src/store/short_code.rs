//! Reversible short codes for member ids.

use std::sync::Arc;

use sqids::Sqids;

use crate::Error;

/// Encodes member ids as short codes and builds redirect urls from them.
#[derive(Clone, Debug)]
pub struct ShortCodec {
    sqids: Arc<Sqids>,
    host: String,
}

impl ShortCodec {
    /// Build a codec producing codes of at least `min_length` characters.
    pub fn new(host: impl Into<String>, min_length: u8) -> Result<Self, Error> {
        let sqids = Sqids::builder()
            .min_length(min_length)
            .build()
            .map_err(|e| Error::ShortCode(e.to_string()))?;

        Ok(Self { sqids: Arc::new(sqids), host: host.into() })
    }

    pub fn encode(&self, id: i64) -> Result<String, Error> {
        let id = u64::try_from(id).map_err(|_| Error::ShortCode(format!("cannot encode negative id {id}")))?;
        self.sqids.encode(&[id]).map_err(|e| Error::ShortCode(e.to_string()))
    }

    /// Decode a short code back to a member id.
    ///
    /// Only canonical codes for exactly one id resolve; anything else is `None`.
    pub fn decode(&self, code: &str) -> Option<i64> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        let ids = self.sqids.decode(code);
        let [id] = ids.as_slice() else {
            return None;
        };

        if self.sqids.encode(&[*id]).ok()? != code {
            return None;
        }

        i64::try_from(*id).ok()
    }

    /// `<host>/<code>` for the given id.
    pub fn short_url(&self, id: i64) -> Result<String, Error> {
        Ok(format!("{}/{}", self.host, self.encode(id)?))
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}
